use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::Coordinate;
use crate::parser::ElementTree;

/// タグ名ごとに集めた数値。キーは値が1つ以上見つかったタグのみ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagBag {
    values: BTreeMap<String, Vec<f64>>,
}

impl TagBag {
    pub fn get(&self, tag: &str) -> Option<&[f64]> {
        self.values.get(tag).map(Vec::as_slice)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.values.contains_key(tag)
    }

    /// アルファベット順のタグ名
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// タグ名のアルファベット順に成分を並べた座標列を組み立てる
    ///
    /// 各タグの値の数が揃っていなければ `ShapeMismatch` を返す（短い方に切り詰めない）。
    pub fn into_coordinates(self) -> Result<Vec<Coordinate>> {
        let mut lengths = self.values.values().map(Vec::len);
        let len = match lengths.next() {
            Some(len) => len,
            None => return Ok(Vec::new()),
        };

        if lengths.any(|l| l != len) {
            let counts = self
                .values
                .iter()
                .map(|(tag, values)| (tag.clone(), values.len()))
                .collect();
            return Err(Error::ShapeMismatch { counts });
        }

        // BTreeMapの走査順がそのまま成分順になる
        let columns: Vec<Vec<f64>> = self.values.into_values().collect();
        let coordinates = (0..len)
            .map(|i| Coordinate::new(columns.iter().map(|column| column[i]).collect()))
            .collect();
        Ok(coordinates)
    }
}

/// ツリー内の全要素を走査し、指定タグのテキストを数値として集める
pub fn extract(tree: &ElementTree, tags: &[&str]) -> Result<TagBag> {
    let mut values: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for element in tree.iter() {
        let name = element.local_name();
        if !tags.contains(&name) {
            continue;
        }

        let value: f64 = element.text.parse().map_err(|_| Error::ValueFormat {
            tag: name.to_string(),
            text: element.text.clone(),
        })?;
        values.entry(name.to_string()).or_default().push(value);
    }

    tracing::debug!(
        "Extracted {} values for tags {:?}",
        values.values().map(Vec::len).sum::<usize>(),
        tags
    );
    Ok(TagBag { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn bag(xml: &str, tags: &[&str]) -> Result<TagBag> {
        extract(&parse(xml).unwrap(), tags)
    }

    #[test]
    fn test_extract_in_document_order() {
        let xml = "<ArrayOfPoint2D><Point2D><x>3</x><y>4</y></Point2D><Point2D><y>6</y><x>5</x></Point2D></ArrayOfPoint2D>";
        let bag = bag(xml, &["x", "y"]).unwrap();

        assert_eq!(bag.get("x"), Some(&[3.0, 5.0][..]));
        assert_eq!(bag.get("y"), Some(&[4.0, 6.0][..]));
    }

    #[test]
    fn test_extract_omits_missing_tags() {
        let xml = "<ArrayOfPoint3D><Point3D><x>1</x><y>2</y></Point3D></ArrayOfPoint3D>";
        let bag = bag(xml, &["x", "y", "z"]).unwrap();

        assert!(!bag.contains("z"));
        assert_eq!(bag.tags().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_extract_ignores_other_tags_and_case() {
        let xml = "<Points><Point><X>9</X><x>1</x><y>2</y><id>abc</id></Point></Points>";
        let bag = bag(xml, &["x", "y"]).unwrap();
        assert_eq!(bag.get("x"), Some(&[1.0][..]));
    }

    #[test]
    fn test_extract_namespaced_leaves() {
        let xml = r#"<ArrayOfPoint2D xmlns="urn:geo"><Point2D><x>1e3</x><y>-2.5</y></Point2D></ArrayOfPoint2D>"#;
        let bag = bag(xml, &["x", "y"]).unwrap();
        assert_eq!(bag.get("x"), Some(&[1000.0][..]));
        assert_eq!(bag.get("y"), Some(&[-2.5][..]));
    }

    #[test]
    fn test_extract_non_numeric_value() {
        let xml = "<ArrayOfPoint2D><Point2D><x>one</x><y>2</y></Point2D></ArrayOfPoint2D>";
        let err = bag(xml, &["x", "y"]).unwrap_err();
        assert!(matches!(err, Error::ValueFormat { ref tag, ref text } if tag == "x" && text == "one"));
    }

    #[test]
    fn test_extract_empty_leaf_is_value_error() {
        let xml = "<ArrayOfPoint2D><Point2D><x/><y>2</y></Point2D></ArrayOfPoint2D>";
        assert!(matches!(
            bag(xml, &["x", "y"]),
            Err(Error::ValueFormat { .. })
        ));
    }

    #[test]
    fn test_coordinates_alphabetical_order() {
        let xml = "<ArrayOfRoughnessPoint><RoughnessPoint><x>1</x><y>2</y><roughness>0.9</roughness></RoughnessPoint></ArrayOfRoughnessPoint>";
        let coordinates = bag(xml, &["x", "y", "roughness"])
            .unwrap()
            .into_coordinates()
            .unwrap();

        assert_eq!(coordinates, vec![Coordinate::new(vec![0.9, 1.0, 2.0])]);
    }

    #[test]
    fn test_coordinates_shape_mismatch() {
        let xml = "<ArrayOfPoint3D><Point3D><x>1</x><y>2</y><z>3</z></Point3D><Point3D><x>4</x><y>5</y></Point3D></ArrayOfPoint3D>";
        let err = bag(xml, &["x", "y", "z"])
            .unwrap()
            .into_coordinates()
            .unwrap_err();

        match err {
            Error::ShapeMismatch { counts } => assert_eq!(
                counts,
                vec![
                    ("x".to_string(), 2),
                    ("y".to_string(), 2),
                    ("z".to_string(), 1)
                ]
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_coordinates_from_empty_bag() {
        let coordinates = TagBag::default().into_coordinates().unwrap();
        assert!(coordinates.is_empty());
    }
}
