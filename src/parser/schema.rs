use crate::model::GeometryKind;
use crate::parser::ElementTree;

/// ルート要素名の接尾辞とスキーマの対応表。上から順に照合する
static SCHEMAS: &[(&str, GeometryKind)] = &[
    ("Point3D", GeometryKind::Point3D),
    ("Point2D", GeometryKind::Point2D),
    ("RoughnessPoint", GeometryKind::RoughnessPoint),
];

/// ルート要素のローカル名からスキーマを判定する
pub fn resolve(tree: &ElementTree) -> GeometryKind {
    let name = tree.root().local_name();

    match SCHEMAS.iter().find(|(suffix, _)| name.ends_with(suffix)) {
        Some((_, kind)) => *kind,
        None => {
            tracing::debug!("Unrecognized root element <{}>, treating as 2D points", name);
            GeometryKind::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn resolve_str(xml: &str) -> GeometryKind {
        resolve(&parse(xml).unwrap())
    }

    #[test]
    fn test_resolve_known_schemas() {
        assert_eq!(resolve_str("<ArrayOfPoint2D/>"), GeometryKind::Point2D);
        assert_eq!(resolve_str("<ArrayOfPoint3D/>"), GeometryKind::Point3D);
        assert_eq!(
            resolve_str("<ArrayOfRoughnessPoint/>"),
            GeometryKind::RoughnessPoint
        );
    }

    #[test]
    fn test_resolve_ignores_namespace() {
        let xml = r#"<ArrayOfPoint3D xmlns="http://schemas.datacontract.org/2004/07/Core.Common.Base.Geometry"/>"#;
        assert_eq!(resolve_str(xml), GeometryKind::Point3D);
    }

    #[test]
    fn test_resolve_falls_back_to_unknown() {
        assert_eq!(resolve_str("<ArrayOfCharacteristicPoint/>"), GeometryKind::Unknown);
        // 接尾辞の照合は大文字小文字を区別する
        assert_eq!(resolve_str("<ArrayOfpoint2d/>"), GeometryKind::Unknown);
    }
}
