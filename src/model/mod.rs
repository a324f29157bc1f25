mod table;

pub use table::{GeoTable, Table, TableInfo, Value};

use std::fmt;

/// XMLが表す点スキーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point2D,
    Point3D,
    RoughnessPoint,
    /// 未知のスキーマ。2次元点として扱う
    Unknown,
}

impl GeometryKind {
    /// 抽出対象の葉タグ名
    pub fn tag_set(&self) -> &'static [&'static str] {
        match self {
            GeometryKind::Point2D | GeometryKind::Unknown => &["x", "y"],
            GeometryKind::Point3D => &["x", "y", "z"],
            GeometryKind::RoughnessPoint => &["x", "y", "roughness"],
        }
    }
}

/// 座標成分の並び。成分の順序はタグ名のアルファベット順
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate(Vec<f64>);

impl Coordinate {
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// 先頭から x, y, z, m として割り当てる。成分が1つしかない場合 y は NaN
    pub fn to_wkt(&self) -> wkt::types::Coord<f64> {
        let nth = |i: usize| self.0.get(i).copied();
        wkt::types::Coord {
            x: nth(0).unwrap_or(f64::NAN),
            y: nth(1).unwrap_or(f64::NAN),
            z: nth(2),
            m: nth(3),
        }
    }
}

/// 呼び出し側が要求する出力形状。元のスキーマとは独立
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestedKind {
    Point,
    MultiPoint,
    Line,
    Polygon,
}

impl RequestedKind {
    /// 大文字小文字を区別せずに解釈する。未知の名前は `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "point" => Some(RequestedKind::Point),
            "multipoint" => Some(RequestedKind::MultiPoint),
            "line" => Some(RequestedKind::Line),
            "polygon" => Some(RequestedKind::Polygon),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VectorGeometry {
    MultiPoint(Vec<Coordinate>),
    LineString(Vec<Coordinate>),
    /// 外周リング。始点と終点は閉じていない場合がある
    Polygon(Vec<Coordinate>),
    Null,
}

impl VectorGeometry {
    pub fn is_null(&self) -> bool {
        matches!(self, VectorGeometry::Null)
    }

    pub fn geometry_type(&self) -> &'static str {
        match self {
            VectorGeometry::MultiPoint(_) => "MultiPoint",
            VectorGeometry::LineString(_) => "LineString",
            VectorGeometry::Polygon(_) => "Polygon",
            VectorGeometry::Null => "Null",
        }
    }

    pub fn coordinates(&self) -> Option<&[Coordinate]> {
        match self {
            VectorGeometry::MultiPoint(c)
            | VectorGeometry::LineString(c)
            | VectorGeometry::Polygon(c) => Some(c),
            VectorGeometry::Null => None,
        }
    }

    pub fn num_points(&self) -> usize {
        self.coordinates().map_or(0, |c| c.len())
    }

    /// `Null` 以外を wkt の型に変換する
    pub fn to_wkt(&self) -> Option<wkt::Wkt<f64>> {
        let line = |coordinates: &[Coordinate]| {
            wkt::types::LineString(coordinates.iter().map(Coordinate::to_wkt).collect())
        };
        let geometry = match self {
            VectorGeometry::MultiPoint(c) => wkt::Wkt::MultiPoint(wkt::types::MultiPoint(
                c.iter()
                    .map(|coordinate| wkt::types::Point(Some(coordinate.to_wkt())))
                    .collect(),
            )),
            VectorGeometry::LineString(c) => wkt::Wkt::LineString(line(c)),
            // 空のポリゴンはリングを持たない
            VectorGeometry::Polygon(c) if c.is_empty() => {
                wkt::Wkt::Polygon(wkt::types::Polygon(vec![]))
            }
            VectorGeometry::Polygon(c) => wkt::Wkt::Polygon(wkt::types::Polygon(vec![line(c)])),
            VectorGeometry::Null => return None,
        };
        Some(geometry)
    }
}

impl fmt::Display for VectorGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_wkt() {
            Some(geometry) => write!(f, "{}", geometry),
            None => f.write_str("NULL"),
        }
    }
}
