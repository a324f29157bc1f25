pub mod builder;
pub mod error;
pub mod model;
pub mod parser;
pub mod projector;

pub use builder::build_geometry;
pub use error::{Error, ErrorKind, Result};
pub use model::{
    Coordinate, GeoTable, GeometryKind, RequestedKind, Table, TableInfo, Value, VectorGeometry,
};
pub use projector::{
    ColumnReport, GeoColumnProjector, GeometryTarget, Projection, ProjectionConfig, RowDiagnostic,
};

/// 1セル分のXMLをジオメトリに変換する
///
/// 解析・抽出・組み立てのエラーはそのまま呼び出し元に返す。
/// 未知のスキーマや未知の出力種別はエラーにならない。
pub fn build(xml: &str, requested: &str) -> Result<VectorGeometry> {
    let tree = parser::parse(xml)?;
    let kind = parser::resolve(&tree);
    let coordinates = parser::extract(&tree, kind.tag_set())?.into_coordinates()?;
    build_geometry(coordinates, requested)
}
