use crate::error::{Error, Result};
use crate::model::{Coordinate, RequestedKind, VectorGeometry};

/// 座標列から1種類のジオメトリを組み立てる
pub trait ShapeBuilder {
    fn build(&self, coordinates: Vec<Coordinate>) -> Result<VectorGeometry>;
}

pub struct MultiPointBuilder;
pub struct LineStringBuilder;
pub struct PolygonBuilder;

fn require_points(shape: &'static str, required: usize, coordinates: &[Coordinate]) -> Result<()> {
    if coordinates.len() < required {
        return Err(Error::InsufficientPoints {
            shape,
            required,
            actual: coordinates.len(),
        });
    }
    Ok(())
}

impl ShapeBuilder for MultiPointBuilder {
    fn build(&self, coordinates: Vec<Coordinate>) -> Result<VectorGeometry> {
        // 0点でも空のMultiPointとして有効
        Ok(VectorGeometry::MultiPoint(coordinates))
    }
}

impl ShapeBuilder for LineStringBuilder {
    fn build(&self, coordinates: Vec<Coordinate>) -> Result<VectorGeometry> {
        require_points("LineString", 2, &coordinates)?;
        Ok(VectorGeometry::LineString(coordinates))
    }
}

impl ShapeBuilder for PolygonBuilder {
    fn build(&self, coordinates: Vec<Coordinate>) -> Result<VectorGeometry> {
        require_points("Polygon", 3, &coordinates)?;
        // リングは閉じない（始点と終点を揃えない）
        Ok(VectorGeometry::Polygon(coordinates))
    }
}

impl RequestedKind {
    pub fn builder(&self) -> &'static dyn ShapeBuilder {
        match self {
            RequestedKind::Point | RequestedKind::MultiPoint => &MultiPointBuilder,
            RequestedKind::Line => &LineStringBuilder,
            RequestedKind::Polygon => &PolygonBuilder,
        }
    }
}

/// 要求された形状でジオメトリを組み立てる。未知の形状名は `Null` を返す
pub fn build_geometry(coordinates: Vec<Coordinate>, requested: &str) -> Result<VectorGeometry> {
    match RequestedKind::parse(requested) {
        Some(kind) => kind.builder().build(coordinates),
        None => {
            tracing::debug!("Unsupported geometry kind {:?}, returning null", requested);
            Ok(VectorGeometry::Null)
        }
    }
}
