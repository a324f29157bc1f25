use std::fmt;
use std::mem::size_of;

use crate::error::{Error, Result};
use crate::model::VectorGeometry;

/// テーブルのセル値
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Geometry(VectorGeometry),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&VectorGeometry> {
        match self {
            Value::Geometry(g) => Some(g),
            _ => None,
        }
    }

    /// セルが保持するデータのおおよそのバイト数
    fn data_size(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Integer(_) => size_of::<i64>(),
            Value::Real(_) => size_of::<f64>(),
            Value::Text(s) => s.len(),
            Value::Geometry(g) => g
                .coordinates()
                .map_or(0, |c| c.iter().map(|p| p.dimension() * size_of::<f64>()).sum()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Geometry(_) => "geometry",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Value>,
}

/// 列指向の行セット。全ての列は同じ行数を持つ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        self.set_column(name, values)?;
        Ok(self)
    }

    /// 列を追加する。同名の列があれば置き換える
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        let others = self.columns.iter().filter(|c| c.name != name);
        if let Some(expected) = others.map(|c| c.values.len()).next() {
            if expected != values.len() {
                return Err(Error::ColumnLength {
                    name,
                    expected,
                    actual: values.len(),
                });
            }
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// 行数・列数・列名とデータ量の概要
    pub fn info(&self) -> TableInfo {
        TableInfo {
            rows: self.num_rows(),
            columns: self.column_names().map(str::to_string).collect(),
            bytes: self
                .columns
                .iter()
                .flat_map(|c| c.values.iter())
                .map(Value::data_size)
                .sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub rows: usize,
    pub columns: Vec<String>,
    pub bytes: usize,
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Shape: ({}, {})  Bytes: {}",
            self.rows,
            self.columns.len(),
            self.bytes
        )?;
        for column in &self.columns {
            write!(f, "\n    {}", column)?;
        }
        Ok(())
    }
}

/// ジオメトリ列と座標系を持つテーブル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoTable {
    pub table: Table,
    pub geometry_column: Option<String>,
    /// 座標系の識別子（例: "EPSG:28992"）。内容は解釈しない
    pub crs: Option<String>,
}

impl GeoTable {
    pub fn geometries(&self) -> Option<impl Iterator<Item = Option<&VectorGeometry>>> {
        let name = self.geometry_column.as_deref()?;
        let values = self.table.column(name)?;
        Some(values.iter().map(Value::as_geometry))
    }
}

impl From<Table> for GeoTable {
    fn from(table: Table) -> Self {
        Self {
            table,
            geometry_column: None,
            crs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_column_replaces_existing() {
        let mut table = Table::new()
            .with_column("id", vec![Value::Integer(1), Value::Integer(2)])
            .unwrap();
        table
            .set_column("id", vec![Value::Integer(3), Value::Integer(4)])
            .unwrap();

        assert_eq!(table.num_columns(), 1);
        assert_eq!(table.column("id").unwrap()[1], Value::Integer(4));
    }

    #[test]
    fn test_set_column_rejects_length_mismatch() {
        let table = Table::new()
            .with_column("id", vec![Value::Integer(1), Value::Integer(2)])
            .unwrap();
        let result = table.with_column("name", vec![Value::from("a")]);

        assert!(matches!(
            result,
            Err(Error::ColumnLength {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_info_lists_shape_and_columns() {
        let table = Table::new()
            .with_column("Id", vec![Value::Integer(1), Value::Null])
            .unwrap()
            .with_column("Points", vec![Value::from("<a/>"), Value::from("<bb/>")])
            .unwrap();

        let info = table.info();
        assert_eq!(info.rows, 2);
        assert_eq!(info.columns, vec!["Id".to_string(), "Points".to_string()]);
        assert_eq!(info.bytes, 8 + 4 + 5);
        assert_eq!(
            info.to_string(),
            "Shape: (2, 2)  Bytes: 17\n    Id\n    Points"
        );
    }

    #[test]
    fn test_info_of_empty_table() {
        let info = Table::new().info();
        assert_eq!(info.rows, 0);
        assert!(info.columns.is_empty());
        assert_eq!(info.to_string(), "Shape: (0, 0)  Bytes: 0");
    }

    #[test]
    fn test_geometries_without_active_column() {
        let geo_table = GeoTable::from(Table::new());
        assert!(geo_table.geometries().is_none());
    }
}
