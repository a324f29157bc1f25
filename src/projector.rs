use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::model::{GeoTable, Value, VectorGeometry};

#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// 出力テーブルに付与する座標系の識別子
    pub crs: Option<String>,
    /// rayonで行を並列処理する
    pub parallel: bool,
    /// 新しいジオメトリ列の接尾辞
    pub suffix: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            crs: None,
            parallel: true,
            suffix: "_geo".to_string(),
        }
    }
}

/// 変換対象の列と出力形状の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryTarget {
    pub column: String,
    pub kind: String,
}

impl GeometryTarget {
    pub fn new(column: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: kind.into(),
        }
    }
}

/// 変換に失敗した行の記録
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    pub row: usize,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Projection {
    pub table: GeoTable,
    /// 出力されたジオメトリ列名
    pub column: String,
    pub diagnostics: Vec<RowDiagnostic>,
}

impl Projection {
    pub fn failed_rows(&self) -> usize {
        self.diagnostics.len()
    }
}

/// `project_all` の列ごとの結果
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReport {
    pub column: String,
    pub diagnostics: Vec<RowDiagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct GeoColumnProjector {
    config: ProjectionConfig,
}

impl GeoColumnProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn with_crs(crs: impl Into<String>) -> Self {
        Self::with_config(ProjectionConfig {
            crs: Some(crs.into()),
            ..Default::default()
        })
    }

    /// 1列分のXMLをジオメトリ列に変換する
    ///
    /// 行ごとのエラーは `Null` と診断情報に置き換え、処理を続ける。
    /// 列が存在しない場合のみエラーを返す。
    pub fn project(
        &self,
        table: impl Into<GeoTable>,
        column: &str,
        requested: &str,
    ) -> Result<Projection> {
        let mut table = table.into();
        let cells = table
            .table
            .column(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;

        info!(
            "Projecting column {} as {} ({} rows)",
            column,
            requested,
            cells.len()
        );

        // 入力の行順を保ったまま変換する
        let results: Vec<(VectorGeometry, Option<RowDiagnostic>)> = if self.config.parallel {
            cells
                .par_iter()
                .enumerate()
                .map(|(row, cell)| convert_cell(row, cell, requested))
                .collect()
        } else {
            cells
                .iter()
                .enumerate()
                .map(|(row, cell)| convert_cell(row, cell, requested))
                .collect()
        };

        let mut geometries = Vec::with_capacity(results.len());
        let mut diagnostics = Vec::new();
        for (geometry, diagnostic) in results {
            geometries.push(Value::Geometry(geometry));
            if let Some(diagnostic) = diagnostic {
                warn!(
                    "Row {} of column {}: {} ({})",
                    diagnostic.row, column, diagnostic.message, diagnostic.kind
                );
                diagnostics.push(diagnostic);
            }
        }

        let output = format!("{}{}", column, self.config.suffix);
        table.table.set_column(output.clone(), geometries)?;
        table.geometry_column = Some(output.clone());
        table.crs = self.config.crs.clone();

        info!(
            "Wrote geometry column {} ({} failed rows, crs: {})",
            output,
            diagnostics.len(),
            table.crs.as_deref().unwrap_or("none")
        );

        Ok(Projection {
            table,
            column: output,
            diagnostics,
        })
    }

    /// 指定された列を順に変換する。最後の列がアクティブなジオメトリ列になる
    pub fn project_all(
        &self,
        table: impl Into<GeoTable>,
        targets: &[GeometryTarget],
    ) -> Result<(GeoTable, Vec<ColumnReport>)> {
        let mut table = table.into();
        let mut reports = Vec::with_capacity(targets.len());

        for target in targets {
            let Projection {
                table: projected,
                column,
                diagnostics,
            } = self.project(table, &target.column, &target.kind)?;
            table = projected;
            reports.push(ColumnReport {
                column,
                diagnostics,
            });
        }

        Ok((table, reports))
    }
}

fn convert_cell(
    row: usize,
    cell: &Value,
    requested: &str,
) -> (VectorGeometry, Option<RowDiagnostic>) {
    let xml = match cell {
        Value::Text(xml) => xml,
        // 値がない行はエラーとしない
        Value::Null => return (VectorGeometry::Null, None),
        other => {
            let diagnostic = RowDiagnostic {
                row,
                kind: ErrorKind::Parse,
                message: format!("expected XML text, found {} value", other.type_name()),
            };
            return (VectorGeometry::Null, Some(diagnostic));
        }
    };

    match crate::build(xml, requested) {
        Ok(geometry) => (geometry, None),
        Err(e) => {
            let diagnostic = RowDiagnostic {
                row,
                kind: e.kind().unwrap_or(ErrorKind::Parse),
                message: e.to_string(),
            };
            (VectorGeometry::Null, Some(diagnostic))
        }
    }
}
