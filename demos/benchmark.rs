use std::time::Instant;

use anyhow::Result;
use rtd_geo::{GeoColumnProjector, ProjectionConfig, Table, Value};

fn synthetic_record(row: usize, points: usize) -> String {
    let mut xml = String::from(
        r#"<ArrayOfPoint3D xmlns="http://schemas.datacontract.org/2004/07/Core.Common.Base.Geometry">"#,
    );
    for i in 0..points {
        let t = (row * points + i) as f64;
        xml.push_str(&format!(
            "<Point3D><x>{:.3}</x><y>{:.3}</y><z>{:.3}</z></Point3D>",
            t * 0.5,
            t * 0.25,
            (t * 0.01).sin()
        ));
    }
    xml.push_str("</ArrayOfPoint3D>");
    xml
}

fn main() -> Result<()> {
    // 環境変数で行数を指定
    let rows: usize = std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(20_000);
    let points = 50;

    println!("Benchmarking projection: {} rows x {} points", rows, points);

    let cells = (0..rows)
        .map(|row| Value::from(synthetic_record(row, points)))
        .collect();
    let table = Table::new().with_column("Geometry", cells)?;

    // 逐次処理
    let sequential = GeoColumnProjector::with_config(ProjectionConfig {
        parallel: false,
        ..Default::default()
    });
    let start = Instant::now();
    let projection = sequential.project(table.clone(), "Geometry", "line")?;
    let duration_sequential = start.elapsed();
    println!(
        "Sequential: {:?} ({} failed rows)",
        duration_sequential,
        projection.failed_rows()
    );

    // 並列処理
    let parallel = GeoColumnProjector::new();
    let start = Instant::now();
    let projection = parallel.project(table, "Geometry", "line")?;
    let duration_parallel = start.elapsed();
    println!(
        "Parallel: {:?} ({} failed rows)",
        duration_parallel,
        projection.failed_rows()
    );

    println!(
        "Speedup: {:.2}x",
        duration_sequential.as_secs_f64() / duration_parallel.as_secs_f64()
    );

    Ok(())
}
