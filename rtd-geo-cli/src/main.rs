use anyhow::{Context, Result};
use clap::Parser;
use rayon::ThreadPoolBuilder;
use rtd_geo::{GeoColumnProjector, ProjectionConfig, Table, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const SOURCE_COLUMN: &str = "source";
const GEOMETRY_COLUMN: &str = "geometry";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 入力XMLファイル（1ファイル1レコード）またはディレクトリ
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// 出力ジオメトリの種類（point, multipoint, line, polygon）
    #[arg(short, long, default_value = "multipoint")]
    kind: String,

    /// 出力に付与する座標系（例: EPSG:28992）
    #[arg(long)]
    crs: Option<String>,

    /// 並列処理スレッド数（デフォルト: CPUコア数）
    #[arg(short, long)]
    threads: Option<usize>,

    /// 行を逐次処理する
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    // ログの初期化（標準出力は結果に使う）
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();
    let start_time = std::time::Instant::now();

    // スレッドプールの設定
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    // 入力パスの処理
    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        info!("Processing directory: {:?}", args.input);
        collect_xml_files(&args.input)?
    } else {
        error!("Invalid input path: {:?}", args.input);
        anyhow::bail!("Input path must be a file or directory");
    };
    info!("Found {} XML records", files.len());

    let table = load_table(&files)?;
    info!("Input table: {}", table.info());

    let projector = GeoColumnProjector::with_config(ProjectionConfig {
        crs: args.crs.clone(),
        parallel: !args.sequential,
        ..Default::default()
    });
    let projection = projector.project(table, GEOMETRY_COLUMN, &args.kind)?;
    info!("Projected table: {}", projection.table.table.info());

    // 結果を1行ずつ出力
    let sources = projection
        .table
        .table
        .column(SOURCE_COLUMN)
        .context("Source column is missing")?;
    let geometries = projection
        .table
        .table
        .column(&projection.column)
        .context("Geometry column is missing")?;
    for (source, geometry) in sources.iter().zip(geometries) {
        let source = source.as_text().unwrap_or_default();
        match geometry.as_geometry() {
            Some(geometry) => println!("{}\t{}", source, geometry),
            None => println!("{}\tNULL", source),
        }
    }

    if !projection.diagnostics.is_empty() {
        warn!("Failed to convert {} records:", projection.diagnostics.len());
        for diagnostic in &projection.diagnostics {
            warn!(
                "  {}: [{}] {}",
                files[diagnostic.row].display(),
                diagnostic.kind,
                diagnostic.message
            );
        }
    }

    info!("Total processing time: {:?}", start_time.elapsed());

    Ok(())
}

/// ディレクトリ以下の .xml ファイルを再帰的に集める（パス順）
fn collect_xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(collect_xml_files(&path)?);
        } else if path.extension().and_then(|s| s.to_str()) == Some("xml") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// ファイルごとに1行のテーブルを作る
fn load_table(files: &[PathBuf]) -> Result<Table> {
    let mut sources = Vec::with_capacity(files.len());
    let mut records = Vec::with_capacity(files.len());

    for path in files {
        let xml = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        sources.push(Value::from(path.display().to_string()));
        records.push(Value::from(xml));
    }

    let table = Table::new()
        .with_column(SOURCE_COLUMN, sources)?
        .with_column(GEOMETRY_COLUMN, records)?;
    Ok(table)
}
