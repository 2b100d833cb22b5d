use optics_rs::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize)]
struct ValidationData {
    name: String,
    notes: String,
    input: InputData,
    params: Params,
    #[serde(skip_deserializing)]
    result: ResultData,
}

#[derive(Debug, Deserialize, Serialize)]
struct InputData {
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Params {
    algorithm: String,
    generating_distance: f64,
    min_points: usize,
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(flatten)]
    extra: Option<Value>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ResultData {
    generating_distance: f64,
    order: Vec<usize>,
    reachability: Vec<Option<f64>>,
    core_distance: Vec<Option<f64>>,
    labels: Vec<usize>,
    cluster_count: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = Path::new("../output/reference");
    let output_dir = Path::new("../output/optics_rs");

    if !input_dir.exists() {
        eprintln!(
            "Input directory {:?} does not exist. Generate the reference cases first.",
            input_dir
        );
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            println!("Processing {:?}", entry.file_name());
            process_file(&path, output_dir)?;
        }
    }

    Ok(())
}

fn tie_break_from(extra: Option<&Value>) -> TieBreak {
    match extra
        .and_then(|v| v.get("tie_break"))
        .and_then(|v| v.as_str())
    {
        Some("descending") => DescendingId,
        Some("unspecified") => Unspecified,
        _ => AscendingId,
    }
}

fn process_file(input_path: &Path, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::open(input_path)?;
    let mut data: ValidationData = serde_json::from_reader(file)?;

    let mut engine = Clustering::new()
        .tie_break(tie_break_from(data.params.extra.as_ref()))
        .build(&data.input.x, &data.input.y)?;

    let p = &data.params;
    let result = &mut data.result;
    match p.algorithm.as_str() {
        "optics" => {
            let order = engine.optics(p.generating_distance, p.min_points)?;
            result.generating_distance = order.generating_distance;
            result.order = order.ids();
            result.reachability = order.order.iter().map(|r| r.reachability).collect();
            result.core_distance = order.order.iter().map(|r| r.core_distance).collect();
            if let Some(threshold) = p.threshold {
                let flat = order.extract_dbscan_clustering(threshold);
                result.cluster_count = flat.cluster_count;
                result.labels = flat.labels;
            }
        }
        "dbscan" => {
            let labels = engine.dbscan(p.generating_distance, p.min_points)?;
            result.generating_distance = labels.generating_distance;
            result.cluster_count = labels.cluster_count();
            result.labels = labels.assignment.labels;
        }
        other => return Err(format!("Unsupported algorithm: {}", other).into()),
    }

    let output_path = output_dir.join(input_path.file_name().ok_or("missing file name")?);
    let output_json = serde_json::to_string_pretty(&data)?;
    fs::write(output_path, output_json)?;

    Ok(())
}
