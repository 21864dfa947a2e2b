//! @ai:module:intent Convert puzzle records into evaluation and fine-tuning JSONL formats
//! @ai:module:layer application
//! @ai:module:public_api DatasetFormat, ConversionSummary, to_eval_format, to_rft_format, convert_records, write_jsonl
//! @ai:module:depends_on dataset::record, config

use crate::config::DatasetConfig;
use crate::dataset::record::{stringify_value, PuzzleRecord};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::Path;

/// @ai:intent Output layout of a converted dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// `{"item": {...stringified fields}}` for eval runs
    Eval,
    /// `{"messages": [...], "target", "nums"}` for reinforcement fine-tuning
    Rft,
}

impl DatasetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetFormat::Eval => "eval",
            DatasetFormat::Rft => "rft",
        }
    }
}

/// @ai:intent Counts from one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub read: usize,
    pub written: usize,
    pub wrong_arity: usize,
}

/// @ai:intent Wrap a record as an eval item with every value stringified
/// @ai:effects pure
/// @ai:example ({"nums": [4, 9], "target": 13}) -> {"item": {"nums": "[4, 9]", "target": "13"}}
pub fn to_eval_format(record: &PuzzleRecord) -> Value {
    let item: Map<String, Value> = record
        .fields()
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(stringify_value(value))))
        .collect();
    json!({ "item": item })
}

/// @ai:intent Build a single-turn fine-tuning record prompting for the puzzle
/// @ai:effects pure
pub fn to_rft_format(record: &PuzzleRecord, system_prompt: &str) -> Value {
    let target = record.field_string("target");
    let nums = record.field_string("nums");

    json!({
        "messages": [{
            "role": "user",
            "content": format!(
                "{}Input:: \n\n Target: \"{}\" Numbers: \"{}\"",
                system_prompt, target, nums
            ),
        }],
        "target": target,
        "nums": nums,
    })
}

/// @ai:intent Keep records of the configured arity, up to max_records, in the chosen format
/// @ai:effects pure
pub fn convert_records(
    records: &[PuzzleRecord],
    config: &DatasetConfig,
    format: DatasetFormat,
) -> (Vec<Value>, ConversionSummary) {
    let mut summary = ConversionSummary {
        read: records.len(),
        ..Default::default()
    };
    let limit = config.max_records.unwrap_or(usize::MAX);
    let mut converted = Vec::new();

    for record in records {
        if converted.len() >= limit {
            break;
        }
        if !record.has_arity(config.arity) {
            summary.wrong_arity += 1;
            continue;
        }

        converted.push(match format {
            DatasetFormat::Eval => to_eval_format(record),
            DatasetFormat::Rft => to_rft_format(record, &config.system_prompt),
        });
    }

    summary.written = converted.len();
    tracing::info!(
        "Converted {} of {} records to {} format ({} dropped for arity != {})",
        summary.written,
        summary.read,
        format.as_str(),
        summary.wrong_arity,
        config.arity
    );
    (converted, summary)
}

/// @ai:intent Write values one per line
/// @ai:effects fs:write
pub fn write_jsonl(path: &Path, values: &[Value]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    for value in values {
        serde_json::to_writer(&mut writer, value)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(values.len())
}
