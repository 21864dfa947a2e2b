//! @ai:module:intent JSONL dataset loader
//! @ai:module:layer infrastructure
//! @ai:module:public_api DatasetLoader, DatasetLoaderTrait
//! @ai:module:stateless true

use crate::dataset::record::PuzzleRecord;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Trait for loading puzzle datasets
pub trait DatasetLoaderTrait: Send + Sync {
    /// @ai:intent Load every record from a JSONL file or a directory of them
    fn load(&self, path: &Path) -> Result<Vec<PuzzleRecord>>;
}

/// @ai:intent Loads puzzle records from JSONL files
pub struct DatasetLoader;

impl DatasetLoader {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Parse one JSONL file, skipping blank and invalid lines
    /// @ai:effects fs:read
    fn parse_file(path: &Path) -> Result<Vec<PuzzleRecord>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(line).map(PuzzleRecord::from_value) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    tracing::warn!("Skipping non-object line {} in {}", index + 1, path.display());
                }
                Err(e) => {
                    tracing::warn!("Skipping invalid line {} in {}: {}", index + 1, path.display(), e);
                }
            }
        }

        Ok(records)
    }

    /// @ai:intent Find all JSONL files under a directory, in path order
    /// @ai:effects fs:read
    fn find_dataset_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "jsonl")
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoaderTrait for DatasetLoader {
    /// @ai:effects fs:read
    fn load(&self, path: &Path) -> Result<Vec<PuzzleRecord>> {
        if !path.is_dir() {
            let records = Self::parse_file(path)?;
            tracing::info!("Loaded {} records from {}", records.len(), path.display());
            return Ok(records);
        }

        let mut records = Vec::new();
        for file in Self::find_dataset_files(path) {
            records.extend(Self::parse_file(&file)?);
        }

        tracing::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_file_skips_blank_and_invalid_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("train.jsonl");
        std::fs::write(
            &path,
            "{\"nums\": [1, 2, 3, 4], \"target\": 10}\n\n{broken\n[1, 2]\n{\"nums\": [5, 6, 7, 8], \"target\": 26}\n",
        )
        .unwrap();

        let records = DatasetLoader::new().load(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].field_string("target"), "26");
    }

    #[test]
    fn test_load_directory_reads_only_jsonl() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join("a.jsonl"), "{\"nums\": [1], \"target\": 1}\n").unwrap();
        std::fs::write(nested.join("b.jsonl"), "{\"nums\": [2], \"target\": 2}\n").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "{\"nums\": [3], \"target\": 3}\n").unwrap();

        let records = DatasetLoader::new().load(temp.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field_string("target"), "1");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(DatasetLoader::new().load(&temp.path().join("missing.jsonl")).is_err());
    }
}
