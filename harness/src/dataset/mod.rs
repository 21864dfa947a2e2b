//! @ai:module:intent Countdown dataset loading and format conversion
//! @ai:module:layer application
//! @ai:module:public_api DatasetLoader, PuzzleRecord, DatasetFormat, to_eval_format, to_rft_format

pub mod convert;
pub mod loader;
pub mod record;

pub use convert::{
    convert_records, to_eval_format, to_rft_format, write_jsonl, ConversionSummary, DatasetFormat,
};
pub use loader::{DatasetLoader, DatasetLoaderTrait};
pub use record::{stringify_value, PuzzleRecord};
