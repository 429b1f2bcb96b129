pub mod args;
pub mod pipeline;
pub mod records;
pub mod settings;

pub use pipeline::{run_preprocess, PreprocessSummary};
pub use records::SkippedRecord;
pub use settings::PipelineSettings;
