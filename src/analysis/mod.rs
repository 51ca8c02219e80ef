//! Analysis module - the aggregation core and correlation

mod correlation;
mod engine;

pub use correlation::CorrelationMatrix;
pub use engine::{
    analyze, AnalysisError, AnalysisResult, ColumnSummary, DateDetector, NormalizedDataset,
    RowIndex, UNNAMED_INDEX_SENTINEL,
};
