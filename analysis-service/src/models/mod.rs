//! Wire models for the analysis service.

pub mod analysis;

pub use analysis::{data_uri, AnalysisResponse, DownloadResponse};
