pub mod clients;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::clients::completion::{CompletionClient, SamplingParams};
pub use crate::clients::destination::DestinationClient;
pub use crate::config::{CliArgs, PipelineFile, Settings};
pub use crate::core::{etl::EtlEngine, pipeline::RewritePipeline};
pub use crate::domain::model::{Record, RunSummary, TRANSFORMED_COLUMN};
pub use crate::domain::ports::{Pipeline, TextGenerator};
pub use crate::utils::error::{EtlError, Result};
