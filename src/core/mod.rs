pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{Record, RunSummary, TRANSFORMED_COLUMN};
pub use crate::domain::ports::{Pipeline, TextGenerator};
pub use crate::utils::error::Result;
