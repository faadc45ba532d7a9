use crate::domain::model::Record;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Seam for the hosted text-generation service, so the transform stage can be
/// exercised with a stub.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<Vec<Record>>;
    async fn load_row(&self, record: &Record) -> Result<serde_json::Value>;
}
