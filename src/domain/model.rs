use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column name the transformer appends to every row.
pub const TRANSFORMED_COLUMN: &str = "transformed_data";

/// A single row: column name to scalar value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

/// Outcome of one pipeline run. Every transformed row is accounted for:
/// `rows_delivered + rows_failed == rows_transformed`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows_extracted: usize,
    pub rows_transformed: usize,
    pub rows_delivered: usize,
    pub rows_failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
