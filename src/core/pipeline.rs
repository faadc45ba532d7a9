use crate::clients::completion::CompletionClient;
use crate::clients::destination::DestinationClient;
use crate::config::settings::Settings;
use crate::core::{Pipeline, Record, TextGenerator, TRANSFORMED_COLUMN};
use crate::utils::error::Result;
use reqwest::Client;
use std::collections::HashMap;

/// The three pipeline stages over one input file: CSV rows in, a generated
/// `transformed_data` column added per row, each row POSTed to the
/// destination.
pub struct RewritePipeline<G: TextGenerator> {
    input_path: String,
    instruction: String,
    generator: G,
    destination: DestinationClient,
}

impl<G: TextGenerator> RewritePipeline<G> {
    pub fn new(
        input_path: String,
        instruction: String,
        generator: G,
        destination: DestinationClient,
    ) -> Self {
        Self {
            input_path,
            instruction,
            generator,
            destination,
        }
    }

    /// Fixed instruction plus a line per field, fields in column-name order so
    /// the prompt is stable for a given row.
    fn build_prompt(&self, record: &Record) -> String {
        let mut fields: Vec<_> = record.data.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let dump = fields
            .iter()
            .map(|(name, value)| format!("{}: {}", name, render_value(value)))
            .collect::<Vec<_>>()
            .join("\n");

        format!("{}\n\n{}", self.instruction, dump)
    }
}

impl RewritePipeline<CompletionClient> {
    pub fn from_settings(settings: &Settings) -> Self {
        let client = Client::new();
        let generator = CompletionClient::new(
            client.clone(),
            settings.completion.api_key.clone(),
            settings.completion.model.clone(),
            settings.completion.params.clone(),
        )
        .with_base_url(settings.completion.base_url.clone());
        let destination = DestinationClient::new(
            client,
            settings.destination.url.clone(),
            settings.destination.bearer_token.clone(),
        );

        Self::new(
            settings.input_path.clone(),
            settings.instruction.clone(),
            generator,
            destination,
        )
    }
}

#[async_trait::async_trait]
impl<G: TextGenerator> Pipeline for RewritePipeline<G> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let mut reader = csv::Reader::from_path(&self.input_path)?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut data = HashMap::new();
            for (header, field) in headers.iter().zip(row.iter()) {
                data.insert(header.to_string(), infer_value(field));
            }
            records.push(Record { data });
        }

        tracing::debug!("Read {} rows from {}", records.len(), self.input_path);
        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<Vec<Record>> {
        let mut transformed = Vec::with_capacity(data.len());

        for (index, mut record) in data.into_iter().enumerate() {
            let prompt = self.build_prompt(&record);
            let value = match self.generator.generate(&prompt).await {
                Ok(text) => serde_json::Value::String(text),
                Err(e) => {
                    tracing::warn!("Row {}: completion failed, storing null: {}", index, e);
                    serde_json::Value::Null
                }
            };
            record.data.insert(TRANSFORMED_COLUMN.to_string(), value);
            transformed.push(record);
        }

        Ok(transformed)
    }

    async fn load_row(&self, record: &Record) -> Result<serde_json::Value> {
        self.destination.post_row(record).await
    }
}

/// Renders a field value for the prompt. Strings appear bare, everything else
/// as its JSON text.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// CSV fields are untyped text; mirror the loose typing of a data-frame
/// loader by parsing numbers and booleans where they are unambiguous.
fn infer_value(raw: &str) -> serde_json::Value {
    if raw.is_empty() {
        return serde_json::Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return serde_json::Value::Number(i.into());
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return serde_json::Value::Number(n);
        }
    }
    match raw {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => serde_json::Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::NamedTempFile;

    /// Echoes a marker per call; fails on the call indexes given.
    struct StubGenerator {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
    }

    impl StubGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Vec::new(),
            }
        }

        fn failing_on(fail_on: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&call) {
                return Err(EtlError::CompletionError {
                    message: format!("stub failure on call {}", call),
                });
            }
            Ok(format!("generated-{}", call))
        }
    }

    fn pipeline_with(input_path: String, generator: StubGenerator) -> RewritePipeline<StubGenerator> {
        let destination =
            DestinationClient::new(reqwest::Client::new(), "http://localhost/unused".to_string(), None);
        RewritePipeline::new(
            input_path,
            "Rewrite this record:".to_string(),
            generator,
            destination,
        )
    }

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_extract_preserves_rows_and_columns() {
        let file = csv_file("id,name,price\n1,Widget,9.50\n2,Gadget,12\n3,Sprocket,0.25\n");
        let pipeline = pipeline_with(
            file.path().to_str().unwrap().to_string(),
            StubGenerator::new(),
        );

        let records = pipeline.extract().await.unwrap();

        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.data.len(), 3);
            assert!(record.data.contains_key("id"));
            assert!(record.data.contains_key("name"));
            assert!(record.data.contains_key("price"));
        }
        assert_eq!(records[0].data["id"], serde_json::json!(1));
        assert_eq!(records[0].data["name"], serde_json::json!("Widget"));
        assert_eq!(records[1].data["price"], serde_json::json!(12));
        assert_eq!(records[2].data["id"], serde_json::json!(3));
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_error() {
        let pipeline = pipeline_with("no/such/file.csv".to_string(), StubGenerator::new());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::CsvError(_)));
    }

    #[tokio::test]
    async fn test_transform_adds_one_column_per_row_in_order() {
        let file = csv_file("id,name\n1,First\n2,Second\n");
        let pipeline = pipeline_with(
            file.path().to_str().unwrap().to_string(),
            StubGenerator::new(),
        );

        let extracted = pipeline.extract().await.unwrap();
        let transformed = pipeline.transform(extracted).await.unwrap();

        assert_eq!(transformed.len(), 2);
        assert_eq!(transformed[0].data["id"], serde_json::json!(1));
        assert_eq!(
            transformed[0].data[TRANSFORMED_COLUMN],
            serde_json::json!("generated-0")
        );
        assert_eq!(transformed[1].data["id"], serde_json::json!(2));
        assert_eq!(
            transformed[1].data[TRANSFORMED_COLUMN],
            serde_json::json!("generated-1")
        );
        // Exactly one column added
        assert_eq!(transformed[0].data.len(), 3);
    }

    #[tokio::test]
    async fn test_transform_failure_is_isolated_per_row() {
        let file = csv_file("id\n1\n2\n3\n");
        let pipeline = pipeline_with(
            file.path().to_str().unwrap().to_string(),
            StubGenerator::failing_on(vec![1]),
        );

        let extracted = pipeline.extract().await.unwrap();
        let transformed = pipeline.transform(extracted).await.unwrap();

        assert_eq!(transformed.len(), 3);
        assert_eq!(
            transformed[0].data[TRANSFORMED_COLUMN],
            serde_json::json!("generated-0")
        );
        assert_eq!(transformed[1].data[TRANSFORMED_COLUMN], serde_json::Value::Null);
        assert_eq!(
            transformed[2].data[TRANSFORMED_COLUMN],
            serde_json::json!("generated-2")
        );
    }

    #[tokio::test]
    async fn test_load_row_posts_to_destination() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rows")
                .json_body(serde_json::json!({"id": 7}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"accepted": true}));
        });

        let destination = DestinationClient::new(reqwest::Client::new(), server.url("/rows"), None);
        let pipeline = RewritePipeline::new(
            "unused.csv".to_string(),
            "Rewrite this record:".to_string(),
            StubGenerator::new(),
            destination,
        );

        let mut data = HashMap::new();
        data.insert("id".to_string(), serde_json::json!(7));
        let response = pipeline.load_row(&Record { data }).await.unwrap();

        api_mock.assert();
        assert_eq!(response["accepted"], true);
    }

    #[test]
    fn test_build_prompt_is_sorted_and_stable() {
        let file = csv_file("id\n1\n");
        let pipeline = pipeline_with(
            file.path().to_str().unwrap().to_string(),
            StubGenerator::new(),
        );

        let mut data = HashMap::new();
        data.insert("name".to_string(), serde_json::json!("Widget"));
        data.insert("id".to_string(), serde_json::json!(1));
        data.insert("price".to_string(), serde_json::json!(9.5));
        let record = Record { data };

        let prompt = pipeline.build_prompt(&record);
        assert_eq!(
            prompt,
            "Rewrite this record:\n\nid: 1\nname: Widget\nprice: 9.5"
        );
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value("42"), serde_json::json!(42));
        assert_eq!(infer_value("-3"), serde_json::json!(-3));
        assert_eq!(infer_value("9.50"), serde_json::json!(9.5));
        assert_eq!(infer_value("true"), serde_json::json!(true));
        assert_eq!(infer_value("false"), serde_json::json!(false));
        assert_eq!(infer_value("Widget"), serde_json::json!("Widget"));
        assert_eq!(infer_value(""), serde_json::Value::Null);
    }
}
