use crate::clients::completion::{SamplingParams, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::config::cli::CliArgs;
use crate::config::file::PipelineFile;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_DESTINATION_URL: &str = "DESTINATION_URL";
pub const ENV_BEARER_TOKEN: &str = "DESTINATION_BEARER_TOKEN";

/// Resolved configuration handed to the pipeline stages.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input_path: String,
    pub instruction: String,
    pub completion: CompletionSettings,
    pub destination: DestinationSettings,
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub params: SamplingParams,
}

#[derive(Debug, Clone)]
pub struct DestinationSettings {
    pub url: String,
    pub bearer_token: Option<String>,
}

impl Settings {
    /// Env-first resolution, or a TOML pipeline file when `--config` is set.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        if let Some(path) = &args.config {
            let file = PipelineFile::from_file(path)?;
            return Ok(Self::from_pipeline_file(file, args));
        }
        Self::from_env(args)
    }

    pub fn from_env(args: &CliArgs) -> Result<Self> {
        Ok(Self {
            input_path: args.input.clone(),
            instruction: args.instruction.clone(),
            completion: CompletionSettings {
                api_key: require_env(ENV_API_KEY)?,
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                params: SamplingParams::default(),
            },
            destination: DestinationSettings {
                url: require_env(ENV_DESTINATION_URL)?,
                bearer_token: std::env::var(ENV_BEARER_TOKEN).ok(),
            },
        })
    }

    pub fn from_pipeline_file(file: PipelineFile, args: &CliArgs) -> Self {
        let defaults = SamplingParams::default();
        Self {
            input_path: file.source.input_path,
            instruction: file
                .pipeline
                .instruction
                .unwrap_or_else(|| args.instruction.clone()),
            completion: CompletionSettings {
                api_key: file.completion.api_key,
                model: file
                    .completion
                    .model
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: file
                    .completion
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                params: SamplingParams {
                    temperature: file.completion.temperature.unwrap_or(defaults.temperature),
                    max_output_tokens: file
                        .completion
                        .max_output_tokens
                        .unwrap_or(defaults.max_output_tokens),
                    candidate_count: file
                        .completion
                        .candidate_count
                        .unwrap_or(defaults.candidate_count),
                    stop_sequences: file
                        .completion
                        .stop_sequences
                        .unwrap_or(defaults.stop_sequences),
                },
            },
            destination: DestinationSettings {
                url: file.destination.url,
                bearer_token: file.destination.bearer_token,
            },
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("input_path", &self.input_path)?;
        validate_non_empty_string("instruction", &self.instruction)?;
        validate_non_empty_string("completion.api_key", &self.completion.api_key)?;
        validate_url("completion.base_url", &self.completion.base_url)?;
        validate_url("destination.url", &self.destination.url)?;
        validate_positive_number(
            "completion.max_output_tokens",
            self.completion.params.max_output_tokens as usize,
            1,
        )?;
        validate_positive_number(
            "completion.candidate_count",
            self.completion.params.candidate_count as usize,
            1,
        )?;
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| EtlError::MissingConfigError {
        field: name.to_string(),
    })
}
