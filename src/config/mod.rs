pub mod cli;
pub mod file;
pub mod settings;

pub use cli::CliArgs;
pub use file::PipelineFile;
pub use settings::Settings;
