use clap::Parser;

pub const DEFAULT_INSTRUCTION: &str =
    "Rewrite the following record as one clear sentence of plain English:";

#[derive(Debug, Clone, Parser)]
#[command(name = "prompt-etl")]
#[command(about = "Reads CSV rows, rewrites each through a text-generation API, POSTs the result")]
pub struct CliArgs {
    /// Input CSV file
    #[arg(long, default_value = "data.csv")]
    pub input: String,

    /// Instruction prepended to every row prompt
    #[arg(long, default_value = DEFAULT_INSTRUCTION)]
    pub instruction: String,

    /// Optional TOML pipeline config; overrides input/instruction when set
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
