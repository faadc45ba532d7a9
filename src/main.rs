use clap::Parser;
use prompt_etl::utils::{logger, validation::Validate};
use prompt_etl::{CliArgs, EtlEngine, RewritePipeline, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting prompt-etl");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let settings = match Settings::resolve(&args) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Failed to resolve configuration: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let pipeline = RewritePipeline::from_settings(&settings);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Pipeline run completed");
            println!(
                "✅ Pipeline run completed: {} rows extracted, {} delivered, {} failed",
                summary.rows_extracted, summary.rows_delivered, summary.rows_failed
            );
        }
        Err(e) => {
            tracing::error!("❌ Pipeline run failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
