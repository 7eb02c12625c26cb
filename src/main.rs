use clap::Parser;
use reqpin::utils::{logger, validation::Validate};
use reqpin::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting reqpin");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let outcome = match config.build_generator() {
        Ok(generator) => generator.run().await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(summary) => {
            tracing::info!(
                "✅ Done: {} packages, {} pinned ({} commented out as broken), {} skipped in {:?}",
                summary.total,
                summary.written,
                summary.annotated,
                summary.skipped,
                summary.elapsed
            );
            tracing::debug!("Run started at {}", summary.started_at.to_rfc3339());
            println!("✅ Wrote {} pins to {}", summary.written, summary.output);
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 依嚴重程度決定退出碼
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
