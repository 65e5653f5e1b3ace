use clap::Parser;
use csv2kml::utils::{logger, validation::Validate};
use csv2kml::{CliConfig, ConversionEngine, EtlError, KmlPipeline, LocalStorage};

fn fail(e: &EtlError) -> ! {
    tracing::error!("❌ Conversion failed: {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Missing <INPUT> prints usage and exits non-zero.
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    let config = match config.load_settings() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let pipeline = KmlPipeline::new(LocalStorage::default(), config);
    let engine = ConversionEngine::new(pipeline);

    match engine.run().await {
        Ok(outcome) => {
            tracing::info!("✅ Conversion completed");
            println!("📁 KML written to {}", outcome.output_path);
        }
        Err(e) => fail(&e),
    }
}
