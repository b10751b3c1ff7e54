use dripeditz::{logger, RelayConfig};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if env_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = RelayConfig::from_env();
    logger::log_startup_info("DripEditz relay", env!("CARGO_PKG_VERSION"), config.port);
    logger::log_config_info(&config);

    if let Err(e) = dripeditz::server::run(config).await {
        log::error!("❌ Relay stopped: {}", e);
        return Err(e.into());
    }

    Ok(())
}
