use std::sync::Arc;

use modrelay_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), modrelay_core::Error> {
    modrelay_core::logging::init("modrelay")?;

    let cfg = Arc::new(Config::load()?);

    modrelay_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| modrelay_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
