use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::{Level, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

use trusty_wallet::{
    GuardConfig, GuardState, ServiceConfig, WalletApiState, WalletManager, create_app,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration errors are reported before logging exists
    let config = ServiceConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        eprintln!("Please check the TRUSTY_* environment variables.");
        e
    })?;

    init_logging(&config)?;

    info!("Starting Trusty Wallet service");
    info!(
        threshold = config.wallet.large_withdrawal_threshold,
        initial_reputation = config.wallet.initial_reputation,
        "Wallet policy loaded"
    );

    info!(
        default_fine = config.fines.default_fine,
        base_reward = config.rewards.base_reward,
        "Fine schedule and reward formula loaded"
    );

    let manager = WalletManager::new(config.wallet.to_policy())
        .with_fine_schedule(config.fines.clone())
        .with_reward_config(config.rewards.clone());
    let wallet_state = WalletApiState::new(manager);

    let guards = GuardState::new(GuardConfig::from(&config));
    if !config.security.enable_auth {
        warn!("API authentication is disabled");
    } else {
        info!(keys = config.security.api_keys.len(), "API key authentication enabled");
    }

    let app = create_app(&config.server.api_base_path, wallet_state, guards.clone());

    // Expired rate limit windows are pruned once a minute
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            ticker.tick().await;
            guards.rate_limiter.prune();
        }
    });

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!(
        "Trusty Wallet listening on {}{}",
        bind_addr, config.server.api_base_path
    );
    info!(
        "Request guards: auth={}, rate limit={}/min, max body={}KB",
        config.security.enable_auth,
        config.security.rate_limit_per_minute,
        config.security.max_request_size / 1024
    );

    // Connect info feeds client IPs to the rate limiter and request log
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_logging(config: &ServiceConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    if config.logging.sanitize_logs {
        info!("Client addresses are masked in request logs");
    }

    Ok(())
}
