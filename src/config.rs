use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::validator::{FineSchedule, MAX_REPUTATION, RewardConfig};
use crate::wallet::{DEFAULT_LARGE_WITHDRAWAL_THRESHOLD, WalletPolicy};

/// Minimum length accepted for an API key
pub const MIN_API_KEY_LENGTH: usize = 16;

/// Configuration for the Trusty Wallet service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub wallet: WalletConfig,
    pub fines: FineSchedule,
    pub rewards: RewardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix under which the wallet routes are mounted
    pub api_base_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_auth: bool,
    /// Accepted API keys. Never logged.
    #[serde(default, skip_serializing)]
    pub api_keys: Vec<String>,
    pub rate_limit_per_minute: u32,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    pub log_requests: bool,
    /// Mask client IPs in request logs
    pub sanitize_logs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub large_withdrawal_threshold: f64,
    pub initial_reputation: u32,
}

impl WalletConfig {
    pub fn to_policy(&self) -> WalletPolicy {
        WalletPolicy {
            large_withdrawal_threshold: self.large_withdrawal_threshold,
            initial_reputation: self.initial_reputation,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8780,
                api_base_path: "/api/trusty-wallet".to_string(),
            },
            security: SecurityConfig {
                enable_auth: true,
                api_keys: Vec::new(),
                rate_limit_per_minute: 120,
                max_request_size: 64 * 1024,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: false,
                sanitize_logs: true,
            },
            wallet: WalletConfig {
                large_withdrawal_threshold: DEFAULT_LARGE_WITHDRAWAL_THRESHOLD,
                initial_reputation: MAX_REPUTATION,
            },
            fines: FineSchedule::default(),
            rewards: RewardConfig::default(),
        }
    }
}

fn parse<T>(value: &str, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} value", name))
}

impl ServiceConfig {
    /// Load configuration from `TRUSTY_*` environment variables and validate it
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        // Server configuration
        if let Some(host) = lookup("TRUSTY_HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("TRUSTY_PORT") {
            config.server.port = parse(&port, "TRUSTY_PORT")?;
        }

        if let Some(base_path) = lookup("TRUSTY_API_BASE_PATH") {
            let trimmed = base_path.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(anyhow!(
                    "Mounting the API at the root path is not supported; \
                     set TRUSTY_API_BASE_PATH to a prefix such as /api/trusty-wallet"
                ));
            }
            config.server.api_base_path = trimmed.to_string();
        }

        // Security configuration
        if let Some(enable_auth) = lookup("TRUSTY_ENABLE_AUTH") {
            config.security.enable_auth = parse(&enable_auth, "TRUSTY_ENABLE_AUTH")?;
        }

        config.security.api_keys = lookup("TRUSTY_API_KEY")
            .into_iter()
            .chain(lookup("TRUSTY_API_KEYS"))
            .flat_map(|keys| {
                keys.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        if let Some(rate_limit) = lookup("TRUSTY_RATE_LIMIT_PER_MINUTE") {
            config.security.rate_limit_per_minute =
                parse(&rate_limit, "TRUSTY_RATE_LIMIT_PER_MINUTE")?;
        }

        if let Some(size) = lookup("TRUSTY_MAX_REQUEST_SIZE") {
            config.security.max_request_size = parse(&size, "TRUSTY_MAX_REQUEST_SIZE")?;
        }

        // Logging configuration
        if let Some(level) = lookup("TRUSTY_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(log_requests) = lookup("TRUSTY_LOG_REQUESTS") {
            config.logging.log_requests = parse(&log_requests, "TRUSTY_LOG_REQUESTS")?;
        }

        if let Some(sanitize) = lookup("TRUSTY_SANITIZE_LOGS") {
            config.logging.sanitize_logs = parse(&sanitize, "TRUSTY_SANITIZE_LOGS")?;
        }

        // Wallet rules
        if let Some(threshold) = lookup("TRUSTY_LARGE_WITHDRAWAL_THRESHOLD") {
            config.wallet.large_withdrawal_threshold =
                parse(&threshold, "TRUSTY_LARGE_WITHDRAWAL_THRESHOLD")?;
        }

        if let Some(reputation) = lookup("TRUSTY_INITIAL_REPUTATION") {
            config.wallet.initial_reputation = parse(&reputation, "TRUSTY_INITIAL_REPUTATION")?;
        }

        // Fine schedule and reward formula
        if let Some(fine) = lookup("TRUSTY_DEFAULT_FINE") {
            config.fines.default_fine = parse(&fine, "TRUSTY_DEFAULT_FINE")?;
        }

        if let Some(rate) = lookup("TRUSTY_FINE_TRANSACTION_RATE") {
            config.fines.transaction_rate = parse(&rate, "TRUSTY_FINE_TRANSACTION_RATE")?;
        }

        if let Some(reward) = lookup("TRUSTY_BASE_REWARD") {
            config.rewards.base_reward = parse(&reward, "TRUSTY_BASE_REWARD")?;
        }

        if let Some(divisor) = lookup("TRUSTY_REWARD_REPUTATION_DIVISOR") {
            config.rewards.reputation_divisor =
                parse(&divisor, "TRUSTY_REWARD_REPUTATION_DIVISOR")?;
        }

        if let Some(rate) = lookup("TRUSTY_REWARD_VOLUME_RATE") {
            config.rewards.volume_rate = parse(&rate, "TRUSTY_REWARD_VOLUME_RATE")?;
        }

        if let Some(cap) = lookup("TRUSTY_MAX_VOLUME_BONUS") {
            config.rewards.max_volume_bonus = parse(&cap, "TRUSTY_MAX_VOLUME_BONUS")?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for consistency and security
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow!("Server port must be non-zero"));
        }

        if !self.server.api_base_path.starts_with('/') {
            return Err(anyhow!(
                "API base path must start with '/': {}",
                self.server.api_base_path
            ));
        }

        if self.security.rate_limit_per_minute == 0 {
            return Err(anyhow!("Rate limit must allow at least one request per minute"));
        }

        if self.security.enable_auth && self.security.api_keys.is_empty() {
            return Err(anyhow!(
                "Authentication is enabled but no API key is configured \
                 (set TRUSTY_API_KEY or TRUSTY_API_KEYS, or TRUSTY_ENABLE_AUTH=false)"
            ));
        }

        if let Some(short) = self
            .security
            .api_keys
            .iter()
            .find(|k| k.len() < MIN_API_KEY_LENGTH)
        {
            return Err(anyhow!(
                "API key {} is too short (minimum {} characters)",
                sanitize_for_logging(short),
                MIN_API_KEY_LENGTH
            ));
        }

        let threshold = self.wallet.large_withdrawal_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(anyhow!(
                "Large withdrawal threshold must be positive: {}",
                threshold
            ));
        }

        // Charged amounts must be positive, rates only non-negative
        let amounts = [
            ("default fine", self.fines.default_fine),
            ("base reward", self.rewards.base_reward),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value <= 0.0 {
                return Err(anyhow!("The {} must be positive: {}", name, value));
            }
        }

        let rates = [
            ("fine transaction rate", self.fines.transaction_rate),
            ("reward volume rate", self.rewards.volume_rate),
            ("maximum volume bonus", self.rewards.max_volume_bonus),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!("The {} cannot be negative: {}", name, value));
            }
        }

        let divisor = self.rewards.reputation_divisor;
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(anyhow!(
                "Reward reputation divisor must be positive: {}",
                divisor
            ));
        }

        if self.wallet.initial_reputation > MAX_REPUTATION {
            return Err(anyhow!(
                "Initial reputation {} exceeds maximum {}",
                self.wallet.initial_reputation,
                MAX_REPUTATION
            ));
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Mask a secret for log output, keeping two characters at each end
pub fn sanitize_for_logging(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }

    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
