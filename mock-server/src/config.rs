//! Environment-driven settings for the mock server binary.

use anyhow::Context;

use crate::Todo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub seed: Vec<Todo>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            seed: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Reads `PORT` and `SEED_TODOS` (a JSON array of todos).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("SEED_TODOS").ok().as_deref(),
        )
    }

    pub fn from_vars(port: Option<&str>, seed: Option<&str>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(port) = port {
            config.port = port
                .parse()
                .with_context(|| format!("invalid PORT: {port}"))?;
        }
        if let Some(seed) = seed {
            config.seed = serde_json::from_str(seed).context("invalid SEED_TODOS")?;
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}
