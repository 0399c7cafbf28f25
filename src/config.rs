use std::env;
use std::time::Duration;

use anyhow::{Context, bail};

use crate::fetcher::{REQUEST_TIMEOUT, USER_AGENT};

pub const PAGE_DELAY: Duration = Duration::from_secs(2);
pub const WORKERS: usize = 5;
/// First page plus 200 offset pages.
pub const MAX_PAGES: usize = 201;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub user_agent: String,
    pub timeout: Duration,
    /// Pause between consecutive fetches in sequential mode.
    pub page_delay: Duration,
    pub workers: usize,
    pub max_pages: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: REQUEST_TIMEOUT,
            page_delay: PAGE_DELAY,
            workers: WORKERS,
            max_pages: MAX_PAGES,
        }
    }
}

impl Config {
    /// Defaults overridden by `ML_*` environment variables. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();

        if let Some(ua) = lookup("ML_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            cfg.user_agent = ua;
        }
        if let Some(v) = lookup("ML_TIMEOUT_SECS") {
            cfg.timeout = Duration::from_secs(parse_num(&v, "ML_TIMEOUT_SECS")?);
        }
        if let Some(v) = lookup("ML_DELAY_MS") {
            cfg.page_delay = Duration::from_millis(parse_num(&v, "ML_DELAY_MS")?);
        }
        if let Some(v) = lookup("ML_WORKERS") {
            cfg.workers = parse_num(&v, "ML_WORKERS")?;
        }
        if let Some(v) = lookup("ML_MAX_PAGES") {
            cfg.max_pages = parse_num(&v, "ML_MAX_PAGES")?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == 0 {
            bail!("worker count must be at least 1");
        }
        if self.timeout.is_zero() {
            bail!("request timeout must be greater than zero");
        }
        Ok(())
    }
}

fn parse_num<T>(value: &str, key: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a non-negative integer, got {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.page_delay, Duration::from_secs(2));
        assert_eq!(cfg.workers, 5);
    }

    #[test]
    fn environment_overrides_defaults() {
        let cfg = Config::from_lookup(lookup(&[
            ("ML_DELAY_MS", "250"),
            ("ML_WORKERS", "8"),
            ("ML_MAX_PAGES", " 3 "),
            ("ML_USER_AGENT", "test-agent"),
        ]))
        .unwrap();
        assert_eq!(cfg.page_delay, Duration::from_millis(250));
        assert_eq!(cfg.workers, 8);
        assert_eq!(cfg.max_pages, 3);
        assert_eq!(cfg.user_agent, "test-agent");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("ML_WORKERS", "five")])).is_err());
        assert!(Config::from_lookup(lookup(&[("ML_WORKERS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("ML_TIMEOUT_SECS", "-1")])).is_err());
    }
}
