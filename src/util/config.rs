use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

static DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
static DEFAULT_TEMPLATE_ROOT: &str = "./priv/templates";
static DEFAULT_STATIC_ROOT: &str = "./static";
const DEFAULT_POOL_SIZE: u32 = 8;

/// Runtime settings, read from the environment (and `.env`) at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub template_root: PathBuf,
    pub static_root: PathBuf,
    pub pool_size: u32,
    pub template_dev_mode: bool,
}

impl Config {
    /// Defaults for everything except the database.
    pub fn new<S: Into<String>>(database_url: S) -> Self {
        Config {
            database_url: database_url.into(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            template_root: PathBuf::from(DEFAULT_TEMPLATE_ROOT),
            static_root: PathBuf::from(DEFAULT_STATIC_ROOT),
            pool_size: DEFAULT_POOL_SIZE,
            template_dev_mode: false,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where F: Fn(&str) -> Option<String> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| Error::Config("DATABASE_URL must be set, e.g: DATABASE_URL=blogly.sqlite3".into()))?;

        let mut config = Config::new(database_url);

        if let Some(addr) = lookup("BIND_ADDR") { config.bind_addr = addr; }
        if let Some(root) = lookup("TEMPLATE_ROOT") { config.template_root = PathBuf::from(root); }
        if let Some(root) = lookup("STATIC_ROOT") { config.static_root = PathBuf::from(root); }

        if let Some(size) = lookup("DB_POOL_SIZE") {
            config.pool_size = match size.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => return Err(Error::Config(format!("DB_POOL_SIZE must be a positive integer, got {:?}", size))),
            };
        }

        if let Some(flag) = lookup("TEMPLATE_DEV_MODE") {
            config.template_dev_mode = parse_flag(&flag)
                .ok_or_else(|| Error::Config(format!("TEMPLATE_DEV_MODE must be true or false, got {:?}", flag)))?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match &value.trim().to_lowercase()[..] {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars.iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();

        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_in(&[("DATABASE_URL", "test.db")])).unwrap();

        assert_eq!(config.database_url, "test.db");
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.template_root, PathBuf::from("./priv/templates"));
        assert_eq!(config.pool_size, 8);
        assert!(!config.template_dev_mode);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_in(&[
            ("DATABASE_URL", "test.db"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("DB_POOL_SIZE", "2"),
            ("TEMPLATE_DEV_MODE", "yes"),
        ])).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.pool_size, 2);
        assert!(config.template_dev_mode);
    }

    #[test]
    fn test_database_url_required() {
        let err = Config::from_lookup(lookup_in(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_bad_pool_size() {
        let vars = [("DATABASE_URL", "test.db"), ("DB_POOL_SIZE", "0")];
        assert!(Config::from_lookup(lookup_in(&vars)).is_err());
    }
}
