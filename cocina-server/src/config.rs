use std::path::PathBuf;

use anyhow::Context;
use cocina::config::{env_parse, env_var, CmsConfig};
use cocina::plan::{PathStrategy, Revalidate};

pub const DEFAULT_SITE_URL: &str = "http://localhost:3002";

#[derive(Clone, Debug)]
pub struct Config {
    pub cms: CmsConfig,
    /// Absolute origin used for sitemap and alternate-language links.
    pub site_url: String,
    pub page_strategy: PathStrategy,
    /// Window for recipe detail pages.
    pub revalidate: Revalidate,
    pub log_dir: PathBuf,
    pub tls: Option<TLSConfig>,
}

#[derive(Clone, Debug)]
pub struct TLSConfig {
    pub cert_path: String,
    pub key_path: String,
}

impl Config {
    /// Load the configuration from the environment and `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        let log_dir = match env_var("LOG_DIR") {
            Some(dir) => dir.into(),
            None if std::fs::exists("/app")? => "/app/data/logs".into(),
            None => std::env::current_dir()?,
        };
        let tls = match (env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")) {
            (Some(cert_path), Some(key_path)) => Some(TLSConfig {
                cert_path,
                key_path,
            }),
            _ => None,
        };
        Ok(Self {
            cms: CmsConfig::from_env().context("Reading CMS settings")?,
            site_url: env_var("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.into()),
            page_strategy: env_parse("PAGE_STRATEGY", PathStrategy::Eager)?,
            revalidate: env_parse("REVALIDATE_SECONDS", Revalidate::from_secs(60)?)?,
            log_dir,
            tls,
        })
    }
}
