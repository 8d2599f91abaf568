use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::eco::catalog::DEFAULT_CUSTOM_CATEGORY;
use crate::eco::ledger::DEFAULT_RECENT_LIMIT;
use crate::error::EcoError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcoDisplayConfig {
    pub recent_limit: usize,
}

impl Default for EcoDisplayConfig {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcoCustomConfig {
    pub default_category: String,
}

impl Default for EcoCustomConfig {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CUSTOM_CATEGORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcoAuditConfig {
    pub enabled: bool,
}

impl Default for EcoAuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EcoConfig {
    pub display: EcoDisplayConfig,
    pub custom: EcoCustomConfig,
    pub audit: EcoAuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialEcoConfig {
    display: Option<EcoDisplayConfig>,
    custom: Option<EcoCustomConfig>,
    audit: Option<EcoAuditConfig>,
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn validate(cfg: &EcoConfig) -> Result<()> {
    if cfg.display.recent_limit == 0 {
        return Err(EcoError::InvalidConfig("display.recent_limit must be >= 1".to_string()).into());
    }
    if cfg.custom.default_category.trim().is_empty() {
        return Err(
            EcoError::InvalidConfig("custom.default_category cannot be empty".to_string()).into(),
        );
    }
    Ok(())
}

fn merge_file_config(base: &mut EcoConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: PartialEcoConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse eco config {}: {err}", path.display()))?;
    if let Some(display) = parsed.display {
        base.display = display;
    }
    if let Some(custom) = parsed.custom {
        base.custom = custom;
    }
    if let Some(audit) = parsed.audit {
        base.audit = audit;
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<EcoConfig> {
    let mut cfg = EcoConfig::default();
    merge_file_config(&mut cfg, path)?;

    cfg.display.recent_limit = env_or_usize("ECO_RECENT_LIMIT", cfg.display.recent_limit);
    cfg.custom.default_category =
        env_or_string("ECO_DEFAULT_CATEGORY", &cfg.custom.default_category);
    cfg.audit.enabled = env_or_bool("ECO_AUDIT_ENABLED", cfg.audit.enabled);

    validate(&cfg)?;
    Ok(cfg)
}
