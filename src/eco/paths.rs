use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct EcoPaths {
    pub eco_home: PathBuf,
    pub store_file: PathBuf,
    pub logs_dir: PathBuf,
    pub config_file: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

pub fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_eco_home() -> Result<PathBuf> {
    if let Ok(v) = env::var("ECO_HOME")
        && !v.trim().is_empty()
    {
        return Ok(PathBuf::from(v.trim()));
    }
    Ok(required_home_dir()?.join(".ecotrack"))
}

pub fn resolve_paths() -> Result<EcoPaths> {
    let eco_home = resolve_eco_home()?;

    let store_file = env_or_default_path(
        "ECO_STORE_FILE",
        eco_home.join("state").join("storage.json"),
    );
    let logs_dir = env_or_default_path("ECO_LOGS_DIR", eco_home.join("logs"));
    let config_file = env_or_default_path("ECO_CONFIG_PATH", eco_home.join("ecotrack.toml"));

    Ok(EcoPaths {
        eco_home,
        store_file,
        logs_dir,
        config_file,
    })
}
