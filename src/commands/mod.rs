pub mod catalog;
pub mod custom;
pub mod goal;
pub mod status;
pub mod summary;
pub mod track;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::eco::clock::SystemClock;
use crate::eco::config::{EcoConfig, load_config};
use crate::eco::paths::{EcoPaths, resolve_paths};
use crate::eco::session::Session;
use crate::eco::storage::FileStore;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
            data: None,
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn attach<T: Serialize>(&mut self, data: &T) -> Result<()> {
        self.data = Some(serde_json::to_value(data)?);
        Ok(())
    }
}

pub type FileSession = Session<FileStore, SystemClock>;

/// Everything a command needs: resolved paths, config and the opened session.
pub struct Context {
    pub paths: EcoPaths,
    pub config: EcoConfig,
    pub session: FileSession,
}

pub fn open_context() -> Result<Context> {
    let paths = resolve_paths()?;
    let config = load_config(&paths.config_file)?;
    let mut session = Session::open(FileStore::new(&paths.store_file), SystemClock, &config);
    if config.audit.enabled {
        session = session.with_audit(paths.clone());
    }
    Ok(Context {
        paths,
        config,
        session,
    })
}
