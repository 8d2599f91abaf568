use thiserror::Error;

use crate::eco::catalog::ActionId;

#[derive(Debug, Error)]
pub enum EcoError {
    #[error("unknown action id: {0}")]
    UnknownAction(ActionId),
    #[error("invalid weekly goal `{0}`: must be a number greater than 0")]
    InvalidGoal(String),
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("store is locked by another process: {0}")]
    StoreLocked(String),
}

/// Why a custom action submission was not added to the catalog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftRejection {
    #[error("action name cannot be empty")]
    EmptyName,
    #[error("co2 reduction `{0}` is not a number")]
    InvalidReduction(String),
    #[error("co2 reduction must be greater than 0 (got {0})")]
    NonPositiveReduction(f64),
}
