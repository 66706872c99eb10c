pub mod dashboard_service;
pub mod history;
pub mod permission;
pub mod star_service;

pub use dashboard_service::DashboardService;
pub use history::{HistoryPublisher, HistoryRecorder};
pub use permission::PermissionChecker;
pub use star_service::StarService;

use crate::database::models::EncodeError;
use crate::database::DatabaseError;

/// Outcome taxonomy of every dashboard operation
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing request fields
    #[error("{0}")]
    ParamInvalid(String),

    #[error("no permission")]
    NoPermission,

    /// The operation is switched off by configuration
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Store failures not attributable to the caller
    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        #[source]
        source: DatabaseError,
    },
}

impl ServiceError {
    pub fn param_invalid(message: impl Into<String>) -> Self {
        ServiceError::ParamInvalid(message.into())
    }

    pub fn dashboard_not_found(id: &str) -> Self {
        ServiceError::NotFound(format!("dashboard id `{}` not found", id))
    }

    /// Wrap a storage error with the operation it interrupted
    pub fn internal(context: &'static str) -> impl FnOnce(DatabaseError) -> ServiceError {
        move |source| ServiceError::Internal { context, source }
    }
}

impl From<EncodeError> for ServiceError {
    fn from(err: EncodeError) -> Self {
        ServiceError::ParamInvalid(err.to_string())
    }
}
