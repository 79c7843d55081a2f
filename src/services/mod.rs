//! Core operation services: gamification, coaching, message dispatch, and
//! conversation analysis.

pub mod analysis;
pub mod coach;
pub mod dispatch;
pub mod gamification;

pub use analysis::AnalysisService;
pub use coach::CoachService;
pub use dispatch::DispatchService;
pub use gamification::GamificationService;

use crate::interfaces::outbound::ClientError;
use crate::interfaces::store::StoreError;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced by the operation services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("write conflict, retry the request")]
    Conflict,

    #[error("storage error: {0}")]
    Store(StoreError),

    #[error("text generation failed: {0}")]
    Generator(ClientError),

    #[error("message delivery failed: {0}")]
    Delivery(ClientError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            StoreError::Conflict { .. } => ServiceError::Conflict,
            other => ServiceError::Store(other),
        }
    }
}
