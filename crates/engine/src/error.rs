//! The module contains the errors the engine can throw.
//!
//! Five of them map to the ledger failure taxonomy: [`KeyNotFound`]
//! (missing or foreign-owned entity), [`InvalidArgument`],
//! [`InsufficientFunds`], [`Conflict`] (a concurrent writer won the
//! check-then-act race; callers may retry) and [`Database`]. On top of
//! those, [`MaxBalanceReached`] rejects credits that would push a balance
//! above its cap.
//!
//! [`KeyNotFound`]: EngineError::KeyNotFound
//! [`InvalidArgument`]: EngineError::InvalidArgument
//! [`InsufficientFunds`]: EngineError::InsufficientFunds
//! [`Conflict`]: EngineError::Conflict
//! [`Database`]: EngineError::Database
//! [`MaxBalanceReached`]: EngineError::MaxBalanceReached
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Max balance reached: {0}")]
    MaxBalanceReached(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::MaxBalanceReached(a), Self::MaxBalanceReached(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
