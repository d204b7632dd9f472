//! Engine operations.
//!
//! Every balance-mutating operation runs its whole read-check-write
//! sequence inside one database transaction via `with_tx!`: either all
//! writes commit or none do, and a caller abandoning the future before
//! commit leaves no trace. Balance `UPDATE`s are additionally filtered on
//! the value the transaction read; losing that race raises
//! `EngineError::Conflict`, which `with_conflict_retry!` retries a
//! bounded number of times before surfacing it.

use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;

use crate::{Event, ResultEngine};

mod access;
mod certification;
mod comptes;
mod fonds;
mod recettes;
mod summary;
mod transferts;

/// Retry budget for optimistic balance updates.
pub(crate) const CONFLICT_RETRIES: usize = 3;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Run a block inside a DB transaction, committing on success and rolling
/// back (via drop) on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = async { $body }.await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Re-run a transactional block while its optimistic balance guard keeps
/// detecting a concurrent writer. Other errors surface immediately.
macro_rules! with_conflict_retry {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let mut attempt = 0;
        loop {
            let outcome = with_tx!($self, |$tx| $body);
            match outcome {
                Err($crate::EngineError::Conflict(reason))
                    if attempt + 1 < $crate::ops::CONFLICT_RETRIES =>
                {
                    attempt += 1;
                    tracing::warn!(attempt, %reason, "balance update conflicted, retrying");
                }
                other => break other,
            }
        }
    }};
}

pub(crate) use with_conflict_retry;
pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    events: broadcast::Sender<Event>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Subscribe to post-commit domain events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Best-effort publish after a successful commit. A send without
    /// subscribers is not an error.
    pub(crate) fn publish(&self, event: Event) {
        tracing::debug!(?event, "publishing domain event");
        let _ = self.events.send(event);
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Engine {
            database: self.database,
            events,
        })
    }
}
