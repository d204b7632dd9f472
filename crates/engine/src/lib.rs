//! Cagnotte ledger engine.
//!
//! The engine tracks money held in independently-exhausted income pools
//! ([`Recette`]), settles transfers between pools ([`Transfert`]), and
//! manages sub-allocations of a single bank credit ([`FondsPartage`])
//! drawn down by append-only movements ([`MouvementFonds`]).
//!
//! Every balance-mutating operation runs inside one database transaction:
//! either all of its writes commit or none do. Balance updates are guarded
//! against concurrent writers with an optimistic check on the value read
//! inside the transaction.
//!
//! Amounts are signed integer **minor units** (cents). Sufficiency checks
//! are exact.

pub use commands::{AllocateCmd, MovementCmd, NewCompteCmd, NewRecetteCmd, TransferCmd};
pub use comptes::Compte;
pub use error::EngineError;
pub use events::Event;
pub use fonds_partages::FondsPartage;
pub use mouvements::{MouvementFonds, MovementKind};
pub use ops::{Engine, EngineBuilder};
pub use recettes::Recette;
pub use summary::Totaux;
pub use transferts::Transfert;

mod commands;
mod comptes;
mod error;
mod events;
mod fonds_partages;
mod mouvements;
mod ops;
mod recettes;
pub mod summary;
mod transferts;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
