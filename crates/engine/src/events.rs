//! Domain events published after successful commits.
//!
//! Delivery is best-effort and at-most-once: events exist so dashboards
//! and other observers can refresh, never for correctness. An event is
//! sent only after its database transaction has committed; a failed send
//! (no subscriber) is ignored.

use uuid::Uuid;

use crate::MovementKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    TransferSettled {
        transfert_id: Uuid,
        source_id: Uuid,
        destination_id: Uuid,
        montant: i64,
    },
    TransferReversed {
        transfert_id: Uuid,
        source_id: Uuid,
        destination_id: Uuid,
        montant: i64,
    },
    MovementApplied {
        fonds_id: Uuid,
        mouvement_id: Uuid,
        kind: MovementKind,
        montant: i64,
    },
}
