//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create, transfer,
//! allocate, movement), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::MovementKind;

/// Create a bank account.
#[derive(Clone, Debug)]
pub struct NewCompteCmd {
    pub user_id: String,
    pub libelle: String,
    pub solde: i64,
    pub exclude_from_total: bool,
}

impl NewCompteCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, libelle: impl Into<String>, solde: i64) -> Self {
        Self {
            user_id: user_id.into(),
            libelle: libelle.into(),
            solde,
            exclude_from_total: false,
        }
    }

    #[must_use]
    pub fn exclude_from_total(mut self, excluded: bool) -> Self {
        self.exclude_from_total = excluded;
        self
    }
}

/// Create an income pool.
#[derive(Clone, Debug)]
pub struct NewRecetteCmd {
    pub user_id: String,
    pub libelle: String,
    /// Originally-received amount. `0` opens an empty, unbounded receiver
    /// pool.
    pub montant: i64,
}

impl NewRecetteCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, libelle: impl Into<String>, montant: i64) -> Self {
        Self {
            user_id: user_id.into(),
            libelle: libelle.into(),
            montant,
        }
    }
}

/// Move funds between two recettes.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub user_id: String,
    pub source_id: Uuid,
    pub destination_id: Uuid,
    pub montant: i64,
    pub description: Option<String>,
    pub date_transfert: DateTime<Utc>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        source_id: Uuid,
        destination_id: Uuid,
        montant: i64,
        date_transfert: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            source_id,
            destination_id,
            montant,
            description: None,
            date_transfert,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Split a credit transaction into a trackable shared fund.
#[derive(Clone, Debug)]
pub struct AllocateCmd {
    pub user_id: String,
    pub transaction_source_id: String,
    pub source_compte_id: Uuid,
    pub primary_compte_id: Option<Uuid>,
    pub montant: i64,
    pub libelle: String,
    pub description: Option<String>,
}

impl AllocateCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        transaction_source_id: impl Into<String>,
        source_compte_id: Uuid,
        montant: i64,
        libelle: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_source_id: transaction_source_id.into(),
            source_compte_id,
            primary_compte_id: None,
            montant,
            libelle: libelle.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn primary_compte_id(mut self, compte_id: Uuid) -> Self {
        self.primary_compte_id = Some(compte_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Apply one debit or credit to a shared fund.
#[derive(Clone, Debug)]
pub struct MovementCmd {
    pub user_id: String,
    pub fonds_id: Uuid,
    pub compte_id: Uuid,
    pub kind: MovementKind,
    pub montant: i64,
    pub transaction_id: Option<String>,
    pub libelle: Option<String>,
}

impl MovementCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        fonds_id: Uuid,
        compte_id: Uuid,
        kind: MovementKind,
        montant: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            fonds_id,
            compte_id,
            kind,
            montant,
            transaction_id: None,
            libelle: None,
        }
    }

    #[must_use]
    pub fn transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    #[must_use]
    pub fn libelle(mut self, libelle: impl Into<String>) -> Self {
        self.libelle = Some(libelle.into());
        self
    }
}
