//! The module contains the representation of a shared fund.
//!
//! A fonds partagé is a sub-ledger carved out of one originating credit
//! (typically a bank account credit), letting that credit be spent down
//! independently by one or more accounts. `montant_initial` is fixed at
//! allocation; `montant_restant` is a materialised running total kept
//! consistent with the append-only movement log (`mouvements_fonds`),
//! which stays the source of truth.
//!
//! A fund becomes inert, but is not deleted, once `montant_restant == 0`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MovementKind, ResultEngine, util::parse_uuid};

/// A shared fund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FondsPartage {
    pub id: Uuid,
    pub user_id: String,
    pub source_compte_id: Uuid,
    pub primary_compte_id: Option<Uuid>,
    /// Identifier of the originating credit in the external transaction
    /// feed. Opaque to the engine.
    pub transaction_source_id: String,
    pub libelle: String,
    pub description: Option<String>,
    pub montant_initial: i64,
    pub montant_restant: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FondsPartage {
    pub fn new(
        user_id: String,
        source_compte_id: Uuid,
        primary_compte_id: Option<Uuid>,
        transaction_source_id: String,
        libelle: String,
        description: Option<String>,
        montant: i64,
    ) -> ResultEngine<Self> {
        if montant <= 0 {
            return Err(EngineError::InvalidArgument(
                "montant must be > 0".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            source_compte_id,
            primary_compte_id,
            transaction_source_id,
            libelle,
            description,
            montant_initial: montant,
            montant_restant: montant,
            created_at: now,
            updated_at: now,
        })
    }

    /// Computes the restant after applying one movement, enforcing
    /// `0 <= restant <= initial`.
    pub fn with_movement(&self, kind: MovementKind, montant: i64) -> ResultEngine<i64> {
        let new_restant = self.montant_restant + kind.signed(montant);
        if new_restant < 0 {
            return Err(EngineError::InsufficientFunds(format!(
                "fonds '{}': remaining {}, debit {}",
                self.libelle, self.montant_restant, montant
            )));
        }
        if new_restant > self.montant_initial {
            return Err(EngineError::MaxBalanceReached(self.libelle.clone()));
        }
        Ok(new_restant)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fonds_partages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub source_compte_id: String,
    pub primary_compte_id: Option<String>,
    pub transaction_source_id: String,
    pub libelle: String,
    pub description: Option<String>,
    pub montant_initial: i64,
    pub montant_restant: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::mouvements::Entity")]
    Mouvements,
    #[sea_orm(
        belongs_to = "super::comptes::Entity",
        from = "Column::SourceCompteId",
        to = "super::comptes::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SourceCompte,
}

impl Related<super::mouvements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mouvements.def()
    }
}

impl Related<super::comptes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceCompte.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FondsPartage> for ActiveModel {
    fn from(fonds: &FondsPartage) -> Self {
        Self {
            id: ActiveValue::Set(fonds.id.to_string()),
            user_id: ActiveValue::Set(fonds.user_id.clone()),
            source_compte_id: ActiveValue::Set(fonds.source_compte_id.to_string()),
            primary_compte_id: ActiveValue::Set(
                fonds.primary_compte_id.map(|id| id.to_string()),
            ),
            transaction_source_id: ActiveValue::Set(fonds.transaction_source_id.clone()),
            libelle: ActiveValue::Set(fonds.libelle.clone()),
            description: ActiveValue::Set(fonds.description.clone()),
            montant_initial: ActiveValue::Set(fonds.montant_initial),
            montant_restant: ActiveValue::Set(fonds.montant_restant),
            created_at: ActiveValue::Set(fonds.created_at),
            updated_at: ActiveValue::Set(fonds.updated_at),
        }
    }
}

impl TryFrom<Model> for FondsPartage {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let primary_compte_id = model
            .primary_compte_id
            .as_deref()
            .map(|id| parse_uuid(id, "compte"))
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "fonds")?,
            user_id: model.user_id,
            source_compte_id: parse_uuid(&model.source_compte_id, "compte")?,
            primary_compte_id,
            transaction_source_id: model.transaction_source_id,
            libelle: model.libelle,
            description: model.description,
            montant_initial: model.montant_initial,
            montant_restant: model.montant_restant,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
