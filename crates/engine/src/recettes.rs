//! The module contains the representation of an income pool.
//!
//! A recette records one income event: the originally-received amount
//! (`montant`, fixed at creation) and the amount still available
//! (`solde_disponible`, spent down over time). Expenses and transfers-out
//! reduce the solde; transfers-in increase it.
//!
//! A recette with `montant > 0` is **bounded**: its solde can never exceed
//! the original receipt, so a transfer-in that would overfill it is
//! rejected. A recette created with `montant = 0` is an **unbounded
//! receiver**, a pool opened empty to collect transfers from other pools.
//!
//! Amounts are stored as integer cents (`i64`).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

/// An income pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recette {
    pub id: Uuid,
    pub user_id: String,
    pub libelle: String,
    /// Originally-received amount, immutable after creation.
    pub montant: i64,
    /// Amount still available for spending or transfer.
    pub solde_disponible: i64,
    pub validation_bancaire: bool,
    pub date_validation_bancaire: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recette {
    pub fn new(user_id: String, libelle: String, montant: i64) -> ResultEngine<Self> {
        if montant < 0 {
            return Err(EngineError::InvalidArgument(
                "montant must be >= 0".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            libelle,
            montant,
            solde_disponible: montant,
            validation_bancaire: false,
            date_validation_bancaire: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Computes the solde after applying a signed change, enforcing the
    /// pool invariants.
    ///
    /// Negative deltas (spends, transfers-out) must not drive the solde
    /// below zero. Positive deltas (transfers-in) must not push a bounded
    /// pool above its original receipt.
    pub fn with_change(&self, delta: i64) -> ResultEngine<i64> {
        let new_solde = self.solde_disponible + delta;
        if new_solde < 0 {
            return Err(EngineError::InsufficientFunds(format!(
                "recette '{}': available {}, requested {}",
                self.libelle,
                self.solde_disponible,
                delta.unsigned_abs()
            )));
        }
        if delta > 0 && self.montant > 0 && new_solde > self.montant {
            return Err(EngineError::MaxBalanceReached(self.libelle.clone()));
        }
        Ok(new_solde)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recettes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub libelle: String,
    pub montant: i64,
    pub solde_disponible: i64,
    pub validation_bancaire: bool,
    pub date_validation_bancaire: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Recette> for ActiveModel {
    fn from(recette: &Recette) -> Self {
        Self {
            id: ActiveValue::Set(recette.id.to_string()),
            user_id: ActiveValue::Set(recette.user_id.clone()),
            libelle: ActiveValue::Set(recette.libelle.clone()),
            montant: ActiveValue::Set(recette.montant),
            solde_disponible: ActiveValue::Set(recette.solde_disponible),
            validation_bancaire: ActiveValue::Set(recette.validation_bancaire),
            date_validation_bancaire: ActiveValue::Set(recette.date_validation_bancaire),
            created_at: ActiveValue::Set(recette.created_at),
            updated_at: ActiveValue::Set(recette.updated_at),
        }
    }
}

impl TryFrom<Model> for Recette {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "recette")?,
            user_id: model.user_id,
            libelle: model.libelle,
            montant: model.montant,
            solde_disponible: model.solde_disponible,
            validation_bancaire: model.validation_bancaire,
            date_validation_bancaire: model.date_validation_bancaire,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded() -> Recette {
        Recette::new("alice".to_string(), "Salaire".to_string(), 1000).unwrap()
    }

    fn unbounded_receiver() -> Recette {
        Recette::new("alice".to_string(), "Reserve".to_string(), 0).unwrap()
    }

    #[test]
    fn new_recette_starts_full() {
        let recette = bounded();
        assert_eq!(recette.montant, 1000);
        assert_eq!(recette.solde_disponible, 1000);
        assert!(!recette.validation_bancaire);
        assert!(recette.date_validation_bancaire.is_none());
    }

    #[test]
    fn new_recette_rejects_negative_montant() {
        let err = Recette::new("alice".to_string(), "Salaire".to_string(), -1).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn with_change_rejects_overdraw() {
        let mut recette = bounded();
        recette.solde_disponible = 300;
        let err = recette.with_change(-301).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds(_)));
        assert_eq!(recette.with_change(-300).unwrap(), 0);
    }

    #[test]
    fn with_change_caps_bounded_pool() {
        let mut recette = bounded();
        recette.solde_disponible = 900;
        let err = recette.with_change(200).unwrap_err();
        assert_eq!(err, EngineError::MaxBalanceReached("Salaire".to_string()));
        assert_eq!(recette.with_change(100).unwrap(), 1000);
    }

    #[test]
    fn empty_origin_pool_receives_unbounded() {
        let recette = unbounded_receiver();
        assert_eq!(recette.with_change(120_000).unwrap(), 120_000);
    }
}
