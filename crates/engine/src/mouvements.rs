//! Shared-fund movements.
//!
//! A [`MouvementFonds`] is one debit or credit applied to a shared fund by
//! an acting account. Movements are append-only: they are never mutated or
//! deleted, and corrections are made via compensating movements. Replaying
//! the full log from `montant_initial` must reproduce the fund's
//! materialised `montant_restant` exactly.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Debit,
    Credit,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Signed contribution of a movement to the fund's restant.
    pub fn signed(self, montant: i64) -> i64 {
        match self {
            Self::Debit => -montant,
            Self::Credit => montant,
        }
    }
}

impl TryFrom<&str> for MovementKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid movement kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouvementFonds {
    pub id: Uuid,
    pub fonds_partage_id: Uuid,
    pub user_id: String,
    pub compte_id: Uuid,
    pub kind: MovementKind,
    pub montant: i64,
    pub transaction_id: Option<String>,
    pub libelle: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MouvementFonds {
    pub fn new(
        fonds_partage_id: Uuid,
        user_id: String,
        compte_id: Uuid,
        kind: MovementKind,
        montant: i64,
        transaction_id: Option<String>,
        libelle: Option<String>,
    ) -> ResultEngine<Self> {
        if montant <= 0 {
            return Err(EngineError::InvalidArgument(
                "montant must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            fonds_partage_id,
            user_id,
            compte_id,
            kind,
            montant,
            transaction_id,
            libelle,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "mouvements_fonds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub fonds_partage_id: String,
    pub user_id: String,
    pub compte_id: String,
    pub kind: String,
    pub montant: i64,
    pub transaction_id: Option<String>,
    pub libelle: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fonds_partages::Entity",
        from = "Column::FondsPartageId",
        to = "super::fonds_partages::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    FondsPartages,
}

impl Related<super::fonds_partages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FondsPartages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MouvementFonds> for ActiveModel {
    fn from(mouvement: &MouvementFonds) -> Self {
        Self {
            id: ActiveValue::Set(mouvement.id.to_string()),
            fonds_partage_id: ActiveValue::Set(mouvement.fonds_partage_id.to_string()),
            user_id: ActiveValue::Set(mouvement.user_id.clone()),
            compte_id: ActiveValue::Set(mouvement.compte_id.to_string()),
            kind: ActiveValue::Set(mouvement.kind.as_str().to_string()),
            montant: ActiveValue::Set(mouvement.montant),
            transaction_id: ActiveValue::Set(mouvement.transaction_id.clone()),
            libelle: ActiveValue::Set(mouvement.libelle.clone()),
            created_at: ActiveValue::Set(mouvement.created_at),
        }
    }
}

impl TryFrom<Model> for MouvementFonds {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "mouvement")?,
            fonds_partage_id: parse_uuid(&model.fonds_partage_id, "fonds")?,
            user_id: model.user_id,
            compte_id: parse_uuid(&model.compte_id, "compte")?,
            kind: MovementKind::try_from(model.kind.as_str())?,
            montant: model.montant,
            transaction_id: model.transaction_id,
            libelle: model.libelle,
            created_at: model.created_at,
        })
    }
}
