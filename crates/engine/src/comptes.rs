//! Bank accounts, as consumed by the ledger.
//!
//! The engine only needs two things from an account: its current balance
//! and its `exclude_from_total` reporting flag, both read by the
//! aggregation queries. Accounts also act as the source / acting parties
//! of shared funds and their movements.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compte {
    pub id: Uuid,
    pub user_id: String,
    pub libelle: String,
    pub solde: i64,
    pub exclude_from_total: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Compte {
    pub fn new(user_id: String, libelle: String, solde: i64, exclude_from_total: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            libelle,
            solde,
            exclude_from_total,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comptes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub libelle: String,
    pub solde: i64,
    pub exclude_from_total: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fonds_partages::Entity")]
    FondsPartages,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::fonds_partages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FondsPartages.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Compte> for ActiveModel {
    fn from(compte: &Compte) -> Self {
        Self {
            id: ActiveValue::Set(compte.id.to_string()),
            user_id: ActiveValue::Set(compte.user_id.clone()),
            libelle: ActiveValue::Set(compte.libelle.clone()),
            solde: ActiveValue::Set(compte.solde),
            exclude_from_total: ActiveValue::Set(compte.exclude_from_total),
            created_at: ActiveValue::Set(compte.created_at),
            updated_at: ActiveValue::Set(compte.updated_at),
        }
    }
}

impl TryFrom<Model> for Compte {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "compte")?,
            user_id: model.user_id,
            libelle: model.libelle,
            solde: model.solde,
            exclude_from_total: model.exclude_from_total,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
