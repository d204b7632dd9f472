//! Transfer primitives.
//!
//! A `Transfert` is a completed, balance-neutral movement of funds between
//! two recettes. The row is created atomically with the paired balance
//! mutation; deleting it reverses the mutation (see `ops`).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfert {
    pub id: Uuid,
    pub user_id: String,
    pub recette_source_id: Uuid,
    pub recette_destination_id: Uuid,
    pub montant: i64,
    pub description: Option<String>,
    pub date_transfert: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transfert {
    pub fn new(
        user_id: String,
        recette_source_id: Uuid,
        recette_destination_id: Uuid,
        montant: i64,
        description: Option<String>,
        date_transfert: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if montant <= 0 {
            return Err(EngineError::InvalidArgument(
                "montant must be > 0".to_string(),
            ));
        }
        if recette_source_id == recette_destination_id {
            return Err(EngineError::InvalidArgument(
                "source and destination must differ".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            recette_source_id,
            recette_destination_id,
            montant,
            description,
            date_transfert,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transferts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub recette_source_id: String,
    pub recette_destination_id: String,
    pub montant: i64,
    pub description: Option<String>,
    pub date_transfert: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recettes::Entity",
        from = "Column::RecetteSourceId",
        to = "super::recettes::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SourceRecette,
    #[sea_orm(
        belongs_to = "super::recettes::Entity",
        from = "Column::RecetteDestinationId",
        to = "super::recettes::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    DestinationRecette,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transfert> for ActiveModel {
    fn from(transfert: &Transfert) -> Self {
        Self {
            id: ActiveValue::Set(transfert.id.to_string()),
            user_id: ActiveValue::Set(transfert.user_id.clone()),
            recette_source_id: ActiveValue::Set(transfert.recette_source_id.to_string()),
            recette_destination_id: ActiveValue::Set(
                transfert.recette_destination_id.to_string(),
            ),
            montant: ActiveValue::Set(transfert.montant),
            description: ActiveValue::Set(transfert.description.clone()),
            date_transfert: ActiveValue::Set(transfert.date_transfert),
            created_at: ActiveValue::Set(transfert.created_at),
            updated_at: ActiveValue::Set(transfert.updated_at),
        }
    }
}

impl TryFrom<Model> for Transfert {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transfert")?,
            user_id: model.user_id,
            recette_source_id: parse_uuid(&model.recette_source_id, "recette")?,
            recette_destination_id: parse_uuid(&model.recette_destination_id, "recette")?,
            montant: model.montant,
            description: model.description,
            date_transfert: model.date_transfert,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_non_positive_amount() {
        let err = Transfert::new(
            "alice".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            0,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn new_rejects_same_recette() {
        let id = Uuid::new_v4();
        let err = Transfert::new("alice".to_string(), id, id, 100, None, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}
