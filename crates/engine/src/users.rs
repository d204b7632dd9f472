//! Users table entity.
//!
//! Identity itself comes from the upstream authentication collaborator;
//! the engine only keeps the row every other table's ownership scope
//! points at.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recettes::Entity")]
    Recettes,
    #[sea_orm(has_many = "super::comptes::Entity")]
    Comptes,
}

impl Related<super::recettes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recettes.def()
    }
}

impl Related<super::comptes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comptes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
