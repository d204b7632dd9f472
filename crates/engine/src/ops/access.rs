//! Ownership-scoped lookups.
//!
//! Every query is filtered by the calling user's identity; a row owned by
//! someone else is indistinguishable from a missing one.

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, comptes, fonds_partages, recettes, transferts, users};

use super::Engine;

/// Generates an ownership-scoped `require_*` lookup for a target entity.
macro_rules! impl_require_owned {
    ($require_fn:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(id.to_string())
                .filter($module::Column::UserId.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(require_recette, recettes, "recette not exists");
    impl_require_owned!(require_compte, comptes, "compte not exists");
    impl_require_owned!(require_fonds, fonds_partages, "fonds not exists");
    impl_require_owned!(require_transfert, transferts, "transfert not exists");

    pub(super) async fn require_user_exists<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }
}
