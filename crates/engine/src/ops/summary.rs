//! Aggregate queries.
//!
//! Loads the caller's committed snapshot and delegates the arithmetic to
//! the pure folds in [`crate::summary`]. Reads run outside any
//! transaction and never block writers.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{Compte, Recette, ResultEngine, Totaux, comptes, recettes, summary};

use super::Engine;

impl Engine {
    /// The three aggregate figures for a user: gross available, certified
    /// available, and account balance net of excluded accounts.
    pub async fn totaux(&self, user_id: &str) -> ResultEngine<Totaux> {
        let recette_models = recettes::Entity::find()
            .filter(recettes::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?;
        let mut recette_rows = Vec::with_capacity(recette_models.len());
        for model in recette_models {
            recette_rows.push(Recette::try_from(model)?);
        }

        let compte_models = comptes::Entity::find()
            .filter(comptes::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?;
        let mut compte_rows = Vec::with_capacity(compte_models.len());
        for model in compte_models {
            compte_rows.push(Compte::try_from(model)?);
        }

        Ok(Totaux {
            disponible: summary::total_disponible(&recette_rows),
            certifie: summary::total_certifie(&recette_rows),
            net_hors_exclusions: summary::net_hors_exclusions(&compte_rows),
        })
    }
}
