//! Income pool operations: creation, direct spend-down, deletion.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, NewRecetteCmd, Recette, ResultEngine, recettes, transferts,
    util::{normalize_required_text, require_positive_amount},
};

use super::{Engine, with_conflict_retry, with_tx};

impl Engine {
    /// Record an income event as a new pool.
    ///
    /// The pool starts full (`solde_disponible = montant`). A `montant` of
    /// zero opens an empty receiver pool for later transfers.
    pub async fn new_recette(&self, cmd: NewRecetteCmd) -> ResultEngine<Recette> {
        let libelle = normalize_required_text(&cmd.libelle, "recette libelle")?;
        let recette = Recette::new(cmd.user_id.clone(), libelle, cmd.montant)?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &cmd.user_id).await?;
            recettes::ActiveModel::from(&recette).insert(&db_tx).await?;
            Ok(())
        })?;
        tracing::info!(recette = %recette.id, montant = recette.montant, "recette created");
        Ok(recette)
    }

    /// Return a [`Recette`].
    pub async fn recette(&self, recette_id: Uuid, user_id: &str) -> ResultEngine<Recette> {
        let model = self
            .require_recette(&self.database, recette_id, user_id)
            .await?;
        Recette::try_from(model)
    }

    /// Spend directly out of a pool. This is the hook expense recording
    /// calls; it only ever reduces the solde.
    pub async fn debit_recette(
        &self,
        recette_id: Uuid,
        user_id: &str,
        montant: i64,
    ) -> ResultEngine<()> {
        require_positive_amount(montant, "montant")?;
        let user_id = user_id.to_string();
        with_conflict_retry!(self, |db_tx| {
            let recette =
                Recette::try_from(self.require_recette(&db_tx, recette_id, &user_id).await?)?;
            let new_solde = recette.with_change(-montant)?;
            self.update_recette_solde(&db_tx, &recette, new_solde).await?;
            Ok(())
        })
    }

    /// Delete a pool, refusing while any transfert still references it.
    pub async fn delete_recette(&self, recette_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        with_tx!(self, |db_tx| {
            let model = self.require_recette(&db_tx, recette_id, &user_id).await?;
            let referenced = transferts::Entity::find()
                .filter(
                    Condition::any()
                        .add(transferts::Column::RecetteSourceId.eq(model.id.clone()))
                        .add(transferts::Column::RecetteDestinationId.eq(model.id.clone())),
                )
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::InvalidArgument(format!(
                    "recette '{}' is referenced by {referenced} transfert(s)",
                    model.libelle
                )));
            }
            recettes::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Guarded update of a pool's solde. The filter on the previously-read
    /// value turns a lost race into [`EngineError::Conflict`].
    pub(super) async fn update_recette_solde(
        &self,
        db_tx: &DatabaseTransaction,
        before: &Recette,
        new_solde: i64,
    ) -> ResultEngine<()> {
        let updated = recettes::Entity::update_many()
            .col_expr(recettes::Column::SoldeDisponible, Expr::value(new_solde))
            .col_expr(recettes::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(recettes::Column::Id.eq(before.id.to_string()))
            .filter(recettes::Column::SoldeDisponible.eq(before.solde_disponible))
            .exec(db_tx)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::Conflict(format!(
                "recette '{}' was updated concurrently",
                before.libelle
            )));
        }
        Ok(())
    }
}
