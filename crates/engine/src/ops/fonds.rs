//! Shared-fund operations: allocation, movements, listing and replay.
//!
//! The movement log is the source of truth; `montant_restant` is a
//! materialised running total. `apply_movement` inserts the log row first
//! and then refreshes the materialised value, both inside one
//! transaction, so a reader never observes one without the other.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    AllocateCmd, EngineError, Event, FondsPartage, MouvementFonds, MovementCmd, ResultEngine,
    fonds_partages, mouvements,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_conflict_retry, with_tx};

impl Engine {
    /// Split a credit transaction into a trackable shared fund.
    pub async fn allocate(&self, cmd: AllocateCmd) -> ResultEngine<FondsPartage> {
        let libelle = normalize_required_text(&cmd.libelle, "fonds libelle")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let transaction_source_id =
            normalize_required_text(&cmd.transaction_source_id, "transaction_source_id")?;

        let fonds = FondsPartage::new(
            cmd.user_id.clone(),
            cmd.source_compte_id,
            cmd.primary_compte_id,
            transaction_source_id,
            libelle,
            description,
            cmd.montant,
        )?;

        with_tx!(self, |db_tx| {
            self.require_compte(&db_tx, cmd.source_compte_id, &cmd.user_id)
                .await?;
            if let Some(primary_id) = cmd.primary_compte_id {
                self.require_compte(&db_tx, primary_id, &cmd.user_id).await?;
            }
            fonds_partages::ActiveModel::from(&fonds).insert(&db_tx).await?;
            Ok(())
        })?;

        tracing::info!(fonds = %fonds.id, montant = fonds.montant_initial, "fonds allocated");
        Ok(fonds)
    }

    /// Return a [`FondsPartage`].
    pub async fn fonds(&self, fonds_id: Uuid, user_id: &str) -> ResultEngine<FondsPartage> {
        let model = self.require_fonds(&self.database, fonds_id, user_id).await?;
        FondsPartage::try_from(model)
    }

    /// Funds a given account can still draw from, newest first.
    ///
    /// The returned list is a snapshot of committed state; callers should
    /// re-query after applying a movement.
    pub async fn list_available_fonds(
        &self,
        compte_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<FondsPartage>> {
        self.require_compte(&self.database, compte_id, user_id)
            .await?;

        let models = fonds_partages::Entity::find()
            .filter(fonds_partages::Column::UserId.eq(user_id.to_string()))
            .filter(
                Condition::any()
                    .add(fonds_partages::Column::SourceCompteId.eq(compte_id.to_string()))
                    .add(fonds_partages::Column::PrimaryCompteId.eq(compte_id.to_string())),
            )
            .filter(fonds_partages::Column::MontantRestant.gt(0))
            .order_by_desc(fonds_partages::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(FondsPartage::try_from(model)?);
        }
        Ok(out)
    }

    /// Apply one debit or credit to a shared fund, returning the created
    /// movement id.
    pub async fn apply_movement(&self, cmd: MovementCmd) -> ResultEngine<Uuid> {
        let transaction_id = normalize_optional_text(cmd.transaction_id.as_deref());
        let libelle = normalize_optional_text(cmd.libelle.as_deref());

        let mouvement = with_conflict_retry!(self, |db_tx| {
            let fonds =
                FondsPartage::try_from(self.require_fonds(&db_tx, cmd.fonds_id, &cmd.user_id).await?)?;
            self.require_compte(&db_tx, cmd.compte_id, &cmd.user_id).await?;

            let mouvement = MouvementFonds::new(
                fonds.id,
                cmd.user_id.clone(),
                cmd.compte_id,
                cmd.kind,
                cmd.montant,
                transaction_id.clone(),
                libelle.clone(),
            )?;
            let new_restant = fonds.with_movement(cmd.kind, cmd.montant)?;

            // Log first, then the materialised total it implies.
            mouvements::ActiveModel::from(&mouvement).insert(&db_tx).await?;
            self.update_fonds_restant(&db_tx, &fonds, new_restant).await?;
            Ok(mouvement)
        })?;

        tracing::info!(
            fonds = %mouvement.fonds_partage_id,
            mouvement = %mouvement.id,
            kind = mouvement.kind.as_str(),
            montant = mouvement.montant,
            "movement applied"
        );
        self.publish(Event::MovementApplied {
            fonds_id: mouvement.fonds_partage_id,
            mouvement_id: mouvement.id,
            kind: mouvement.kind,
            montant: mouvement.montant,
        });
        Ok(mouvement.id)
    }

    /// Full movement history of a fund, oldest first.
    pub async fn list_movements(
        &self,
        fonds_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<MouvementFonds>> {
        self.require_fonds(&self.database, fonds_id, user_id).await?;

        let models = mouvements::Entity::find()
            .filter(mouvements::Column::FondsPartageId.eq(fonds_id.to_string()))
            .order_by_asc(mouvements::Column::CreatedAt)
            .order_by_asc(mouvements::Column::Id)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(MouvementFonds::try_from(model)?);
        }
        Ok(out)
    }

    /// Replays the movement log from the initial allocation and repairs
    /// the materialised `montant_restant`, returning the replayed value.
    pub async fn recompute_fonds(&self, fonds_id: Uuid, user_id: &str) -> ResultEngine<i64> {
        let user_id = user_id.to_string();
        with_tx!(self, |db_tx| {
            let fonds =
                FondsPartage::try_from(self.require_fonds(&db_tx, fonds_id, &user_id).await?)?;

            let mouvement_models = mouvements::Entity::find()
                .filter(mouvements::Column::FondsPartageId.eq(fonds.id.to_string()))
                .order_by_asc(mouvements::Column::CreatedAt)
                .order_by_asc(mouvements::Column::Id)
                .all(&db_tx)
                .await?;

            // Replay from the initial allocation, validating the bounds at
            // every step.
            let mut replay = fonds.clone();
            replay.montant_restant = replay.montant_initial;
            for model in mouvement_models {
                let mouvement = MouvementFonds::try_from(model)?;
                replay.montant_restant = replay.with_movement(mouvement.kind, mouvement.montant)?;
            }

            let restant = replay.montant_restant;
            if restant != fonds.montant_restant {
                tracing::warn!(
                    fonds = %fonds.id,
                    materialised = fonds.montant_restant,
                    replayed = restant,
                    "repairing materialised restant"
                );
            }

            let fonds_model = fonds_partages::ActiveModel {
                id: ActiveValue::Set(fonds.id.to_string()),
                montant_restant: ActiveValue::Set(restant),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            fonds_model.update(&db_tx).await?;
            Ok(restant)
        })
    }

    /// Guarded update of a fund's materialised restant.
    async fn update_fonds_restant(
        &self,
        db_tx: &DatabaseTransaction,
        before: &FondsPartage,
        new_restant: i64,
    ) -> ResultEngine<()> {
        let updated = fonds_partages::Entity::update_many()
            .col_expr(fonds_partages::Column::MontantRestant, Expr::value(new_restant))
            .col_expr(fonds_partages::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(fonds_partages::Column::Id.eq(before.id.to_string()))
            .filter(fonds_partages::Column::MontantRestant.eq(before.montant_restant))
            .exec(db_tx)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::Conflict(format!(
                "fonds '{}' was updated concurrently",
                before.libelle
            )));
        }
        Ok(())
    }
}
