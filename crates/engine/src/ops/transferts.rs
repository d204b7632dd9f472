//! Transfer settlement and reversal.
//!
//! A transfer decrements the source pool, increments the destination pool
//! and persists the transfert row as one atomic unit. Reversal is the
//! mirror image: it re-validates that the destination still holds the
//! amount (funds already spent downstream cannot be clawed back), reverts
//! both balances and deletes the row.

use sea_orm::{ActiveModelTrait, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    EngineError, Event, Recette, ResultEngine, Transfert, TransferCmd, transferts,
    util::normalize_optional_text,
};

use super::{Engine, with_conflict_retry, with_tx};

impl Engine {
    /// Move a positive amount from one recette to another.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<Transfert> {
        if cmd.source_id == cmd.destination_id {
            return Err(EngineError::InvalidArgument(
                "source and destination must differ".to_string(),
            ));
        }
        let description = normalize_optional_text(cmd.description.as_deref());

        let transfert = with_conflict_retry!(self, |db_tx| {
            let source = Recette::try_from(
                self.require_recette(&db_tx, cmd.source_id, &cmd.user_id).await?,
            )?;
            let destination = Recette::try_from(
                self.require_recette(&db_tx, cmd.destination_id, &cmd.user_id)
                    .await?,
            )?;

            let transfert = Transfert::new(
                cmd.user_id.clone(),
                source.id,
                destination.id,
                cmd.montant,
                description.clone(),
                cmd.date_transfert,
            )?;

            // Validate both sides before writing anything.
            let new_source_solde = source.with_change(-cmd.montant)?;
            let new_destination_solde = destination.with_change(cmd.montant)?;

            transferts::ActiveModel::from(&transfert).insert(&db_tx).await?;
            self.update_recette_solde(&db_tx, &source, new_source_solde)
                .await?;
            self.update_recette_solde(&db_tx, &destination, new_destination_solde)
                .await?;
            Ok(transfert)
        })?;

        tracing::info!(
            transfert = %transfert.id,
            source = %transfert.recette_source_id,
            destination = %transfert.recette_destination_id,
            montant = transfert.montant,
            "transfer settled"
        );
        self.publish(Event::TransferSettled {
            transfert_id: transfert.id,
            source_id: transfert.recette_source_id,
            destination_id: transfert.recette_destination_id,
            montant: transfert.montant,
        });
        Ok(transfert)
    }

    /// Return a [`Transfert`].
    pub async fn transfert(&self, transfert_id: Uuid, user_id: &str) -> ResultEngine<Transfert> {
        let model = self
            .require_transfert(&self.database, transfert_id, user_id)
            .await?;
        Transfert::try_from(model)
    }

    /// Undo a settled transfer and remove its row.
    ///
    /// Fails closed with `InsufficientFunds` when the destination no
    /// longer holds the amount; nothing is touched in that case.
    pub async fn reverse_transfer(&self, transfert_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        let transfert = with_conflict_retry!(self, |db_tx| {
            let transfert = Transfert::try_from(
                self.require_transfert(&db_tx, transfert_id, &user_id).await?,
            )?;
            let source = Recette::try_from(
                self.require_recette(&db_tx, transfert.recette_source_id, &user_id)
                    .await?,
            )?;
            let destination = Recette::try_from(
                self.require_recette(&db_tx, transfert.recette_destination_id, &user_id)
                    .await?,
            )?;

            let new_destination_solde = destination.with_change(-transfert.montant)?;
            let new_source_solde = source.with_change(transfert.montant)?;

            transferts::Entity::delete_by_id(transfert.id.to_string())
                .exec(&db_tx)
                .await?;
            self.update_recette_solde(&db_tx, &destination, new_destination_solde)
                .await?;
            self.update_recette_solde(&db_tx, &source, new_source_solde)
                .await?;
            Ok(transfert)
        })?;

        tracing::info!(transfert = %transfert.id, montant = transfert.montant, "transfer reversed");
        self.publish(Event::TransferReversed {
            transfert_id: transfert.id,
            source_id: transfert.recette_source_id,
            destination_id: transfert.recette_destination_id,
            montant: transfert.montant,
        });
        Ok(())
    }
}
