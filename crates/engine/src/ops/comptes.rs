//! Bank account operations.
//!
//! Accounts are owned by the external banking sync; the ledger only
//! creates them, reads them for aggregation, and toggles the reporting
//! exclusion flag.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, TransactionTrait};
use uuid::Uuid;

use crate::{
    Compte, NewCompteCmd, ResultEngine, comptes, util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a bank account.
    pub async fn new_compte(&self, cmd: NewCompteCmd) -> ResultEngine<Compte> {
        let libelle = normalize_required_text(&cmd.libelle, "compte libelle")?;
        let compte = Compte::new(
            cmd.user_id.clone(),
            libelle,
            cmd.solde,
            cmd.exclude_from_total,
        );
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &cmd.user_id).await?;
            comptes::ActiveModel::from(&compte).insert(&db_tx).await?;
            Ok(())
        })?;
        Ok(compte)
    }

    /// Return a [`Compte`].
    pub async fn compte(&self, compte_id: Uuid, user_id: &str) -> ResultEngine<Compte> {
        let model = self
            .require_compte(&self.database, compte_id, user_id)
            .await?;
        Compte::try_from(model)
    }

    /// Flag an account in or out of the reported totals.
    pub async fn set_compte_exclusion(
        &self,
        compte_id: Uuid,
        user_id: &str,
        excluded: bool,
    ) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        with_tx!(self, |db_tx| {
            let model = self.require_compte(&db_tx, compte_id, &user_id).await?;
            let compte_model = comptes::ActiveModel {
                id: ActiveValue::Set(model.id),
                exclude_from_total: ActiveValue::Set(excluded),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            compte_model.update(&db_tx).await?;
            Ok(())
        })
    }
}
