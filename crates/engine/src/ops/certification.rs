//! Bank-certification toggle.
//!
//! Marks a recette as reconciled against an external bank statement.
//! Pure metadata: no balance is touched, only the flag and its timestamp.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, TransactionTrait};
use uuid::Uuid;

use crate::{ResultEngine, recettes};

use super::{Engine, with_tx};

impl Engine {
    /// Set or clear the certification flag on a recette.
    ///
    /// Certifying stamps `date_validation_bancaire` with the current
    /// time; decertifying clears it.
    pub async fn set_certified(
        &self,
        recette_id: Uuid,
        user_id: &str,
        certified: bool,
    ) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        with_tx!(self, |db_tx| {
            let model = self.require_recette(&db_tx, recette_id, &user_id).await?;
            let now = Utc::now();
            let recette_model = recettes::ActiveModel {
                id: ActiveValue::Set(model.id),
                validation_bancaire: ActiveValue::Set(certified),
                date_validation_bancaire: ActiveValue::Set(certified.then_some(now)),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            recette_model.update(&db_tx).await?;
            Ok(())
        })
    }
}
