//! Read-side aggregation.
//!
//! Pure folds over a snapshot of rows: no state, no I/O. The engine's
//! query methods load a user's records and delegate here, and tests can
//! exercise the arithmetic without a database.

use serde::{Deserialize, Serialize};

use crate::{Compte, Recette};

/// The three aggregate figures reported by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totaux {
    pub disponible: i64,
    pub certifie: i64,
    pub net_hors_exclusions: i64,
}

/// Sum of `solde_disponible` across all given recettes.
pub fn total_disponible(recettes: &[Recette]) -> i64 {
    recettes.iter().map(|r| r.solde_disponible).sum()
}

/// Sum of `solde_disponible` restricted to bank-certified recettes.
pub fn total_certifie(recettes: &[Recette]) -> i64 {
    recettes
        .iter()
        .filter(|r| r.validation_bancaire)
        .map(|r| r.solde_disponible)
        .sum()
}

/// Aggregate account balance net of accounts flagged out of reporting.
///
/// Computed as gross minus excluded; must always agree with the direct
/// sum over non-excluded accounts (the equivalence is covered by tests).
pub fn net_hors_exclusions(comptes: &[Compte]) -> i64 {
    let gross: i64 = comptes.iter().map(|c| c.solde).sum();
    let excluded: i64 = comptes
        .iter()
        .filter(|c| c.exclude_from_total)
        .map(|c| c.solde)
        .sum();
    gross - excluded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recette(solde: i64, certifie: bool) -> Recette {
        let mut recette =
            Recette::new("alice".to_string(), "Salaire".to_string(), solde).unwrap();
        recette.validation_bancaire = certifie;
        recette
    }

    fn compte(solde: i64, excluded: bool) -> Compte {
        Compte::new("alice".to_string(), "Courant".to_string(), solde, excluded)
    }

    #[test]
    fn totals_over_certified_subset() {
        let recettes = vec![
            recette(100_000, true),
            recette(200_000, true),
            recette(300_000, false),
        ];
        assert_eq!(total_disponible(&recettes), 600_000);
        assert_eq!(total_certifie(&recettes), 300_000);
    }

    #[test]
    fn empty_snapshot_sums_to_zero() {
        assert_eq!(total_disponible(&[]), 0);
        assert_eq!(total_certifie(&[]), 0);
        assert_eq!(net_hors_exclusions(&[]), 0);
    }

    #[test]
    fn net_matches_filtered_sum() {
        let comptes = vec![
            compte(50_000, false),
            compte(-12_500, false),
            compte(80_000, true),
            compte(7_331, true),
            compte(0, false),
        ];

        let filtered: i64 = comptes
            .iter()
            .filter(|c| !c.exclude_from_total)
            .map(|c| c.solde)
            .sum();

        assert_eq!(net_hors_exclusions(&comptes), filtered);
        assert_eq!(net_hors_exclusions(&comptes), 37_500);
    }

    #[test]
    fn net_with_all_excluded_is_zero() {
        let comptes = vec![compte(10, true), compte(-3, true)];
        assert_eq!(net_hors_exclusions(&comptes), 0);
    }
}
