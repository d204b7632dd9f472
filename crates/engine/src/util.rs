//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent
//! invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidArgument(format!("invalid {label} id")))
}

/// Trim a required label, rejecting empty values.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidArgument(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim optional free text, mapping blank values to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Reject non-positive amounts before they reach balance arithmetic.
pub(crate) fn require_positive_amount(montant: i64, label: &str) -> ResultEngine<()> {
    if montant <= 0 {
        return Err(EngineError::InvalidArgument(format!(
            "{label} must be > 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_optional_text_drops_blanks() {
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(
            normalize_optional_text(Some("  loyer  ")),
            Some("loyer".to_string())
        );
    }

    #[test]
    fn required_text_rejects_empty() {
        assert!(normalize_required_text("  ", "libelle").is_err());
        assert_eq!(
            normalize_required_text(" Salaire ", "libelle").unwrap(),
            "Salaire"
        );
    }

    #[test]
    fn positive_amount_check() {
        assert!(require_positive_amount(0, "montant").is_err());
        assert!(require_positive_amount(-5, "montant").is_err());
        assert!(require_positive_amount(1, "montant").is_ok());
    }
}
