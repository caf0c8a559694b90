use serde::{Deserialize, Serialize};

use crate::{LedgerError, LedgerResult};

/// Separator placed between the parts of a transaction key.
pub const KEY_SEPARATOR: char = '\u{1f}';

/// Layout used to address transaction records in the state store.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// `name`, `entity` and `transaction_id` joined by [`KEY_SEPARATOR`].
    #[default]
    Delimited,
    /// Plain concatenation, matching stores written by earlier deployments.
    /// Distinct triples may alias each other under this layout.
    Concatenated,
}

impl KeyScheme {
    pub fn transaction_key(self, name: &str, entity: &str, transaction_id: &str) -> String {
        match self {
            KeyScheme::Delimited => {
                let mut key =
                    String::with_capacity(name.len() + entity.len() + transaction_id.len() + 2);
                key.push_str(name);
                key.push(KEY_SEPARATOR);
                key.push_str(entity);
                key.push(KEY_SEPARATOR);
                key.push_str(transaction_id);
                key
            }
            KeyScheme::Concatenated => format!("{name}{entity}{transaction_id}"),
        }
    }
}

/// Ensure an identifier can be used as (part of) a store key.
pub fn validate_identifier(field: &str, value: &str) -> LedgerResult<()> {
    if value.is_empty() {
        return Err(LedgerError::invalid(format!("{field} must not be empty")));
    }
    if value.contains(KEY_SEPARATOR) {
        return Err(LedgerError::invalid(format!(
            "{field} contains a reserved control character"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_keys_do_not_alias() {
        let scheme = KeyScheme::Delimited;
        assert_ne!(
            scheme.transaction_key("ab", "c", "d"),
            scheme.transaction_key("a", "bc", "d")
        );
    }

    #[test]
    fn concatenated_matches_legacy_layout() {
        assert_eq!(
            KeyScheme::Concatenated.transaction_key("alice", "AirlineX", "TX1"),
            "aliceAirlineXTX1"
        );
    }

    #[test]
    fn rejects_empty_and_separator() {
        assert!(validate_identifier("name", "").is_err());
        assert!(validate_identifier("name", "a\u{1f}b").is_err());
        assert!(validate_identifier("name", "alice").is_ok());
    }
}
