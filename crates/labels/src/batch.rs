//! Batch number format.
//!
//! A batch number reads `{PREFIX}-{YYYYMMDD}-{SEQ}`, e.g. `ALM-20261019-004`.
//! The sequence part comes from a counter keyed by [`sequence_key`], so two
//! print events on the same day never share a number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use labelforge_core::{DomainError, DomainResult};

const PREFIX_LEN: usize = 3;
const FALLBACK_PREFIX: &str = "LBL";

/// Identifier grouping the stickers of one product in one print event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchNumber(String);

impl BatchNumber {
    pub fn compose(prefix: &str, day: NaiveDate, seq: u32) -> Self {
        Self(format!("{}-{seq:03}", sequence_key(prefix, day)))
    }

    /// Wrap a value read back from storage.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BatchNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the batch prefix from a product name.
pub fn batch_prefix(product_name: &str) -> DomainResult<String> {
    let name = product_name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("product name must not be empty"));
    }

    let mut prefix: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(PREFIX_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if prefix.is_empty() {
        return Ok(FALLBACK_PREFIX.to_string());
    }
    while prefix.len() < PREFIX_LEN {
        prefix.push('X');
    }
    Ok(prefix)
}

/// Counter key shared by all batches of one prefix on one day.
pub fn sequence_key(prefix: &str, day: NaiveDate) -> String {
    format!("{prefix}-{}", day.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn prefix_uses_first_alphanumerics() {
        assert_eq!(batch_prefix("almond cookies").unwrap(), "ALM");
        assert_eq!(batch_prefix("  7-up Lime").unwrap(), "7UP");
    }

    #[test]
    fn short_names_are_padded() {
        assert_eq!(batch_prefix("Ox").unwrap(), "OXX");
    }

    #[test]
    fn names_without_ascii_fall_back() {
        assert_eq!(batch_prefix("ćšž").unwrap(), "LBL");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(batch_prefix("   "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn compose_formats_date_and_sequence() {
        assert_eq!(BatchNumber::compose("ALM", day(), 4).as_str(), "ALM-20261019-004");
        assert_eq!(BatchNumber::compose("ALM", day(), 1234).as_str(), "ALM-20261019-1234");
    }

    proptest! {
        #[test]
        fn distinct_sequences_give_distinct_numbers(a in 1u32..100_000, b in 1u32..100_000) {
            prop_assume!(a != b);
            prop_assert_ne!(BatchNumber::compose("ABC", day(), a), BatchNumber::compose("ABC", day(), b));
        }

        #[test]
        fn prefix_is_always_three_uppercase_alphanumerics(name in "[a-zA-Z0-9 ]{0,20}[a-zA-Z]") {
            let prefix = batch_prefix(&name).unwrap();
            prop_assert_eq!(prefix.len(), 3);
            prop_assert!(prefix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
