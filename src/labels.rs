//! Spreadsheet-style column labels (`A`, `B`, ..., `Z`, `AA`, `AB`, ...).
//!
//! Labels are a bijective base-26 numeral: the digits run from 1 (`A`) to 26 (`Z`)
//! and there is no zero digit. Index 0 is `A`, index 25 is `Z`, index 26 is `AA`.

use crate::{LoaderError, LoaderResult};

/// Number of letters in the label alphabet.
const RADIX: usize = 26;

/// Converts a zero-based column index into its spreadsheet label.
///
/// ```
/// use polars_load::index_to_label;
///
/// assert_eq!(index_to_label(0), "A");
/// assert_eq!(index_to_label(26), "AA");
/// assert_eq!(index_to_label(16383), "XFD");
/// ```
pub fn index_to_label(index: usize) -> String {
    // Work with the 1-based column number; every digit is then in 1..=26.
    let mut number = index + 1;
    let mut letters = Vec::new();

    while number > 0 {
        number -= 1;
        letters.push((b'A' + (number % RADIX) as u8) as char);
        number /= RADIX;
    }

    letters.iter().rev().collect()
}

/// Converts a spreadsheet label back into its zero-based column index.
///
/// Only the uppercase letters `A`-`Z` are accepted.
///
/// ### Errors
/// `LoaderError::InvalidLabel` for an empty label, any other character
/// (digits, lowercase letters, whitespace) or a label too long to fit in `usize`.
pub fn label_to_index(label: &str) -> LoaderResult<usize> {
    if label.is_empty() {
        return Err(invalid_label(label, "label is empty"));
    }

    let mut number: usize = 0;

    for byte in label.bytes() {
        if !byte.is_ascii_uppercase() {
            let reason = format!("'{}' is not a letter between A and Z", byte as char);
            return Err(invalid_label(label, &reason));
        }

        let digit = (byte - b'A') as usize + 1;

        number = number
            .checked_mul(RADIX)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| invalid_label(label, "label is too long"))?;
    }

    // number >= 1 here because the label is non-empty.
    Ok(number - 1)
}

/// Generates the first `n` labels in spreadsheet order: `A`, `B`, ..., `Z`, `AA`, ...
pub fn generate_labels(n: usize) -> Vec<String> {
    (0..n).map(index_to_label).collect()
}

fn invalid_label(label: &str, reason: &str) -> LoaderError {
    LoaderError::InvalidLabel {
        label: label.to_string(),
        reason: reason.to_string(),
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_labels`
#[cfg(test)]
mod tests_labels {
    use super::*;

    /// Orders labels the way a spreadsheet orders its columns:
    /// shorter labels first, then alphabetically.
    fn spreadsheet_order(a: &str, b: &str) -> std::cmp::Ordering {
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }

    #[test]
    fn test_index_to_label_known_values() {
        assert_eq!(index_to_label(0), "A");
        assert_eq!(index_to_label(1), "B");
        assert_eq!(index_to_label(25), "Z");
        assert_eq!(index_to_label(26), "AA");
        assert_eq!(index_to_label(27), "AB");
        assert_eq!(index_to_label(51), "AZ");
        assert_eq!(index_to_label(52), "BA");
        assert_eq!(index_to_label(701), "ZZ");
        assert_eq!(index_to_label(702), "AAA");
        assert_eq!(index_to_label(16383), "XFD"); // Last Excel column
    }

    #[test]
    fn test_label_to_index_known_values() -> LoaderResult<()> {
        assert_eq!(label_to_index("A")?, 0);
        assert_eq!(label_to_index("N")?, 13);
        assert_eq!(label_to_index("Z")?, 25);
        assert_eq!(label_to_index("AA")?, 26);
        assert_eq!(label_to_index("ZZ")?, 701);
        assert_eq!(label_to_index("AAA")?, 702);
        assert_eq!(label_to_index("XFD")?, 16383);
        Ok(())
    }

    #[test]
    fn test_label_to_index_rejects_characters_outside_a_to_z() {
        for label in ["", "a", "Ab", "A1", "1", " A", "A ", "Ñ", "A-B", "@", "["] {
            let result = label_to_index(label);
            assert!(
                matches!(result, Err(LoaderError::InvalidLabel { .. })),
                "label {label:?} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_label_to_index_rejects_overflow() {
        let label = "Z".repeat(64);
        assert!(matches!(
            label_to_index(&label),
            Err(LoaderError::InvalidLabel { .. })
        ));
    }

    #[test]
    fn test_round_trip_index_label_index() -> LoaderResult<()> {
        for index in (0..20_000).chain([usize::pow(26, 4), 1_000_000]) {
            let label = index_to_label(index);
            assert_eq!(label_to_index(&label)?, index, "label: {label}");
        }
        Ok(())
    }

    #[test]
    fn test_round_trip_label_index_label() -> LoaderResult<()> {
        // Every label of one, two and three letters.
        let letters: Vec<char> = ('A'..='Z').collect();
        let mut labels: Vec<String> = letters.iter().map(|c| c.to_string()).collect();
        for a in &letters {
            for b in &letters {
                labels.push(format!("{a}{b}"));
                for c in &letters {
                    labels.push(format!("{a}{b}{c}"));
                }
            }
        }

        for label in labels {
            assert_eq!(index_to_label(label_to_index(&label)?), label);
        }
        Ok(())
    }

    #[test]
    fn test_generate_labels_length_order_and_uniqueness() {
        for n in [1, 2, 25, 26, 27, 52, 53, 702, 703, 2000] {
            let labels = generate_labels(n);
            assert_eq!(labels.len(), n);

            for pair in labels.windows(2) {
                assert_eq!(
                    spreadsheet_order(&pair[0], &pair[1]),
                    std::cmp::Ordering::Less,
                    "{} must come before {}",
                    pair[0],
                    pair[1]
                );
            }

            let unique: std::collections::HashSet<&String> = labels.iter().collect();
            assert_eq!(unique.len(), n);
        }
    }

    #[test]
    fn test_generate_labels_27th_is_aa() {
        let labels = generate_labels(27);
        assert_eq!(labels[25], "Z");
        assert_eq!(labels[26], "AA");
    }

    #[test]
    fn test_generate_labels_zero() {
        assert!(generate_labels(0).is_empty());
    }
}
