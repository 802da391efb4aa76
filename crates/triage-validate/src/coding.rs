//! Coding-scheme inference for coded columns.
//!
//! A coded column is either *binary* (a known yes/no token pair), *ordinal*
//! (a small set of integer levels) or *categorical* (anything else).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use triage_ingest::parse_f64;
use triage_model::{Category, FileType, ValidationMessage};

/// Token pairs recognized as binary codings, positive token first.
const BINARY_PAIRS: [(&str, &str); 4] = [("yes", "no"), ("y", "n"), ("1", "0"), ("true", "false")];

/// Integer columns with more levels than this are not ordinal codes.
const MAX_ORDINAL_LEVELS: usize = 10;

/// How a coded column represents its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum CodingScheme {
    Binary { positive: String, negative: String },
    Ordinal { min: i64, max: i64, levels: usize },
    Categorical { levels: usize },
}

impl CodingScheme {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Binary { .. } => "binary",
            Self::Ordinal { .. } => "ordinal",
            Self::Categorical { .. } => "categorical",
        }
    }
}

/// Infer the coding scheme of a column from its non-null values.
///
/// Returns `None` when there are no values to inspect.
pub fn infer_coding_scheme<I, S>(values: I) -> Option<CodingScheme>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens: BTreeSet<String> = values
        .into_iter()
        .map(|value| value.as_ref().trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .map(|token| normalize_integral(&token))
        .collect();
    if tokens.is_empty() {
        return None;
    }

    if tokens.len() <= 2
        && let Some((positive, negative)) = BINARY_PAIRS.iter().find(|(positive, negative)| {
            tokens
                .iter()
                .all(|token| token == positive || token == negative)
        })
    {
        return Some(CodingScheme::Binary {
            positive: (*positive).to_string(),
            negative: (*negative).to_string(),
        });
    }

    let integers: Option<BTreeSet<i64>> = tokens
        .iter()
        .map(|token| token.parse::<i64>().ok())
        .collect();
    if let Some(levels) = integers
        && levels.len() <= MAX_ORDINAL_LEVELS
        && let (Some(min), Some(max)) = (levels.first(), levels.last())
    {
        return Some(CodingScheme::Ordinal {
            min: *min,
            max: *max,
            levels: levels.len(),
        });
    }

    Some(CodingScheme::Categorical {
        levels: tokens.len(),
    })
}

/// Compare the scheme of a coded column across cycles.
pub fn compare_coding(
    file_type: FileType,
    column: &str,
    reference: &CodingScheme,
    current: &CodingScheme,
) -> Option<ValidationMessage> {
    if reference.kind() != current.kind() {
        return Some(
            ValidationMessage::error(
                Category::CodingScheme,
                "coding_scheme_changed",
                format!(
                    "{column} changed from a {} to a {} coding",
                    reference.kind(),
                    current.kind()
                ),
            )
            .for_file(file_type)
            .with_detail("column", column)
            .with_detail("reference", reference.kind())
            .with_detail("current", current.kind())
            .with_recommendation("Recode the column to match the reference cycle"),
        );
    }

    let drift = match (reference, current) {
        (
            CodingScheme::Ordinal { min, max, levels },
            CodingScheme::Ordinal {
                min: new_min,
                max: new_max,
                levels: new_levels,
            },
        ) if (min, max, levels) != (new_min, new_max, new_levels) => Some(format!(
            "{column} levels changed from {min}..={max} ({levels} levels) to \
             {new_min}..={new_max} ({new_levels} levels)"
        )),
        (
            CodingScheme::Binary { positive, negative },
            CodingScheme::Binary {
                positive: new_positive,
                negative: new_negative,
            },
        ) if (positive, negative) != (new_positive, new_negative) => Some(format!(
            "{column} tokens changed from {positive}/{negative} to {new_positive}/{new_negative}"
        )),
        _ => None,
    }?;

    Some(
        ValidationMessage::warning(Category::CodingScheme, "coding_scheme_drift", drift)
            .for_file(file_type)
            .with_detail("column", column),
    )
}

/// `"2.0"` and `"2"` are the same code.
fn normalize_integral(token: &str) -> String {
    match parse_f64(token) {
        Some(number) if number.fract() == 0.0 && token.contains('.') => {
            format!("{}", number as i64)
        }
        _ => token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_known_token_is_binary() {
        assert_eq!(
            infer_coding_scheme(["Yes", "yes", " YES "]),
            Some(CodingScheme::Binary {
                positive: "yes".to_string(),
                negative: "no".to_string()
            })
        );
    }

    #[test]
    fn integer_levels_are_ordinal() {
        assert_eq!(
            infer_coding_scheme(["1", "3", "5.0", "2"]),
            Some(CodingScheme::Ordinal {
                min: 1,
                max: 5,
                levels: 4
            })
        );
    }

    #[test]
    fn free_text_is_categorical() {
        assert_eq!(
            infer_coding_scheme(["Upward", "Downward", "Flat"]),
            Some(CodingScheme::Categorical { levels: 3 })
        );
        assert_eq!(infer_coding_scheme(Vec::<String>::new()), None);
    }
}
