//! Numeric range checks for registered bounds.

use polars::prelude::DataFrame;

use triage_ingest::column_numbers;
use triage_map::Reconciliation;
use triage_model::{Category, ValidationMessage};
use triage_standards::{BoundKind, NumericBound, StructuralConfig};

/// Check registered numeric columns against their hard and soft ranges.
///
/// Hours columns are also screened for a minutes-for-hours unit mix-up and
/// GPA columns for a non-4.0 grading scale.
pub fn check<'a, I>(
    df: &DataFrame,
    reconciliation: &Reconciliation,
    bounds: I,
    config: &StructuralConfig,
) -> Vec<ValidationMessage>
where
    I: IntoIterator<Item = &'a NumericBound>,
{
    let file_type = reconciliation.file_type();
    let mut messages = Vec::new();

    for bound in bounds {
        let Some(raw) = reconciliation.raw_for(&bound.column) else {
            continue;
        };
        let Ok(values) = column_numbers(df, raw) else {
            continue;
        };
        let values: Vec<f64> = values.into_iter().flatten().collect();
        if values.is_empty() {
            continue;
        }

        let outside_hard = values.iter().filter(|v| !bound.hard.contains(**v)).count();
        let outside_soft = values
            .iter()
            .filter(|v| bound.hard.contains(**v) && !bound.soft.contains(**v))
            .count();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if outside_hard > 0 {
            messages.push(
                ValidationMessage::error(
                    Category::DataQuality,
                    "value_out_of_range",
                    format!(
                        "{outside_hard} values of {} are outside {}..={}",
                        bound.column, bound.hard.min, bound.hard.max
                    ),
                )
                .for_file(file_type)
                .with_detail("column", bound.column.clone())
                .with_detail("count", outside_hard)
                .with_detail("min", min)
                .with_detail("max", max),
            );
        }
        if outside_soft > 0 {
            messages.push(
                ValidationMessage::warning(
                    Category::DataQuality,
                    "value_unusual",
                    format!(
                        "{outside_soft} values of {} are outside the usual {}..={}",
                        bound.column, bound.soft.min, bound.soft.max
                    ),
                )
                .for_file(file_type)
                .with_detail("column", bound.column.clone())
                .with_detail("count", outside_soft),
            );
        }

        match bound.kind {
            BoundKind::Hours => {
                let median = median(&values);
                if median > config.hours_unit_median {
                    messages.push(
                        ValidationMessage::error(
                            Category::DataQuality,
                            "unit_mismatch",
                            format!(
                                "median of {} is {median}, which suggests minutes instead of hours",
                                bound.column
                            ),
                        )
                        .for_file(file_type)
                        .with_detail("column", bound.column.clone())
                        .with_detail("median", median)
                        .with_recommendation("Convert the column to hours before uploading"),
                    );
                }
            }
            BoundKind::Gpa if max > config.gpa_scale_max => {
                messages.push(
                    ValidationMessage::warning(
                        Category::DataQuality,
                        "gpa_scale_mismatch",
                        format!(
                            "maximum of {} is {max}, which is not on a 4.0 scale",
                            bound.column
                        ),
                    )
                    .for_file(file_type)
                    .with_detail("column", bound.column.clone())
                    .with_detail("max", max),
                );
            }
            _ => {}
        }
    }

    messages
}

pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
