//! Parsing of the numeric encodings found in Gapminder cells.
//!
//! Cells look like `"812"`, `"1.5k"`, `"3,2M"`, `"1.1B"` or are blank.

use thiserror::Error;

use super::error::{PipelineError, Result};
use super::model::{MeltedCell, Observation};

/// Why a single cell could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("unit suffix without a number")]
    BareSuffix,
    #[error("not a number")]
    NotANumber,
    #[error("value is not finite")]
    NotFinite,
}

/// A successfully parsed, non-blank cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitude {
    pub value: f64,
    /// The cell carried a unit suffix.
    pub explicit_unit: bool,
}

/// Multiplier for a trailing unit suffix, if `c` is one.
fn suffix_multiplier(c: char) -> Option<f64> {
    match c.to_ascii_lowercase() {
        'k' => Some(1e3),
        'm' => Some(1e6),
        'b' => Some(1e9),
        _ => None,
    }
}

/// Parse one cell. Blank cells are missing (`Ok(None)`), not zero.
pub fn normalize(cell: &str) -> std::result::Result<Option<Magnitude>, CellError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (number, multiplier) = match trimmed.chars().last().and_then(suffix_multiplier) {
        // suffix chars are ASCII, so slicing off one byte is safe
        Some(m) => (trimmed[..trimmed.len() - 1].trim_end(), Some(m)),
        None => (trimmed, None),
    };
    if number.is_empty() {
        return Err(CellError::BareSuffix);
    }

    let parsed: f64 = number
        .replace(',', ".")
        .parse()
        .map_err(|_| CellError::NotANumber)?;
    let value = parsed * multiplier.unwrap_or(1.0);
    if !value.is_finite() {
        return Err(CellError::NotFinite);
    }

    Ok(Some(Magnitude {
        value,
        explicit_unit: multiplier.is_some(),
    }))
}

/// How malformed cells are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Reject the table on the first malformed cell.
    #[default]
    Strict,
    /// Substitute zero and log a warning.
    Lenient,
}

/// Outcome of normalizing one table's cells.
#[derive(Debug, Default)]
pub struct NormalizeOutcome<'a> {
    pub observations: Vec<Observation<'a>>,
    /// Year headers that are not integers; their cells are dropped.
    pub dropped_columns: Vec<String>,
    /// Cells replaced by zero in lenient mode.
    pub substituted: usize,
}

/// Normalize the melted cells of `table`.
///
/// `row` in a parse error is the 0-based data row of the wide table, derived
/// from the row-major cell order produced by [`super::reshape::melt`].
pub fn normalize_cells<'a>(
    table: &str,
    cells: &'a [MeltedCell],
    columns_per_row: usize,
    mode: ParseMode,
) -> Result<NormalizeOutcome<'a>> {
    let mut out = NormalizeOutcome {
        observations: Vec::with_capacity(cells.len()),
        ..Default::default()
    };

    for (i, cell) in cells.iter().enumerate() {
        let Ok(year) = cell.year.trim().parse::<i32>() else {
            if !out.dropped_columns.contains(&cell.year) {
                log::warn!("{table}: column '{}' is not a year, dropping it", cell.year);
                out.dropped_columns.push(cell.year.clone());
            }
            continue;
        };

        let magnitude = match normalize(&cell.raw) {
            Ok(m) => m,
            Err(reason) if mode == ParseMode::Lenient => {
                log::warn!(
                    "{table}: '{}' for {} in {year} is {reason}, using 0",
                    cell.raw,
                    cell.country
                );
                out.substituted += 1;
                Some(Magnitude {
                    value: 0.0,
                    explicit_unit: false,
                })
            }
            Err(reason) => {
                return Err(PipelineError::ValueParse {
                    table: table.to_string(),
                    column: cell.year.clone(),
                    row: i.checked_div(columns_per_row).unwrap_or(0),
                    country: cell.country.clone(),
                    value: cell.raw.clone(),
                    reason: reason.to_string(),
                });
            }
        };

        out.observations.push(Observation {
            country: &cell.country,
            year,
            value: magnitude.map(|m| m.value),
            explicit_unit: magnitude.is_some_and(|m| m.explicit_unit),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(cell: &str) -> Option<f64> {
        normalize(cell).unwrap().map(|m| m.value)
    }

    fn cell(country: &str, year: &str, raw: &str) -> MeltedCell {
        MeltedCell {
            country: country.to_string(),
            year: year.to_string(),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn suffixes_multiply_after_parsing() {
        assert_eq!(value("1.5k"), Some(1500.0));
        assert_eq!(value("3M"), Some(3_000_000.0));
        assert_eq!(value("2B"), Some(2_000_000_000.0));
        assert_eq!(value("2b"), Some(2_000_000_000.0));
        assert_eq!(value("4K"), Some(4000.0));
        assert!(normalize("1.5k").unwrap().unwrap().explicit_unit);
        assert!(!normalize("1500").unwrap().unwrap().explicit_unit);
    }

    #[test]
    fn comma_is_a_decimal_separator() {
        assert_eq!(value("2,5"), Some(2.5));
        assert_eq!(value("2,5k"), Some(2500.0));
    }

    #[test]
    fn blank_is_missing() {
        assert_eq!(normalize(""), Ok(None));
        assert_eq!(normalize("   "), Ok(None));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(value(" 42 "), Some(42.0));
        assert_eq!(value("1.2 M"), Some(1_200_000.0));
    }

    #[test]
    fn malformed_cells_are_rejected() {
        assert_eq!(normalize("k"), Err(CellError::BareSuffix));
        assert_eq!(normalize("abc"), Err(CellError::NotANumber));
        assert_eq!(normalize("1.2.3"), Err(CellError::NotANumber));
        assert_eq!(normalize("inf"), Err(CellError::NotFinite));
        assert_eq!(normalize("NaN"), Err(CellError::NotFinite));
    }

    #[test]
    fn strict_mode_reports_table_column_and_row() {
        let cells = vec![
            cell("A", "2000", "1"),
            cell("A", "2001", "2"),
            cell("B", "2000", "3"),
            cell("B", "2001", "oops"),
        ];
        let err = normalize_cells("income", &cells, 2, ParseMode::Strict).unwrap_err();
        match err {
            PipelineError::ValueParse {
                table,
                column,
                row,
                country,
                value,
                ..
            } => {
                assert_eq!(table, "income");
                assert_eq!(column, "2001");
                assert_eq!(row, 1);
                assert_eq!(country, "B");
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_mode_substitutes_zero() {
        let cells = vec![cell("A", "2000", "oops"), cell("A", "2001", "")];
        let out = normalize_cells("income", &cells, 2, ParseMode::Lenient).unwrap();
        assert_eq!(out.substituted, 1);
        assert_eq!(out.observations[0].value, Some(0.0));
        assert_eq!(out.observations[1].value, None);
    }

    #[test]
    fn non_year_columns_are_dropped() {
        let cells = vec![
            cell("A", "2000", "1"),
            cell("A", "notes", "x"),
            cell("B", "2000", "2"),
            cell("B", "notes", "y"),
        ];
        let out = normalize_cells("income", &cells, 2, ParseMode::Strict).unwrap();
        assert_eq!(out.dropped_columns, vec!["notes".to_string()]);
        assert_eq!(out.observations.len(), 2);
        assert!(out.observations.iter().all(|o| o.year == 2000));
    }
}
