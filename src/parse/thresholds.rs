use std::collections::BTreeSet;
use std::io::{Read, Seek};

use calamine::{DataType, Xlsx};
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::io::sheet;
use crate::layout::WorkbookLayout;
use crate::model::ThresholdSet;

/// Keyword a threshold formula must contain to be considered.
const CONDITIONAL_KEYWORD: &str = "IF(";

/// Derives the level thresholds from the conditional formula stored in the
/// layout's threshold cell. Never fails: any problem yields the defaults.
#[instrument(level = "debug", skip_all, fields(sheet = %layout.questionnaire_sheet))]
pub fn read_thresholds<R: Read + Seek>(workbook: &mut Xlsx<R>, layout: &WorkbookLayout) -> ThresholdSet {
    match read_threshold_formula(workbook, layout) {
        Ok(formula) => parse_threshold_formula(
            formula.as_deref(),
            &layout.threshold_reference,
            layout.default_thresholds,
        ),
        Err(error) => {
            warn!(%error, "threshold formula unreadable, using defaults");
            layout.default_thresholds
        }
    }
}

fn read_threshold_formula<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    layout: &WorkbookLayout,
) -> Result<Option<String>> {
    let position = layout.threshold_cell;
    let Some(formulas) = sheet::read_formulas(workbook, &layout.questionnaire_sheet)? else {
        return Ok(None);
    };
    if let Some(formula) = formulas
        .get_value((position.row, position.column))
        .filter(|formula| !formula.is_empty())
    {
        return Ok(Some(formula.clone()));
    }

    // Conditionals typed as plain text are stored as strings, not formulas.
    let Some(values) = sheet::read_range(workbook, &layout.questionnaire_sheet)? else {
        return Ok(None);
    };
    match values.get_value((position.row, position.column)) {
        Some(DataType::String(text)) => Ok(Some(text.clone())),
        _ => Ok(None),
    }
}

/// Extracts the two smallest distinct integers compared against `reference`
/// inside `formula`.
///
/// A single integer is paired with the default upper threshold. A missing
/// formula, one without a conditional, or one without comparisons yields
/// `defaults` unchanged.
pub fn parse_threshold_formula(
    formula: Option<&str>,
    reference: &str,
    defaults: ThresholdSet,
) -> ThresholdSet {
    let Some(formula) = formula else {
        debug!("no threshold formula, using defaults");
        return defaults;
    };
    if !formula.to_uppercase().contains(CONDITIONAL_KEYWORD) {
        debug!(formula, "threshold cell holds no conditional, using defaults");
        return defaults;
    }

    let pattern = format!(r"(?i){}\s*[<>=]{{1,2}}\s*(\d+)", regex::escape(reference));
    let comparison = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(error) => {
            warn!(%error, reference, "invalid threshold reference, using defaults");
            return defaults;
        }
    };

    let values: BTreeSet<i64> = comparison
        .captures_iter(formula)
        .filter_map(|captures| captures.get(1)?.as_str().parse().ok())
        .collect();
    let mut values = values.into_iter();

    let thresholds = match (values.next(), values.next()) {
        (Some(first), Some(second)) => ThresholdSet::new(first, second),
        (Some(first), None) => ThresholdSet::new(first, defaults.level2_max),
        _ => defaults,
    };
    debug!(?thresholds, formula, "thresholds derived from formula");
    thresholds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(formula: Option<&str>) -> ThresholdSet {
        parse_threshold_formula(formula, "D77", ThresholdSet::default())
    }

    #[test]
    fn nested_conditional_yields_both_thresholds() {
        let thresholds = parse(Some(r#"=IF(D77<15,"A",IF(D77<23,"B","C"))"#));
        assert_eq!(thresholds, ThresholdSet::new(15, 23));
    }

    #[test]
    fn two_smallest_distinct_values_are_used() {
        let thresholds = parse(Some(r#"IF(D77 <= 12,"A",IF(D77<=20,"B",IF(D77>12,"C",IF(D77>=30,"D","E"))))"#));
        assert_eq!(thresholds, ThresholdSet::new(12, 20));
    }

    #[test]
    fn single_value_is_paired_with_default_upper_threshold() {
        let thresholds = parse(Some(r#"if(D77<10,"Inicial","Otro")"#));
        assert_eq!(thresholds, ThresholdSet::new(10, 23));
    }

    #[test]
    fn comparisons_against_other_cells_are_ignored() {
        let thresholds = parse(Some(r#"IF(E77<5,"A",IF(D77<18,"B","C"))"#));
        assert_eq!(thresholds, ThresholdSet::new(18, 23));
        assert_eq!(parse(Some(r#"IF(E77<5,"A","B")"#)), ThresholdSet::default());
    }

    #[test]
    fn plain_text_or_missing_cell_yields_defaults() {
        assert_eq!(parse(Some("Puntaje total")), ThresholdSet::new(15, 23));
        assert_eq!(parse(None), ThresholdSet::new(15, 23));
    }

    #[test]
    fn reversed_thresholds_are_not_reordered_beyond_sorting() {
        let thresholds = parse(Some(r#"IF(D77<30,"A",IF(D77<30,"B","C"))"#));
        assert_eq!(thresholds, ThresholdSet::new(30, 23));
        assert!(!thresholds.is_ordered());
    }
}
