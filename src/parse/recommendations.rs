use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::io::sheet::SheetGrid;
use crate::model::{RECOMMENDATION_COLUMNS, RecommendationRow, RecommendationTable};

/// Substring of a normalized header → canonical column it maps to.
const COLUMN_ALIASES: [(&str, &str); 5] = [
    ("barrera", "barrera"),
    ("concepto", "concepto"),
    ("sintoma", "sintomas"),
    ("indicador", "indicadores"),
    ("recomendacion", "recomendaciones"),
];

/// Lower-cases a header, folds Spanish accents, and joins words with `_`.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| match ch {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ñ' => 'n',
            ' ' => '_',
            other => other,
        })
        .collect()
}

/// Canonical column for a normalized header, if any alias matches.
pub fn canonical_column(normalized: &str) -> Option<&'static str> {
    COLUMN_ALIASES
        .iter()
        .find(|(needle, _)| normalized.contains(needle))
        .map(|(_, canonical)| *canonical)
}

/// Resolves every header to its final column name. Each canonical name is
/// claimed by the first header that maps to it; later headers keep their
/// normalized form. Blank headers become `unnamed_{index}`.
fn resolve_columns(headers: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let normalized = normalize_header(header);
            let mut name = match canonical_column(&normalized) {
                Some(canonical) if !used.contains(canonical) => canonical.to_string(),
                _ if normalized.is_empty() => format!("unnamed_{index}"),
                _ => normalized,
            };
            while used.contains(&name) {
                name.push('_');
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

/// Maps the recommendations sheet onto canonical columns. The first row of
/// the grid holds the headers; unmatched headers are kept.
pub fn normalize_recommendations(grid: Option<&SheetGrid>) -> RecommendationTable {
    let Some(grid) = grid.filter(|grid| !grid.is_empty()) else {
        return RecommendationTable::default();
    };

    let columns = resolve_columns(grid.header());
    let unmapped: Vec<&String> = columns
        .iter()
        .filter(|column| !RECOMMENDATION_COLUMNS.contains(&column.as_str()))
        .collect();
    if !unmapped.is_empty() {
        debug!(?unmapped, "recommendation columns kept without canonical name");
    }

    let rows: Vec<RecommendationRow> = grid
        .body()
        .iter()
        .map(|cells| RecommendationRow {
            values: columns
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect::<BTreeMap<_, _>>(),
        })
        .collect();

    info!(row_count = rows.len(), column_count = columns.len(), "recommendations normalized");
    RecommendationTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> SheetGrid {
        SheetGrid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn headers_are_normalized() {
        assert_eq!(normalize_header(" Síntomas Observados "), "sintomas_observados");
        assert_eq!(normalize_header("Año de Revisión"), "ano_de_revision");
    }

    #[test]
    fn known_headers_map_to_canonical_columns() {
        let table = normalize_recommendations(Some(&grid(&[
            &["Barrera", "Concepto clave", "Síntomas", "Indicadores de avance", "Recomendación", "Fuente"],
            &["Prejuicio", "Sesgo", "Rechazo", "Quejas", "Capacitar", "Manual"],
        ])));

        assert_eq!(
            table.columns,
            vec!["barrera", "concepto", "sintomas", "indicadores", "recomendaciones", "fuente"]
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("recomendaciones"), "Capacitar");
        assert_eq!(table.rows[0].get("fuente"), "Manual");
    }

    #[test]
    fn unmatched_sheet_keeps_its_columns() {
        let table = normalize_recommendations(Some(&grid(&[&["Tema", "Acción"], &["A", "B"]])));
        assert_eq!(table.columns, vec!["tema", "accion"]);
        assert_eq!(table.rows[0].get("accion"), "B");
        assert_eq!(table.rows[0].get("barrera"), "");
    }

    #[test]
    fn repeated_canonical_header_keeps_normalized_name() {
        let table = normalize_recommendations(Some(&grid(&[
            &["Barrera", "Barrera secundaria", ""],
            &["Uno", "Dos", "Tres"],
        ])));
        assert_eq!(table.columns, vec!["barrera", "barrera_secundaria", "unnamed_2"]);
    }

    #[test]
    fn missing_sheet_yields_empty_table() {
        assert_eq!(normalize_recommendations(None), RecommendationTable::default());
    }
}
