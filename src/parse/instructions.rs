use std::collections::HashSet;

use crate::io::sheet::SheetGrid;

/// Flattens the instructions sheet into newline-separated lines, dropping
/// repeated lines while keeping the first occurrence. Falls back to
/// `default_text` when the sheet holds nothing.
pub fn extract_instructions(grid: Option<&SheetGrid>, default_text: &str) -> String {
    let Some(grid) = grid else {
        return default_text.to_string();
    };

    let mut seen = HashSet::new();
    let lines: Vec<&str> = grid
        .non_empty_cells()
        .filter(|cell| seen.insert(*cell))
        .collect();

    if lines.is_empty() {
        default_text.to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "Bienvenido.";

    fn grid(rows: &[&[&str]]) -> SheetGrid {
        SheetGrid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn cells_are_joined_row_major_without_repeats() {
        let sheet = grid(&[
            &["Instrucciones", ""],
            &["Lea cada pregunta", "Marque una opción"],
            &["Instrucciones", "Marque una opción"],
            &["", "Envíe el formulario"],
        ]);

        assert_eq!(
            extract_instructions(Some(&sheet), DEFAULT),
            "Instrucciones\nLea cada pregunta\nMarque una opción\nEnvíe el formulario"
        );
    }

    #[test]
    fn empty_or_missing_sheet_yields_default_text() {
        assert_eq!(extract_instructions(Some(&grid(&[&["  "]])), DEFAULT), DEFAULT);
        assert_eq!(extract_instructions(None, DEFAULT), DEFAULT);
    }
}
