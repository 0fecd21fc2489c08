use std::collections::BTreeMap;
use std::io::{Read, Seek};

use calamine::{DataType, Range, Xlsx};
use tracing::{debug, instrument, warn};

use crate::error::{Result, ToolError};
use crate::io::sheet::{self, SheetGrid};
use crate::model::{Level, LevelKey};

/// Canonical field keys recognised on a level sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LevelField {
    Title,
    Definition,
    Characteristics,
    Route,
}

impl LevelField {
    /// Resolves a raw key through the alias table. Case, surrounding spaces,
    /// accents on the canonical keys, and underscores are tolerated.
    pub fn from_key(raw: &str) -> Option<Self> {
        let key = raw.trim().to_uppercase().replace('_', " ");
        match key.as_str() {
            "NIVEL" => Some(LevelField::Title),
            "DEFINICION" | "DEFINICIÓN" => Some(LevelField::Definition),
            "CARACTERISTICAS" | "CARACTERÍSTICAS" => Some(LevelField::Characteristics),
            "RUTA" | "RUTA DE APRENDIZAJE SUGERIDA" => Some(LevelField::Route),
            _ => None,
        }
    }
}

/// Collects field values, joining repeated fields with newlines.
#[derive(Debug, Default)]
struct LevelFields {
    values: BTreeMap<LevelField, String>,
}

impl LevelFields {
    fn append(&mut self, field: LevelField, value: &str) {
        self.values
            .entry(field)
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn into_level(mut self) -> Level {
        let mut take = |field: LevelField| self.values.remove(&field).unwrap_or_default();
        Level {
            title: take(LevelField::Title),
            definition: take(LevelField::Definition),
            characteristics: take(LevelField::Characteristics),
            route: take(LevelField::Route),
        }
    }
}

/// Key/value reading: the first two non-empty cells of each row are a key
/// and its value.
fn parse_key_value_rows(rows: &[Vec<String>]) -> LevelFields {
    let mut fields = LevelFields::default();
    for row in rows {
        let mut cells = row.iter().map(|cell| cell.trim()).filter(|cell| !cell.is_empty());
        let (Some(key), Some(value)) = (cells.next(), cells.next()) else {
            continue;
        };
        if let Some(field) = LevelField::from_key(key) {
            fields.append(field, value);
        }
    }
    fields
}

/// Columnar reading: a header naming a field owns every non-empty cell below it.
fn parse_columns(grid: &SheetGrid) -> LevelFields {
    let mut fields = LevelFields::default();
    for (column, header) in grid.header().iter().enumerate() {
        let Some(field) = LevelField::from_key(header) else {
            continue;
        };
        let text: Vec<&str> = grid
            .body()
            .iter()
            .filter_map(|row| row.get(column))
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
            .collect();
        fields.values.insert(field, text.join("\n"));
    }
    fields
}

/// Parses a level sheet from its raw rows, falling back to the columnar
/// layout when no key/value row is recognised.
pub fn parse_level_rows(rows: &[Vec<String>]) -> Level {
    let fields = parse_key_value_rows(rows);
    if !fields.is_empty() {
        return fields.into_level();
    }
    debug!("no key/value rows, trying columnar layout");
    parse_columns(&SheetGrid::from_rows(rows.to_vec())).into_level()
}

fn range_rows(range: &Range<DataType>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(|cell| sheet::cell_to_string(Some(cell))).collect())
        .collect()
}

/// Reads a single level sheet.
pub fn read_level<R: Read + Seek>(workbook: &mut Xlsx<R>, key: LevelKey) -> Result<Level> {
    let name = key.sheet_name();
    let range = sheet::read_range(workbook, name)?
        .ok_or_else(|| ToolError::MissingSheet(name.to_string()))?;
    Ok(parse_level_rows(&range_rows(&range)))
}

/// Reads all three level sheets. A sheet that is missing or unreadable
/// contributes an empty level without affecting the others.
#[instrument(level = "debug", skip_all)]
pub fn read_levels<R: Read + Seek>(workbook: &mut Xlsx<R>) -> BTreeMap<LevelKey, Level> {
    LevelKey::ALL
        .into_iter()
        .map(|key| {
            let level = match read_level(workbook, key) {
                Ok(level) => level,
                Err(error) => {
                    warn!(level = %key, %error, "level sheet unavailable, leaving it empty");
                    Level::default()
                }
            };
            (key, level)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn aliases_resolve_to_canonical_fields() {
        assert_eq!(LevelField::from_key(" definición "), Some(LevelField::Definition));
        assert_eq!(LevelField::from_key("CARACTERÍSTICAS"), Some(LevelField::Characteristics));
        assert_eq!(
            LevelField::from_key("Ruta_de_aprendizaje_sugerida"),
            Some(LevelField::Route)
        );
        assert_eq!(LevelField::from_key("Ruta de aprendizaje sugerida"), Some(LevelField::Route));
        assert_eq!(LevelField::from_key("Nivel"), Some(LevelField::Title));
        assert_eq!(LevelField::from_key("Observaciones"), None);
    }

    #[test]
    fn key_value_rows_fill_fields_and_concatenate_repeats() {
        let level = parse_level_rows(&rows(&[
            &["", "NIVEL", "Inicial"],
            &["", "", ""],
            &["DEFINICIÓN", "", "La agencia empieza."],
            &["Características", "Sin política"],
            &["CARACTERISTICAS", "Sin capacitación"],
            &["Ruta de aprendizaje sugerida", "Taller 1"],
            &["Notas", "ignoradas"],
            &["RUTA"],
        ]));

        assert_eq!(level.title, "Inicial");
        assert_eq!(level.definition, "La agencia empieza.");
        assert_eq!(level.characteristics, "Sin política\nSin capacitación");
        assert_eq!(level.route, "Taller 1");
    }

    #[test]
    fn columnar_layout_is_used_when_no_key_value_rows_match() {
        let level = parse_level_rows(&rows(&[
            &["Aspecto", "Definición", "", "Ruta"],
            &["1", "Primera línea", "", "Taller A"],
            &["", "", "", ""],
            &["2", "Segunda línea", "", ""],
        ]));

        assert_eq!(level.definition, "Primera línea\nSegunda línea");
        assert_eq!(level.route, "Taller A");
        assert_eq!(level.characteristics, "");
        assert_eq!(level.title, "");
    }

    #[test]
    fn unrecognised_sheet_yields_empty_level() {
        let level = parse_level_rows(&rows(&[&["Texto libre"], &["Más texto", "y algo"]]));
        assert!(level.is_empty());
    }
}
