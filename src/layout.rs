//! Positional conventions of the questionnaire workbook.
//!
//! The workbook has no declared schema; these values describe where the human
//! author placed things. [`WorkbookLayout::default`] matches the published
//! questionnaire and every field can be overridden by callers.

use crate::model::ThresholdSet;

/// File name the questionnaire workbook is distributed under.
pub const WORKBOOK_FILE_NAME: &str =
    "Cuestionario de autodiagnóstico en inclusión laboral LGBTIQ para agencias de empleo.xlsx";
/// Extension used when falling back to any workbook in the directory.
pub const WORKBOOK_EXTENSION: &str = "xlsx";
/// Text returned when the instructions sheet is empty or absent.
pub const DEFAULT_INSTRUCTIONS: &str = "Bienvenido. Por favor lea y complete el cuestionario.";

/// Zero-based (row, column) coordinates of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row: u32,
    pub column: u32,
}

impl CellPosition {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Sheet names and cell positions consulted during ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookLayout {
    pub file_name: String,
    pub extension: String,
    pub instructions_sheet: String,
    pub questionnaire_sheet: String,
    pub recommendations_sheet: String,
    /// Column holding section labels, question ids, and option scores (B).
    pub id_column: u32,
    /// Column holding question text and option labels (C).
    pub text_column: u32,
    /// Cell whose formula encodes the level thresholds (C81).
    pub threshold_cell: CellPosition,
    /// A1 reference compared against integer literals inside that formula.
    pub threshold_reference: String,
    pub default_thresholds: ThresholdSet,
    pub default_instructions: String,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            file_name: WORKBOOK_FILE_NAME.to_string(),
            extension: WORKBOOK_EXTENSION.to_string(),
            instructions_sheet: "Instrucciones".to_string(),
            questionnaire_sheet: "Cuestionario".to_string(),
            recommendations_sheet: "Recomendaciones".to_string(),
            id_column: 1,
            text_column: 2,
            threshold_cell: CellPosition::new(80, 2),
            threshold_reference: "D77".to_string(),
            default_thresholds: ThresholdSet::default(),
            default_instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}
