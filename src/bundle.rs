use std::io::{Read, Seek};
use std::path::Path;

use calamine::Xlsx;
use tracing::{info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::io::{locate, sheet};
use crate::layout::WorkbookLayout;
use crate::model::DataBundle;
use crate::parse::{instructions, levels, questions, recommendations, thresholds};

/// Locates the questionnaire workbook in `data_dir` and ingests it.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display()))]
pub fn load_data(data_dir: &Path, layout: &WorkbookLayout) -> Result<DataBundle> {
    let path = locate::find_workbook(data_dir, layout)?;
    load_data_from_excel(&path, layout)
}

/// Ingests the workbook stored at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_data_from_excel(path: &Path, layout: &WorkbookLayout) -> Result<DataBundle> {
    if !path.is_file() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let mut workbook = sheet::open(path)?;
    assemble(&mut workbook, layout)
}

/// Runs every sheet parser over an open workbook and builds the bundle.
///
/// Only the questionnaire sheet can fail the ingestion. Missing or malformed
/// supplementary sheets degrade to defaults.
pub fn assemble<R: Read + Seek>(workbook: &mut Xlsx<R>, layout: &WorkbookLayout) -> Result<DataBundle> {
    let questions = questions::read_questions(workbook, layout)?;

    let instructions_grid = optional_grid(workbook, &layout.instructions_sheet);
    let instructions =
        instructions::extract_instructions(instructions_grid.as_ref(), &layout.default_instructions);

    let thresholds = thresholds::read_thresholds(workbook, layout);
    if !thresholds.is_ordered() {
        warn!(
            level1_max = thresholds.level1_max,
            level2_max = thresholds.level2_max,
            "thresholds are not strictly increasing; level bands are degenerate"
        );
    }

    let levels = levels::read_levels(workbook);

    let recommendations_grid = optional_grid(workbook, &layout.recommendations_sheet);
    let recommendations = recommendations::normalize_recommendations(recommendations_grid.as_ref());

    info!(
        question_count = questions.len(),
        level1_max = thresholds.level1_max,
        level2_max = thresholds.level2_max,
        recommendation_count = recommendations.rows.len(),
        "workbook ingested"
    );

    Ok(DataBundle::new(
        instructions,
        questions,
        thresholds,
        levels,
        recommendations,
    ))
}

/// Reads a supplementary sheet, logging instead of failing when it is
/// missing or unreadable.
fn optional_grid<R: Read + Seek>(workbook: &mut Xlsx<R>, name: &str) -> Option<sheet::SheetGrid> {
    match sheet::read_grid(workbook, name) {
        Ok(Some(grid)) => Some(grid),
        Ok(None) => {
            warn!(sheet = name, "sheet not found, using defaults");
            None
        }
        Err(error) => {
            warn!(sheet = name, %error, "sheet unreadable, using defaults");
            None
        }
    }
}
