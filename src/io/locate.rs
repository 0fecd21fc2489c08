use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};
use unicode_normalization::UnicodeNormalization as _;

use crate::error::{Result, ToolError};
use crate::layout::WorkbookLayout;

/// Finds the questionnaire workbook inside `directory`.
///
/// Resolution order: the exact expected file name, then a file whose name is
/// equal to it after NFC normalization (macOS stores decomposed accents), and
/// finally the first file with the expected extension in file-name order.
#[instrument(level = "debug", skip_all, fields(directory = %directory.display()))]
pub fn find_workbook(directory: &Path, layout: &WorkbookLayout) -> Result<PathBuf> {
    let exact = directory.join(&layout.file_name);
    if exact.is_file() {
        debug!(path = %exact.display(), "workbook found by exact name");
        return Ok(exact);
    }

    let candidates = list_workbooks(directory, &layout.extension)?;

    let expected: String = layout.file_name.nfc().collect();
    if let Some(path) = candidates.iter().find(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.nfc().eq(expected.chars()))
    }) {
        debug!(path = %path.display(), "workbook found after unicode normalization");
        return Ok(path.clone());
    }

    match candidates.into_iter().next() {
        Some(path) => {
            warn!(
                path = %path.display(),
                expected = %layout.file_name,
                "expected workbook not found, using first available workbook"
            );
            Ok(path)
        }
        None => Err(ToolError::FileNotFound {
            directory: directory.to_path_buf(),
            expected: layout.file_name.clone(),
        }),
    }
}

fn list_workbooks(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(error.into()),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches_extension && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
