use std::path::Path;

use rust_xlsxwriter::{Table, Workbook};
use tracing::{debug, instrument};

use crate::error::{Result, ToolError};
use crate::flatten::WorkbookData;

/// Writes the provided workbook data to the given path.
///
/// Each table's header row is written first; sheets with data rows are
/// wrapped in an autofiltered Excel table. Empty tables still get a sheet.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        if table.rows.iter().any(|row| row.len() > table.columns.len()) {
            return Err(ToolError::InvalidWorkbook(format!(
                "sheet '{}' has rows wider than its header",
                table.sheet_name
            )));
        }

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }

        if table.rows.is_empty() || table.columns.is_empty() {
            debug!(sheet = %table.sheet_name, "sheet is empty, skipping table");
            continue;
        }

        let mut excel_table = Table::new();
        excel_table.set_autofilter(true);
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}
