// Excel export via rust_xlsxwriter

use std::path::Path;

use rust_xlsxwriter::Workbook as XlsxWorkbook;

use rowdeck_engine::row::{Row, Schema};

/// Fixed layout: every column 25 wide, every row 25 high (header included).
const COLUMN_WIDTH: f64 = 25.0;
const ROW_HEIGHT: f64 = 25.0;

/// Write the full working dataset to an .xlsx file: one header row, one row
/// per data row, columns in schema order.
///
/// Always the complete store; the current filter, sort, and reveal window do
/// not affect the output.
pub fn export(schema: &Schema, rows: &[Row], path: &Path) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Data")
        .map_err(|e| format!("Failed to create sheet: {}", e))?;

    for (col, name) in schema.names().enumerate() {
        worksheet
            .write_string(0, col as u16, name)
            .map_err(|e| format!("Failed to write header '{}': {}", name, e))?;
        worksheet
            .set_column_width(col as u16, COLUMN_WIDTH)
            .map_err(|e| format!("Failed to set column width: {}", e))?;
    }

    for (r, row) in rows.iter().enumerate() {
        let xlsx_row = r as u32 + 1;
        for (col, name) in schema.names().enumerate() {
            worksheet
                .write_string(xlsx_row, col as u16, row.get(name))
                .map_err(|e| format!("Failed to write cell: {}", e))?;
        }
    }

    for r in 0..=rows.len() {
        worksheet
            .set_row_height(r as u32, ROW_HEIGHT)
            .map_err(|e| format!("Failed to set row height: {}", e))?;
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    Ok(())
}
