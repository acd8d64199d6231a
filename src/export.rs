use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::store::PredictionRow;

/// Write the current prediction board to an XLSX workbook under `export_dir`
/// and return the written path. One sheet, header row first, then one row per
/// prediction in the store's stable order.
pub fn export_board(export_dir: &Path, predictions: &[PredictionRow]) -> Result<PathBuf> {
    fs::create_dir_all(export_dir)
        .with_context(|| format!("create export dir {}", export_dir.display()))?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = export_dir.join(format!("predictions_{stamp}.xlsx"));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name("Predictions")?;
    write_board_sheet(sheet, predictions)?;
    workbook
        .save(&path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    Ok(path)
}

fn write_board_sheet(
    sheet: &mut Worksheet,
    predictions: &[PredictionRow],
) -> Result<(), rust_xlsxwriter::XlsxError> {
    const HEADER: [&str; 5] = ["User", "Home", "Away", "Home Score", "Visitor Score"];
    for (col, title) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }

    for (idx, row) in predictions.iter().enumerate() {
        let r = (idx + 1) as u32;
        sheet.write_string(r, 0, &row.user_id)?;
        sheet.write_string(r, 1, &row.home)?;
        sheet.write_string(r, 2, &row.away)?;
        sheet.write_number(r, 3, row.home_score as f64)?;
        sheet.write_number(r, 4, row.visitor_score as f64)?;
    }

    sheet.set_column_width(0, 24.0)?;
    sheet.set_column_width(1, 16.0)?;
    sheet.set_column_width(2, 16.0)?;
    Ok(())
}
