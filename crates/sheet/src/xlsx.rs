use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

fn xlsx_error(e: impl std::fmt::Display) -> SheetError {
    SheetError::Xlsx(e.to_string())
}

fn open<P: AsRef<Path>>(path: P) -> Result<Xlsx<BufReader<File>>> {
    open_workbook(path.as_ref()).map_err(|e: XlsxError| xlsx_error(e))
}

fn range_to_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(data_to_cell_value).collect())
        .collect();
    Sheet::from_grid(name, grid)
}

impl Sheet {
    /// Load a specific sheet from an Excel file by name, first row as header
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened, sheet not found, or read fails.
    pub fn from_xlsx_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Self> {
        let mut workbook = open(path)?;
        if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
            return Err(SheetError::SheetNotFound {
                name: sheet_name.to_string(),
            });
        }
        let range = workbook.worksheet_range(sheet_name).map_err(xlsx_error)?;
        Ok(range_to_sheet(sheet_name, &range))
    }

    /// Save the sheet to an Excel file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        self.write_to_worksheet(worksheet)?;
        workbook.save(path.as_ref()).map_err(xlsx_error)?;
        Ok(())
    }

    /// Write header and data rows to a worksheet
    fn write_to_worksheet(&self, worksheet: &mut Worksheet) -> Result<()> {
        worksheet.set_name(self.name()).map_err(xlsx_error)?;

        for (row_idx, row) in self.to_grid().enumerate() {
            let row_num = u32::try_from(row_idx).map_err(|_| xlsx_error("Row index overflow"))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num =
                    u16::try_from(col_idx).map_err(|_| xlsx_error("Column index overflow"))?;

                match cell {
                    CellValue::Null => {} // Leave empty
                    CellValue::Bool(b) => {
                        worksheet
                            .write_boolean(row_num, col_num, *b)
                            .map_err(xlsx_error)?;
                    }
                    CellValue::Int(i) => {
                        // Excel stores all numbers as f64
                        worksheet
                            .write_number(row_num, col_num, *i as f64)
                            .map_err(xlsx_error)?;
                    }
                    CellValue::Float(f) => {
                        worksheet
                            .write_number(row_num, col_num, *f)
                            .map_err(xlsx_error)?;
                    }
                    CellValue::String(s) => {
                        worksheet
                            .write_string(row_num, col_num, s)
                            .map_err(xlsx_error)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Book {
    /// Load a book from an Excel file (all sheets, first row as header)
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut workbook = open(path)?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut book = Book::new();

        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name).map_err(xlsx_error)?;
            book.add_sheet(&sheet_name, range_to_sheet(&sheet_name, &range))?;
        }

        tracing::debug!(sheets = book.sheet_count(), "loaded workbook");
        Ok(book)
    }

    /// Save the book to an Excel file, one worksheet per sheet
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();

        for (_, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            sheet.write_to_worksheet(worksheet)?;
        }

        workbook.save(path.as_ref()).map_err(xlsx_error)?;
        Ok(())
    }

    /// Get sheet names from an Excel file without loading data
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened.
    pub fn xlsx_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let workbook = open(path)?;
        Ok(workbook.sheet_names().to_vec())
    }
}
