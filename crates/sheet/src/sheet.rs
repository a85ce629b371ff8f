use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashMap;

/// A named table: ordered, unique column names over row-major data.
///
/// The header is kept apart from the data rows, so `row_count` is the number
/// of records (respondents) and every row is exactly `col_count` cells wide.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    data: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create an empty sheet with the given columns
    ///
    /// # Errors
    ///
    /// Returns `SheetError::DuplicateColumnName` if a column name repeats.
    pub fn new<S: Into<String>>(name: &str, columns: Vec<S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut column_index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if column_index.insert(column.clone(), i).is_some() {
                return Err(SheetError::DuplicateColumnName {
                    name: column.clone(),
                });
            }
        }

        Ok(Sheet {
            name: name.to_string(),
            columns,
            column_index,
            data: Vec::new(),
        })
    }

    /// Create a sheet from column names and row data
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate column names or ragged rows.
    pub fn from_data<S, T>(columns: Vec<S>, rows: Vec<Vec<T>>) -> Result<Self>
    where
        S: Into<String>,
        T: Into<CellValue>,
    {
        let mut sheet = Self::new("Sheet1", columns)?;
        for row in rows {
            sheet.push_row(row)?;
        }
        Ok(sheet)
    }

    /// Build a sheet from a raw grid whose first row is the header.
    ///
    /// Blank header cells become `Unnamed: {index}`, repeated names get a
    /// `.1`, `.2`, ... suffix, rows are padded or cut to the header width and
    /// rows holding only nulls are skipped.
    #[must_use]
    pub fn from_grid(name: &str, grid: Vec<Vec<CellValue>>) -> Self {
        let mut rows = grid.into_iter();
        let header = rows.next().unwrap_or_default();

        let mut columns = Vec::with_capacity(header.len());
        let mut column_index = HashMap::with_capacity(header.len());
        for (i, cell) in header.iter().enumerate() {
            let base = match cell.as_str().trim() {
                "" => format!("Unnamed: {i}"),
                s => s.to_string(),
            };
            let mut column = base.clone();
            let mut suffix = 1;
            while column_index.contains_key(&column) {
                column = format!("{base}.{suffix}");
                suffix += 1;
            }
            if column != base {
                tracing::warn!(sheet = name, "renamed duplicate column '{base}' to '{column}'");
            }
            column_index.insert(column.clone(), i);
            columns.push(column);
        }

        let width = columns.len();
        let data = rows
            .filter(|row| row.iter().any(|cell| !cell.is_null()))
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();

        Sheet {
            name: name.to_string(),
            columns,
            column_index,
            data,
        }
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of data rows (header excluded)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the sheet has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Column names in order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Check if a column exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Get the column index by name
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.column_index
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Iterate over the cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let index = self.column_index(name)?;
        Ok(self.data.iter().map(move |row| &row[index]))
    }

    /// Get a cell by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Result<&CellValue> {
        let col = self.column_index(column)?;
        Ok(&self.row(row)?[col])
    }

    /// Get an entire row by index (0-based)
    pub fn row(&self, index: usize) -> Result<&[CellValue]> {
        self.data
            .get(index)
            .map(Vec::as_slice)
            .ok_or(SheetError::RowIndexOutOfBounds {
                index,
                count: self.row_count(),
            })
    }

    /// Append a row to the end of the sheet
    pub fn push_row<T: Into<CellValue>>(&mut self, data: Vec<T>) -> Result<()> {
        if data.len() != self.col_count() {
            return Err(SheetError::LengthMismatch {
                expected: self.col_count(),
                actual: data.len(),
            });
        }
        self.data.push(data.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Rows iterator
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.data.iter().map(Vec::as_slice)
    }

    /// Build a new sheet holding the rows that match the predicate.
    ///
    /// Columns and row order are preserved; `self` is left untouched.
    #[must_use]
    pub fn filter_rows<F>(&self, predicate: F) -> Sheet
    where
        F: Fn(&[CellValue]) -> bool,
    {
        Sheet {
            name: self.name.clone(),
            columns: self.columns.clone(),
            column_index: self.column_index.clone(),
            data: self
                .data
                .iter()
                .filter(|row| predicate(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Header followed by data rows, the layout written to files
    pub(crate) fn to_grid(&self) -> impl Iterator<Item = Vec<CellValue>> + '_ {
        let header: Vec<CellValue> = self.columns.iter().map(|c| c.as_str().into()).collect();
        std::iter::once(header).chain(self.data.iter().cloned())
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet {
            name: "Sheet1".to_string(),
            columns: Vec::new(),
            column_index: HashMap::new(),
            data: Vec::new(),
        }
    }
}
