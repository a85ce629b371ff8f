//! Sheet/Book model for survey-explorer
//!
//! A small tabular layer the survey engine reads responses through: named
//! columns over rows of [`CellValue`]s, grouped into a [`Book`] the way an
//! Excel workbook groups worksheets.
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use survey_sheet::{CellValue, Sheet};
//!
//! let sheet = Sheet::from_data(
//!     vec!["Country", "Languages"],
//!     vec![vec!["USA", "Python;Rust"], vec!["UK", "Go"]],
//! )
//! .unwrap();
//!
//! assert_eq!(sheet.row_count(), 2);
//! assert_eq!(sheet.get(1, "Country").unwrap(), &CellValue::from("UK"));
//! ```
//!
//! ## Loading a workbook
//!
//! ```no_run
//! use survey_sheet::Book;
//!
//! let book = Book::from_xlsx("survey.xlsx").unwrap();
//! let raw = book.get_sheet("raw data").unwrap();
//! println!("{} responses", raw.row_count());
//! ```

mod book;
mod cell;
mod csv;
mod error;
mod sheet;
mod xlsx;

pub use book::Book;
pub use cell::CellValue;
pub use csv::CsvOptions;
pub use error::{Result, SheetError};
pub use sheet::Sheet;
