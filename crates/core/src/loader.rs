//! Dataset loading from xlsx workbooks and delimited text files.

use crate::error::{SurveyError, SurveyResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use survey_sheet::{Book, CsvOptions, Sheet};

/// Sheet holding one column per question.
pub const DEFAULT_RAW_SHEET: &str = "raw data";
/// Sheet declaring question ids, texts and types.
pub const DEFAULT_SCHEMA_SHEET: &str = "schema";

/// How the schema sheet of a workbook is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeSourceKind {
    /// Use the schema sheet when the workbook has one, otherwise infer.
    #[default]
    Auto,
    /// Require the schema sheet.
    Schema,
    /// Ignore any schema sheet and infer types from the answers.
    Inferred,
}

/// Loader options
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Raw data sheet; defaults to `raw data`, then the first sheet
    pub sheet: Option<String>,
    pub schema_sheet: String,
    pub type_source: TypeSourceKind,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            sheet: None,
            schema_sheet: DEFAULT_SCHEMA_SHEET.to_string(),
            type_source: TypeSourceKind::Auto,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn with_sheet(mut self, sheet: Option<&str>) -> Self {
        self.sheet = sheet.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_schema_sheet(mut self, schema_sheet: &str) -> Self {
        self.schema_sheet = schema_sheet.to_string();
        self
    }

    #[must_use]
    pub fn with_type_source(mut self, type_source: TypeSourceKind) -> Self {
        self.type_source = type_source;
        self
    }
}

/// Shape of one sheet in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
}

impl SheetSummary {
    fn of(sheet: &Sheet) -> Self {
        SheetSummary {
            name: sheet.name().to_string(),
            rows: sheet.row_count(),
            columns: sheet.columns().to_vec(),
        }
    }
}

/// Tables read from a dataset file.
#[derive(Debug, Clone)]
pub struct SurveyData {
    pub raw: Sheet,
    pub schema: Option<Sheet>,
    pub source: PathBuf,
    summaries: Vec<SheetSummary>,
}

impl SurveyData {
    /// Every sheet of the source file, in file order
    pub fn sheet_summaries(&self) -> &[SheetSummary] {
        &self.summaries
    }
}

/// Load the survey tables from `path`.
///
/// # Errors
///
/// `FileNotFound` when the path does not exist, `Load` for an unsupported
/// extension, an unreadable file or a missing sheet.
pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> SurveyResult<SurveyData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SurveyError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let data = match extension.as_str() {
        "xlsx" | "xlsm" => load_workbook(path, options)?,
        "csv" => load_delimited(path, CsvOptions::default(), options)?,
        "tsv" => load_delimited(path, CsvOptions::tsv(), options)?,
        other => {
            return Err(SurveyError::load(format!(
                "unsupported file type '{other}' for {}",
                path.display()
            )))
        }
    };

    tracing::info!(
        path = %path.display(),
        sheet = data.raw.name(),
        responses = data.raw.row_count(),
        columns = data.raw.col_count(),
        schema = data.schema.is_some(),
        "loaded survey data"
    );
    Ok(data)
}

fn load_workbook(path: &Path, options: &LoadOptions) -> SurveyResult<SurveyData> {
    let mut book = Book::from_xlsx(path)
        .map_err(|e| SurveyError::load(format!("failed to read {}: {e}", path.display())))?;
    let summaries: Vec<SheetSummary> = book.sheets().map(|(_, s)| SheetSummary::of(s)).collect();

    let schema = match options.type_source {
        TypeSourceKind::Inferred => None,
        TypeSourceKind::Auto => book.take_sheet(&options.schema_sheet).ok(),
        TypeSourceKind::Schema => Some(book.take_sheet(&options.schema_sheet).map_err(|_| {
            SurveyError::load(format!(
                "schema sheet '{}' not found in {}",
                options.schema_sheet,
                path.display()
            ))
        })?),
    };

    let raw_name = match &options.sheet {
        Some(name) => name.clone(),
        None if book.has_sheet(DEFAULT_RAW_SHEET) => DEFAULT_RAW_SHEET.to_string(),
        None => book
            .sheets()
            .map(|(name, _)| name)
            .find(|name| *name != options.schema_sheet)
            .map(str::to_string)
            .ok_or_else(|| {
                SurveyError::load(format!("no raw data sheet in {}", path.display()))
            })?,
    };
    let raw = book.take_sheet(&raw_name).map_err(|_| {
        SurveyError::load(format!("sheet '{raw_name}' not found in {}", path.display()))
    })?;

    Ok(SurveyData {
        raw,
        schema,
        source: path.to_path_buf(),
        summaries,
    })
}

fn load_delimited(
    path: &Path,
    csv_options: CsvOptions,
    options: &LoadOptions,
) -> SurveyResult<SurveyData> {
    if options.type_source == TypeSourceKind::Schema {
        return Err(SurveyError::load(format!(
            "{} has no schema sheet; schema types need an xlsx workbook",
            path.display()
        )));
    }
    // answers stay verbatim strings
    let raw = Sheet::from_csv_with_options(path, csv_options.with_type_inference(false))
        .map_err(|e| SurveyError::load(format!("failed to read {}: {e}", path.display())))?;
    let summaries = vec![SheetSummary::of(&raw)];

    Ok(SurveyData {
        raw,
        schema: None,
        source: path.to_path_buf(),
        summaries,
    })
}
