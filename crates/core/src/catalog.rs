//! Question catalog built once from the loaded table.
//!
//! Question types come from one of two sources, chosen at load time:
//! an explicit schema table, or inference from the raw answers.

use crate::error::{require_non_empty, SurveyError, SurveyResult};
use crate::question::{ColumnStats, Question, QuestionType, MULTI_VALUE_SEPARATOR};
use indexmap::IndexMap;
use survey_sheet::{CellValue, Sheet};

/// Identifier column skipped when inferring questions.
pub const DEFAULT_ID_COLUMN: &str = "ResponseId";

const SCHEMA_COLUMN: &str = "column";
const SCHEMA_TEXT: &str = "question_text";
const SCHEMA_TYPE: &str = "type";

/// Options for the inference type source
#[derive(Debug, Clone)]
pub struct InferenceOptions {
    /// Column holding respondent ids, excluded from the catalog
    pub id_column: Option<String>,
    /// Number of leading non-null values inspected for a `;`
    pub sample_size: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        InferenceOptions {
            id_column: Some(DEFAULT_ID_COLUMN.to_string()),
            sample_size: 1,
        }
    }
}

impl InferenceOptions {
    /// Set the identifier column (`None` analyses every column)
    #[must_use]
    pub fn with_id_column(mut self, id_column: Option<&str>) -> Self {
        self.id_column = id_column.map(str::to_string);
        self
    }

    /// Set how many non-null values are sampled; clamped to at least one
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }
}

/// Where question types come from.
#[derive(Debug, Clone)]
pub enum TypeSource<'a> {
    /// Types declared in a schema table with `column`, `question_text`, `type`.
    Schema(&'a Sheet),
    /// Types inferred from the answers.
    Inferred(InferenceOptions),
}

/// Per-question metadata keyed by question id, in table column order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    questions: IndexMap<String, Question>,
}

impl Catalog {
    /// Build the catalog for `table`.
    ///
    /// # Errors
    ///
    /// With a schema source: `Load` when the schema lacks a required column,
    /// `InvalidSchema` for a type outside {SC, MC} or a column missing from
    /// the table.
    pub fn build(table: &Sheet, source: TypeSource<'_>) -> SurveyResult<Self> {
        let catalog = match source {
            TypeSource::Schema(schema) => Self::from_schema(table, schema)?,
            TypeSource::Inferred(options) => Self::infer(table, &options),
        };
        tracing::debug!(questions = catalog.len(), "built question catalog");
        Ok(catalog)
    }

    fn from_schema(table: &Sheet, schema: &Sheet) -> SurveyResult<Self> {
        for required in [SCHEMA_COLUMN, SCHEMA_TEXT, SCHEMA_TYPE] {
            if !schema.has_column(required) {
                return Err(SurveyError::load(format!(
                    "schema table is missing required column '{required}'"
                )));
            }
        }
        let id_idx = schema.column_index(SCHEMA_COLUMN)?;
        let text_idx = schema.column_index(SCHEMA_TEXT)?;
        let type_idx = schema.column_index(SCHEMA_TYPE)?;

        let mut declared: IndexMap<String, (String, QuestionType)> = IndexMap::new();
        for row in schema.rows() {
            let id = row[id_idx].as_str().trim().to_string();
            if id.is_empty() {
                continue;
            }
            let declared_type = row[type_idx].as_str();
            let question_type = declared_type.parse::<QuestionType>().map_err(|_| {
                SurveyError::invalid_schema(
                    &id,
                    format!("type '{}' is not SC or MC", declared_type.trim()),
                )
            })?;
            if !table.has_column(&id) {
                return Err(SurveyError::invalid_schema(
                    &id,
                    "column is not present in the raw data",
                ));
            }
            let text = match row[text_idx].as_str().trim() {
                "" => id.clone(),
                t => t.to_string(),
            };
            if declared.insert(id.clone(), (text, question_type)).is_some() {
                tracing::warn!(
                    column = %id,
                    "schema declares column twice, keeping the last entry"
                );
            }
        }

        let mut questions = IndexMap::with_capacity(declared.len());
        for column in table.columns() {
            if let Some((text, question_type)) = declared.get(column) {
                let stats = ColumnStats::scan(table.column(column)?);
                questions.insert(
                    column.clone(),
                    Question::new(column, text, *question_type, &stats),
                );
            }
        }
        Ok(Catalog { questions })
    }

    fn infer(table: &Sheet, options: &InferenceOptions) -> Self {
        let mut questions = IndexMap::new();
        for (idx, column) in table.columns().iter().enumerate() {
            if options.id_column.as_deref() == Some(column.as_str()) {
                continue;
            }
            let cells = || table.rows().map(move |row| &row[idx]);
            let stats = ColumnStats::scan(cells());
            let question_type = infer_type(cells(), stats.response_count, options.sample_size);
            questions.insert(
                column.clone(),
                Question::new(column, column, question_type, &stats),
            );
        }
        Catalog { questions }
    }

    /// Get a question by id
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty id, `UnknownQuestion` when absent.
    pub fn lookup(&self, id: &str) -> SurveyResult<&Question> {
        let id = require_non_empty(id, "question id")?;
        self.questions
            .get(id)
            .ok_or_else(|| SurveyError::UnknownQuestion(id.to_string()))
    }

    /// Questions in table column order
    pub fn list(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.questions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Classify a column from its first `sample_size` non-null values.
///
/// A single sample misclassifies an MC column whose first answer holds only
/// one option; raise `sample_size` to look further.
fn infer_type<'a>(
    cells: impl Iterator<Item = &'a CellValue>,
    response_count: usize,
    sample_size: usize,
) -> QuestionType {
    if response_count == 0 {
        return QuestionType::Empty;
    }
    let multi = cells
        .filter(|c| !c.is_null())
        .take(sample_size)
        .any(|c| c.as_str().contains(MULTI_VALUE_SEPARATOR));
    if multi {
        QuestionType::MultipleChoice
    } else {
        QuestionType::SingleChoice
    }
}
