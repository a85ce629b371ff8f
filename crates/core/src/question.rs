//! Question metadata.

use crate::error::{SurveyError, SurveyResult};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use survey_sheet::CellValue;

/// Separator joining the selected options of a multiple-choice cell.
pub const MULTI_VALUE_SEPARATOR: char = ';';

/// How answers to a question are stored in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuestionType {
    /// Each cell holds exactly one option.
    #[serde(rename = "SC")]
    SingleChoice,
    /// Each cell holds zero or more options joined by `;`.
    #[serde(rename = "MC")]
    MultipleChoice,
    /// The column has no responses at all.
    #[serde(rename = "EMPTY")]
    Empty,
}

impl QuestionType {
    /// Short code used in schemas and output.
    pub fn code(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "SC",
            QuestionType::MultipleChoice => "MC",
            QuestionType::Empty => "EMPTY",
        }
    }

    pub fn is_multiple_choice(self) -> bool {
        self == QuestionType::MultipleChoice
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for QuestionType {
    type Err = SurveyError;

    /// Parse a schema-declared type. Only `SC` and `MC` can be declared.
    fn from_str(s: &str) -> SurveyResult<Self> {
        match s.trim() {
            "SC" => Ok(QuestionType::SingleChoice),
            "MC" => Ok(QuestionType::MultipleChoice),
            other => Err(SurveyError::invalid_argument(format!(
                "unknown question type '{other}', expected SC or MC"
            ))),
        }
    }
}

/// One analysable column of the survey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    /// Column name in the raw data.
    pub id: String,
    /// Prompt shown to respondents; the id when no schema exists.
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Distinct non-null raw values (joined MC strings count as one value).
    pub unique_value_count: usize,
    /// Non-null cells.
    pub response_count: usize,
}

impl Question {
    pub fn new(id: &str, text: &str, question_type: QuestionType, stats: &ColumnStats) -> Self {
        Question {
            id: id.to_string(),
            text: text.to_string(),
            question_type,
            unique_value_count: stats.unique_value_count,
            response_count: stats.response_count,
        }
    }
}

/// Counts gathered from one scan of a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnStats {
    pub response_count: usize,
    pub unique_value_count: usize,
}

impl ColumnStats {
    pub fn scan<'a>(cells: impl Iterator<Item = &'a CellValue>) -> Self {
        let mut seen = HashSet::new();
        let mut response_count = 0;
        for cell in cells.filter(|c| !c.is_null()) {
            response_count += 1;
            seen.insert(cell.key());
        }
        ColumnStats {
            response_count,
            unique_value_count: seen.len(),
        }
    }
}
