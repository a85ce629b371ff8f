//! Respondent subsets filtered on one question/option pair.

use crate::error::{require_non_empty, SurveyResult};
use crate::options::{question_column, split_options};
use crate::question::Question;
use serde::Serialize;
use survey_sheet::Sheet;

/// How a multiple-choice cell is matched against the requested option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MultiChoiceMatch {
    /// Case-insensitive substring of the joined cell, so `Go` also matches
    /// `Golang`.
    #[default]
    Substring,
    /// Case-insensitive equality with one of the split options.
    ExactOption,
}

/// Subset filter options
#[derive(Debug, Clone, Default)]
pub struct SubsetOptions {
    pub multi_choice_match: MultiChoiceMatch,
}

impl SubsetOptions {
    /// Set how MC cells are matched
    #[must_use]
    pub fn with_multi_choice_match(mut self, multi_choice_match: MultiChoiceMatch) -> Self {
        self.multi_choice_match = multi_choice_match;
        self
    }
}

/// The question/option pair a subset was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsetFilter {
    pub question_id: String,
    pub option: String,
}

/// Immutable filtered copy of the respondent table.
#[derive(Debug, Clone)]
pub struct Subset {
    filter: SubsetFilter,
    rows: Sheet,
}

impl Subset {
    pub fn filter(&self) -> &SubsetFilter {
        &self.filter
    }

    /// Matching rows with every original column, in original order
    pub fn rows(&self) -> &Sheet {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Percentage of `total` respondents in this subset
    pub fn share_of(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            100.0 * self.len() as f64 / total as f64
        }
    }
}

/// Select the respondents whose answer to `question` matches `option`.
///
/// SC (and EMPTY) answers must equal `option` exactly, case included.
/// MC answers follow `options.multi_choice_match`.
///
/// # Errors
///
/// `InvalidArgument` for an empty option, `UnknownQuestion` when the table
/// has no such column.
pub fn create_subset(
    table: &Sheet,
    question: &Question,
    option: &str,
    options: &SubsetOptions,
) -> SurveyResult<Subset> {
    let option = require_non_empty(option, "option")?;
    let idx = question_column(table, question)?;

    let rows = if question.question_type.is_multiple_choice() {
        let needle = option.to_lowercase();
        match options.multi_choice_match {
            MultiChoiceMatch::Substring => table.filter_rows(|row| {
                !row[idx].is_null() && row[idx].as_str().to_lowercase().contains(&needle)
            }),
            MultiChoiceMatch::ExactOption => table.filter_rows(|row| {
                let cell = row[idx].as_str();
                let hit = split_options(&cell).any(|o| o.to_lowercase() == needle);
                hit
            }),
        }
    } else {
        table.filter_rows(|row| !row[idx].is_null() && row[idx].as_str() == option)
    };

    tracing::debug!(
        question = %question.id,
        option,
        matched = rows.row_count(),
        total = table.row_count(),
        "created subset"
    );

    Ok(Subset {
        filter: SubsetFilter {
            question_id: question.id.clone(),
            option: option.to_string(),
        },
        rows,
    })
}
