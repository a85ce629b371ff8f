//! Percentage distributions with "top-N + Others" truncation.
//!
//! The denominator depends on the question type:
//!
//! - SC: non-null answers in the row set, so the percentages sum to 100.
//! - MC: every row in the row set, blanks included. A respondent can pick
//!   several options, so the percentages usually sum above 100, yet no single
//!   option exceeds 100.

use crate::error::{SurveyError, SurveyResult};
use crate::options::{question_column, split_options};
use crate::question::{Question, QuestionType};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use survey_sheet::Sheet;

/// Label of the synthetic entry aggregating truncated options.
///
/// A real option spelled the same way is folded into that entry when the
/// distribution is truncated, so the label never appears twice.
pub const OTHERS_LABEL: &str = "Others";

/// Number of entries shown before the rest fold into "Others".
pub const DEFAULT_TOP_N: usize = 10;

/// One row of a distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub option: String,
    pub count: usize,
    /// `100 * count / denominator`, unrounded
    pub percentage: f64,
}

impl DistributionEntry {
    fn new(option: String, count: usize, denominator: usize) -> Self {
        DistributionEntry {
            option,
            count,
            percentage: 100.0 * count as f64 / denominator as f64,
        }
    }
}

/// Answer frequencies for one question over a row set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub question_id: String,
    pub question_type: QuestionType,
    pub denominator: usize,
    entries: Vec<DistributionEntry>,
    /// True when the last entry is the synthetic "Others" aggregate
    pub truncated: bool,
}

impl Distribution {
    fn empty(question: &Question) -> Self {
        Distribution {
            question_id: question.id.clone(),
            question_type: question.question_type,
            denominator: 0,
            entries: Vec::new(),
            truncated: false,
        }
    }

    /// Entries by descending count, ties by option; "Others" last when truncated
    pub fn entries(&self) -> &[DistributionEntry] {
        &self.entries
    }

    /// The "Others" aggregate, if the distribution was truncated
    pub fn others(&self) -> Option<&DistributionEntry> {
        if self.truncated {
            self.entries.last()
        } else {
            None
        }
    }

    /// Percentage of a real option (never the "Others" aggregate)
    pub fn percentage_of(&self, option: &str) -> Option<f64> {
        let real = if self.truncated {
            &self.entries[..self.entries.len() - 1]
        } else {
            &self.entries[..]
        };
        real.iter()
            .find(|e| e.option == option)
            .map(|e| e.percentage)
    }

    /// Sum of all entry percentages, "Others" included
    pub fn total_percentage(&self) -> f64 {
        self.entries.iter().map(|e| e.percentage).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the distribution of `question` over `rows`.
///
/// `rows` is the full table or a subset of it. With `top_n = Some(n)` and more
/// than `n` options, the first `n` are kept and the rest are summed into a
/// trailing "Others" entry. `None` returns every option.
///
/// # Errors
///
/// `UnknownQuestion` when `rows` has no column for the question.
pub fn compute_distribution(
    rows: &Sheet,
    question: &Question,
    top_n: Option<usize>,
) -> SurveyResult<Distribution> {
    let idx = question_column(rows, question)?;
    if question.question_type == QuestionType::Empty {
        return Ok(Distribution::empty(question));
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    let denominator = if question.question_type.is_multiple_choice() {
        for row in rows.rows() {
            let cell = &row[idx];
            if cell.is_null() {
                continue;
            }
            let value = cell.as_str();
            // one vote per respondent even if an option repeats in the cell
            let picked: HashSet<&str> = split_options(&value).collect();
            for option in picked {
                *counts.entry(option.to_string()).or_default() += 1;
            }
        }
        rows.row_count()
    } else {
        let mut answered = 0;
        for cell in rows.column(&question.id)?.filter(|c| !c.is_null()) {
            answered += 1;
            *counts.entry(cell.as_str()).or_default() += 1;
        }
        answered
    };

    if denominator == 0 {
        return Ok(Distribution::empty(question));
    }

    let mut counted: Vec<(String, usize)> = counts.into_iter().collect();
    counted.sort_by(|(a_opt, a_count), (b_opt, b_count)| {
        b_count.cmp(a_count).then_with(|| a_opt.cmp(b_opt))
    });

    let mut truncated = false;
    if let Some(n) = top_n {
        if counted.len() > n {
            let mut dropped = 0;
            counted.retain(|(option, count)| {
                let real_others = option == OTHERS_LABEL;
                if real_others {
                    dropped += count;
                }
                !real_others
            });
            if counted.len() > n {
                dropped += counted.drain(n..).map(|(_, count)| count).sum::<usize>();
            }
            counted.push((OTHERS_LABEL.to_string(), dropped));
            truncated = true;
        }
    }

    let entries = counted
        .into_iter()
        .map(|(option, count)| DistributionEntry::new(option, count, denominator))
        .collect();

    tracing::debug!(
        question = %question.id,
        denominator,
        truncated,
        "computed distribution"
    );

    Ok(Distribution {
        question_id: question.id.clone(),
        question_type: question.question_type,
        denominator,
        entries,
        truncated,
    })
}

/// Distribution that only accepts single-choice questions.
///
/// # Errors
///
/// `TypeMismatch` unless `question` is SC.
pub fn single_choice_distribution(
    rows: &Sheet,
    question: &Question,
    top_n: Option<usize>,
) -> SurveyResult<Distribution> {
    expect_type(question, QuestionType::SingleChoice)?;
    compute_distribution(rows, question, top_n)
}

/// Distribution that only accepts multiple-choice questions.
///
/// # Errors
///
/// `TypeMismatch` unless `question` is MC.
pub fn multiple_choice_distribution(
    rows: &Sheet,
    question: &Question,
    top_n: Option<usize>,
) -> SurveyResult<Distribution> {
    expect_type(question, QuestionType::MultipleChoice)?;
    compute_distribution(rows, question, top_n)
}

fn expect_type(question: &Question, expected: QuestionType) -> SurveyResult<()> {
    if question.question_type == expected {
        Ok(())
    } else {
        Err(SurveyError::type_mismatch(
            &question.id,
            expected,
            question.question_type,
        ))
    }
}
