//! Option extraction for single- and multiple-choice columns.

use crate::error::{SurveyError, SurveyResult};
use crate::question::{Question, QuestionType, MULTI_VALUE_SEPARATOR};
use std::collections::BTreeSet;
use survey_sheet::Sheet;

/// Split a joined multiple-choice answer into trimmed, non-empty options.
pub fn split_options(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(MULTI_VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|option| !option.is_empty())
}

/// Column index for a question, or `UnknownQuestion` when the rows lack it.
pub(crate) fn question_column(rows: &Sheet, question: &Question) -> SurveyResult<usize> {
    rows.column_index(&question.id)
        .map_err(|_| SurveyError::UnknownQuestion(question.id.clone()))
}

/// Distinct options answered for `question`, sorted.
///
/// SC cells contribute their whole value, MC cells each split option.
pub fn extract_options(table: &Sheet, question: &Question) -> SurveyResult<BTreeSet<String>> {
    let idx = question_column(table, question)?;
    let mut options = BTreeSet::new();
    if question.question_type == QuestionType::Empty {
        return Ok(options);
    }

    for row in table.rows() {
        let cell = &row[idx];
        if cell.is_null() {
            continue;
        }
        let value = cell.as_str();
        if question.question_type.is_multiple_choice() {
            options.extend(split_options(&value).map(str::to_string));
        } else {
            options.insert(value);
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::ColumnStats;
    use survey_sheet::CellValue;

    fn question(id: &str, question_type: QuestionType) -> Question {
        Question::new(id, id, question_type, &ColumnStats::default())
    }

    fn table() -> Sheet {
        Sheet::from_data(
            vec!["Country", "Languages", "YearsCode"],
            vec![
                vec!["USA".into(), "Python;JavaScript".into(), CellValue::Int(5)],
                vec!["UK".into(), " Python ; ;".into(), CellValue::Float(3.0)],
                vec![CellValue::Null, "JavaScript;Java".into(), CellValue::Int(7)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_split_options() {
        let parts: Vec<&str> = split_options(" Go ;;Rust; ").collect();
        assert_eq!(parts, vec!["Go", "Rust"]);
        assert_eq!(split_options("").count(), 0);
    }

    #[test]
    fn test_single_choice_options() {
        let options =
            extract_options(&table(), &question("Country", QuestionType::SingleChoice)).unwrap();
        assert_eq!(options.into_iter().collect::<Vec<_>>(), vec!["UK", "USA"]);
    }

    #[test]
    fn test_multiple_choice_options() {
        let options =
            extract_options(&table(), &question("Languages", QuestionType::MultipleChoice))
                .unwrap();
        assert_eq!(
            options.into_iter().collect::<Vec<_>>(),
            vec!["Java", "JavaScript", "Python"]
        );
    }

    #[test]
    fn test_numeric_options_render_as_strings() {
        let options =
            extract_options(&table(), &question("YearsCode", QuestionType::SingleChoice)).unwrap();
        assert!(options.contains("3"));
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn test_empty_and_unknown() {
        let empty =
            extract_options(&table(), &question("Country", QuestionType::Empty)).unwrap();
        assert!(empty.is_empty());

        let result = extract_options(&table(), &question("Nope", QuestionType::SingleChoice));
        assert!(matches!(result, Err(SurveyError::UnknownQuestion(_))));
    }
}
