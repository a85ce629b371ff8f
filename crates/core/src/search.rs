//! Case-insensitive search over questions and their options.

use crate::catalog::Catalog;
use crate::error::{require_non_empty, SurveyResult};
use crate::options::extract_options;
use crate::question::Question;
use survey_sheet::Sheet;

/// Questions whose id or text contains `query`, in catalog order.
///
/// # Errors
///
/// `InvalidArgument` for an empty query.
pub fn search_questions<'c>(catalog: &'c Catalog, query: &str) -> SurveyResult<Vec<&'c Question>> {
    let needle = require_non_empty(query, "search query")?.to_lowercase();
    Ok(catalog
        .list()
        .filter(|q| {
            q.id.to_lowercase().contains(&needle) || q.text.to_lowercase().contains(&needle)
        })
        .collect())
}

/// Options of `question_id`, optionally filtered by `query`, sorted and distinct.
///
/// A missing or blank query returns the full option set.
///
/// # Errors
///
/// `InvalidArgument` for an empty id, `UnknownQuestion` when the catalog
/// does not know it.
pub fn search_options(
    catalog: &Catalog,
    table: &Sheet,
    question_id: &str,
    query: Option<&str>,
) -> SurveyResult<Vec<String>> {
    let question = catalog.lookup(question_id)?;
    let options = extract_options(table, question)?;

    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    Ok(match needle {
        Some(needle) => options
            .into_iter()
            .filter(|o| o.to_lowercase().contains(&needle))
            .collect(),
        None => options.into_iter().collect(),
    })
}
