//! # survey-core
//!
//! In-memory analysis engine for developer-survey exports.
//!
//! This crate provides:
//! - A question catalog with schema-declared or inferred types
//! - Option extraction for single- and multiple-choice answers
//! - Respondent subsets filtered on one question/option pair
//! - Percentage distributions with "top-N + Others" truncation
//! - Question and option search
//!
//! # Example
//!
//! ```
//! use survey_core::{Analyzer, AnalyzerOptions, Session};
//! use survey_sheet::Sheet;
//!
//! let table = Sheet::from_data(
//!     vec!["ResponseId", "Country", "Languages"],
//!     vec![
//!         vec!["1", "USA", "Python;Rust"],
//!         vec!["2", "UK", "Python"],
//!     ],
//! )
//! .unwrap();
//! let analyzer = Analyzer::from_parts(table, None, &AnalyzerOptions::default()).unwrap();
//!
//! let mut session = Session::new(&analyzer);
//! session.create_subset("Country", "USA").unwrap();
//! let dist = session.distribution("Languages", Some(10), true).unwrap();
//! assert_eq!(dist.percentage_of("Rust"), Some(100.0));
//! ```

/// Analyzer over one loaded dataset.
pub mod analyzer;
/// Question catalog and type sources.
pub mod catalog;
/// Percentage distributions.
pub mod distribution;
/// Error types and result aliases.
pub mod error;
/// Dataset loading.
pub mod loader;
/// Option extraction.
pub mod options;
/// Question metadata.
pub mod question;
/// Question and option search.
pub mod search;
/// Interactive session state.
pub mod session;
/// Respondent subsets.
pub mod subset;

pub use analyzer::{Analyzer, AnalyzerOptions};
pub use catalog::{Catalog, InferenceOptions, TypeSource, DEFAULT_ID_COLUMN};
pub use distribution::{
    compute_distribution, multiple_choice_distribution, single_choice_distribution, Distribution,
    DistributionEntry, DEFAULT_TOP_N, OTHERS_LABEL,
};
pub use error::{SurveyError, SurveyResult};
pub use loader::{
    load, LoadOptions, SheetSummary, SurveyData, TypeSourceKind, DEFAULT_RAW_SHEET,
    DEFAULT_SCHEMA_SHEET,
};
pub use options::{extract_options, split_options};
pub use question::{ColumnStats, Question, QuestionType, MULTI_VALUE_SEPARATOR};
pub use search::{search_options, search_questions};
pub use session::Session;
pub use subset::{create_subset, MultiChoiceMatch, Subset, SubsetFilter, SubsetOptions};
