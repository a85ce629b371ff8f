//! The loaded survey: immutable response table plus its question catalog.

use crate::catalog::{Catalog, InferenceOptions, TypeSource};
use crate::distribution::{
    compute_distribution, multiple_choice_distribution, single_choice_distribution, Distribution,
};
use crate::error::SurveyResult;
use crate::loader::{load, LoadOptions, SheetSummary};
use crate::question::Question;
use crate::search;
use crate::subset::{create_subset, Subset, SubsetOptions};
use std::path::Path;
use survey_sheet::Sheet;

/// Options for opening and analysing a survey
#[derive(Debug, Clone, Default)]
pub struct AnalyzerOptions {
    pub load: LoadOptions,
    pub inference: InferenceOptions,
    pub subset: SubsetOptions,
}

impl AnalyzerOptions {
    #[must_use]
    pub fn with_load(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    #[must_use]
    pub fn with_inference(mut self, inference: InferenceOptions) -> Self {
        self.inference = inference;
        self
    }

    #[must_use]
    pub fn with_subset(mut self, subset: SubsetOptions) -> Self {
        self.subset = subset;
        self
    }
}

/// Read-only analysis engine over one loaded dataset.
///
/// The table and catalog are built once and never change; subset state lives
/// in a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct Analyzer {
    table: Sheet,
    catalog: Catalog,
    subset_options: SubsetOptions,
    sheets: Vec<SheetSummary>,
}

impl Analyzer {
    /// Load `path` and build the catalog.
    ///
    /// Types come from the schema sheet when one was loaded, otherwise they
    /// are inferred.
    pub fn open<P: AsRef<Path>>(path: P, options: &AnalyzerOptions) -> SurveyResult<Self> {
        let data = load(path, &options.load)?;
        let sheets = data.sheet_summaries().to_vec();
        let mut analyzer = Self::from_parts(data.raw, data.schema.as_ref(), options)?;
        analyzer.sheets = sheets;
        Ok(analyzer)
    }

    /// Build an analyzer from tables already in memory
    pub fn from_parts(
        table: Sheet,
        schema: Option<&Sheet>,
        options: &AnalyzerOptions,
    ) -> SurveyResult<Self> {
        let source = match schema {
            Some(schema) => TypeSource::Schema(schema),
            None => TypeSource::Inferred(options.inference.clone()),
        };
        let catalog = Catalog::build(&table, source)?;
        let sheets = vec![SheetSummary {
            name: table.name().to_string(),
            rows: table.row_count(),
            columns: table.columns().to_vec(),
        }];
        Ok(Analyzer {
            table,
            catalog,
            subset_options: options.subset.clone(),
            sheets,
        })
    }

    /// The full response table
    pub fn table(&self) -> &Sheet {
        &self.table
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Sheets of the source file
    pub fn sheets(&self) -> &[SheetSummary] {
        &self.sheets
    }

    pub fn response_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.catalog.list()
    }

    pub fn question(&self, id: &str) -> SurveyResult<&Question> {
        self.catalog.lookup(id)
    }

    pub fn search_questions(&self, query: &str) -> SurveyResult<Vec<&Question>> {
        search::search_questions(&self.catalog, query)
    }

    pub fn search_options(
        &self,
        question_id: &str,
        query: Option<&str>,
    ) -> SurveyResult<Vec<String>> {
        search::search_options(&self.catalog, &self.table, question_id, query)
    }

    /// Filter the full table on one question/option pair
    pub fn create_subset(&self, question_id: &str, option: &str) -> SurveyResult<Subset> {
        let question = self.catalog.lookup(question_id)?;
        create_subset(&self.table, question, option, &self.subset_options)
    }

    /// Distribution over the full table, or over `subset` when given
    pub fn distribution(
        &self,
        question_id: &str,
        subset: Option<&Subset>,
        top_n: Option<usize>,
    ) -> SurveyResult<Distribution> {
        let question = self.catalog.lookup(question_id)?;
        compute_distribution(self.rows(subset), question, top_n)
    }

    /// Distribution of a question that must be single-choice
    pub fn single_choice_distribution(
        &self,
        question_id: &str,
        subset: Option<&Subset>,
        top_n: Option<usize>,
    ) -> SurveyResult<Distribution> {
        let question = self.catalog.lookup(question_id)?;
        single_choice_distribution(self.rows(subset), question, top_n)
    }

    /// Distribution of a question that must be multiple-choice
    pub fn multiple_choice_distribution(
        &self,
        question_id: &str,
        subset: Option<&Subset>,
        top_n: Option<usize>,
    ) -> SurveyResult<Distribution> {
        let question = self.catalog.lookup(question_id)?;
        multiple_choice_distribution(self.rows(subset), question, top_n)
    }

    fn rows<'a>(&'a self, subset: Option<&'a Subset>) -> &'a Sheet {
        subset.map_or(&self.table, Subset::rows)
    }
}
