//! Interactive session state: one remembered subset per session.

use crate::analyzer::Analyzer;
use crate::distribution::Distribution;
use crate::error::{SurveyError, SurveyResult};
use crate::subset::Subset;

/// A user's view onto an [`Analyzer`].
///
/// Each session owns its remembered subset, so two sessions over the same
/// analyzer never see each other's filters.
#[derive(Debug)]
pub struct Session<'a> {
    analyzer: &'a Analyzer,
    active: Option<Subset>,
}

impl<'a> Session<'a> {
    pub fn new(analyzer: &'a Analyzer) -> Self {
        Session {
            analyzer,
            active: None,
        }
    }

    pub fn analyzer(&self) -> &'a Analyzer {
        self.analyzer
    }

    /// Create a subset and remember it, replacing any previous one
    pub fn create_subset(&mut self, question_id: &str, option: &str) -> SurveyResult<&Subset> {
        let subset = self.analyzer.create_subset(question_id, option)?;
        Ok(self.remember(subset))
    }

    /// Remember an existing subset, replacing any previous one
    pub fn remember(&mut self, subset: Subset) -> &Subset {
        self.active.insert(subset)
    }

    pub fn active_subset(&self) -> Option<&Subset> {
        self.active.as_ref()
    }

    /// Forget the remembered subset, returning it
    pub fn clear_subset(&mut self) -> Option<Subset> {
        self.active.take()
    }

    /// Distribution over the full table, or over the remembered subset
    ///
    /// # Errors
    ///
    /// `NoActiveSubset` when `use_subset` is set and nothing is remembered.
    pub fn distribution(
        &self,
        question_id: &str,
        top_n: Option<usize>,
        use_subset: bool,
    ) -> SurveyResult<Distribution> {
        let subset = if use_subset {
            Some(self.active.as_ref().ok_or(SurveyError::NoActiveSubset)?)
        } else {
            None
        };
        self.analyzer.distribution(question_id, subset, top_n)
    }
}
