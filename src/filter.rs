use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::schema::{Dataset, Dimension, Record};

/// Per-dimension selections of categorical values, ANDed across dimensions.
///
/// Each set defaults to every value observed in the dataset (see
/// [`FilterCriteria::select_all`]). An *empty* set is an explicit selection of
/// nothing: no record can match on that dimension, so the filtered result is
/// empty. Deselect-all is not select-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub genders: BTreeSet<String>,
    pub ethnicities: BTreeSet<String>,
    pub education_levels: BTreeSet<String>,
}

impl FilterCriteria {
    /// The default selection: every distinct value observed in the dataset.
    pub fn select_all(dataset: &Dataset) -> Self {
        Self {
            genders: dataset.distinct(Dimension::Gender).clone(),
            ethnicities: dataset.distinct(Dimension::Ethnicity).clone(),
            education_levels: dataset.distinct(Dimension::ParentalEducation).clone(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.genders.contains(&record.gender)
            && self.ethnicities.contains(&record.ethnicity_group)
            && self.education_levels.contains(&record.parental_education_level)
    }
}

/// Order-preserving view of the records matching `criteria`. Pure: the same
/// dataset and criteria always produce the same sequence.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> Vec<&'a Record> {
    dataset
        .records()
        .iter()
        .filter(|record| criteria.matches(record))
        .collect()
}
