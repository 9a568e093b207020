use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::table::RawTable;

/// Columns that must be present after header normalization.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "gender",
    "race/ethnicity",
    "parental_level_of_education",
    "math_score",
    "reading_score",
    "writing_score",
];

/// Canonical form of a column header: lower-case, spaces replaced with `_`.
pub fn normalize_header(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: column '{column}' has non-numeric score '{value}'")]
    InvalidScore {
        row: usize,
        column: String,
        value: String,
    },
}

/// The numeric fields a chart can be built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Average,
    Math,
    Reading,
    Writing,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Average, Metric::Math, Metric::Reading, Metric::Writing];

    /// Display name used to tag chart series.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Average => "Average score",
            Metric::Math => "Math",
            Metric::Reading => "Reading",
            Metric::Writing => "Writing",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Metric::Average => "average_score",
            Metric::Math => "math_score",
            Metric::Reading => "reading_score",
            Metric::Writing => "writing_score",
        }
    }

    pub fn value(&self, record: &Record) -> f64 {
        match self {
            Metric::Average => record.average_score,
            Metric::Math => record.math_score,
            Metric::Reading => record.reading_score,
            Metric::Writing => record.writing_score,
        }
    }
}

/// The categorical fields records can be filtered and grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Gender,
    Ethnicity,
    ParentalEducation,
}

impl Dimension {
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Gender => "gender",
            Dimension::Ethnicity => "race/ethnicity",
            Dimension::ParentalEducation => "parental_level_of_education",
        }
    }

    pub fn value<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            Dimension::Gender => &record.gender,
            Dimension::Ethnicity => &record.ethnicity_group,
            Dimension::ParentalEducation => &record.parental_education_level,
        }
    }
}

/// One student's assessment row.
///
/// `average_score` is derived from the three score fields at construction
/// and is never set independently; build records through [`Record::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub gender: String,
    pub ethnicity_group: String,
    pub parental_education_level: String,
    pub math_score: f64,
    pub reading_score: f64,
    pub writing_score: f64,
    pub average_score: f64,
}

impl Record {
    pub fn new(
        gender: String,
        ethnicity_group: String,
        parental_education_level: String,
        math_score: f64,
        reading_score: f64,
        writing_score: f64,
    ) -> Self {
        let average_score = (math_score + reading_score + writing_score) / 3.0;
        Self {
            gender,
            ethnicity_group,
            parental_education_level,
            math_score,
            reading_score,
            writing_score,
            average_score,
        }
    }
}

/// The normalized, immutable dataset with pre-computed category domains.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    genders: BTreeSet<String>,
    ethnicities: BTreeSet<String>,
    education_levels: BTreeSet<String>,
}

impl Dataset {
    /// Normalize headers, verify required columns, and build records with
    /// the derived average score.
    pub fn from_table(table: &RawTable) -> Result<Self, SchemaError> {
        let headers: Vec<String> = table.headers.iter().map(|h| normalize_header(h)).collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !headers.iter().any(|h| h == *name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        // Verified above to exist
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap_or(usize::MAX);
        let gender_col = col(Dimension::Gender.column());
        let ethnicity_col = col(Dimension::Ethnicity.column());
        let education_col = col(Dimension::ParentalEducation.column());
        let math_col = col(Metric::Math.column());
        let reading_col = col(Metric::Reading.column());
        let writing_col = col(Metric::Writing.column());

        let mut records = Vec::with_capacity(table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            let text = |col: usize| row.get(col).cloned().unwrap_or_default();
            let score = |col: usize| -> Result<f64, SchemaError> {
                let raw = row.get(col).map(String::as_str).unwrap_or("");
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| SchemaError::InvalidScore {
                        row: i + 1,
                        column: headers[col].clone(),
                        value: raw.to_string(),
                    })
            };

            records.push(Record::new(
                text(gender_col),
                text(ethnicity_col),
                text(education_col),
                score(math_col)?,
                score(reading_col)?,
                score(writing_col)?,
            ));
        }

        // Category values stay open strings, but the observed domains are
        // indexed so unexpected values surface in filter defaults.
        let mut genders = BTreeSet::new();
        let mut ethnicities = BTreeSet::new();
        let mut education_levels = BTreeSet::new();
        for record in &records {
            genders.insert(record.gender.clone());
            ethnicities.insert(record.ethnicity_group.clone());
            education_levels.insert(record.parental_education_level.clone());
        }

        debug!(
            "normalized dataset: {} records, {} genders, {} ethnicity groups, {} education levels",
            records.len(),
            genders.len(),
            ethnicities.len(),
            education_levels.len()
        );

        Ok(Self {
            records,
            genders,
            ethnicities,
            education_levels,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted set of distinct values observed for one categorical dimension.
    pub fn distinct(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Gender => &self.genders,
            Dimension::Ethnicity => &self.ethnicities,
            Dimension::ParentalEducation => &self.education_levels,
        }
    }
}
