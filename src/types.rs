use std::fmt;

use chrono::NaiveDateTime;

use crate::errors::SplitError;
use crate::schema::{LABEL_TEST, LABEL_TRAIN, LABEL_VALIDATION};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SplitType {
    Azimuth,
    Solstice,
    Balanced,
    HighVariance,
}

impl SplitType {
    pub const ALL: [SplitType; 4] = [
        SplitType::Azimuth,
        SplitType::Solstice,
        SplitType::Balanced,
        SplitType::HighVariance,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SplitType::Azimuth => "azimuth",
            SplitType::Solstice => "solstice",
            SplitType::Balanced => "balanced",
            SplitType::HighVariance => "high_variance",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SplitType {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "azimuth" => Ok(SplitType::Azimuth),
            "solstice" => Ok(SplitType::Solstice),
            "balanced" | "kmeans" => Ok(SplitType::Balanced),
            "high_variance" | "high-variance" | "knn" => Ok(SplitType::HighVariance),
            other => {
                let known: Vec<&str> = SplitType::ALL.iter().map(|t| t.as_str()).collect();
                Err(SplitError::invalid(format!(
                    "the split type must be one of `{}`; the selected split type `{other}` is not supported",
                    known.join(", ")
                )))
            }
        }
    }
}

/// Order is the output order within a heliostat: train, validation, test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SplitLabel {
    Train,
    Validation,
    Test,
}

impl SplitLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            SplitLabel::Train => LABEL_TRAIN,
            SplitLabel::Validation => LABEL_VALIDATION,
            SplitLabel::Test => LABEL_TEST,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            LABEL_TRAIN => Some(SplitLabel::Train),
            LABEL_VALIDATION => Some(SplitLabel::Validation),
            LABEL_TEST => Some(SplitLabel::Test),
            _ => None,
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calibration sample of a heliostat, as seen by the split strategies.
///
/// `row` is the zero-based data row in the input file and doubles as the
/// final tie-breaker wherever two samples compare equal.
#[derive(Clone, Debug, PartialEq)]
pub struct HeliostatSample {
    pub row: usize,
    pub sample_id: String,
    pub heliostat_id: String,
    pub azimuth: f64,
    pub elevation: f64,
    pub timestamp: NaiveDateTime,
}

impl HeliostatSample {
    pub fn position(&self) -> [f64; 2] {
        [self.azimuth, self.elevation]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitAssignment {
    pub row: usize,
    pub sample_id: String,
    pub heliostat_id: String,
    pub split: SplitLabel,
}

impl SplitAssignment {
    pub fn new(sample: &HeliostatSample, split: SplitLabel) -> Self {
        Self {
            row: sample.row,
            sample_id: sample.sample_id.clone(),
            heliostat_id: sample.heliostat_id.clone(),
            split,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitConfiguration {
    pub split_type: SplitType,
    pub training_size: usize,
    pub validation_size: usize,
}

impl SplitConfiguration {
    /// Validates untyped caller input.
    pub fn new(
        split_type: &str,
        training_size: i64,
        validation_size: i64,
    ) -> Result<Self, SplitError> {
        let split_type = split_type.parse::<SplitType>()?;
        let training_size = non_negative("training_size", training_size)?;
        let validation_size = non_negative("validation_size", validation_size)?;
        Ok(Self {
            split_type,
            training_size,
            validation_size,
        })
    }
}

fn non_negative(name: &str, v: i64) -> Result<usize, SplitError> {
    usize::try_from(v)
        .map_err(|_| SplitError::invalid(format!("{name} must be >= 0, got {v}")))
}

pub(crate) fn cmp_f64_asc(a: f64, b: f64) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

pub(crate) fn cmp_f64_desc(a: f64, b: f64) -> std::cmp::Ordering {
    b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_type_accepts_legacy_names() {
        assert_eq!("kmeans".parse::<SplitType>().ok(), Some(SplitType::Balanced));
        assert_eq!("KNN".parse::<SplitType>().ok(), Some(SplitType::HighVariance));
        assert_eq!(" Azimuth ".parse::<SplitType>().ok(), Some(SplitType::Azimuth));
    }

    #[test]
    fn unknown_split_type_is_invalid_configuration() {
        let err = "this_does_not_exist".parse::<SplitType>().unwrap_err();
        assert!(err.is_invalid_configuration());
        assert!(err.to_string().contains("azimuth, solstice, balanced, high_variance"));
    }

    #[test]
    fn negative_sizes_are_rejected() {
        assert!(SplitConfiguration::new("azimuth", -1, 3)
            .unwrap_err()
            .is_invalid_configuration());
        assert!(SplitConfiguration::new("azimuth", 3, -1)
            .unwrap_err()
            .is_invalid_configuration());
        let cfg = SplitConfiguration::new("solstice", 0, 0).unwrap();
        assert_eq!(cfg.split_type, SplitType::Solstice);
    }

    #[test]
    fn label_display_is_strict() {
        assert_eq!(SplitLabel::Train.to_string(), "train");
        assert_eq!(SplitLabel::Validation.to_string(), "validation");
        assert_eq!(SplitLabel::Test.to_string(), "test");
        assert_eq!(SplitLabel::parse("VALIDATION"), Some(SplitLabel::Validation));
        assert_eq!(SplitLabel::parse("holdout"), None);
    }
}
