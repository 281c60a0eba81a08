use crate::types::SplitType;

pub const COL_ID: &str = "id";
pub const COL_HELIOSTAT_ID: &str = "HeliostatId";
pub const COL_AZIMUTH: &str = "Azimuth";
pub const COL_ELEVATION: &str = "Elevation";
pub const COL_DATE_TIME: &str = "DateTime";
pub const COL_SPLIT: &str = "Split";

/// Columns always present in a benchmark split file, in output order.
/// Passthrough metadata (when kept) sits between these and `Split`.
pub const SPLIT_KEY_COLUMNS: [&str; 5] = [
    COL_ID,
    COL_HELIOSTAT_ID,
    COL_AZIMUTH,
    COL_ELEVATION,
    COL_DATE_TIME,
];

pub const LABEL_TRAIN: &str = "train";
pub const LABEL_VALIDATION: &str = "validation";
pub const LABEL_TEST: &str = "test";

pub const SUMMARY_HEADER: [&str; 5] = ["HeliostatId", "train", "validation", "test", "total"];

/// Canonical name of a persisted benchmark split, e.g.
/// `benchmark_split-azimuth_train-10_validation-30.csv`.
pub fn benchmark_file_name(
    split_type: SplitType,
    training_size: usize,
    validation_size: usize,
) -> String {
    format!(
        "benchmark_split-{}_train-{}_validation-{}.csv",
        split_type.as_str(),
        training_size,
        validation_size
    )
}

/// Normalized header key: lowercase ASCII alphanumerics only.
pub(crate) fn norm(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub(crate) const ID_ALIASES: [&str; 2] = ["id", "sampleid"];
pub(crate) const HELIOSTAT_ALIASES: [&str; 2] = ["heliostatid", "heliostat"];
pub(crate) const AZIMUTH_ALIASES: [&str; 2] = ["azimuth", "sunazimuth"];
pub(crate) const ELEVATION_ALIASES: [&str; 2] = ["elevation", "sunelevation"];
pub(crate) const DATE_TIME_ALIASES: [&str; 4] = ["datetime", "timestamp", "createdat", "datetimeindex"];
