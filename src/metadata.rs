use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::errors::{SplitError, SplitResult};
use crate::schema::{
    norm, AZIMUTH_ALIASES, COL_AZIMUTH, COL_DATE_TIME, COL_ELEVATION, COL_HELIOSTAT_ID, COL_ID,
    DATE_TIME_ALIASES, ELEVATION_ALIASES, HELIOSTAT_ALIASES, ID_ALIASES,
};
use crate::types::HeliostatSample;

/// Calibration metadata as loaded from disk.
///
/// Raw cell text is retained so that the split file reproduces the input
/// values byte for byte.
#[derive(Clone, Debug)]
pub struct MetadataTable {
    pub columns: Vec<String>,
    pub keys: KeyColumns,
    pub records: Vec<csv::StringRecord>,
    pub samples: Vec<HeliostatSample>,
}

/// Positions of the required columns in the input header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyColumns {
    pub id: usize,
    pub heliostat_id: usize,
    pub azimuth: usize,
    pub elevation: usize,
    pub date_time: usize,
}

impl KeyColumns {
    fn new(header: &csv::StringRecord) -> SplitResult<Self> {
        Ok(Self {
            id: find_column(header, &ID_ALIASES, COL_ID)?,
            heliostat_id: find_column(header, &HELIOSTAT_ALIASES, COL_HELIOSTAT_ID)?,
            azimuth: find_column(header, &AZIMUTH_ALIASES, COL_AZIMUTH)?,
            elevation: find_column(header, &ELEVATION_ALIASES, COL_ELEVATION)?,
            date_time: find_column(header, &DATE_TIME_ALIASES, COL_DATE_TIME)?,
        })
    }

    pub fn as_array(&self) -> [usize; 5] {
        [
            self.id,
            self.heliostat_id,
            self.azimuth,
            self.elevation,
            self.date_time,
        ]
    }
}

impl MetadataTable {
    pub fn load(path: &Path) -> SplitResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> SplitResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header = rdr.headers()?.clone();
        let keys = KeyColumns::new(&header)?;

        let mut records = Vec::new();
        let mut samples = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            samples.push(parse_sample(&record, &keys, row)?);
            records.push(record);
        }

        Ok(Self {
            columns: header.iter().map(|s| s.to_string()).collect(),
            keys,
            records,
            samples,
        })
    }

    /// Input columns that are not required by any split strategy, in input order.
    pub fn passthrough_columns(&self) -> Vec<usize> {
        let keys = self.keys.as_array();
        (0..self.columns.len())
            .filter(|i| !keys.contains(i))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub(crate) fn find_column(
    header: &csv::StringRecord,
    aliases: &[&str],
    display: &str,
) -> SplitResult<usize> {
    header
        .iter()
        .position(|h| aliases.contains(&norm(h).as_str()))
        .ok_or_else(|| SplitError::invalid(format!("missing column: {display}")))
}

fn parse_sample(
    record: &csv::StringRecord,
    keys: &KeyColumns,
    row: usize,
) -> SplitResult<HeliostatSample> {
    let cell = |idx: usize, name: &str| -> SplitResult<&str> {
        match record.get(idx) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(SplitError::invalid(format!("row {row}: empty {name}"))),
        }
    };

    let sample_id = cell(keys.id, COL_ID)?.to_string();
    let heliostat_id = cell(keys.heliostat_id, COL_HELIOSTAT_ID)?.to_string();

    let raw = cell(keys.azimuth, COL_AZIMUTH)?;
    let azimuth = parse_f64(raw).ok_or_else(|| {
        SplitError::invalid(format!("row {row}: invalid {COL_AZIMUTH} value `{raw}`"))
    })?;
    let raw = cell(keys.elevation, COL_ELEVATION)?;
    let elevation = parse_f64(raw).ok_or_else(|| {
        SplitError::invalid(format!("row {row}: invalid {COL_ELEVATION} value `{raw}`"))
    })?;
    let raw = cell(keys.date_time, COL_DATE_TIME)?;
    let timestamp = parse_timestamp(raw).ok_or_else(|| {
        SplitError::invalid(format!("row {row}: invalid {COL_DATE_TIME} value `{raw}`"))
    })?;

    Ok(HeliostatSample {
        row,
        sample_id,
        heliostat_id,
        azimuth,
        elevation,
        timestamp,
    })
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

/// Parses the timestamp layouts found in exported metadata. Values carrying an
/// offset are converted to UTC; values without one are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
