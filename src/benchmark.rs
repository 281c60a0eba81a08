//! Reading persisted benchmark splits back, the way a dataset loader consumes them.

use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{SplitError, SplitResult};
use crate::metadata::find_column;
use crate::schema::{COL_HELIOSTAT_ID, COL_ID, COL_SPLIT, HELIOSTAT_ALIASES, ID_ALIASES};
use crate::types::SplitLabel;

const SPLIT_ALIAS: &str = "split";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchmarkEntry {
    pub sample_id: String,
    pub heliostat_id: String,
    pub split: SplitLabel,
}

pub fn read_benchmark_file(path: &Path) -> SplitResult<Vec<BenchmarkEntry>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let header = rdr.headers()?.clone();
    let idx_id = find_column(&header, &ID_ALIASES, COL_ID)?;
    let idx_heliostat = find_column(&header, &HELIOSTAT_ALIASES, COL_HELIOSTAT_ID)?;
    let idx_split = find_column(&header, &[SPLIT_ALIAS], COL_SPLIT)?;

    let mut out = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let raw = record.get(idx_split).unwrap_or("");
        let split = SplitLabel::parse(raw).ok_or_else(|| {
            SplitError::invalid(format!("row {row}: unknown split label `{raw}`"))
        })?;
        out.push(BenchmarkEntry {
            sample_id: record.get(idx_id).unwrap_or("").to_string(),
            heliostat_id: record.get(idx_heliostat).unwrap_or("").to_string(),
            split,
        });
    }
    Ok(out)
}

/// Sample ids per split label, in file order.
pub fn load_split_ids(path: &Path) -> SplitResult<BTreeMap<SplitLabel, Vec<String>>> {
    let mut ids: BTreeMap<SplitLabel, Vec<String>> = BTreeMap::new();
    for e in read_benchmark_file(path)? {
        ids.entry(e.split).or_default().push(e.sample_id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "helio_split_benchmark_{name}_{}_{}.csv",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        std::fs::write(&p, contents).expect("write tmp csv");
        p
    }

    #[test]
    fn groups_ids_by_label() {
        let path = tmp_csv(
            "ok",
            "id,HeliostatId,Split\n1,AA23,train\n2,AA23,test\n3,AA23,train\n4,AA23,validation\n",
        );
        let ids = load_split_ids(&path).unwrap();
        assert_eq!(ids[&SplitLabel::Train], vec!["1", "3"]);
        assert_eq!(ids[&SplitLabel::Test], vec!["2"]);
        assert_eq!(ids[&SplitLabel::Validation], vec!["4"]);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let path = tmp_csv("bad", "id,HeliostatId,Split\n1,AA23,holdout\n");
        assert!(load_split_ids(&path).unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn missing_split_column_is_rejected() {
        let path = tmp_csv("nosplit", "id,HeliostatId\n1,AA23\n");
        let err = read_benchmark_file(&path).unwrap_err();
        assert!(err.to_string().contains("Split"));
    }
}
