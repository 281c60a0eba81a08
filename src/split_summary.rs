use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::benchmark::read_benchmark_file;
use crate::dataset_split::SplitTable;
use crate::errors::SplitResult;
use crate::schema::SUMMARY_HEADER;
use crate::types::SplitLabel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub train: u64,
    pub validation: u64,
    pub test: u64,
}

impl SplitCounts {
    fn push(&mut self, label: SplitLabel) {
        match label {
            SplitLabel::Train => self.train += 1,
            SplitLabel::Validation => self.validation += 1,
            SplitLabel::Test => self.test += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.train + self.validation + self.test
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub by_heliostat: BTreeMap<String, SplitCounts>,
    pub totals: SplitCounts,
}

impl SplitSummary {
    fn push(&mut self, heliostat_id: &str, label: SplitLabel) {
        self.by_heliostat
            .entry(heliostat_id.to_string())
            .or_default()
            .push(label);
        self.totals.push(label);
    }
}

pub fn summarize(table: &SplitTable) -> SplitSummary {
    let mut s = SplitSummary::default();
    for r in &table.rows {
        s.push(&r.heliostat_id, r.split);
    }
    s
}

pub fn summarize_file(path: &Path) -> SplitResult<SplitSummary> {
    let mut s = SplitSummary::default();
    for e in read_benchmark_file(path)? {
        s.push(&e.heliostat_id, e.split);
    }
    Ok(s)
}

pub fn write_summary_csv(path: &Path, summary: &SplitSummary) -> SplitResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    wtr.write_record(SUMMARY_HEADER)?;
    for (heliostat_id, c) in &summary.by_heliostat {
        wtr.write_record([
            heliostat_id.clone(),
            c.train.to_string(),
            c.validation.to_string(),
            c.test.to_string(),
            c.total().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset_split::SplitRow;

    fn row(heliostat_id: &str, split: SplitLabel) -> SplitRow {
        SplitRow {
            row: 0,
            sample_id: "x".to_string(),
            heliostat_id: heliostat_id.to_string(),
            split,
            cells: Vec::new(),
        }
    }

    #[test]
    fn counts_per_heliostat_and_total() {
        let table = SplitTable {
            columns: Vec::new(),
            rows: vec![
                row("BB10", SplitLabel::Train),
                row("AA23", SplitLabel::Test),
                row("AA23", SplitLabel::Train),
                row("AA23", SplitLabel::Validation),
            ],
        };
        let s = summarize(&table);
        assert_eq!(s.by_heliostat.keys().collect::<Vec<_>>(), vec!["AA23", "BB10"]);
        assert_eq!(s.by_heliostat["AA23"].total(), 3);
        assert_eq!(s.by_heliostat["BB10"].train, 1);
        assert_eq!(
            s.totals,
            SplitCounts {
                train: 2,
                validation: 1,
                test: 1
            }
        );
    }

    #[test]
    fn summary_header_is_frozen() {
        assert_eq!(SUMMARY_HEADER.join(","), "HeliostatId,train,validation,test,total");
    }
}
