use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{Config, InsufficientPolicy, SplitterOptions};
use crate::errors::{SplitError, SplitResult};
use crate::metadata::MetadataTable;
use crate::schema::{benchmark_file_name, COL_SPLIT, SPLIT_KEY_COLUMNS};
use crate::strategies::split_heliostat;
use crate::types::{HeliostatSample, SplitAssignment, SplitConfiguration, SplitLabel};

/// Generates benchmark splits from calibration metadata.
///
/// The metadata is read once on construction; every call to
/// [`DatasetSplitter::get_dataset_splits`] computes a fresh split and writes
/// exactly one CSV into the output directory.
#[derive(Debug)]
pub struct DatasetSplitter {
    metadata: MetadataTable,
    output_dir: PathBuf,
    remove_unused_data: bool,
    options: SplitterOptions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedHeliostat {
    pub heliostat_id: String,
    pub available: usize,
    pub required: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitRow {
    /// Zero-based data row in the input metadata.
    pub row: usize,
    pub sample_id: String,
    pub heliostat_id: String,
    pub split: SplitLabel,
    /// Full output record, aligned with [`SplitTable::columns`].
    pub cells: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitTable {
    pub columns: Vec<String>,
    pub rows: Vec<SplitRow>,
}

impl SplitTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, label: SplitLabel) -> usize {
        self.rows.iter().filter(|r| r.split == label).count()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn split_of(&self, sample_id: &str) -> Option<SplitLabel> {
        self.rows
            .iter()
            .find(|r| r.sample_id == sample_id)
            .map(|r| r.split)
    }
}

#[derive(Clone, Debug)]
pub struct SplitOutcome {
    pub split: SplitConfiguration,
    pub table: SplitTable,
    pub output_path: PathBuf,
    pub skipped: Vec<SkippedHeliostat>,
    /// Samples left unlabelled by the high-variance gap policy.
    pub excluded_samples: usize,
}

impl DatasetSplitter {
    pub fn new(
        input_file: &Path,
        output_dir: &Path,
        remove_unused_data: bool,
    ) -> SplitResult<Self> {
        let metadata = MetadataTable::load(input_file)?;
        std::fs::create_dir_all(output_dir)?;
        info!(
            input = %input_file.display(),
            samples = metadata.samples.len(),
            "calibration metadata loaded"
        );
        Ok(Self {
            metadata,
            output_dir: output_dir.to_path_buf(),
            remove_unused_data,
            options: SplitterOptions::default(),
        })
    }

    pub fn from_config(cfg: &Config) -> SplitResult<Self> {
        Ok(Self::new(
            &cfg.run.input_file,
            &cfg.run.output_dir,
            cfg.run.remove_unused_data,
        )?
        .with_options(cfg.options()))
    }

    pub fn with_options(mut self, options: SplitterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn options(&self) -> &SplitterOptions {
        &self.options
    }

    /// Distinct heliostat ids present in the input, in string order (so `"10"`
    /// sorts before `"9"`). Split files list heliostats in the same order.
    pub fn heliostat_ids(&self) -> Vec<&str> {
        self.metadata
            .samples
            .iter()
            .map(|s| s.heliostat_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn get_dataset_splits(
        &self,
        split_type: &str,
        training_size: i64,
        validation_size: i64,
    ) -> SplitResult<SplitOutcome> {
        let cfg = SplitConfiguration::new(split_type, training_size, validation_size)?;
        self.split(cfg)
    }

    pub fn split(&self, cfg: SplitConfiguration) -> SplitResult<SplitOutcome> {
        if self.metadata.is_empty() {
            return Err(SplitError::invalid("input metadata contains no samples"));
        }

        let groups = self.group_by_heliostat();
        let mut assigned = Vec::new();
        let mut skipped = Vec::new();
        let mut first_insufficient: Option<SplitError> = None;
        let mut excluded_samples = 0usize;

        for (heliostat_id, samples) in &groups {
            match split_heliostat(samples, &cfg, &self.options) {
                Ok(group) => {
                    debug!(
                        heliostat_id = %heliostat_id,
                        train = group.count(SplitLabel::Train),
                        validation = group.count(SplitLabel::Validation),
                        test = group.count(SplitLabel::Test),
                        excluded = group.excluded,
                        "heliostat split"
                    );
                    excluded_samples += group.excluded;
                    assigned.extend(group.assignments);
                }
                Err(SplitError::InsufficientSamples {
                    heliostat_id,
                    available,
                    required,
                }) => {
                    let err = SplitError::InsufficientSamples {
                        heliostat_id: heliostat_id.clone(),
                        available,
                        required,
                    };
                    if self.options.on_insufficient == InsufficientPolicy::Abort {
                        return Err(err);
                    }
                    warn!(
                        heliostat_id = %heliostat_id,
                        available,
                        required,
                        "insufficient samples; heliostat skipped"
                    );
                    skipped.push(SkippedHeliostat {
                        heliostat_id,
                        available,
                        required,
                    });
                    first_insufficient.get_or_insert(err);
                }
                Err(e) => return Err(e),
            }
        }

        if assigned.is_empty() {
            if let Some(err) = first_insufficient {
                return Err(err);
            }
        }

        let table = self.build_table(&assigned);
        let output_path = self.output_dir.join(benchmark_file_name(
            cfg.split_type,
            cfg.training_size,
            cfg.validation_size,
        ));
        write_split_csv(&output_path, &table)?;

        info!(
            split_type = %cfg.split_type,
            training_size = cfg.training_size,
            validation_size = cfg.validation_size,
            heliostats = groups.len() - skipped.len(),
            skipped = skipped.len(),
            rows = table.len(),
            excluded = excluded_samples,
            out = %output_path.display(),
            "dataset split written"
        );

        Ok(SplitOutcome {
            split: cfg,
            table,
            output_path,
            skipped,
            excluded_samples,
        })
    }

    /// Samples per heliostat, keyed and ordered by the id string.
    fn group_by_heliostat(&self) -> BTreeMap<&str, Vec<HeliostatSample>> {
        let mut groups: BTreeMap<&str, Vec<HeliostatSample>> = BTreeMap::new();
        for s in &self.metadata.samples {
            groups
                .entry(s.heliostat_id.as_str())
                .or_default()
                .push(s.clone());
        }
        groups
    }

    fn build_table(&self, assigned: &[SplitAssignment]) -> SplitTable {
        let keys = self.metadata.keys.as_array();
        let passthrough = if self.remove_unused_data {
            Vec::new()
        } else {
            self.metadata.passthrough_columns()
        };

        let mut columns: Vec<String> = SPLIT_KEY_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(passthrough.iter().map(|&i| self.metadata.columns[i].clone()));
        columns.push(COL_SPLIT.to_string());

        let rows = assigned
            .iter()
            .map(|a| {
                let record = &self.metadata.records[a.row];
                let mut cells: Vec<String> = keys
                    .iter()
                    .chain(passthrough.iter())
                    .map(|&i| record.get(i).unwrap_or("").to_string())
                    .collect();
                cells.push(a.split.as_str().to_string());
                SplitRow {
                    row: a.row,
                    sample_id: a.sample_id.clone(),
                    heliostat_id: a.heliostat_id.clone(),
                    split: a.split,
                    cells,
                }
            })
            .collect();

        SplitTable { columns, rows }
    }
}

/// Writes `table` to `path` via a temporary sibling file, so a failure never
/// leaves a partial split file behind.
pub fn write_split_csv(path: &Path, table: &SplitTable) -> SplitResult<()> {
    let tmp = path.with_extension("csv.tmp");
    let res = write_records(&tmp, table).and_then(|()| {
        std::fs::rename(&tmp, path)?;
        Ok(())
    });
    if res.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    res
}

fn write_records(path: &Path, table: &SplitTable) -> SplitResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    wtr.write_record(&table.columns)?;
    for r in &table.rows {
        wtr.write_record(&r.cells)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "helio_split_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let _ = std::fs::remove_dir_all(&p);
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    #[test]
    fn splits_each_heliostat_and_orders_by_id() -> anyhow::Result<()> {
        let tmp = tmp_dir("order");
        let input = tmp.join("metadata.csv");
        let mut csv = String::from("id,HeliostatId,Azimuth,Elevation,DateTime,ReceiverId\n");
        for (i, h) in ["BB10", "AA23", "BB10", "AA23", "BB10", "AA23"].iter().enumerate() {
            csv.push_str(&format!(
                "{},{h},{}.0,20.0,2023-03-0{} 10:00:00,tower\n",
                100 + i,
                i * 10,
                i + 1
            ));
        }
        std::fs::write(&input, csv)?;

        let splitter = DatasetSplitter::new(&input, &tmp.join("out"), true)?;
        assert_eq!(splitter.heliostat_ids(), vec!["AA23", "BB10"]);

        let outcome = splitter.get_dataset_splits("azimuth", 1, 1)?;
        let helio: Vec<&str> = outcome
            .table
            .rows
            .iter()
            .map(|r| r.heliostat_id.as_str())
            .collect();
        assert_eq!(helio, vec!["AA23", "AA23", "AA23", "BB10", "BB10", "BB10"]);
        assert!(outcome.output_path.exists());
        assert!(outcome
            .output_path
            .ends_with("benchmark_split-azimuth_train-1_validation-1.csv"));
        assert!(outcome.table.column_index("ReceiverId").is_none());
        assert!(!outcome.output_path.with_extension("csv.tmp").exists());
        Ok(())
    }

    #[test]
    fn missing_input_is_io_error() {
        let tmp = tmp_dir("missing");
        let err = DatasetSplitter::new(&tmp.join("nope.csv"), &tmp, true).unwrap_err();
        assert!(matches!(err, SplitError::Io(_)));
    }
}
