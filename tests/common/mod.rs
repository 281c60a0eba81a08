#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "id,HeliostatId,Azimuth,Elevation,DateTime,CalibrationTargetId";

/// Ten calibration samples of heliostat AA23 (id, azimuth, elevation, timestamp).
pub const AA23: [(&str, &str, &str, &str); 10] = [
    ("222963", "-6.400352313789926", "62.3279159365105", "2023-06-16 09:48:04"),
    ("225295", "81.83915757811221", "37.04787945593409", "2023-06-27 05:39:56"),
    ("212358", "66.41160685040921", "45.213616680026576", "2023-05-31 06:35:41"),
    ("203321", "-56.13534862708945", "46.12541005936384", "2023-05-13 12:00:13"),
    ("199617", "-24.27562868172698", "48.83409042343407", "2023-04-21 10:37:26"),
    ("246253", "0.6579483837589489", "45.16393436924701", "2023-09-07 09:30:42"),
    ("253429", "-15.977388041420308", "36.73122895223354", "2023-09-26 10:16:52"),
    ("254084", "-10.322274676749569", "33.49675640446808", "2023-10-06 09:57:10"),
    ("77399", "-58.76801724645433", "15.887782919284154", "2022-03-05 14:29:04"),
    ("62302", "-42.01706826036833", "8.527271132686408", "2022-01-18 13:44:45"),
];

pub fn tmp_dir(name: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "helio_split_it_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).expect("create tmp dir");
    p
}

pub fn row(heliostat: &str, sample: (&str, &str, &str, &str)) -> String {
    let (id, az, el, ts) = sample;
    format!("{id},{heliostat},{az},{el},{ts},multi_focus_tower\n")
}

/// Writes the AA23 fixture (rows in `order`) plus any `extra` rows.
pub fn write_metadata(dir: &Path, order: &[usize], extra: &[String]) -> PathBuf {
    let mut csv = format!("{HEADER}\n");
    for &i in order {
        csv.push_str(&row("AA23", AA23[i]));
    }
    for r in extra {
        csv.push_str(r);
    }
    let path = dir.join("calibration_metadata.csv");
    fs::write(&path, csv).expect("write metadata");
    path
}

pub fn aa23(dir: &Path) -> PathBuf {
    let order: Vec<usize> = (0..AA23.len()).collect();
    write_metadata(dir, &order, &[])
}

pub fn dir_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut d| d.next().is_none())
        .unwrap_or(true)
}
