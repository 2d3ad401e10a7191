use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::data::{labradar, magnetospeed};
use crate::state::chrono_series::ChronoSeries;

/// LabRadar keeps its series directories under this directory at the root of the SD card.
const LABRADAR_ROOT_DIR: &str = "LBR";
/// Present inside each series directory; seeing it means we are one level too deep.
const LABRADAR_TRACK_DIR: &str = "TRK";
const REPORT_SUFFIX: &str = "Report.csv";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("cannot read directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to find chronograph data in '{0}'")]
    NoData(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceKind {
    LabRadar,
    MagnetoSpeed,
}

impl DeviceKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::LabRadar => "LabRadar",
            DeviceKind::MagnetoSpeed => "MagnetoSpeed",
        }
    }
}

/// One independent data source found while scanning.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub device: DeviceKind,
    /// Series directory root for LabRadar, the CSV file for MagnetoSpeed.
    pub path: PathBuf,
    pub series: Vec<ChronoSeries>,
}

impl Candidate {
    pub fn shot_count(&self) -> usize {
        self.series.iter().map(|s| s.shot_count()).sum()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} series, {} shots - {}",
            self.device.label(),
            self.series.len(),
            self.shot_count(),
            self.path.display()
        )
    }
}

fn series_dir_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^SR\d{4}").expect("series directory pattern is valid"))
}

/// Scan a directory for chronograph data.
///
/// Every source found is returned as its own candidate; choosing between
/// several is left to the caller.
pub fn scan_directory(root: &Path) -> Result<Vec<Candidate>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    tracing::info!("Scanning {:?} for chronograph data", root);

    let mut candidates = scan_magnetospeed(root)?;

    let lr_root = resolve_labradar_root(root);
    if let Some(candidate) = scan_labradar(&lr_root)? {
        candidates.push(candidate);
    }

    if candidates.is_empty() {
        tracing::info!("No chronograph data found in {:?}", root);
        return Err(ScanError::NoData(root.to_path_buf()));
    }
    for c in &candidates {
        tracing::info!("Found {c}");
    }
    Ok(candidates)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut entries = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Every CSV directly in `dir` that parses as MagnetoSpeed becomes a candidate.
fn scan_magnetospeed(dir: &Path) -> Result<Vec<Candidate>, std::io::Error> {
    let mut found = Vec::new();
    for path in sorted_entries(dir)? {
        if !path.is_file() || !has_csv_extension(&path) {
            continue;
        }
        tracing::debug!("Trying {:?} as MagnetoSpeed", path);
        let series = magnetospeed::parse_file(&path);
        if !series.is_empty() {
            found.push(Candidate {
                device: DeviceKind::MagnetoSpeed,
                path,
                series,
            });
        }
    }
    Ok(found)
}

/// Handle the user picking the SD card root (series live in `LBR/`) or a
/// single series directory (the real root is one level up).
pub fn resolve_labradar_root(root: &Path) -> PathBuf {
    let mut path = root.to_path_buf();

    let lbr = path.join(LABRADAR_ROOT_DIR);
    if lbr.is_dir() {
        tracing::info!("Detected LabRadar directory {:?}, using it instead", lbr);
        path = lbr;
    }

    if path.join(LABRADAR_TRACK_DIR).is_dir() {
        let canonical = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if let Some(parent) = canonical.parent() {
            tracing::info!("Inside a LabRadar series directory, using {:?} instead", parent);
            path = parent.to_path_buf();
        }
    }

    path
}

fn find_report(series_dir: &Path) -> Result<Option<PathBuf>, std::io::Error> {
    let reports: Vec<PathBuf> = sorted_entries(series_dir)?
        .into_iter()
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.ends_with(REPORT_SUFFIX))
                    .unwrap_or(false)
        })
        .collect();
    if reports.len() > 1 {
        tracing::warn!("{:?} holds {} report files, using the first", series_dir, reports.len());
    }
    Ok(reports.into_iter().next())
}

fn scan_labradar(dir: &Path) -> Result<Option<Candidate>, std::io::Error> {
    let mut series = Vec::new();

    for path in sorted_entries(dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if !path.is_dir() || !series_dir_pattern().is_match(&name) {
            continue;
        }
        tracing::debug!("Detected LabRadar series directory {:?}", path);

        let report = match find_report(&path) {
            Ok(Some(report)) => report,
            Ok(None) => {
                tracing::debug!("No report CSV in {:?}, skipping", path);
                continue;
            }
            Err(e) => {
                tracing::warn!("Cannot list {:?}: {e}", path);
                continue;
            }
        };

        if let Some(s) = labradar::parse_file(&report, &name).into_series() {
            series.push(s);
        }
    }

    if series.is_empty() {
        return Ok(None);
    }
    series.sort_by_key(|s| s.series_number);
    Ok(Some(Candidate {
        device: DeviceKind::LabRadar,
        path: dir.to_path_buf(),
        series,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::labradar::tests::report_text;
    use crate::data::magnetospeed::tests::series_block;
    use tempfile::TempDir;

    fn write_series_dir(parent: &Path, name: &str, number: u32, velocities: &[u32]) {
        let dir = parent.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(format!("{name} Report.csv")),
            report_text(number, "fps", velocities),
        )
        .unwrap();
    }

    #[test]
    fn finds_labradar_series_directories() {
        let tmp = TempDir::new().unwrap();
        write_series_dir(tmp.path(), "SR0002", 2, &[2900, 2910]);
        write_series_dir(tmp.path(), "SR0001", 1, &[2950, 2960]);
        write_series_dir(tmp.path(), "SR0003 deleted", 3, &[]);
        std::fs::create_dir(tmp.path().join("NOTES")).unwrap();

        let candidates = scan_directory(tmp.path()).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.device, DeviceKind::LabRadar);
        let names: Vec<&str> = c.series.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(names, vec!["SR0001", "SR0002"]);
        assert_eq!(c.shot_count(), 4);
    }

    #[test]
    fn reroots_into_lbr_directory() {
        let tmp = TempDir::new().unwrap();
        let lbr = tmp.path().join("LBR");
        write_series_dir(&lbr, "SR0001", 1, &[2950]);

        let candidates = scan_directory(tmp.path()).unwrap();
        assert_eq!(candidates[0].path, lbr);
    }

    #[test]
    fn reroots_out_of_series_directory() {
        let tmp = TempDir::new().unwrap();
        write_series_dir(tmp.path(), "SR0001", 1, &[2950]);
        write_series_dir(tmp.path(), "SR0002", 2, &[2960]);
        let inner = tmp.path().join("SR0001");
        std::fs::create_dir(inner.join("TRK")).unwrap();

        let candidates = scan_directory(&inner).unwrap();
        let lr = candidates
            .iter()
            .find(|c| c.device == DeviceKind::LabRadar)
            .unwrap();
        assert_eq!(lr.series.len(), 2);
    }

    #[test]
    fn surfaces_every_source() {
        let tmp = TempDir::new().unwrap();
        write_series_dir(tmp.path(), "SR0001", 1, &[2950]);
        std::fs::write(tmp.path().join("a.csv"), series_block(1, &[2900, 2901])).unwrap();
        std::fs::write(tmp.path().join("b.CSV"), series_block(5, &[2800])).unwrap();
        std::fs::write(tmp.path().join("junk.csv"), "hello,world\n").unwrap();

        let candidates = scan_directory(tmp.path()).unwrap();
        let devices: Vec<DeviceKind> = candidates.iter().map(|c| c.device).collect();
        assert_eq!(
            devices,
            vec![DeviceKind::MagnetoSpeed, DeviceKind::MagnetoSpeed, DeviceKind::LabRadar]
        );
        assert!(candidates[0].to_string().starts_with("MagnetoSpeed - 1 series, 2 shots - "));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "nothing here").unwrap();
        assert!(matches!(scan_directory(tmp.path()), Err(ScanError::NoData(_))));
        assert!(matches!(
            scan_directory(&tmp.path().join("missing")),
            Err(ScanError::NotADirectory(_))
        ));
    }
}
