//! Reading fix logs and writing trip outputs.
//!
//! Input is CSV with `lat`, `lon` and `timestamp` columns (other columns are
//! ignored). Cells that are not numbers become NaN and are rejected by
//! validation rather than dropped here.
//!
//! A report is written to a directory as:
//! - `rejects.log` - rejected fixes with their reason
//! - `trip_<n>.csv` - the fixes of each trip
//! - `summaries.json` - summary per trip, keyed by trip name
//! - `trips.geojson` - one line feature per trip

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use serde::ser::{Serialize, Serializer};

use crate::error::{IoResultExt, Result, TripSplitError};
use crate::geometry::FeatureCollection;
use crate::{Fix, RejectedFix, Trip, TripReport};

pub const REJECTS_FILE: &str = "rejects.log";
pub const SUMMARIES_FILE: &str = "summaries.json";
pub const GEOJSON_FILE: &str = "trips.geojson";

#[derive(Debug, serde::Serialize)]
struct RejectRecord<'a> {
    index: usize,
    lat: f64,
    lon: f64,
    timestamp: String,
    reason: &'a str,
}

#[derive(Debug, serde::Serialize)]
struct TripFixRecord {
    lat: f64,
    lon: f64,
    timestamp: String,
    distance_km: f64,
    timedelta_min: f64,
}

fn parse_coordinate(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Read raw fixes from CSV. Row order becomes the fix index.
///
/// Empty input yields no fixes. Otherwise only a missing `lat`, `lon` or
/// `timestamp` header is an error. Short rows and cells that are not valid
/// UTF-8 still produce a fix (NaN coordinates or no timestamp) so validation
/// can reject it.
pub fn read_fixes<R: Read>(reader: R) -> Result<Vec<Fix>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.byte_headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let lat_col = column_index(&headers, "lat")?;
    let lon_col = column_index(&headers, "lon")?;
    let timestamp_col = column_index(&headers, "timestamp")?;

    let mut fixes = Vec::new();
    let mut record = csv::ByteRecord::new();
    while csv_reader.read_byte_record(&mut record)? {
        let cell = |i: usize| String::from_utf8_lossy(record.get(i).unwrap_or(b""));
        fixes.push(Fix::from_raw(
            fixes.len(),
            parse_coordinate(&cell(lat_col)),
            parse_coordinate(&cell(lon_col)),
            &cell(timestamp_col),
        ));
    }

    debug!("[Export] Read {} fixes", fixes.len());
    Ok(fixes)
}

fn column_index(headers: &csv::ByteRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| String::from_utf8_lossy(h).trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| TripSplitError::Csv {
            message: format!("missing '{}' column", name),
        })
}

/// Read raw fixes from a CSV file.
pub fn read_fixes_from_path(path: &Path) -> Result<Vec<Fix>> {
    let file = File::open(path).with_path(path)?;
    let fixes = read_fixes(file)?;
    info!("[Export] Loaded {} fixes from {}", fixes.len(), path.display());
    Ok(fixes)
}

/// Write the rejects log: `index,lat,lon,timestamp,reason`.
pub fn write_rejects<W: Write>(writer: W, rejected: &[RejectedFix]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for r in rejected {
        csv_writer.serialize(RejectRecord {
            index: r.fix.index,
            lat: r.fix.latitude,
            lon: r.fix.longitude,
            timestamp: r.fix.timestamp.as_ref().map(format_timestamp).unwrap_or_default(),
            reason: r.reason.as_str(),
        })?;
    }
    if rejected.is_empty() {
        csv_writer.write_record(["index", "lat", "lon", "timestamp", "reason"])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one trip's fixes: `lat,lon,timestamp,distance_km,timedelta_min`.
pub fn write_trip<W: Write>(writer: W, trip: &Trip) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for f in &trip.fixes {
        csv_writer.serialize(TripFixRecord {
            lat: f.fix.latitude,
            lon: f.fix.longitude,
            timestamp: format_timestamp(&f.fix.timestamp),
            distance_km: f.distance_from_prev_km,
            timedelta_min: f.time_from_prev_min,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Summaries as a JSON object keyed by trip name, in trip order.
struct NamedSummaries<'a>(&'a TripReport);

impl Serialize for NamedSummaries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.named_summaries())
    }
}

/// Write `{ "trip_0": {...}, "trip_1": {...} }`.
pub fn write_summaries<W: Write>(writer: W, report: &TripReport) -> Result<()> {
    serde_json::to_writer_pretty(writer, &NamedSummaries(report))?;
    Ok(())
}

/// Write the GeoJSON feature collection.
pub fn write_geojson<W: Write>(writer: W, features: &FeatureCollection) -> Result<()> {
    serde_json::to_writer(writer, features)?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path).with_path(path)?))
}

/// True for names this module writes per trip (`trip_<n>.csv`).
fn is_trip_file(name: &str) -> bool {
    name.strip_prefix("trip_")
        .and_then(|rest| rest.strip_suffix(".csv"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Delete `trip_<n>.csv` files left in `dir` by an earlier run.
fn remove_stale_trip_files(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir).with_path(dir)? {
        let path = entry.with_path(dir)?.path();
        let stale = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_trip_file);
        if stale && path.is_file() {
            fs::remove_file(&path).with_path(&path)?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!("[Export] Removed {} stale trip files from {}", removed, dir.display());
    }
    Ok(removed)
}

/// Write every output file of a report into `dir`, creating it if needed.
///
/// `trip_<n>.csv` files already in `dir` are deleted first, so the directory
/// never mixes trips from different runs. Other files are left alone.
///
/// Returns the paths written, in the order listed in the module docs.
pub fn write_report(dir: &Path, report: &TripReport) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_path(dir)?;
    remove_stale_trip_files(dir)?;
    let mut written = Vec::with_capacity(report.trips.len() + 3);

    let path = dir.join(REJECTS_FILE);
    write_rejects(create(&path)?, &report.rejected)?;
    written.push(path);

    for trip in &report.trips {
        let path = dir.join(format!("{}.csv", trip.name()));
        write_trip(create(&path)?, trip)?;
        written.push(path);
    }

    let path = dir.join(SUMMARIES_FILE);
    let mut out = create(&path)?;
    write_summaries(&mut out, report)?;
    out.flush().with_path(&path)?;
    written.push(path);

    let path = dir.join(GEOJSON_FILE);
    let mut out = create(&path)?;
    write_geojson(&mut out, &report.features)?;
    out.flush().with_path(&path)?;
    written.push(path);

    info!(
        "[Export] Wrote {} files ({} trips, {} rejects) to {}",
        written.len(),
        report.trips.len(),
        report.rejected.len(),
        dir.display()
    );

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{validate_fixes, RejectReason};

    #[test]
    fn test_read_fixes_tolerates_bad_cells() {
        let data = "\
id,lat,lon,timestamp
a,45.0,10.0,2023-05-01 08:00:00
b,abc,10.0,2023-05-01 08:01:00
c,45.0,10.0,
d,45.0,10.0,not-a-date
";
        let fixes = read_fixes(data.as_bytes()).unwrap();
        assert_eq!(fixes.len(), 4);
        assert!(fixes[0].timestamp.is_some());
        assert!(fixes[1].latitude.is_nan());
        assert!(fixes[2].timestamp.is_none());
        assert!(fixes[3].timestamp.is_none());
        assert_eq!(fixes[3].index, 3);
    }

    #[test]
    fn test_short_rows_are_kept() {
        let data = "\
lat,lon,timestamp
45.0,10.0,2023-05-01 08:00:00
45.0,10.0
45.0
45.0,10.0,2023-05-01 08:05:00
";
        let fixes = read_fixes(data.as_bytes()).unwrap();
        assert_eq!(fixes.len(), 4);
        assert!(fixes[1].timestamp.is_none());
        assert!(fixes[2].longitude.is_nan());
        assert_eq!(fixes[3].index, 3);

        let result = validate_fixes(&fixes);
        assert_eq!(result.valid.len(), 2);
        let reasons: Vec<_> = result.rejected.iter().map(|r| (r.fix.index, r.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (1, RejectReason::BadTimestamp),
                (2, RejectReason::InvalidCoordinatesAndBadTimestamp),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_cell_is_rejected() {
        let mut data = b"lat,lon,timestamp\n45.0,10.0,2023-05-01 08:00:00\n45.0,10.0,".to_vec();
        data.extend_from_slice(b"\xff\n");
        let fixes = read_fixes(data.as_slice()).unwrap();
        assert_eq!(fixes.len(), 2);

        let result = validate_fixes(&fixes);
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.rejected[0].fix.index, 1);
        assert_eq!(result.rejected[0].reason, RejectReason::BadTimestamp);
    }

    #[test]
    fn test_columns_found_by_name() {
        let data = "Timestamp,id,LON,lat\n2023-05-01 08:00:00,a,10.0,45.0\n";
        let fixes = read_fixes(data.as_bytes()).unwrap();
        assert_eq!(fixes[0].latitude, 45.0);
        assert_eq!(fixes[0].longitude, 10.0);
        assert!(fixes[0].timestamp.is_some());
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let err = read_fixes("lat,timestamp\n45.0,2023-05-01\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TripSplitError::Csv { .. }));
        assert!(err.to_string().contains("lon"));
    }

    #[test]
    fn test_empty_input_has_no_fixes() {
        assert!(read_fixes("".as_bytes()).unwrap().is_empty());
        assert!(read_fixes("lat,lon,timestamp\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_is_trip_file() {
        assert!(is_trip_file("trip_0.csv"));
        assert!(is_trip_file("trip_12.csv"));
        assert!(!is_trip_file("trip_.csv"));
        assert!(!is_trip_file("trip_a.csv"));
        assert!(!is_trip_file("trip_1.json"));
        assert!(!is_trip_file("rejects.log"));
    }

    #[test]
    fn test_write_rejects() {
        let raw = vec![
            Fix::from_raw(0, 95.0, 10.0, "2023-05-01 08:00:00"),
            Fix::from_raw(1, 45.0, 10.0, "bad"),
        ];
        let rejected = validate_fixes(&raw).rejected;
        assert_eq!(rejected[1].reason, RejectReason::BadTimestamp);

        let mut buf = Vec::new();
        write_rejects(&mut buf, &rejected).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index,lat,lon,timestamp,reason");
        assert_eq!(lines[1], "0,95.0,10.0,2023-05-01T08:00:00Z,invalid coordinates");
        assert_eq!(lines[2], "1,45.0,10.0,,bad timestamp");
    }

    #[test]
    fn test_write_rejects_empty_has_header() {
        let mut buf = Vec::new();
        write_rejects(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "index,lat,lon,timestamp,reason\n");
    }
}
