//! # PSV conversion
//!
//! Reading an MPCReport.txt apart into header and observation lines, and
//! writing the whole batch back out as an ADES PSV file. Two table layouts
//! exist: the plain one, and a wider one with uncertainty columns that can
//! only be filled when the matching Astrometrica session log was found.
//!
//! ## Overview
//!
//! - [`read_mpcreport_file`]: split a report into header and body lines
//! - [`find_astrometrica_log`]: locate the session log next to the report
//! - [`PsvRow`]: one output row with the Astrometrica-specific adjustments
//!   applied (magnitude rounding, catalog substitution)
//! - [`convert_mpcreport_to_psv`]: the whole file-to-file conversion
//!
//! Tracking-label-only records are measured by Astrometrica but are not
//! reportable observations, so they are parsed for validation and then left
//! out of the PSV table.

use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};

use crate::astrometrica_log::{read_astrometrica_logfile, LogMeasurement};
use crate::constants::{ArcSec, CONVERTER_VERSION, catalog_for_net_name};
use crate::errors::Mpc2AdesError;
use crate::obs_context::{parse_header, SiteConfig};
use crate::record::ObservationRecord;

/// Header-line prefixes of the MPC 1992 format.
const HEADER_PREFIXES: [&str; 9] = [
    "COD", "CON", "OBS", "MEA", "TEL", "ACK", "AC2", "COM", "NET",
];

/// Split a report file into header lines and observation lines.
///
/// The `----- end -----` trailer is dropped; everything else that does not
/// carry a header prefix lands in the body, blank lines included.
pub fn read_mpcreport_file(
    mpcreport_file: &Utf8Path,
) -> Result<(Vec<String>, Vec<String>), Mpc2AdesError> {
    let content = fs::read_to_string(mpcreport_file)?;
    let mut header = Vec::new();
    let mut body = Vec::new();
    for line in content.lines() {
        let line = line.trim_end();
        if line.get(..3).is_some_and(|p| HEADER_PREFIXES.contains(&p)) {
            header.push(line.to_string());
        } else if !line.contains("----- end -----") {
            body.push(line.to_string());
        }
    }
    Ok((header, body))
}

/// Look for an `Astrometrica.log` in the directory of the report file.
pub fn find_astrometrica_log(mpcreport: &Utf8Path) -> Option<Utf8PathBuf> {
    let directory = mpcreport.parent().unwrap_or(Utf8Path::new(""));
    let log = directory.join("Astrometrica.log");
    if fs::File::open(&log).is_ok() {
        Some(log)
    } else {
        warn!(
            "Could not find matching Astrometrica.log to {} in {}",
            mpcreport.file_name().unwrap_or(""),
            directory
        );
        None
    }
}

/// Resolve a `NET` header line to an ADES catalog name.
///
/// Returns an empty string when the header has no `NET` line, and `" "` when
/// the named catalog is not recognized.
pub fn map_net_to_catalog(header: &[String]) -> String {
    let mut catalog = String::new();
    for line in header {
        if line.contains("NET ") {
            let name = line.trim_end().get(4..).unwrap_or("");
            catalog = catalog_for_net_name(name).unwrap_or(" ").to_string();
        }
    }
    catalog
}

/// Round a magnitude field to one decimal, left-justified in five columns.
///
/// A field that does not parse as a number passes through unchanged.
fn round_mag(mag: &str) -> String {
    match mag.trim().parse::<f64>() {
        Ok(value) => format!("{:<5}", format!("{value:.1}")),
        Err(_) => mag.to_string(),
    }
}

// -------------------------------------------------------------------------------------------------
// Output rows
// -------------------------------------------------------------------------------------------------

/// One PSV output row.
///
/// Carries the adjustments Astrometrica output needs on top of a plain record
/// decode: the magnitude is rounded to one decimal, a blank catalog code is
/// replaced by the `NET` line catalog, and the photometric catalog always
/// equals the astrometric one.
#[derive(Debug, Clone, PartialEq)]
pub struct PsvRow {
    pub total_id: String,
    pub perm_id: String,
    pub prov_id: String,
    pub trk_sub: String,
    pub mode: &'static str,
    pub stn: String,
    pub prog: &'static str,
    pub obs_time: String,
    pub ra: String,
    pub dec: String,
    pub ast_cat: String,
    pub mag: String,
    pub band: char,
    pub phot_cat: String,
    pub notes: char,
    pub remarks: String,
}

impl PsvRow {
    pub fn from_record(record: &ObservationRecord, net_catalog: &str) -> Self {
        let ast_cat = if record.ast_cat == ' ' && !net_catalog.is_empty() {
            net_catalog.to_string()
        } else {
            record.ast_cat.to_string()
        };
        PsvRow {
            total_id: record.total_id.clone(),
            perm_id: record.identity.perm_id.clone().unwrap_or_default(),
            prov_id: record.identity.prov_id.clone().unwrap_or_default(),
            trk_sub: record.identity.trk_sub.clone().unwrap_or_default(),
            mode: record.mode,
            stn: record.station.clone(),
            prog: record.prog,
            obs_time: record.obs_time.clone(),
            ra: record.ra.clone(),
            dec: record.dec.clone(),
            phot_cat: ast_cat.clone(),
            ast_cat,
            mag: round_mag(&record.mag),
            band: record.band,
            notes: record.note,
            remarks: String::new(),
        }
    }

    /// Render the row for the plain table layout.
    pub fn plain_text(&self) -> String {
        format!(
            "{:>7}|{:<11}|{:>8}|{:>4}|{:<4}|{:>4}|{:<23}|{:>11}|{:>11}|{:>8}|{:>5}|{:>6}|{:>8}|{:<5}|{}",
            self.perm_id,
            self.prov_id,
            self.trk_sub,
            self.mode,
            self.stn,
            self.prog,
            self.obs_time,
            self.ra,
            self.dec,
            self.ast_cat,
            self.mag,
            self.band,
            self.phot_cat,
            self.notes,
            self.remarks
        )
    }

    /// Render the row for the rms table layout.
    ///
    /// `average_seeing` replaces a zero FWHM, which Astrometrica writes for
    /// detections too faint for a profile fit.
    pub fn rms_text(&self, measurement: &LogMeasurement, average_seeing: Option<ArcSec>) -> String {
        let log_snr = measurement
            .snr
            .parse::<f64>()
            .ok()
            .filter(|snr| *snr > 0.0)
            .map(|snr| format!("{:6.4}", snr.log10()))
            .unwrap_or_else(|| "    ".to_string());
        let seeing = if measurement.fwhm != "0.0" {
            measurement
                .fwhm
                .parse::<f64>()
                .map(|fwhm| format!("{fwhm:6.4}"))
                .unwrap_or_else(|_| "    ".to_string())
        } else {
            format!("{:6.4}", average_seeing.unwrap_or(0.0))
        };
        let phot_ap = measurement
            .phot_ap
            .map(|ap| ap.to_string())
            .unwrap_or_default();
        format!(
            "{:>7}|{:<11}|{:>8}|{:>4}|{:<4}|{:>4}|{:<23}|{:>11}|{:>11}|{:>5}|{:>6}|{:>8}|{:>5}|{:>6}|{:>4}|{:>8}|{:>6}|{:>6}|{:>6}|{:<5}|{}",
            self.perm_id,
            self.prov_id,
            self.trk_sub,
            self.mode,
            self.stn,
            self.prog,
            self.obs_time,
            self.ra,
            self.dec,
            measurement.rms_ra,
            measurement.rms_dec,
            self.ast_cat,
            self.mag,
            measurement.rms_mag,
            self.band,
            self.phot_cat,
            phot_ap,
            log_snr,
            seeing,
            self.notes,
            self.remarks
        )
    }
}

fn plain_table_header() -> String {
    format!(
        "{:>7}|{:<11}|{:>8}|{:>4}|{:<4}|{:>4}|{:<23}|{:>11}|{:>11}|{:>8}|{:>5}|{:>6}|{:>8}|{:<5}|{}",
        "permID",
        "provID",
        "trkSub",
        "mode",
        "stn",
        "prog",
        "obsTime",
        "ra",
        "dec",
        "astCat",
        "mag",
        "band",
        "photCat",
        "notes",
        "remarks"
    )
}

fn rms_table_header() -> String {
    format!(
        "{:>7}|{:<11}|{:>8}|{:>4}|{:<4}|{:>4}|{:<23}|{:>11}|{:>11}|{:>5}|{:>6}|{:>8}|{:>5}|{:>6}|{:>4}|{:>8}|{:>6}|{:>6}|{:>6}|{:<5}|{}",
        "permID",
        "provID",
        "trkSub",
        "mode",
        "stn",
        "prog",
        "obsTime",
        "ra",
        "dec",
        "rmsRA",
        "rmsDec",
        "astCat",
        "mag",
        "rmsMag",
        "band",
        "photCat",
        "photAp",
        "logSNR",
        "seeing",
        "notes",
        "remarks"
    )
}

// -------------------------------------------------------------------------------------------------
// File conversion
// -------------------------------------------------------------------------------------------------

/// Convert an Astrometrica-produced MPCReport.txt to an ADES PSV file.
///
/// Arguments
/// -----------------
/// * `mpcreport`: the MPC 1992 report file.
/// * `out_file`: where to write the PSV output.
/// * `rms_available`: ask for the rms table layout. Silently downgraded to
///   the plain layout when no log is given or the log has no measurements.
/// * `astrometrica_log`: the session log to take uncertainties from.
/// * `config`: site table for the obsContext header.
///
/// Return
/// ----------
/// * The number of observation rows written.
pub fn convert_mpcreport_to_psv(
    mpcreport: &Utf8Path,
    out_file: &Utf8Path,
    rms_available: bool,
    astrometrica_log: Option<&Utf8Path>,
    config: &SiteConfig,
) -> Result<usize, Mpc2AdesError> {
    let (header, body) = read_mpcreport_file(mpcreport)?;
    if header.is_empty() || body.is_empty() {
        return Err(Mpc2AdesError::EmptyReport(mpcreport.to_string()));
    }
    info!(
        "Read {} header lines,{} observation lines from {}",
        header.len(),
        body.len(),
        mpcreport
    );

    let mut rms_available = rms_available;
    let mut summary = None;
    if rms_available {
        match astrometrica_log {
            Some(log) => {
                let scraped = read_astrometrica_logfile(log)?;
                if scraped.measurements.is_empty() {
                    warn!("No measurements found in {log}, writing the plain layout");
                    rms_available = false;
                }
                summary = Some(scraped);
            }
            None => rms_available = false,
        }
    }
    let measurements: &[LogMeasurement] = summary
        .as_ref()
        .map(|s| s.measurements.as_slice())
        .unwrap_or(&[]);
    let average_seeing = {
        let fwhm_values: Vec<ArcSec> = measurements
            .iter()
            .filter(|m| m.fwhm != "0.0")
            .filter_map(|m| m.fwhm.parse().ok())
            .collect();
        if fwhm_values.is_empty() {
            None
        } else {
            Some(fwhm_values.iter().sum::<f64>() / fwhm_values.len() as f64)
        }
    };

    let mut psv_header = parse_header(&header, config)?;
    if rms_available {
        if let Some(summary) = &summary {
            if !summary.version.is_empty() {
                psv_header.push_str(&format!(
                    "# software\n! astrometry {0}\n! photometry {0}\n! objectDetection {0}\n",
                    summary.version
                ));
            }
        }
    }
    psv_header.push_str(&format!(
        "# comment\n! line Converted to PSV with {CONVERTER_VERSION}\n"
    ));

    let mut out = fs::File::create(out_file)?;
    writeln!(out, "{}", psv_header.trim_end())?;
    if rms_available {
        writeln!(out, "{}", rms_table_header())?;
    } else {
        writeln!(out, "{}", plain_table_header())?;
    }

    let net_catalog = map_net_to_catalog(&header);
    let mut num_objects = 0;
    for line in &body {
        if line.is_empty() {
            continue;
        }
        let record = ObservationRecord::parse(line)?;
        if record.identity.trk_sub.is_some() {
            continue;
        }
        let row = PsvRow::from_record(&record, &net_catalog);
        if rms_available {
            let measurement = measurements
                .iter()
                .find(|m| m.total_id == record.total_id && m.obs_time == record.obs_time)
                .ok_or_else(|| Mpc2AdesError::LogMeasurementNotFound {
                    total_id: record.total_id.clone(),
                    obs_time: record.obs_time.clone(),
                })?;
            writeln!(out, "{}", row.rms_text(measurement, average_seeing))?;
        } else {
            writeln!(out, "{}", row.plain_text())?;
        }
        num_objects += 1;
    }

    Ok(num_objects)
}
