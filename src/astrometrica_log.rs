//! # Astrometrica log scraping
//!
//! Astrometrica writes a free-form session log next to its MPCReport.txt. The
//! log is the only place that records the measurement uncertainties, the SNR
//! and FWHM of each detection, the astrometric fit quality per image and the
//! photometry aperture. This module scrapes those numbers back out so the PSV
//! writer can fill the rms columns.
//!
//! ## Overview
//!
//! - [`read_astrometrica_logfile`] / [`scrape_log`]: pull the program version,
//!   per-image fit statistics and per-measurement uncertainties out of a log
//! - [`LogMeasurement`]: one measured position, keyed by the packed identifier
//!   field and the derived ADES timestamp
//!
//! Uncertainty values are kept as the strings found in the log; they are
//! written to the PSV columns verbatim.

use std::fs;

use camino::Utf8Path;
use log::warn;
use regex::Regex;

use crate::constants::ArcSec;
use crate::errors::Mpc2AdesError;
use crate::record::ObservationRecord;

/// Astrometric fit quality of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStats {
    pub nstars: String,
    pub d_ra: String,
    pub d_dec: String,
    /// Photometric fit rms, filled when the log also has a photometry block.
    pub d_mag: Option<String>,
}

/// One measured position with its uncertainties.
///
/// `total_id` and `obs_time` identify the matching 80-column record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMeasurement {
    pub total_id: String,
    pub obs_time: String,
    pub rms_ra: String,
    pub rms_dec: String,
    pub rms_mag: String,
    pub snr: String,
    pub fwhm: String,
    /// Photometry aperture radius, when the log states both the aperture
    /// radius in pixels and the pixel scale.
    pub phot_ap: Option<ArcSec>,
}

/// Everything worth keeping from one Astrometrica session log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSummary {
    /// Program version string, empty when the log never states it.
    pub version: String,
    pub images: Vec<(String, ImageStats)>,
    pub measurements: Vec<LogMeasurement>,
}

/// Read and scrape an Astrometrica log file.
pub fn read_astrometrica_logfile(log: &Utf8Path) -> Result<LogSummary, Mpc2AdesError> {
    let content = fs::read_to_string(log)?;
    scrape_log(&content)
}

/// Scrape log text.
///
/// The log interleaves settings, per-image astrometry and photometry blocks
/// and per-object position blocks. Each block is recognized by its first line
/// and consumes a fixed number of following lines. A position block whose
/// detail lines do not have the expected layout is reported and skipped; an
/// unreadable 80-column line inside a position block fails the whole scrape.
pub fn scrape_log(content: &str) -> Result<LogSummary, Mpc2AdesError> {
    // image and measurement block openers
    let images_regex = Regex::new(r"^\d{2}:\d{2}:\d{2} - Astrometry of Image \d* \((.*)\):")
        .unwrap();
    let photom_regex = Regex::new(r"^\d{2}:\d{2}:\d{2} - Photometry of Image \d* \((.*)\):")
        .unwrap();
    let pos_regex = Regex::new(r"^(?:\d{2}:\d{2}:\d{2} - Position added|Moving Object)").unwrap();
    // settings lines
    let version_regex = Regex::new(r"^\s*(Astrometrica .+)").unwrap();
    let apradius_regex = Regex::new(r"^\s*Aperture Radius\s*=\s*(\d)").unwrap();
    // numbers inside the blocks
    let astrom_rms_regex = Regex::new(r#"(\d+)[^=]+=\s*([.0-9]+)"[^=]+=\s*([.0-9]+)""#).unwrap();
    let photom_rms_regex = Regex::new(r"(\d+)[^=]+=\s*([.0-9]+)").unwrap();
    let pos_rms_regex = Regex::new(r"([.0-9]+)").unwrap();
    let pix_size_regex = Regex::new(r#"([.0-9]+)""#).unwrap();

    let mut version = String::new();
    let mut images: Vec<(String, ImageStats)> = Vec::new();
    let mut measurements: Vec<LogMeasurement> = Vec::new();
    let mut ap_radius_pix: Option<f64> = None;
    let mut avg_pix_size: Option<f64> = None;

    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        if let Some(captures) = version_regex.captures(line) {
            version = captures[1].trim_end().to_string();
        } else if let Some(captures) = apradius_regex.captures(line) {
            ap_radius_pix = captures[1].parse().ok();
        } else if let Some(captures) = images_regex.captures(line) {
            let image = captures[1].to_string();
            let Some(line2) = lines.next() else { break };
            if let Some(fit) = astrom_rms_regex.captures(line2) {
                let stats = ImageStats {
                    nstars: fit[1].to_string(),
                    d_ra: fit[2].to_string(),
                    d_dec: fit[3].to_string(),
                    d_mag: None,
                };
                // a re-measured image replaces its earlier fit
                match images.iter_mut().find(|(name, _)| *name == image) {
                    Some(entry) => entry.1 = stats,
                    None => images.push((image, stats)),
                }
            }
            // the pixel scale sits on the sixth line of the block
            let mut scale_line = None;
            for _ in 0..6 {
                scale_line = lines.next();
                if scale_line.is_none() {
                    break;
                }
            }
            if let Some(scale_line) = scale_line {
                let sizes: Vec<f64> = pix_size_regex
                    .captures_iter(scale_line)
                    .filter_map(|c| c[1].parse().ok())
                    .collect();
                if sizes.len() == 2 {
                    avg_pix_size = Some((sizes[0] + sizes[1]) / 2.0);
                }
            }
        } else if let Some(captures) = photom_regex.captures(line) {
            let image = captures[1].to_string();
            let Some(line2) = lines.next() else { break };
            if let Some(fit) = photom_rms_regex.captures(line2) {
                match images.iter_mut().find(|(name, _)| *name == image) {
                    Some(entry) => entry.1.d_mag = Some(fit[2].to_string()),
                    None => warn!("Image not found in list to update"),
                }
            }
        } else if pos_regex.is_match(line) {
            let Some(line2) = lines.next() else { break };
            let chunks: Vec<&str> = line2.split_whitespace().collect();
            let detection = match chunks.len() {
                // object not known to Astrometrica: RA, Dec, mag, X, Y, flux, FWHM, SNR, fit rms
                13 => Some((chunks[10].to_string(), chunks[11].to_string())),
                // known object: the same with delta RA, delta Dec and delta mag columns
                16 => Some((chunks[13].to_string(), chunks[14].to_string())),
                _ => {
                    warn!("Unexpected number of fields in line:\n{line2}");
                    None
                }
            };
            let Some(line3) = lines.next() else { break };
            let rms: Vec<&str> = pos_rms_regex
                .find_iter(line3)
                .map(|m| m.as_str())
                .collect();
            let uncertainties = if rms.len() == 3 {
                Some((rms[0], rms[1], rms[2]))
            } else {
                warn!("Unexpected number of uncertainties in line:\n{line3}");
                None
            };
            let Some(line4) = lines.next() else { break };
            let record = ObservationRecord::parse(line4.trim_end())?;
            if let (Some((fwhm, snr)), Some((rms_ra, rms_dec, rms_mag))) = (detection, uncertainties)
            {
                let measurement = LogMeasurement {
                    total_id: record.total_id,
                    obs_time: record.obs_time,
                    rms_ra: rms_ra.to_string(),
                    rms_dec: rms_dec.to_string(),
                    rms_mag: rms_mag.to_string(),
                    snr,
                    fwhm,
                    phot_ap: None,
                };
                if !measurements.contains(&measurement) {
                    measurements.push(measurement);
                }
            }
        }
    }

    // with both an aperture radius and a pixel scale the photometry aperture
    // is known in arcsec and applies to every measurement of the session
    if let (Some(radius), Some(pix_size)) = (ap_radius_pix, avg_pix_size) {
        if radius != 0.0 && pix_size != 0.0 {
            let ap_arcsec = radius * pix_size;
            for measurement in &mut measurements {
                measurement.phot_ap = Some(ap_arcsec);
            }
        }
    }

    Ok(LogSummary {
        version,
        images,
        measurements,
    })
}

#[cfg(test)]
mod scrape_tests {
    use super::*;

    const LOG: &str = "\
Astrometrica 4.10.0.431
          Aperture Radius = 2 Pixels
19:22:15 - Astrometry of Image 1 (lsc1m005-fl15-20180215-0129-e11.fits):
  439 Stars used, dRA = 0.12\", dDec = 0.10\"
  Reference Catalog: Gaia DR2
  Focal length refined
  Position angle refined
  WCS solution accepted
  Plate constants computed
  Focal Length = 5421.71 mm, Pixel Size = 0.78\" x 0.78\"
19:22:20 - Photometry of Image 1 (lsc1m005-fl15-20180215-0129-e11.fits):
  439 Stars used, dmag = 0.10
19:45:22 - Position added:
   11 26 54.170           -04 24 44.70           20.20           2018.73  2063.05    1951   1.1   18.9  0.151
      RA RMS = 0.16\", Dec RMS = 0.10\", Mag RMS = 0.02
     K17BC1T KC2018 02 16.19817211 26 54.17 -04 24 44.7          20.2 G      W85
";

    #[test]
    fn version_and_image_fit_are_extracted() {
        let summary = scrape_log(LOG).unwrap();
        assert_eq!(summary.version, "Astrometrica 4.10.0.431");
        assert_eq!(
            summary.images,
            vec![(
                "lsc1m005-fl15-20180215-0129-e11.fits".to_string(),
                ImageStats {
                    nstars: "439".to_string(),
                    d_ra: "0.12".to_string(),
                    d_dec: "0.10".to_string(),
                    d_mag: Some("0.10".to_string()),
                }
            )]
        );
    }

    #[test]
    fn measurements_pick_up_the_aperture_in_arcsec() {
        let summary = scrape_log(LOG).unwrap();
        assert_eq!(
            summary.measurements,
            vec![LogMeasurement {
                total_id: "     K17BC1T".to_string(),
                obs_time: "2018-02-16T04:45:22.06Z".to_string(),
                rms_ra: "0.16".to_string(),
                rms_dec: "0.10".to_string(),
                rms_mag: "0.02".to_string(),
                snr: "18.9".to_string(),
                fwhm: "1.1".to_string(),
                phot_ap: Some(1.56),
            }]
        );
    }

    #[test]
    fn known_object_lines_use_the_wider_layout() {
        let log = "\
Moving Object detected:
   10 05 13.676   +3.44   +03 56 04.33   +0.58   19.77   -0.21   1650.78   898.43    5327   2.1   54.8  0.123
      RA RMS = 0.16\", Dec RMS = 0.15\", Mag RMS = 0.01
     K17V12R KC2018 03 06.40816110 05 13.67 +03 56 04.3          19.8 GV     V37
";
        let summary = scrape_log(log).unwrap();
        assert_eq!(summary.measurements.len(), 1);
        let measurement = &summary.measurements[0];
        assert_eq!(measurement.fwhm, "2.1");
        assert_eq!(measurement.snr, "54.8");
        assert_eq!(measurement.phot_ap, None);
    }

    #[test]
    fn repeated_positions_are_stored_once() {
        let block = "\
19:45:22 - Position added:
   11 26 54.170           -04 24 44.70           20.20           2018.73  2063.05    1951   1.1   18.9  0.151
      RA RMS = 0.16\", Dec RMS = 0.10\", Mag RMS = 0.02
     K17BC1T KC2018 02 16.19817211 26 54.17 -04 24 44.7          20.2 G      W85
";
        let log = format!("{block}{block}");
        let summary = scrape_log(&log).unwrap();
        assert_eq!(summary.measurements.len(), 1);
    }

    #[test]
    fn malformed_detail_lines_skip_the_measurement() {
        let log = "\
19:45:22 - Position added:
   only three words here
      RA RMS = 0.16\", Dec RMS = 0.10\", Mag RMS = 0.02
     K17BC1T KC2018 02 16.19817211 26 54.17 -04 24 44.7          20.2 G      W85
";
        let summary = scrape_log(log).unwrap();
        assert!(summary.measurements.is_empty());
    }

    #[test]
    fn a_remeasured_image_replaces_the_earlier_fit() {
        let log = "\
19:22:15 - Astrometry of Image 1 (frame.fits):
  439 Stars used, dRA = 0.12\", dDec = 0.10\"
a
b
c
d
e
f
19:30:00 - Astrometry of Image 1 (frame.fits):
  512 Stars used, dRA = 0.08\", dDec = 0.07\"
";
        let summary = scrape_log(log).unwrap();
        assert_eq!(summary.images.len(), 1);
        assert_eq!(summary.images[0].1.nstars, "512");
    }
}
