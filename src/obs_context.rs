//! # Observation context parsing
//!
//! The header lines of an MPC 1992 report (`COD`, `OBS`, `MEA`, `TEL`) carry the
//! observing circumstances that ADES expects as an obsContext block. This module
//! parses those lines into an [`ObsContext`] and renders the PSV header text.
//!
//! ## Overview
//!
//! - [`SiteConfig`]: site names and submitters keyed by MPC station code, read
//!   from a TOML table (a built-in copy ships with the crate)
//! - [`ObsContext::parse`]: scan the report header lines
//! - [`Telescope::parse`]: decode a `TEL` line like `1.5-m f/3.3 reflector + CCD`
//! - [`parse_header`]: the full header-to-PSV-text pipeline
//!
//! The rendered output starts with the ADES version line and emits only the
//! blocks the report actually populated. A missing submitter is reported in the
//! log but does not fail the conversion.

use std::collections::BTreeMap;
use std::fs;

use camino::Utf8Path;
use log::warn;
use nom::{
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, multispace0, space1},
    combinator::{map, opt, rest},
    sequence::{preceded, terminated},
    IResult, Parser,
};
use serde::Deserialize;

use crate::constants::ADES_VERSION_LINE;
use crate::errors::Mpc2AdesError;

// -------------------------------------------------------------------------------------------------
// Site configuration
// -------------------------------------------------------------------------------------------------

/// Per-site details that the 80-column header cannot carry itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    observatory: BTreeMap<String, SiteEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SiteEntry {
    site_name: Option<String>,
    submitter: Option<String>,
}

impl SiteConfig {
    /// The site table compiled into the crate.
    pub fn builtin() -> Result<Self, Mpc2AdesError> {
        Ok(toml::from_str(include_str!("data/sites.toml"))?)
    }

    /// Load a site table from a TOML file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, Mpc2AdesError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Observatory name for a station code, if configured.
    pub fn site_name(&self, site_code: &str) -> Option<&str> {
        self.observatory
            .get(site_code)
            .and_then(|entry| entry.site_name.as_deref())
    }

    /// Fallback submitter for a station code, if configured.
    pub fn submitter(&self, site_code: &str) -> Option<&str> {
        self.observatory
            .get(site_code)
            .and_then(|entry| entry.submitter.as_deref())
    }
}

// -------------------------------------------------------------------------------------------------
// Telescope line
// -------------------------------------------------------------------------------------------------

/// Decoded `TEL` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telescope {
    /// Aperture in meters, kept verbatim from the `<aperture>-m` token.
    pub aperture: String,
    /// Focal ratio rendered with one decimal, when the line carries an `f/` token.
    pub f_ratio: Option<String>,
    pub design: String,
    pub detector: String,
}

impl Telescope {
    /// Parse the text after `TEL `, e.g. `"1.0-m f/8 Ritchey-Chretien + CCD"`.
    ///
    /// The design may span several words; the detector is everything after the
    /// first `+`. An `f/` token that does not parse as a number is dropped.
    pub fn parse(code_line: &str) -> Result<Self, Mpc2AdesError> {
        telescope_line(code_line)
            .map(|(_, telescope)| telescope)
            .map_err(|_e| Mpc2AdesError::InvalidTelescopeLine(code_line.to_string()))
    }
}

fn aperture_token(input: &str) -> IResult<&str, &str> {
    terminated(
        take_while1(|c: char| c.is_ascii_digit() || c == '.'),
        tag("-m"),
    )
    .parse(input)
}

fn f_ratio_token(input: &str) -> IResult<&str, &str> {
    preceded(tag("f/"), take_while1(|c: char| !c.is_whitespace())).parse(input)
}

fn telescope_line(input: &str) -> IResult<&str, Telescope> {
    map(
        (
            preceded(multispace0, aperture_token),
            opt(preceded(space1, f_ratio_token)),
            preceded(space1, take_until("+")),
            preceded(char('+'), rest),
        ),
        |(aperture, f_ratio, design, detector)| Telescope {
            aperture: aperture.to_string(),
            f_ratio: f_ratio.and_then(format_f_ratio),
            design: design.trim().to_string(),
            detector: detector.trim().to_string(),
        },
    )
    .parse(input)
}

fn format_f_ratio(raw: &str) -> Option<String> {
    raw.parse::<f64>().ok().map(|ratio| format!("{ratio:.1}"))
}

// -------------------------------------------------------------------------------------------------
// Header lines
// -------------------------------------------------------------------------------------------------

/// Observing circumstances collected from the report header.
///
/// Repeated header lines of the same kind overwrite each other, the last one
/// wins. Observer and measurer names come from comma-separated `OBS`/`MEA`
/// lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObsContext {
    pub site_code: String,
    pub site_name: Option<String>,
    pub observers: Vec<String>,
    pub measurers: Vec<String>,
    pub telescope: Option<Telescope>,
}

impl ObsContext {
    /// Scan report header lines for `COD`, `OBS`, `MEA` and `TEL` entries.
    pub fn parse(header_lines: &[String], config: &SiteConfig) -> Result<Self, Mpc2AdesError> {
        let mut context = ObsContext::default();
        for line in header_lines {
            let prefix = line.get(..3).unwrap_or("");
            let code_line = line.get(4..).unwrap_or("");
            match prefix {
                "COD" => {
                    context.site_code = code_line.trim().to_string();
                    context.site_name = config.site_name(&context.site_code).map(str::to_string);
                }
                "OBS" => context.observers = split_names(code_line),
                "MEA" => context.measurers = split_names(code_line),
                "TEL" => context.telescope = Some(Telescope::parse(code_line)?),
                _ => {}
            }
        }
        Ok(context)
    }

    /// Submitter of the batch: the first measurer, or the configured fallback
    /// for the site when no `MEA` line was present.
    pub fn submitter(&self, config: &SiteConfig) -> Option<String> {
        match self.measurers.first() {
            Some(first) if !first.is_empty() => Some(first.clone()),
            Some(_) => None,
            None => config.submitter(&self.site_code).map(str::to_string),
        }
    }

    /// Render the obsContext blocks, starting with the ADES version line.
    pub fn to_psv_header(&self, config: &SiteConfig) -> String {
        let mut header = String::from(ADES_VERSION_LINE);
        header.push('\n');
        if !self.site_code.is_empty() {
            header.push_str("# observatory\n");
            header.push_str(&format!("! mpcCode {}\n", self.site_code));
            if let Some(name) = &self.site_name {
                header.push_str(&format!("! name {name}\n"));
            }
        }
        match self.submitter(config) {
            Some(name) => {
                header.push_str("# submitter\n");
                header.push_str(&format!("! name {name}\n"));
            }
            None => {
                if self.measurers.is_empty() {
                    warn!("Could not determine submitter from measurers");
                    warn!("Either fix MEA line or configure a submitter for the site");
                }
                warn!("Error: Submitter is required");
            }
        }
        if !self.observers.is_empty() {
            header.push_str(&name_block("observers", &self.observers));
        }
        if !self.measurers.is_empty() {
            header.push_str(&name_block("measurers", &self.measurers));
        }
        if let Some(telescope) = &self.telescope {
            header.push_str("# telescope\n");
            header.push_str(&format!("! aperture {}\n", telescope.aperture));
            header.push_str(&format!("! design {}\n", telescope.design));
            header.push_str(&format!("! detector {}\n", telescope.detector));
            if let Some(f_ratio) = &telescope.f_ratio {
                header.push_str(&format!("! fRatio {f_ratio}\n"));
            }
        }
        header
    }
}

fn split_names(code_line: &str) -> Vec<String> {
    code_line
        .split(',')
        .map(|name| name.trim().to_string())
        .collect()
}

fn name_block(title: &str, names: &[String]) -> String {
    let mut block = format!("# {title}\n");
    for name in names {
        block.push_str("! name ");
        block.push_str(name);
        block.push('\n');
    }
    block
}

/// Parse report header lines and render the PSV obsContext text.
pub fn parse_header(
    header_lines: &[String],
    config: &SiteConfig,
) -> Result<String, Mpc2AdesError> {
    let context = ObsContext::parse(header_lines, config)?;
    Ok(context.to_psv_header(config))
}

#[cfg(test)]
mod context_header_tests {
    use super::*;

    fn header(lines: &[&str]) -> String {
        let lines: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
        parse_header(&lines, &SiteConfig::builtin().unwrap()).unwrap()
    }

    #[test]
    fn observatory_block_names_configured_sites() {
        let expected = "# version=2022\n\
                        # observatory\n\
                        ! mpcCode G96\n\
                        ! name Catalina Sky Survey\n";
        assert_eq!(header(&["COD G96"]), expected);

        let expected = "# version=2022\n\
                        # observatory\n\
                        ! mpcCode G99\n";
        assert_eq!(header(&["COD G99"]), expected);
    }

    #[test]
    fn first_measurer_becomes_the_submitter() {
        let expected = "# version=2022\n\
                        # submitter\n\
                        ! name R. L. Seaman\n\
                        # measurers\n\
                        ! name R. L. Seaman\n\
                        ! name E. J. Christensen\n";
        assert_eq!(header(&["MEA R. L. Seaman, E. J. Christensen"]), expected);
    }

    #[test]
    fn configured_submitter_covers_reports_without_measurers() {
        let expected = "# version=2022\n\
                        # observatory\n\
                        ! mpcCode Z99\n\
                        # submitter\n\
                        ! name J. R. Random\n";
        assert_eq!(header(&["COD Z99"]), expected);
    }

    #[test]
    fn observer_names_split_on_commas() {
        let expected = "# version=2022\n\
                        # observers\n\
                        ! name R. L. Seaman\n\
                        ! name D. C. Fuls\n";
        assert_eq!(header(&["OBS R. L. Seaman, D. C. Fuls"]), expected);
    }

    #[test]
    fn telescope_lines_carry_an_optional_focal_ratio() {
        let plain = Telescope::parse("1.5-m reflector + CCD").unwrap();
        assert_eq!(
            plain,
            Telescope {
                aperture: "1.5".to_string(),
                f_ratio: None,
                design: "reflector".to_string(),
                detector: "CCD".to_string(),
            }
        );

        let with_ratio = Telescope::parse("1.0-m f/8 Ritchey-Chretien + CCD").unwrap();
        assert_eq!(with_ratio.f_ratio.as_deref(), Some("8.0"));
        assert_eq!(with_ratio.design, "Ritchey-Chretien");
    }

    #[test]
    fn telescope_design_may_span_words() {
        let telescope = Telescope::parse("0.6-m f/5.7 Schmidt-Cassegrain reflector + CMOS").unwrap();
        assert_eq!(telescope.aperture, "0.6");
        assert_eq!(telescope.f_ratio.as_deref(), Some("5.7"));
        assert_eq!(telescope.design, "Schmidt-Cassegrain reflector");
        assert_eq!(telescope.detector, "CMOS");
    }

    #[test]
    fn telescope_without_detector_separator_is_rejected() {
        assert_eq!(
            Telescope::parse("1.5-m reflector"),
            Err(Mpc2AdesError::InvalidTelescopeLine(
                "1.5-m reflector".to_string()
            ))
        );
    }

    #[test]
    fn unparseable_focal_ratio_is_dropped() {
        let telescope = Telescope::parse("1.5-m f/x reflector + CCD").unwrap();
        assert_eq!(telescope.f_ratio, None);
        assert_eq!(telescope.design, "reflector");
    }

    #[test]
    fn telescope_block_renders_after_names() {
        let expected = "# version=2022\n\
                        # telescope\n\
                        ! aperture 1.5\n\
                        ! design reflector\n\
                        ! detector CCD\n\
                        ! fRatio 3.3\n";
        assert_eq!(header(&["TEL 1.5-m f/3.3 reflector + CCD"]), expected);
    }
}
