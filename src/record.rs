//! # 80-column observation records
//!
//! An MPC 1992 report line packs one optical observation into exactly 80
//! columns. Decoding is positional: every field sits at a fixed column range,
//! and a line either matches the optical shape completely or is rejected.
//! Two-line record kinds (satellite, roving observer, radar) do not fit this
//! shape and are reported as non-matching.
//!
//! ## Overview
//!
//! * [`ObservationRecord::parse`] validates the column grammar, the date and
//!   angle fields, the mode and note codes, and unpacks the identifier slice
//!   into an [`ObjectIdentity`].
//! * Records are write-once values: parse them, read the fields, write PSV.

use log::warn;

use crate::constants;
use crate::designation::ObjectIdentity;
use crate::errors::Mpc2AdesError;
use crate::sexagesimal;

/// One decoded optical observation line.
///
/// The sexagesimal source fields are kept verbatim next to their decimal
/// conversions, so output layers can choose either representation.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    /// Columns 1-12 exactly as they appeared in the line.
    pub total_id: String,
    pub identity: ObjectIdentity,
    pub discovery: char,
    pub note: char,
    /// Single-character mode code from column 15.
    pub code: char,
    /// ADES observation mode the code maps to.
    pub mode: &'static str,
    pub sub_fmt: &'static str,
    /// Columns 16-32, `"YYYY MM DD.ffffff"`.
    pub date: String,
    pub obs_time: String,
    /// Time precision in units of 1e-6 day.
    pub prec_time: u32,
    pub ra_sexagesimal: String,
    pub dec_sexagesimal: String,
    /// Right ascension in decimal degrees, printed at source resolution.
    pub ra: String,
    /// Declination in decimal degrees, printed at source resolution.
    pub dec: String,
    pub prec_ra: f64,
    pub prec_dec: f64,
    /// Columns 57-65, documented blank but not reliably so.
    pub reserved: String,
    /// Columns 66-70 verbatim, blank when no magnitude was reported.
    pub mag: String,
    pub band: char,
    /// Columns 72-77, the packed reference field.
    pub packed_ref: String,
    /// First character of the packed reference, the astrometric catalog code.
    pub ast_cat: char,
    pub prog: &'static str,
    pub station: String,
}

impl ObservationRecord {
    /// Decode one 80-column line.
    ///
    /// Arguments
    /// -----------------
    /// * `line`: the report line, without its trailing newline.
    ///
    /// Return
    /// ----------
    /// * The decoded record, or a [`Mpc2AdesError`] naming the first field
    ///   that failed validation. No partial records are returned.
    pub fn parse(line: &str) -> Result<Self, Mpc2AdesError> {
        let fail = |reason: String| Mpc2AdesError::InvalidRecordLine {
            reason,
            line: line.to_string(),
        };

        let length = line.chars().count();
        if length > 80 {
            return Err(fail(format!("{length} columns")));
        }
        if !line.is_ascii() || line.len() != 80 {
            return Err(fail("no match for line".to_string()));
        }
        let bytes: &[u8; 80] = line
            .as_bytes()
            .try_into()
            .map_err(|_| fail("no match for line".to_string()))?;
        if !optical_shape_ok(bytes) {
            return Err(fail("no match for line".to_string()));
        }

        let date = &line[15..32];
        let (obs_time, prec_time) = sexagesimal::check_date(date)?;
        let (ra, prec_ra) = sexagesimal::check_ra(&line[32..44])?;
        let (dec, prec_dec) = sexagesimal::check_dec(&line[44..56])?;

        let code = bytes[14] as char;
        if !constants::VALID_CODES.contains(code) {
            return Err(fail(format!("invalid mode code {code} in line ")));
        }
        let Some(mode) = constants::mode_for_code(code) else {
            return Err(fail(format!("invalid mode code {code} in line ")));
        };

        let note = bytes[13] as char;
        if !constants::VALID_NOTES.contains(note) {
            return Err(fail(format!("invalid note {note} in line ")));
        }

        let total_id = line[..12].to_string();
        let identity = ObjectIdentity::from_packed(&total_id)?;
        // advisory only: a non-canonical packing is a data-quality signal
        match identity.to_packed() {
            Ok(packed) if packed != total_id => {
                warn!("ID does not round-trip; {packed} vs. {total_id}");
            }
            Ok(_) => {}
            Err(_) => warn!("fails pack: {}", identity.triple_text()),
        }

        Ok(ObservationRecord {
            total_id,
            identity,
            discovery: bytes[12] as char,
            note,
            code,
            mode,
            sub_fmt: "M92",
            date: date.to_string(),
            obs_time,
            prec_time,
            ra_sexagesimal: line[32..44].to_string(),
            dec_sexagesimal: line[44..56].to_string(),
            ra,
            dec,
            prec_ra,
            prec_dec,
            reserved: line[56..65].to_string(),
            mag: line[65..70].to_string(),
            band: bytes[70] as char,
            packed_ref: line[71..77].to_string(),
            ast_cat: bytes[71] as char,
            prog: "  ",
            station: line[77..80].to_string(),
        })
    }
}

/// Column-class check for the one-line optical shape.
fn optical_shape_ok(bytes: &[u8; 80]) -> bool {
    bytes[..12]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b' ')
        && matches!(bytes[12], b' ' | b'*' | b'+')
        && is_optical_code(bytes[14])
        && bytes[15..19].iter().all(u8::is_ascii_digit)
        && (bytes[19] == b' ' || (b'a'..=b'e').contains(&bytes[19]))
        && bytes[20..32].iter().all(is_angle_byte)
        && bytes[32..44].iter().all(is_angle_byte)
        && matches!(bytes[44], b'-' | b'+' | b' ')
        && bytes[45..56].iter().all(is_angle_byte)
}

fn is_optical_code(b: u8) -> bool {
    matches!(
        b,
        b'A' | b' ' | b'P' | b'e' | b'C' | b'T' | b'M' | b'c' | b'E' | b'O' | b'H' | b'N' | b'n'
    )
}

fn is_angle_byte(b: &u8) -> bool {
    b.is_ascii_digit() || *b == b' ' || *b == b'.'
}

#[cfg(test)]
mod dataline_tests {
    use super::*;

    const CCD_LINE: &str =
        "     K18D01E KC2018 03 01.16162913 06 26.33 -23 24 51.0          20.78G      W87";

    #[test]
    fn decodes_an_optical_ccd_line() {
        let record = ObservationRecord::parse(CCD_LINE).unwrap();
        assert_eq!(record.total_id, "     K18D01E");
        assert_eq!(record.identity.prov_id.as_deref(), Some("2018 DE1"));
        assert_eq!(record.identity.perm_id, None);
        assert_eq!(record.mode, "CCD");
        assert_eq!(record.sub_fmt, "M92");
        assert_eq!(record.date, "2018 03 01.161629");
        assert_eq!(record.obs_time, "2018-03-01T03:52:44.75Z");
        assert_eq!(record.prec_time, 1);
        assert_eq!(record.ra, "196.60971");
        assert_eq!(record.dec, "-23.41417");
        assert_eq!(record.prec_ra, 0.01);
        assert_eq!(record.prec_dec, 0.1);
        assert_eq!(record.mag, "20.78");
        assert_eq!(record.band, 'G');
        assert_eq!(record.ast_cat, ' ');
        assert_eq!(record.prog, "  ");
        assert_eq!(record.station, "W87");
    }

    #[test]
    fn decodes_a_tracking_label_line() {
        let line =
            "     P10GvKl  C2018 02 16.19817210 28 41.98 +04 20 34.4          21.2 GV     W85";
        let record = ObservationRecord::parse(line).unwrap();
        assert_eq!(record.identity.trk_sub.as_deref(), Some("P10GvKl"));
        assert_eq!(record.identity.perm_id, None);
        assert_eq!(record.ast_cat, 'V');
    }

    #[test]
    fn overlong_lines_report_their_length() {
        let line = format!("{CCD_LINE}foo");
        assert_eq!(
            ObservationRecord::parse(&line),
            Err(Mpc2AdesError::InvalidRecordLine {
                reason: "83 columns".to_string(),
                line,
            })
        );
    }

    #[test]
    fn satellite_lines_do_not_match_the_optical_shape() {
        let line =
            "     K13J22N  S2018 02 28.02505 16 47 10.53 +01 01 26.6          19   RLEE024C51";
        assert_eq!(
            ObservationRecord::parse(line),
            Err(Mpc2AdesError::InvalidRecordLine {
                reason: "no match for line".to_string(),
                line: line.to_string(),
            })
        );
    }

    #[test]
    fn unknown_notes_are_rejected() {
        let line =
            "     K13J22N ZC2018 02 28.02505 16 47 10.53 +01 01 26.6          19.0 RLEE024F51";
        let err = ObservationRecord::parse(line).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid MPC80COL line (invalid note Z in line ) in line:\n{line}")
        );
    }

    #[test]
    fn unmapped_mode_codes_are_rejected() {
        let line = CCD_LINE.to_string().replace(" KC2018", " KA2018");
        let err = ObservationRecord::parse(&line).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid MPC80COL line (invalid mode code A in line ) in line:\n{line}")
        );
    }

    #[test]
    fn identifier_failures_fail_the_record() {
        let line = CCD_LINE.to_string().replace("     K18D01E", "00000       ");
        assert_eq!(
            ObservationRecord::parse(&line),
            Err(Mpc2AdesError::UnpackMinorPlanetZero("00000       ".to_string()))
        );
    }
}
