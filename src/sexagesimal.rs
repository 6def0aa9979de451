//! # Sexagesimal field parsing
//!
//! The fixed-width observation line carries its date and angles in sexagesimal
//! notation: a fractional day for the epoch, `"HH MM SS.ss"` for right
//! ascension and `"sDD MM SS.s"` for declination. The number of digits a
//! reporter wrote determines the precision the converted record may claim, so
//! parsing keeps track of the implied resolution alongside the value itself.
//!
//! ## Overview
//!
//! * [`parse_angle_triple`] splits a `"DD MM SS.ddd"` shaped field into its
//!   whole, minutes and seconds parts plus the precision derived from the
//!   written digits.
//! * [`check_date`] validates a `"YYYY MM DD.ffffff"` calendar date and turns
//!   the fractional day into an ISO-8601 UTC timestamp.
//! * [`check_ra`] and [`check_dec`] convert the angle fields to decimal
//!   degrees, printed just fine enough to preserve the source resolution.

use crate::errors::Mpc2AdesError;

/// Days per month in a non-leap year, January first.
const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

// -------------------------------------------------------------------------------------------------
// Angle triples
// -------------------------------------------------------------------------------------------------

/// Parse a sexagesimal angle field of the shape `"DD MM SS.ddd"`.
///
/// The seconds field is optional, and the minutes field may instead carry a
/// single fractional digit. Trailing blanks are ignored, a leading blank is
/// malformed.
///
/// Return
/// ----------
/// * `(whole, minutes, seconds, precision)` where the precision is the value
///   of one unit in the last written digit, in seconds: `60` for whole
///   minutes, `6` for a fractional-minute digit, `10^-k` for a seconds field
///   with `k` fractional digits.
pub fn parse_angle_triple(text: &str) -> Result<(u32, f64, f64, f64), Mpc2AdesError> {
    let bytes = text.as_bytes();
    let fail = || Mpc2AdesError::InvalidSexagesimal(text.to_string());

    let whole_end = scan_digits(bytes, 0);
    if whole_end == 0 {
        return Err(fail());
    }
    let whole: u32 = text[..whole_end].parse().map_err(|_| fail())?;

    let minutes_start = scan_blanks(bytes, whole_end);
    if minutes_start == whole_end || minutes_start == bytes.len() {
        return Err(fail());
    }
    let minutes_end = scan_digits(bytes, minutes_start);
    if minutes_end == minutes_start {
        return Err(fail());
    }
    let mut minutes: f64 = text[minutes_start..minutes_end]
        .parse()
        .map_err(|_| fail())?;

    // minutes-only field, possibly blank padded
    if scan_blanks(bytes, minutes_end) == bytes.len() {
        return Ok((whole, minutes, 0.0, 60.0));
    }

    // a single fractional-minute digit, nothing behind it
    if bytes[minutes_end] == b'.' {
        let frac_end = scan_digits(bytes, minutes_end + 1);
        if frac_end != minutes_end + 2 || scan_blanks(bytes, frac_end) != bytes.len() {
            return Err(fail());
        }
        minutes += f64::from(bytes[minutes_end + 1] - b'0') / 10.0;
        return Ok((whole, minutes, 0.0, 6.0));
    }

    let seconds_start = scan_blanks(bytes, minutes_end);
    if seconds_start == minutes_end {
        return Err(fail());
    }
    let int_end = scan_digits(bytes, seconds_start);
    if int_end == seconds_start {
        return Err(fail());
    }
    let (seconds_end, precision) = if bytes.get(int_end) == Some(&b'.') {
        let frac_end = scan_digits(bytes, int_end + 1);
        if frac_end == int_end + 1 {
            return Err(fail());
        }
        (frac_end, 10f64.powi(-((frac_end - int_end - 1) as i32)))
    } else {
        (int_end, 1.0)
    };
    if scan_blanks(bytes, seconds_end) != bytes.len() {
        return Err(fail());
    }
    let seconds: f64 = text[seconds_start..seconds_end].parse().map_err(|_| fail())?;
    Ok((whole, minutes, seconds, precision))
}

fn scan_digits(bytes: &[u8], from: usize) -> usize {
    let mut pos = from;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    pos
}

fn scan_blanks(bytes: &[u8], from: usize) -> usize {
    let mut pos = from;
    while pos < bytes.len() && bytes[pos] == b' ' {
        pos += 1;
    }
    pos
}

// -------------------------------------------------------------------------------------------------
// Dates
// -------------------------------------------------------------------------------------------------

/// Validate a `"YYYY MM DD.ffffff"` date and derive its UTC timestamp.
///
/// The fractional day is mandatory. Its digit count sets the reported time
/// precision and how many decimals of a second the timestamp carries.
///
/// Return
/// ----------
/// * `(obs_time, prec_time)` with `obs_time` in `YYYY-MM-DDThh:mm:ss[.ss]Z`
///   form and `prec_time` in units of 1e-6 day, clamped below at 1.
pub fn check_date(date: &str) -> Result<(String, u32), Mpc2AdesError> {
    let fail = |reason: &str| Mpc2AdesError::InvalidDate {
        reason: reason.to_string(),
        date: date.to_string(),
    };
    let bytes = date.as_bytes();
    if bytes.len() < 10
        || !bytes[..4].iter().all(u8::is_ascii_digit)
        || bytes[4] != b' '
        || !bytes[5..7].iter().all(u8::is_ascii_digit)
        || bytes[7] != b' '
        || !bytes[8..10].iter().all(u8::is_ascii_digit)
    {
        return Err(fail("no match for date"));
    }
    let year: u32 = date[..4].parse().map_err(|_| fail("no match for date"))?;
    let month: u32 = date[5..7].parse().map_err(|_| fail("no match for date"))?;
    let day: u32 = date[8..10].parse().map_err(|_| fail("no match for date"))?;

    if !(1..=12).contains(&month) {
        return Err(fail("invalid month"));
    }
    if day < 1 || day > month_length(year, month) {
        return Err(fail("invalid day for month"));
    }

    if bytes.len() == 10 || bytes[10..].iter().all(|&b| b == b' ') {
        return Err(fail("no fractional day"));
    }
    if bytes[10] != b'.' {
        return Err(fail("no match for date"));
    }
    let frac = date[11..].trim_end_matches(' ');
    if frac.is_empty() {
        return Err(fail("empty fractional day"));
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(fail("no match for date"));
    }

    let digits = frac.len() as u32;
    let fraction: u128 = frac.parse().map_err(|_| fail("no match for date"))?;
    let seconds_decimals = digits.saturating_sub(4);
    let obs_time = render_obs_time(date, fraction, digits, seconds_decimals)
        .ok_or_else(|| fail("no match for date"))?;
    let prec_time = if digits >= 6 {
        1
    } else {
        10u32.pow(6 - digits)
    };
    Ok((obs_time, prec_time))
}

/// Scale the fractional day to seconds, rounding once at the target
/// resolution. At `k` decimals of a second the round-up can never reach the
/// next day, so no carry into the calendar part is needed.
fn render_obs_time(date: &str, fraction: u128, digits: u32, k: u32) -> Option<String> {
    let denominator = 10u128.checked_pow(digits)?;
    let scale = 10u128.checked_pow(k)?;
    let scaled = fraction
        .checked_mul(86_400)?
        .checked_mul(scale)?
        .checked_add(denominator / 2)?
        / denominator;
    let total_seconds = scaled / scale;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let mut obs_time = format!(
        "{}-{}-{}T{:02}:{:02}:{:02}",
        &date[..4],
        &date[5..7],
        &date[8..10],
        hours,
        minutes,
        seconds
    );
    if k > 0 {
        let frac_part = scaled % scale;
        obs_time.push_str(&format!(".{:0width$}", frac_part, width = k as usize));
    }
    obs_time.push('Z');
    Some(obs_time)
}

fn month_length(year: u32, month: u32) -> u32 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        MONTH_LENGTHS[(month - 1) as usize]
    }
}

fn is_leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

// -------------------------------------------------------------------------------------------------
// Angles to decimal degrees
// -------------------------------------------------------------------------------------------------

/// Convert an `"HH MM SS.ss"` right ascension field to decimal degrees.
///
/// Return
/// ----------
/// * `(ra, prec_ra)` with the right ascension printed at a resolution at
///   least as fine as the written digits imply, and the raw precision in
///   seconds of time.
pub fn check_ra(ra_field: &str) -> Result<(String, f64), Mpc2AdesError> {
    let (hours, minutes, seconds, precision) = parse_angle_triple(ra_field)?;
    let degrees = 15.0 * (f64::from(hours) + minutes / 60.0 + seconds / 3600.0);
    let decimals = resolution_decimals(240.0 / precision);
    Ok((format!("{degrees:.decimals$}"), precision))
}

/// Convert a signed `"DD MM SS.s"` declination field to decimal degrees.
///
/// The sign column may hold `+`, `-` or a blank; blank reads as positive.
pub fn check_dec(dec_field: &str) -> Result<(String, f64), Mpc2AdesError> {
    let mut chars = dec_field.chars();
    let sign = chars
        .next()
        .filter(|c| matches!(c, '+' | '-' | ' '))
        .ok_or_else(|| Mpc2AdesError::InvalidSexagesimal(dec_field.to_string()))?;
    let (whole, minutes, seconds, precision) = parse_angle_triple(chars.as_str())?;
    let mut degrees = f64::from(whole) + minutes / 60.0 + seconds / 3600.0;
    if sign == '-' {
        degrees = -degrees;
    }
    let decimals = resolution_decimals(3600.0 / precision);
    Ok((format!("{degrees:.decimals$}"), precision))
}

/// Decimals needed so one printed step is no coarser than one precision step.
fn resolution_decimals(steps_per_degree: f64) -> usize {
    (steps_per_degree.log10() - 1e-9).ceil() as usize
}

#[cfg(test)]
mod date_and_angle_tests {
    use super::*;

    #[test]
    fn angle_triples_carry_their_precision() {
        assert_eq!(
            parse_angle_triple("12 13 14.56").unwrap(),
            (12, 13.0, 14.56, 0.01)
        );
        assert_eq!(
            parse_angle_triple("12 13 14.567").unwrap(),
            (12, 13.0, 14.567, 0.001)
        );
        assert_eq!(parse_angle_triple("12 13 14").unwrap(), (12, 13.0, 14.0, 1.0));
        assert_eq!(parse_angle_triple("12 13   ").unwrap(), (12, 13.0, 0.0, 60.0));
        assert_eq!(parse_angle_triple("12 13.1 ").unwrap(), (12, 13.1, 0.0, 6.0));
    }

    #[test]
    fn malformed_angles_are_rejected() {
        for text in [
            "12",
            "12 ",
            "12.1",
            "12.1 ",
            "12 13. ",
            "12 13.12 ",
            "12 13 14x5",
            "12 13 14.56 x",
            " 13 13 14.56  ",
        ] {
            assert_eq!(
                parse_angle_triple(text),
                Err(Mpc2AdesError::InvalidSexagesimal(text.to_string())),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn fractional_day_becomes_a_timestamp() {
        assert_eq!(
            check_date("2018 02 16.198172").unwrap(),
            ("2018-02-16T04:45:22.06Z".to_string(), 1)
        );
        assert_eq!(
            check_date("2018 03 01.161629").unwrap(),
            ("2018-03-01T03:52:44.75Z".to_string(), 1)
        );
        // four digits round to whole seconds
        assert_eq!(
            check_date("2018 02 16.1981  ").unwrap(),
            ("2018-02-16T04:45:16Z".to_string(), 100)
        );
    }

    #[test]
    fn calendar_rules_apply() {
        assert!(check_date("2000 02 29.5").is_ok());
        assert!(check_date("2020 02 29.5").is_ok());
        for date in ["1900 02 29.5", "2019 02 29.5", "2018 13 01.5", "2018 01 32.5"] {
            assert!(matches!(
                check_date(date),
                Err(Mpc2AdesError::InvalidDate { .. })
            ));
        }
    }

    #[test]
    fn fractional_day_is_mandatory() {
        let reason = |date: &str| match check_date(date) {
            Err(Mpc2AdesError::InvalidDate { reason, .. }) => reason,
            other => panic!("expected a date error, got {other:?}"),
        };
        assert_eq!(reason("2018 02 16"), "no fractional day");
        assert_eq!(reason("2018 02 16       "), "no fractional day");
        assert_eq!(reason("2018 02 16.      "), "empty fractional day");
    }

    #[test]
    fn angles_convert_to_degrees() {
        assert_eq!(
            check_ra("11 26 54.17 ").unwrap(),
            ("171.72571".to_string(), 0.01)
        );
        assert_eq!(
            check_dec("-04 24 44.7 ").unwrap(),
            ("-4.41242".to_string(), 0.1)
        );
        assert_eq!(
            check_dec("+01 01 26.6 ").unwrap(),
            ("1.02406".to_string(), 0.1)
        );
        assert_eq!(check_ra("13 06 26.33 ").unwrap().0, "196.60971");
        assert_eq!(check_dec("-23 24 51.0 ").unwrap().0, "-23.41417");
    }

    #[test]
    fn coarse_fields_print_fewer_decimals() {
        assert_eq!(check_ra("12 30   ").unwrap(), ("187.5".to_string(), 60.0));
        assert_eq!(check_dec(" 12 30   ").unwrap(), ("12.50".to_string(), 60.0));
        assert_eq!(check_ra("12 30 00").unwrap().0, "187.500");
    }
}
