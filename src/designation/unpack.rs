//! Packed-ID decoding.
//!
//! Each designation family (minor planet, comet, natural satellite) gets its own
//! grammar-attempt function over the 12-byte field. The families are disjoint on
//! the shape of columns 1-5, so the first one that matches wins. A family that
//! matches on shape but carries an out-of-range number reports that range error
//! rather than falling through to "no match".

use crate::constants::planet_name;
use crate::designation::alphabet;
use crate::designation::ObjectIdentity;
use crate::errors::Mpc2AdesError;

/// Decode a packed 12-column ID field into an [`ObjectIdentity`].
///
/// Input shorter than 12 characters is treated as blank-padded on the right.
pub(crate) fn unpack_packed_id(packed: &str) -> Result<ObjectIdentity, Mpc2AdesError> {
    if packed.len() > 12 || !packed.is_ascii() {
        return Err(Mpc2AdesError::UnpackNoMatch(packed.to_string()));
    }
    let mut field = [b' '; 12];
    field[..packed.len()].copy_from_slice(packed.as_bytes());

    if let Some(identity) = minor_planet_family(&field, packed)? {
        return Ok(identity);
    }
    if let Some(identity) = comet_family(&field, packed)? {
        return Ok(identity);
    }
    if let Some(identity) = satellite_family(&field, packed)? {
        return Ok(identity);
    }
    Err(Mpc2AdesError::UnpackNoMatch(packed.to_string()))
}

fn all_blank(zone: &[u8]) -> bool {
    zone.iter().all(|b| *b == b' ')
}

/// Value of an all-digit zone, `None` if any byte is not a digit.
fn digits_value(zone: &[u8]) -> Option<u32> {
    zone.iter().try_fold(0u32, |acc, b| {
        if b.is_ascii_digit() {
            Some(acc * 10 + u32::from(b - b'0'))
        } else {
            None
        }
    })
}

/// Half-month letters run A-Y without I and Z.
pub(super) fn is_half_month(b: u8) -> bool {
    b.is_ascii_uppercase() && b != b'I' && b != b'Z'
}

/// The second designation letter runs A-Z without I.
pub(super) fn is_second_letter(b: u8) -> bool {
    b.is_ascii_uppercase() && b != b'I'
}

// -------------------------------------------------------------------------------------------------
// Minor planets (and survey designations and tracking labels)
// -------------------------------------------------------------------------------------------------

pub(super) struct MinorPlanetProv {
    year: u32,
    half_month: char,
    order: u32,
    /// `None` means the trailing column held `0`: the zone reads as a
    /// comet-style `A/` designation instead of a second letter.
    second: Option<char>,
}

enum MinorPlanetZone2 {
    Blank,
    Designation(MinorPlanetProv),
    Survey(String),
    Label(String),
}

fn minor_planet_family(
    field: &[u8; 12],
    packed: &str,
) -> Result<Option<ObjectIdentity>, Mpc2AdesError> {
    let perm_zone = &field[..5];
    let prov_zone = &field[5..];

    let perm_number = if all_blank(perm_zone) {
        None
    } else {
        let head = match alphabet::value_of(perm_zone[0] as char) {
            Some(value) => value,
            None => return Ok(None),
        };
        let tail = match digits_value(&perm_zone[1..]) {
            Some(value) => value,
            None => return Ok(None),
        };
        Some(head * 10_000 + tail)
    };

    let zone2 = if let Some(parts) = minor_planet_prov_zone(prov_zone) {
        MinorPlanetZone2::Designation(parts)
    } else if let Some(survey) = survey_prov_zone(prov_zone) {
        MinorPlanetZone2::Survey(survey)
    } else if all_blank(prov_zone) {
        MinorPlanetZone2::Blank
    } else if let Some(label) = label_zone(prov_zone) {
        MinorPlanetZone2::Label(label)
    } else {
        return Ok(None);
    };

    // number range rules apply only once the whole field has matched the family
    let perm_id = match perm_number {
        Some(0) => return Err(Mpc2AdesError::UnpackMinorPlanetZero(packed.to_string())),
        Some(n) => Some(n.to_string()),
        None => None,
    };

    let mut prov_id = None;
    let mut trk_sub = None;
    match zone2 {
        MinorPlanetZone2::Designation(parts) => {
            let order = order_suffix(parts.order);
            prov_id = Some(match parts.second {
                Some(second) => {
                    format!("{} {}{}{}", parts.year, parts.half_month, second, order)
                }
                None => format!("A/{} {}{}", parts.year, parts.half_month, order),
            });
        }
        MinorPlanetZone2::Survey(survey) => prov_id = Some(survey),
        // a label next to a permanent number carries no information
        MinorPlanetZone2::Label(label) => {
            if perm_id.is_none() {
                trk_sub = Some(label);
            }
        }
        MinorPlanetZone2::Blank => {}
    }

    if perm_id.is_none() && prov_id.is_none() && trk_sub.is_none() {
        return Ok(None);
    }
    Ok(Some(ObjectIdentity {
        perm_id,
        prov_id,
        trk_sub,
    }))
}

pub(super) fn minor_planet_prov_zone(zone: &[u8]) -> Option<MinorPlanetProv> {
    if !(b'I'..=b'K').contains(&zone[0]) {
        return None;
    }
    let century = alphabet::value_of(zone[0] as char)?;
    let yy = digits_value(&zone[1..3])?;
    if !is_half_month(zone[3]) {
        return None;
    }
    let cycle = alphabet::value_of(zone[4] as char)?;
    if !zone[5].is_ascii_digit() {
        return None;
    }
    let second = match zone[6] {
        b'0' => None,
        b if is_second_letter(b) => Some(b as char),
        _ => return None,
    };
    Some(MinorPlanetProv {
        year: century * 100 + yy,
        half_month: zone[3] as char,
        order: cycle * 10 + u32::from(zone[5] - b'0'),
        second,
    })
}

pub(super) fn survey_prov_zone(zone: &[u8]) -> Option<String> {
    let survey = match (zone[0], zone[1], zone[2]) {
        (b'P', b'L', b'S') => "P-L",
        (b'T', b'1', b'S') => "T-1",
        (b'T', b'2', b'S') => "T-2",
        (b'T', b'3', b'S') => "T-3",
        _ => return None,
    };
    if !zone[3..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let digits = std::str::from_utf8(&zone[3..]).ok()?;
    Some(format!("{digits} {survey}"))
}

fn label_zone(zone: &[u8]) -> Option<String> {
    let end = zone.iter().rposition(|b| *b != b' ')? + 1;
    let core = &zone[..end];
    if !core[0].is_ascii_alphabetic() || !core.iter().all(u8::is_ascii_alphanumeric) {
        return None;
    }
    Some(std::str::from_utf8(core).ok()?.to_string())
}

fn order_suffix(order: u32) -> String {
    if order == 0 {
        String::new()
    } else {
        order.to_string()
    }
}

// -------------------------------------------------------------------------------------------------
// Comets
// -------------------------------------------------------------------------------------------------

struct CometProv {
    year: u32,
    half_month: char,
    order: u32,
    /// Second designation letter of a comet originally designated as an asteroid.
    second: Option<char>,
    /// Lowercase fragment trailer.
    fragment: Option<char>,
}

enum CometZone2 {
    Blank,
    Designation(CometProv),
    /// Fragment letters of a numbered comet, columns 11-12.
    Fragment(String),
}

fn comet_family(field: &[u8; 12], packed: &str) -> Result<Option<ObjectIdentity>, Mpc2AdesError> {
    let type_byte = field[4];
    if !matches!(type_byte, b'A' | b'P' | b'C' | b'D' | b'X' | b'I') {
        return Ok(None);
    }
    let perm_zone = &field[..4];
    let prov_zone = &field[5..];

    let perm_number = if all_blank(perm_zone) {
        None
    } else {
        match digits_value(perm_zone) {
            Some(value) => Some(value),
            None => return Ok(None),
        }
    };

    let zone2 = if let Some(parts) = comet_prov_zone(prov_zone) {
        CometZone2::Designation(parts)
    } else if let Some(letters) = comet_fragment_zone(prov_zone) {
        CometZone2::Fragment(letters)
    } else if all_blank(prov_zone) {
        CometZone2::Blank
    } else {
        return Ok(None);
    };

    let type_char = type_byte as char;
    let mut perm_id = None;
    if let Some(n) = perm_number {
        if n == 0 {
            return Err(Mpc2AdesError::UnpackCometZero(packed.to_string()));
        }
        if type_char != 'P' && type_char != 'D' {
            return Err(Mpc2AdesError::UnpackCometType(packed.to_string()));
        }
        let mut id = format!("{n}{type_char}");
        match &zone2 {
            CometZone2::Designation(parts) => {
                if let Some(fragment) = parts.fragment {
                    id.push('-');
                    id.push(fragment.to_ascii_uppercase());
                }
            }
            CometZone2::Fragment(letters) => {
                id.push('-');
                id.push_str(letters);
            }
            CometZone2::Blank => {}
        }
        perm_id = Some(id);
    }

    let prov_id = match &zone2 {
        CometZone2::Designation(parts) => {
            let order = order_suffix(parts.order);
            let second = parts.second.map(String::from).unwrap_or_default();
            let mut prov = format!(
                "{}/{} {}{}{}",
                type_char, parts.year, parts.half_month, second, order
            );
            if let Some(fragment) = parts.fragment {
                prov.push('-');
                prov.push(fragment.to_ascii_uppercase());
            }
            Some(prov)
        }
        _ => None,
    };

    if perm_id.is_none() && prov_id.is_none() {
        return Ok(None);
    }
    Ok(Some(ObjectIdentity {
        perm_id,
        prov_id,
        trk_sub: None,
    }))
}

fn comet_prov_zone(zone: &[u8]) -> Option<CometProv> {
    let century = alphabet::value_of(zone[0] as char)?;
    let yy = digits_value(&zone[1..3])?;
    if !is_half_month(zone[3]) {
        return None;
    }
    let cycle = alphabet::value_of(zone[4] as char)?;
    if !zone[5].is_ascii_digit() {
        return None;
    }
    let (second, fragment) = match zone[6] {
        b'0' => (None, None),
        b if b.is_ascii_uppercase() => (Some(b as char), None),
        b if b.is_ascii_lowercase() => (None, Some(b as char)),
        _ => return None,
    };
    Some(CometProv {
        year: century * 100 + yy,
        half_month: zone[3] as char,
        order: cycle * 10 + u32::from(zone[5] - b'0'),
        second,
        fragment,
    })
}

fn comet_fragment_zone(zone: &[u8]) -> Option<String> {
    if !all_blank(&zone[..5]) {
        return None;
    }
    let first = zone[5];
    let second = zone[6];
    if !(first == b' ' || first.is_ascii_lowercase()) || !second.is_ascii_lowercase() {
        return None;
    }
    let mut letters = String::new();
    if first != b' ' {
        letters.push((first as char).to_ascii_uppercase());
    }
    letters.push((second as char).to_ascii_uppercase());
    Some(letters)
}

// -------------------------------------------------------------------------------------------------
// Natural satellites
// -------------------------------------------------------------------------------------------------

struct SatelliteProv {
    year: u32,
    planet: char,
    order: u32,
}

fn satellite_family(
    field: &[u8; 12],
    packed: &str,
) -> Result<Option<ObjectIdentity>, Mpc2AdesError> {
    if field[4] != b'S' {
        return Ok(None);
    }
    let perm_zone = &field[..4];
    let prov_zone = &field[5..];

    let perm = if all_blank(perm_zone) {
        None
    } else {
        let planet = match planet_name(perm_zone[0] as char) {
            Some(name) => name,
            None => return Ok(None),
        };
        let number = match digits_value(&perm_zone[1..]) {
            Some(value) => value,
            None => return Ok(None),
        };
        Some((planet, number))
    };

    let prov = if all_blank(prov_zone) {
        None
    } else {
        match satellite_prov_zone(prov_zone) {
            Some(parts) => Some(parts),
            None => return Ok(None),
        }
    };

    let perm_id = match perm {
        Some((_, 0)) => return Err(Mpc2AdesError::UnpackSatelliteZero(packed.to_string())),
        Some((planet, number)) => Some(format!("{planet} {number}")),
        None => None,
    };
    let prov_id = match prov {
        Some(parts) => {
            if parts.order == 0 {
                return Err(Mpc2AdesError::UnpackSatelliteOrderZero(packed.to_string()));
            }
            Some(format!("S/{} {} {}", parts.year, parts.planet, parts.order))
        }
        None => None,
    };

    if perm_id.is_none() && prov_id.is_none() {
        return Ok(None);
    }
    Ok(Some(ObjectIdentity {
        perm_id,
        prov_id,
        trk_sub: None,
    }))
}

fn satellite_prov_zone(zone: &[u8]) -> Option<SatelliteProv> {
    let century = alphabet::value_of(zone[0] as char)?;
    let yy = digits_value(&zone[1..3])?;
    let planet = zone[3] as char;
    planet_name(planet)?;
    let cycle = alphabet::value_of(zone[4] as char)?;
    if !zone[5].is_ascii_digit() {
        return None;
    }
    if zone[6] != b'0' {
        return None;
    }
    Some(SatelliteProv {
        year: century * 100 + yy,
        planet,
        order: cycle * 10 + u32::from(zone[5] - b'0'),
    })
}

#[cfg(test)]
mod test_unpack {
    use super::*;

    fn unpack(packed: &str) -> (Option<String>, Option<String>, Option<String>) {
        let identity = unpack_packed_id(packed).unwrap();
        (identity.perm_id, identity.prov_id, identity.trk_sub)
    }

    #[test]
    fn families_are_disjoint_on_the_permanent_zone() {
        assert_eq!(
            unpack("     K14A00A"),
            (None, Some("2014 AA".into()), None)
        );
        assert_eq!(
            unpack("    CJ95A010"),
            (None, Some("C/1995 A1".into()), None)
        );
        assert_eq!(unpack("J001S       "), (Some("Jupiter 1".into()), None, None));
        assert_eq!(unpack("z9999       "), (Some("619999".into()), None, None));
    }

    #[test]
    fn label_needs_a_blank_permanent_zone() {
        assert_eq!(unpack("     bb12   "), (None, None, Some("bb12".into())));
        // label next to a permanent number is dropped
        assert_eq!(unpack("03141bb12   "), (Some("3141".into()), None, None));
    }

    #[test]
    fn range_errors_take_priority_over_no_match() {
        assert_eq!(
            unpack_packed_id("00000       "),
            Err(Mpc2AdesError::UnpackMinorPlanetZero("00000       ".into()))
        );
        assert_eq!(
            unpack_packed_id("0000P       "),
            Err(Mpc2AdesError::UnpackCometZero("0000P       ".into()))
        );
        assert_eq!(
            unpack_packed_id("U000S       "),
            Err(Mpc2AdesError::UnpackSatelliteZero("U000S       ".into()))
        );
    }

    #[test]
    fn satellite_order_zero_is_a_range_error() {
        assert_eq!(
            unpack_packed_id("    SK01U000"),
            Err(Mpc2AdesError::UnpackSatelliteOrderZero("    SK01U000".into()))
        );
    }

    #[test]
    fn all_blank_field_is_no_match() {
        assert_eq!(
            unpack_packed_id("            "),
            Err(Mpc2AdesError::UnpackNoMatch("            ".into()))
        );
    }

    #[test]
    fn oversized_input_is_no_match() {
        assert!(matches!(
            unpack_packed_id("K14A00A tooooo long"),
            Err(Mpc2AdesError::UnpackNoMatch(_))
        ));
    }
}
