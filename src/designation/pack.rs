//! Identity packing: rebuild the 12-column packed field from an [`ObjectIdentity`].
//!
//! Each component is classified and packed into its zone on its own, then the
//! zones are assembled. A permanent ID and a provisional designation can share
//! the field only when they belong to the same family (and, for comet
//! fragments, carry the same fragment letters).

use crate::constants::planet_letter;
use crate::designation::alphabet;
use crate::designation::unpack;
use crate::designation::{IdentityClass, ObjectIdentity};
use crate::errors::Mpc2AdesError;

struct PackedPerm {
    /// Columns 1-5 of the field.
    zone: String,
    class: IdentityClass,
    /// Fragment letters carried by a comet-fragment permanent ID.
    fragment: Option<String>,
}

struct PackedProv {
    /// Columns 5-12 of the field, including the leading placeholder column.
    zone: String,
    class: IdentityClass,
    fragment: Option<char>,
}

pub(crate) fn pack_identity(identity: &ObjectIdentity) -> Result<String, Mpc2AdesError> {
    let packed_perm = match identity.perm_id.as_deref() {
        Some(perm_id) => Some(pack_perm_id(perm_id)?),
        None => None,
    };
    let packed_prov = match identity.prov_id.as_deref() {
        Some(prov_id) => Some(pack_prov_id(prov_id)?),
        None => None,
    };
    let packed_trk = match identity.trk_sub.as_deref() {
        Some(trk_sub) => Some(pack_trk_sub(trk_sub)?),
        None => None,
    };

    match (packed_perm, packed_prov, packed_trk) {
        // a tracking label next to a structured identity carries no information
        (Some(perm), Some(prov), _) => {
            if perm.class != prov.class {
                return Err(Mpc2AdesError::PackTypeMismatch(identity.triple_text()));
            }
            if perm.class == IdentityClass::CometFragment {
                let perm_fragment = perm.fragment.unwrap_or_default();
                let prov_fragment = prov.fragment.map(String::from).unwrap_or_default();
                if perm_fragment != prov_fragment {
                    return Err(Mpc2AdesError::PackFragmentMismatch(identity.triple_text()));
                }
            }
            Ok(format!("{}{}", perm.zone, &prov.zone[1..]))
        }
        (Some(perm), None, None) => {
            let mut packed = format!("{}       ", perm.zone);
            if let Some(fragment) = &perm.fragment {
                // fragment letters go lowercased into the last two columns
                let trailer = if fragment.len() == 1 {
                    format!(" {}", fragment.to_lowercase())
                } else {
                    fragment.to_lowercase()
                };
                packed.replace_range(10.., &trailer);
            }
            Ok(packed)
        }
        (Some(_), None, Some(_)) => Err(Mpc2AdesError::PackEmpty(identity.triple_text())),
        (None, Some(_), Some(_)) => Err(Mpc2AdesError::PackProvAndTrkSub(identity.triple_text())),
        (None, Some(prov), None) => Ok(format!("    {}", prov.zone)),
        (None, None, Some(trk_sub)) => Ok(format!("     {trk_sub:<7}")),
        (None, None, None) => Err(Mpc2AdesError::PackEmpty(identity.triple_text())),
    }
}

// -------------------------------------------------------------------------------------------------
// Permanent IDs
// -------------------------------------------------------------------------------------------------

fn pack_perm_id(perm_id: &str) -> Result<PackedPerm, Mpc2AdesError> {
    if !perm_id.is_empty() && perm_id.bytes().all(|b| b.is_ascii_digit()) {
        let number: u64 = perm_id.parse().unwrap_or(u64::MAX);
        if !(1..=619_999).contains(&number) {
            return Err(Mpc2AdesError::PackMinorPlanetRange(perm_id.to_string()));
        }
        let head = alphabet::char_of((number / 10_000) as u32)
            .ok_or_else(|| Mpc2AdesError::PackMinorPlanetRange(perm_id.to_string()))?;
        return Ok(PackedPerm {
            zone: format!("{}{:04}", head, number % 10_000),
            class: IdentityClass::MinorPlanet,
            fragment: None,
        });
    }

    if let Some((number, type_char, fragment)) = parse_comet_perm(perm_id) {
        if number > 9_999 {
            return Err(Mpc2AdesError::PackCometNumberTooLarge(perm_id.to_string()));
        }
        if number == 0 {
            return Err(Mpc2AdesError::PackCometNumberZero(perm_id.to_string()));
        }
        let class = if fragment.is_some() {
            IdentityClass::CometFragment
        } else {
            IdentityClass::Comet
        };
        return Ok(PackedPerm {
            zone: format!("{number:04}{type_char}"),
            class,
            fragment,
        });
    }

    if let Some((letter, number)) = parse_satellite_perm(perm_id) {
        if number > 999 {
            return Err(Mpc2AdesError::PackSatelliteNumberTooLarge(
                perm_id.to_string(),
            ));
        }
        if number == 0 {
            return Err(Mpc2AdesError::PackSatelliteNumberZero(perm_id.to_string()));
        }
        return Ok(PackedPerm {
            zone: format!("{letter}{number:03}S"),
            class: IdentityClass::Satellite,
            fragment: None,
        });
    }

    if is_asteroid_satellite(perm_id) {
        return Err(Mpc2AdesError::PackAsteroidSatellite(perm_id.to_string()));
    }
    Err(Mpc2AdesError::InvalidPermId(perm_id.to_string()))
}

/// `<digits>[PD]` with an optional `-[A-Z]{1,2}` fragment suffix.
fn parse_comet_perm(perm_id: &str) -> Option<(u64, char, Option<String>)> {
    let bytes = perm_id.as_bytes();
    let digits_end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    if digits_end == 0 {
        return None;
    }
    let type_char = *bytes.get(digits_end)? as char;
    if type_char != 'P' && type_char != 'D' {
        return None;
    }
    let rest = &perm_id[digits_end + 1..];
    let fragment = if rest.is_empty() {
        None
    } else {
        let letters = rest.strip_prefix('-')?;
        if letters.is_empty() || letters.len() > 2 || !letters.bytes().all(|b| b.is_ascii_uppercase())
        {
            return None;
        }
        Some(letters.to_string())
    };
    let number = perm_id[..digits_end].parse().unwrap_or(u64::MAX);
    Some((number, type_char, fragment))
}

/// `<PlanetName> <digits>`.
fn parse_satellite_perm(perm_id: &str) -> Option<(char, u64)> {
    let (name, number) = perm_id.split_once(' ')?;
    let letter = planet_letter(name)?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((letter, number.parse().unwrap_or(u64::MAX)))
}

/// `(<number>) <n>` or `(<provisional>) <n>`: satellites of asteroids have no
/// packed form at all.
fn is_asteroid_satellite(perm_id: &str) -> bool {
    let Some(rest) = perm_id.strip_prefix('(') else {
        return false;
    };
    let Some((inner, number)) = rest.split_once(") ") else {
        return false;
    };
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    let bytes = inner.as_bytes();
    bytes.len() >= 8
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b' '
        && bytes[5].is_ascii_uppercase()
        && bytes[6].is_ascii_uppercase()
        && bytes[7..].iter().all(u8::is_ascii_digit)
}

// -------------------------------------------------------------------------------------------------
// Provisional designations
// -------------------------------------------------------------------------------------------------

fn pack_prov_id(prov_id: &str) -> Result<PackedProv, Mpc2AdesError> {
    if let Some(parts) = parse_minor_planet_prov(prov_id) {
        // years before 1800 or after 2099 have no century letter
        if !(18..=20).contains(&parts.head) {
            return Err(Mpc2AdesError::PackMinorPlanetYear(prov_id.to_string()));
        }
        if parts.order > 619 {
            return Err(Mpc2AdesError::PackOrderTooBig(prov_id.to_string()));
        }
        let century = alphabet::char_of(parts.head)
            .ok_or_else(|| Mpc2AdesError::PackMinorPlanetYear(prov_id.to_string()))?;
        let (cycle, digit) = order_pair(parts.order, prov_id)?;
        return Ok(PackedProv {
            zone: format!(
                " {}{}{}{}{}{}",
                century, parts.year_tail, parts.half_month, cycle, digit, parts.second
            ),
            class: IdentityClass::MinorPlanet,
            fragment: None,
        });
    }

    if let Some((digits, s1, s2)) = parse_survey_prov(prov_id) {
        return Ok(PackedProv {
            zone: format!(" {s1}{s2}S{digits}"),
            class: IdentityClass::MinorPlanet,
            fragment: None,
        });
    }

    if let Some(parts) = parse_comet_prov(prov_id) {
        if parts.order / 10 > 61 {
            return Err(Mpc2AdesError::PackOrderTooBig(prov_id.to_string()));
        }
        let century = alphabet::char_of(parts.head)
            .ok_or_else(|| Mpc2AdesError::PackYearUnencodable(prov_id.to_string()))?;
        let (cycle, digit) = order_pair(parts.order, prov_id)?;
        let extra = parts.second.unwrap_or('0');
        let class = if parts.type_char == 'A' {
            // asteroid in disguise
            IdentityClass::MinorPlanet
        } else {
            IdentityClass::Comet
        };
        return Ok(PackedProv {
            zone: format!(
                "{}{}{}{}{}{}{}",
                parts.type_char, century, parts.year_tail, parts.half_month, cycle, digit, extra
            ),
            class,
            fragment: None,
        });
    }

    if let Some(parts) = parse_comet_fragment_prov(prov_id) {
        if parts.order / 10 > 61 {
            return Err(Mpc2AdesError::PackOrderTooBig(prov_id.to_string()));
        }
        let century = alphabet::char_of(parts.head)
            .ok_or_else(|| Mpc2AdesError::PackYearUnencodable(prov_id.to_string()))?;
        let (cycle, digit) = order_pair(parts.order, prov_id)?;
        let fragment = parts.second.unwrap_or('A');
        return Ok(PackedProv {
            zone: format!(
                "{}{}{}{}{}{}{}",
                parts.type_char,
                century,
                parts.year_tail,
                parts.half_month,
                cycle,
                digit,
                fragment.to_ascii_lowercase()
            ),
            class: IdentityClass::CometFragment,
            fragment: Some(fragment),
        });
    }

    if let Some(parts) = parse_satellite_prov(prov_id) {
        if parts.order / 10 > 61 {
            return Err(Mpc2AdesError::PackOrderTooBig(prov_id.to_string()));
        }
        if parts.order == 0 {
            return Err(Mpc2AdesError::PackOrderZero(prov_id.to_string()));
        }
        let century = alphabet::char_of(parts.head)
            .ok_or_else(|| Mpc2AdesError::PackYearUnencodable(prov_id.to_string()))?;
        let (cycle, digit) = order_pair(parts.order, prov_id)?;
        return Ok(PackedProv {
            zone: format!(
                "S{}{}{}{}{}0",
                century, parts.year_tail, parts.half_month, cycle, digit
            ),
            class: IdentityClass::Satellite,
            fragment: None,
        });
    }

    Err(Mpc2AdesError::InvalidProvId(prov_id.to_string()))
}

/// Split an order number into its packed cycle/digit pair.
fn order_pair(order: u64, prov_id: &str) -> Result<(char, char), Mpc2AdesError> {
    let cycle = alphabet::char_of((order / 10) as u32)
        .ok_or_else(|| Mpc2AdesError::PackOrderTooBig(prov_id.to_string()))?;
    let digit = char::from(b'0' + (order % 10) as u8);
    Ok((cycle, digit))
}

struct ProvParts {
    type_char: char,
    /// Two-digit century head of the year.
    head: u32,
    /// Last two digits of the year, kept verbatim.
    year_tail: String,
    half_month: char,
    second: Option<char>,
    order: u64,
}

struct MinorPlanetParts {
    head: u32,
    year_tail: String,
    half_month: char,
    second: char,
    order: u64,
}

/// `YYYY <half-month><second><order?>`.
fn parse_minor_planet_prov(prov_id: &str) -> Option<MinorPlanetParts> {
    let bytes = prov_id.as_bytes();
    if bytes.len() < 7 {
        return None;
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b' ' {
        return None;
    }
    if !unpack::is_half_month(bytes[5]) || !unpack::is_second_letter(bytes[6]) {
        return None;
    }
    let order_digits = &prov_id[7..];
    if !order_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let order = if order_digits.is_empty() {
        0
    } else {
        order_digits.parse().unwrap_or(u64::MAX)
    };
    Some(MinorPlanetParts {
        head: prov_id[..2].parse().ok()?,
        year_tail: prov_id[2..4].to_string(),
        half_month: bytes[5] as char,
        second: bytes[6] as char,
        order,
    })
}

/// `YYYY P-L` or `YYYY T-1`/`T-2`/`T-3`.
fn parse_survey_prov(prov_id: &str) -> Option<(&str, char, char)> {
    let (digits, survey) = prov_id.split_once(' ')?;
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (s1, s2) = match survey {
        "P-L" => ('P', 'L'),
        "T-1" => ('T', '1'),
        "T-2" => ('T', '2'),
        "T-3" => ('T', '3'),
        _ => return None,
    };
    Some((digits, s1, s2))
}

/// `[ACDIPX]/YYYY <letter><letter?><order?>`; the optional second letter marks
/// a comet that was originally designated as an asteroid.
fn parse_comet_prov(prov_id: &str) -> Option<ProvParts> {
    let (type_char, head, year_tail, half_month, rest) =
        parse_comet_prov_head(prov_id, &['A', 'C', 'D', 'I', 'P', 'X'])?;
    let (second, order_digits) = match rest.as_bytes().first() {
        Some(b) if b.is_ascii_uppercase() => (Some(*b as char), &rest[1..]),
        _ => (None, rest),
    };
    if !order_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let order = if order_digits.is_empty() {
        0
    } else {
        order_digits.parse().unwrap_or(u64::MAX)
    };
    Some(ProvParts {
        type_char,
        head,
        year_tail,
        half_month,
        second,
        order,
    })
}

/// `[CDPX]/YYYY <letter><order?>-<fragment>`.
fn parse_comet_fragment_prov(prov_id: &str) -> Option<ProvParts> {
    let (type_char, head, year_tail, half_month, rest) =
        parse_comet_prov_head(prov_id, &['C', 'D', 'P', 'X'])?;
    let (order_digits, fragment) = rest.split_once('-')?;
    if fragment.len() != 1 || !fragment.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    if !order_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let order = if order_digits.is_empty() {
        0
    } else {
        order_digits.parse().unwrap_or(u64::MAX)
    };
    Some(ProvParts {
        type_char,
        head,
        year_tail,
        half_month,
        second: fragment.chars().next(),
        order,
    })
}

/// Common `T/YYYY L` head of the comet provisional grammars.
fn parse_comet_prov_head<'a>(
    prov_id: &'a str,
    types: &[char],
) -> Option<(char, u32, String, char, &'a str)> {
    let bytes = prov_id.as_bytes();
    if bytes.len() < 8 {
        return None;
    }
    let type_char = bytes[0] as char;
    if !types.contains(&type_char) || bytes[1] != b'/' {
        return None;
    }
    if !bytes[2..6].iter().all(u8::is_ascii_digit) || bytes[6] != b' ' {
        return None;
    }
    if !bytes[7].is_ascii_uppercase() {
        return None;
    }
    Some((
        type_char,
        prov_id[2..4].parse().ok()?,
        prov_id[4..6].to_string(),
        bytes[7] as char,
        &prov_id[8..],
    ))
}

struct SatelliteParts {
    head: u32,
    year_tail: String,
    half_month: char,
    order: u64,
}

/// `S/YYYY [JSUN] <n>`.
fn parse_satellite_prov(prov_id: &str) -> Option<SatelliteParts> {
    let bytes = prov_id.as_bytes();
    if bytes.len() < 10 {
        return None;
    }
    if bytes[0] != b'S' || bytes[1] != b'/' {
        return None;
    }
    if !bytes[2..6].iter().all(u8::is_ascii_digit) || bytes[6] != b' ' {
        return None;
    }
    if !matches!(bytes[7], b'J' | b'S' | b'U' | b'N') || bytes[8] != b' ' {
        return None;
    }
    let number = &prov_id[9..];
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(SatelliteParts {
        head: prov_id[2..4].parse().ok()?,
        year_tail: prov_id[4..6].to_string(),
        half_month: bytes[7] as char,
        order: number.parse().unwrap_or(u64::MAX),
    })
}

// -------------------------------------------------------------------------------------------------
// Tracking labels
// -------------------------------------------------------------------------------------------------

fn pack_trk_sub(trk_sub: &str) -> Result<String, Mpc2AdesError> {
    let bytes = trk_sub.as_bytes();
    let valid_syntax = !bytes.is_empty()
        && bytes.len() <= 7
        && bytes[0].is_ascii_alphabetic()
        && bytes.iter().all(u8::is_ascii_alphanumeric);
    if !valid_syntax || collides_with_packed_zone(trk_sub) {
        return Err(Mpc2AdesError::InvalidTrkSub(trk_sub.to_string()));
    }
    Ok(trk_sub.to_string())
}

/// A 7-character label whose bytes parse as a packed provisional or survey zone
/// would be ambiguous inside the field, so those patterns are reserved.
fn collides_with_packed_zone(label: &str) -> bool {
    let Ok(zone) = <[u8; 7]>::try_from(label.as_bytes()) else {
        return false;
    };
    unpack::minor_planet_prov_zone(&zone).is_some() || unpack::survey_prov_zone(&zone).is_some()
}

// -------------------------------------------------------------------------------------------------
// Program codes
// -------------------------------------------------------------------------------------------------

/// Pack a single-character program code as its two-digit hex character code.
pub fn pack_prog_id(code: char) -> String {
    format!("{:02x}", code as u32)
}

/// Decode a two-digit hex program code back to its character.
pub fn unpack_prog_id(packed: &str) -> Result<char, Mpc2AdesError> {
    let value = u32::from_str_radix(packed, 16)
        .map_err(|_| Mpc2AdesError::InvalidProgramCode(packed.to_string()))?;
    char::from_u32(value).ok_or_else(|| Mpc2AdesError::InvalidProgramCode(packed.to_string()))
}
