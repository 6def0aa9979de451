//! # Constants and type definitions for mpc2ades
//!
//! This module centralizes the **code tables** of the MPC 1992 80-column format and the
//! **ADES vocabulary** they translate to, together with a few common type aliases.
//!
//! ## Overview
//!
//! - Observation mode codes (column 15) and their ADES `mode` names
//! - Note and program-code character sets
//! - Star catalog single-letter codes and their ADES catalog names
//! - Astrometrica `NET` line reference-catalog names
//! - Giant-planet letters used by natural-satellite designations
//!
//! These tables are used by the designation codec, the record decoder and the PSV writer.

// -------------------------------------------------------------------------------------------------
// Format versions
// -------------------------------------------------------------------------------------------------

/// First line of every ADES PSV output file.
pub const ADES_VERSION_LINE: &str = "# version=2022";

/// Identification string written into the PSV `# comment` block.
pub const CONVERTER_VERSION: &str = concat!("mpc2ades V", env!("CARGO_PKG_VERSION"));

// -------------------------------------------------------------------------------------------------
// Observation mode codes (column 15)
// -------------------------------------------------------------------------------------------------

/// Every column-15 code accepted on an observation line. `0` is special for header lines,
/// `RrSsVvXx` mark radar, satellite, roving and photographic sub-formats handled elsewhere.
pub const VALID_CODES: &str = "A PeCTMcEOHNnRrSsVvXx0";

/// Translate a column-15 code to the ADES `mode` string for optical observations.
///
/// Blank means photographic. Codes outside the optical set (radar, satellite, roving)
/// have no entry here.
pub fn mode_for_code(code: char) -> Option<&'static str> {
    match code {
        ' ' => Some("PHo"),
        'P' => Some("PHO"),
        'e' => Some("ENC"),
        'C' => Some("CCD"),
        'T' => Some("MER"),
        'M' => Some("MIC"),
        'c' => Some("ccd"),
        'E' => Some("OCC"),
        'O' => Some("OFF"),
        'H' => Some("PMT"),
        'N' => Some("NOR"),
        'n' => Some("VID"),
        _ => None,
    }
}

// -------------------------------------------------------------------------------------------------
// Note and program-code characters
// -------------------------------------------------------------------------------------------------

/// Characters allowed in the column-14 note field.
pub const VALID_NOTES: &str = " AaBbcDdEFfGgGgHhIiJKkMmNOoPpRrSsTtUuVWwYyCQX2345vzjeL16789";

/// Characters allowed as an observing-program code at sites that use them.
pub const VALID_PROGRAM_CODES: &str =
    r#" AaBbcDdEFfGgGgHhIiJKkMmNOoPpRrSsTtUuVWwYyCQX2345016789=#$%"&\+-![]`!|(){}.?@,^;:_/~*<>eLvzjZ'"#;

/// Station codes whose column-14 character is an observing-program code rather than a note.
pub const PROGRAM_CODE_SITES: &[&str] = &[
    "010", "012", "084", "089", "094", "095", "121", "260", "261", "262", "266", "267", "268",
    "269", "290", "309", "413", "561", "568", "658", "673", "675", "688", "689", "695", "696",
    "705", "807", "809", "950", "A84", "B35", "D90", "E03", "E10", "E26", "F65", "G40", "G73",
    "G83", "H06", "I03", "I05", "I11", "I89", "J13", "N50", "Q62", "U69", "V07", "W84", "W88",
    "Z18", "Z19", "Z20", "249", "C49", "C50 ",
];

// -------------------------------------------------------------------------------------------------
// Star catalog codes (column 72)
// -------------------------------------------------------------------------------------------------

/// Single-letter reference-star catalog codes and their ADES catalog names.
pub const CATALOG_CODES: &[(char, &str)] = &[
    (' ', "UNK"),
    ('a', "USNOA1"),
    ('b', "USNOSA1"),
    ('c', "USNOA2"),
    ('d', "USNOSA2"),
    ('e', "UCAC1"),
    ('f', "Tyc1"),
    ('g', "Tyc2"),
    ('h', "GSC1.0"),
    ('i', "GSC1.1"),
    ('j', "GSC1.2"),
    ('k', "GSC2.2"),
    ('l', "ACT"),
    ('m', "GSCACT"),
    ('n', "SSDS8"),
    ('o', "USNOB1"),
    ('p', "PPM"),
    ('q', "UCAC4"),
    ('r', "UCAC2"),
    ('s', "USNOB2"),
    ('t', "PPMXL"),
    ('u', "UCAC3"),
    ('v', "NOMAD"),
    ('w', "CMC14"),
    ('x', "Hip2"),
    ('y', "Hip1"),
    ('z', "GSC"),
    ('A', "AC"),
    ('B', "SAO1984"),
    ('C', "SAO"),
    ('D', "AGK3"),
    ('E', "FK4"),
    ('F', "ACRS"),
    ('G', "LickGas"),
    ('H', "Ida93"),
    ('I', "Perth70"),
    ('J', "COSMOS"),
    ('K', "Yale"),
    ('L', "2MASS"),
    ('M', "GSC2.3"),
    ('N', "SDSS7"),
    ('O', "SSTRC1"),
    ('P', "MPOSC3"),
    ('Q', "CMC15"),
    ('R', "SSTRC4"),
    ('S', "URAT1"),
    ('T', "URAT2"),
    ('U', "Gaia1"),
    ('V', "Gaia2"),
    ('W', "UCAC5"),
];

/// ADES catalog name for a column-72 catalog code.
pub fn catalog_for_code(code: char) -> Option<&'static str> {
    CATALOG_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Column-72 catalog code for an ADES catalog name.
pub fn code_for_catalog(name: &str) -> Option<char> {
    CATALOG_CODES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(c, _)| *c)
}

// -------------------------------------------------------------------------------------------------
// Astrometrica NET line catalogs
// -------------------------------------------------------------------------------------------------

/// Mapping of Astrometrica reference-catalog names (as written on a `NET` header line)
/// to MPC approved ADES names, from
/// <https://www.minorplanetcenter.net/iau/info/ADESFieldValues.html>.
pub const NET_CATALOG_NAMES: &[(&str, &str)] = &[
    ("USNO-SA2.0", "USNOSA2"),
    ("USNO-A2.0", "USNOA2"),
    ("USNO-B1.0", "USNOB1"),
    ("UCAC-3", "UCAC3"),
    ("UCAC-4", "UCAC4"),
    ("URAT-1", "URAT1"),
    ("NOMAD", "NOMAD"),
    ("CMC-14", "CMC14"),
    ("CMC-15", "CMC15"),
    ("PPMXL", "PPMXL"),
    ("Gaia DR1", "Gaia1"),
    ("Gaia DR2", "Gaia2"),
];

/// ADES catalog name for an Astrometrica reference-catalog name.
pub fn catalog_for_net_name(name: &str) -> Option<&'static str> {
    NET_CATALOG_NAMES
        .iter()
        .find(|(net, _)| *net == name)
        .map(|(_, ades)| *ades)
}

// -------------------------------------------------------------------------------------------------
// Giant planets
// -------------------------------------------------------------------------------------------------

/// Full planet name for a natural-satellite designation letter.
pub fn planet_name(letter: char) -> Option<&'static str> {
    match letter {
        'J' => Some("Jupiter"),
        'S' => Some("Saturn"),
        'U' => Some("Uranus"),
        'N' => Some("Neptune"),
        _ => None,
    }
}

/// Designation letter for a giant-planet name.
pub fn planet_letter(name: &str) -> Option<char> {
    match name {
        "Jupiter" => Some('J'),
        "Saturn" => Some('S'),
        "Uranus" => Some('U'),
        "Neptune" => Some('N'),
        _ => None,
    }
}

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in arcseconds
pub type ArcSec = f64;
