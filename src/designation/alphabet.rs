//! Base-62 packing alphabet shared by every packed-designation zone.
//!
//! A packing digit encodes a value from 0 to 61 as `0`-`9`, then `A`-`Z` for
//! 10-35, then `a`-`z` for 36-61. The same alphabet serves minor planet number
//! heads, provisional-year century letters and cycle counts.

/// The 62 packing digits in value order.
pub const PACK_LETTERS: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Numeric value of a packing digit.
///
/// Returns `None` for any character outside the alphabet.
pub fn value_of(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 36),
        _ => None,
    }
}

/// Packing digit for a value below 62.
pub fn char_of(value: u32) -> Option<char> {
    PACK_LETTERS.get(value as usize).map(|b| *b as char)
}

#[cfg(test)]
mod alphabet_tests {
    use super::*;

    #[test]
    fn roundtrip_all_values() {
        for v in 0..62 {
            let c = char_of(v).unwrap();
            assert_eq!(value_of(c), Some(v));
        }
    }

    #[test]
    fn boundaries() {
        assert_eq!(value_of('0'), Some(0));
        assert_eq!(value_of('9'), Some(9));
        assert_eq!(value_of('A'), Some(10));
        assert_eq!(value_of('Z'), Some(35));
        assert_eq!(value_of('a'), Some(36));
        assert_eq!(value_of('z'), Some(61));
        assert_eq!(char_of(62), None);
    }

    #[test]
    fn rejects_non_alphabet() {
        assert_eq!(value_of(' '), None);
        assert_eq!(value_of('-'), None);
        assert_eq!(value_of('é'), None);
    }
}
