/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The FIX checksum is the sum of every byte that precedes the `10=` field,
//! delimiters included, modulo 256, rendered as a 3-digit zero-padded string.

/// Calculates the FIX checksum for the given data.
///
/// # Arguments
/// * `data` - The message bytes to checksum (everything before `10=`)
///
/// # Returns
/// The checksum value as a u8 (0-255).
///
/// # Example
/// ```
/// use emberfix_tagvalue::calculate_checksum;
///
/// let data = b"8=FIX.4.2\x019=5\x0135=0\x01";
/// assert_eq!(calculate_checksum(data), 161);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Formats a checksum value as a 3-digit zero-padded string.
///
/// # Arguments
/// * `checksum` - The checksum value (0-255)
///
/// # Returns
/// A 3-character representation (e.g., "042", "255").
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    let d0 = b'0' + (checksum / 100);
    let d1 = b'0' + ((checksum / 10) % 10);
    let d2 = b'0' + (checksum % 10);
    [d0, d1, d2]
}

/// Parses a 3-digit checksum string to a u8 value.
///
/// # Arguments
/// * `bytes` - The 3-byte checksum string
///
/// # Returns
/// `Some(checksum)` if valid, `None` otherwise (including values above 255).
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u8> {
    let [d0, d1, d2] = *bytes else {
        return None;
    };

    let mut value: u16 = 0;
    for d in [d0, d1, d2] {
        if !d.is_ascii_digit() {
            return None;
        }
        value = value * 10 + u16::from(d - b'0');
    }

    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_checksum_empty() {
        assert_eq!(calculate_checksum(b""), 0);
    }

    #[test]
    fn test_calculate_checksum_wraps() {
        let data = vec![255u8; 1000];
        let expected = ((255u32 * 1000) % 256) as u8;
        assert_eq!(calculate_checksum(&data), expected);
    }

    #[test]
    fn test_calculate_checksum_logon() {
        let data = b"8=FIX.4.2\x019=00069\x0135=A\x0149=SERVER\x0156=CLIENT\x0134=177\x01\
52=20090107-18:15:16.000\x0198=0\x01108=30\x01";
        assert_eq!(calculate_checksum(data), 144);
    }

    #[test]
    fn test_format_checksum() {
        assert_eq!(format_checksum(0), *b"000");
        assert_eq!(format_checksum(49), *b"049");
        assert_eq!(format_checksum(144), *b"144");
        assert_eq!(format_checksum(255), *b"255");
    }

    #[test]
    fn test_parse_checksum() {
        assert_eq!(parse_checksum(b"000"), Some(0));
        assert_eq!(parse_checksum(b"094"), Some(94));
        assert_eq!(parse_checksum(b"255"), Some(255));
    }

    #[test]
    fn test_parse_checksum_invalid() {
        assert_eq!(parse_checksum(b""), None);
        assert_eq!(parse_checksum(b"94"), None);
        assert_eq!(parse_checksum(b"0094"), None);
        assert_eq!(parse_checksum(b"12X"), None);
        assert_eq!(parse_checksum(b"256"), None);
        assert_eq!(parse_checksum(b"999"), None);
    }
}
