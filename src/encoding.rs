//! Six-bit ASCII armoring used inside AIS sentences
//!
//! Two distinct six-bit alphabets are involved: the *armor* alphabet that maps
//! each 6-bit group of the binary payload onto a printable character of the
//! sentence, and the *text* alphabet used for string fields (ship names, call
//! signs) inside the binary payload itself.

use crate::error::{AisError, Result};
use crate::wire::BITS_PER_CHARACTER;

/// Armor alphabet, indexed by 6-bit value
const ARMOR_CHARS: &[u8; 64] =
    b"0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVW`abcdefghijklmnopqrstuvw";

/// Text alphabet for string fields, indexed by 6-bit value. Value 0 (`@`)
/// terminates a string.
const TEXT_CHARS: &[u8; 64] =
    b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_ !\"#$%&'()*+,-./0123456789:;<=>?";

/// Substituted for characters that have no six-bit text representation
pub const PLACEHOLDER: char = '?';

/// Map an armor character to its 6-bit value
///
/// `'0'..='W'` map to 0..=39 and `` '`'..='w' `` map to 40..=63; the eight
/// characters between the two ranges are skipped.
pub fn armor_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'W' => Some(c - 48),
        b'`'..=b'w' => Some(c - 56),
        _ => None,
    }
}

/// Map a 6-bit value to its armor character
pub fn armor_char(value: u8) -> char {
    ARMOR_CHARS[(value & 0x3F) as usize] as char
}

/// Map a 6-bit value of a text field to its character
pub fn text_char(value: u8) -> char {
    TEXT_CHARS
        .get(value as usize)
        .map(|&c| c as char)
        .unwrap_or(PLACEHOLDER)
}

/// Map a character to its six-bit text value.
///
/// Lowercase letters are folded to uppercase. Characters outside the alphabet,
/// and `@` which would terminate the string, become [`PLACEHOLDER`].
pub fn text_value(c: char) -> u8 {
    let upper = c.to_ascii_uppercase();
    if upper != '@' && upper.is_ascii() {
        if let Some(pos) = TEXT_CHARS.iter().position(|&t| t as char == upper) {
            return pos as u8;
        }
    }
    TEXT_CHARS
        .iter()
        .position(|&t| t as char == PLACEHOLDER)
        .unwrap_or(0) as u8
}

/// Armors a bit string into printable characters
pub struct ArmorEncoder;

impl ArmorEncoder {
    /// Encode bits into armored text.
    ///
    /// Returns the text together with the number of zero bits appended to
    /// complete the last six-bit group; this is the fill-bit count of the last
    /// outgoing sentence.
    pub fn encode(bits: &[bool]) -> (String, u8) {
        let mut result = String::with_capacity(bits.len().div_ceil(BITS_PER_CHARACTER));
        for group in bits.chunks(BITS_PER_CHARACTER) {
            let mut value = 0u8;
            for i in 0..BITS_PER_CHARACTER {
                value <<= 1;
                if group.get(i).copied().unwrap_or(false) {
                    value |= 1;
                }
            }
            result.push(armor_char(value));
        }

        let remainder = bits.len() % BITS_PER_CHARACTER;
        let fill_bits = if remainder == 0 {
            0
        } else {
            BITS_PER_CHARACTER - remainder
        };
        (result, fill_bits as u8)
    }
}

/// Turns armored text back into a bit string
pub struct ArmorDecoder;

impl ArmorDecoder {
    /// Decode armored text into bits, most significant bit of each character first.
    ///
    /// The fill bits are part of the last character already, so the result is
    /// always a multiple of six bits long. An empty input yields no bits.
    pub fn decode(armored: &str, fill_bits: u8) -> Result<Vec<bool>> {
        if fill_bits > 5 {
            return Err(AisError::invalid_armor(format!(
                "fill bit count {} out of range [0, 5]",
                fill_bits
            )));
        }

        let mut bits: Vec<bool> = Vec::with_capacity(armored.len() * BITS_PER_CHARACTER);
        for (index, c) in armored.bytes().enumerate() {
            let value = armor_value(c).ok_or_else(|| {
                AisError::invalid_armor(format!(
                    "character {:?} at position {} is not six-bit armor",
                    c as char, index
                ))
            })?;
            for shift in (0..6).rev() {
                bits.push((value >> shift) & 1 != 0);
            }
        }

        Ok(bits)
    }
}
