//! The binary payload of an AIS message
//!
//! A [`BitPayload`] is read by absolute bit index when decoding and grows by
//! appending when encoding. Fields are stored most significant bit first.

use crate::core::{MessageType, Mmsi};
use crate::encoding::{text_char, text_value, ArmorDecoder, ArmorEncoder};
use crate::error::{AisError, Result};

/// Raw rate-of-turn value meaning "no turn information available"
pub const RATE_OF_TURN_NOT_AVAILABLE: i32 = -128;

/// Raw true-heading value meaning "not available"
pub const TRUE_HEADING_NOT_AVAILABLE: u32 = 511;

/// Latitude and longitude are transmitted in 1/10000 arc-minutes
const POSITION_SCALE: f64 = 600_000.0;

/// Speed, course and draught are transmitted in tenths
const TENTHS_SCALE: f64 = 10.0;

/// Bit string of an AIS message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitPayload {
    bits: Vec<bool>,
    /// Number of trailing bits that are padding, as declared by the sentence
    fill_bits: u8,
}

impl BitPayload {
    /// Create an empty payload, ready for appending
    pub fn new() -> Self {
        BitPayload::default()
    }

    /// Create a payload from a bit string
    pub fn from_bits(bits: Vec<bool>) -> Self {
        BitPayload { bits, fill_bits: 0 }
    }

    /// Decode an armored sentence payload
    pub fn from_armored(armored: &str, fill_bits: u8) -> Result<Self> {
        let bits = ArmorDecoder::decode(armored, fill_bits)?;
        Ok(BitPayload { bits, fill_bits })
    }

    /// Armor the payload for transmission, returning the text and its fill-bit count
    pub fn to_armored(&self) -> (String, u8) {
        ArmorEncoder::encode(&self.bits)
    }

    /// Length in bits, including any fill bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether no bits have been written
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Fill bits declared for this payload when it was decoded
    pub fn fill_bits(&self) -> u8 {
        self.fill_bits
    }

    /// Length without the declared fill bits
    pub fn significant_len(&self) -> usize {
        self.bits.len().saturating_sub(self.fill_bits as usize)
    }

    /// The raw bit string
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Read a single bit; bits past the end read as zero
    pub fn bit(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// The raw six-bit message type tag
    pub fn message_type_tag(&self) -> u8 {
        self.read_uint(0, 6) as u8
    }

    /// The message type, if the tag is a known one
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::try_from(self.message_type_tag()).ok()
    }

    fn read_raw(&self, start: usize, length: usize) -> u64 {
        debug_assert!(length <= 64);
        (start..start + length).fold(0u64, |acc, i| (acc << 1) | self.bit(i) as u64)
    }

    fn write_raw(&mut self, value: u64, length: usize) {
        for shift in (0..length).rev() {
            self.bits.push((value >> shift) & 1 != 0);
        }
    }

    // ---- readers ----

    /// Read an unsigned integer of up to 32 bits
    pub fn read_uint(&self, start: usize, length: usize) -> u32 {
        self.read_raw(start, length.min(32)) as u32
    }

    /// Read a two's complement signed integer of up to 32 bits
    pub fn read_int(&self, start: usize, length: usize) -> i32 {
        let length = length.min(32);
        if length == 0 {
            return 0;
        }
        let raw = self.read_raw(start, length) as i64;
        if self.bit(start) {
            (raw - (1i64 << length)) as i32
        } else {
            raw as i32
        }
    }

    /// Read the numeric value of an enumerated field
    pub fn read_enum_tag(&self, start: usize, length: usize) -> u32 {
        self.read_uint(start, length)
    }

    /// Read a message type tag, `None` if it names no known type
    pub fn read_message_type(&self, start: usize, length: usize) -> Option<MessageType> {
        u8::try_from(self.read_uint(start, length))
            .ok()
            .and_then(|tag| MessageType::try_from(tag).ok())
    }

    /// Read a boolean flag
    pub fn read_bool(&self, start: usize) -> bool {
        self.bit(start)
    }

    /// Read an MMSI; zero means "no station" and reads as `None`
    pub fn read_mmsi(&self, start: usize, length: usize) -> Option<Mmsi> {
        match self.read_uint(start, length) {
            0 => None,
            value => Mmsi::new(value).ok(),
        }
    }

    /// Read an unsigned integer as floating point value
    pub fn read_unsigned_double(&self, start: usize, length: usize) -> f64 {
        self.read_raw(start, length) as f64
    }

    /// Read a signed integer as floating point value
    pub fn read_double(&self, start: usize, length: usize) -> f64 {
        if length == 0 {
            return 0.0;
        }
        let raw = self.read_raw(start, length) as f64;
        if self.bit(start) {
            raw - 2f64.powi(length as i32)
        } else {
            raw
        }
    }

    /// Read a latitude in degrees
    pub fn read_latitude(&self, start: usize, length: usize) -> f64 {
        self.read_double(start, length) / POSITION_SCALE
    }

    /// Read a longitude in degrees
    pub fn read_longitude(&self, start: usize, length: usize) -> f64 {
        self.read_double(start, length) / POSITION_SCALE
    }

    /// Read a speed over ground in knots
    pub fn read_speed_over_ground(&self, start: usize, length: usize) -> f64 {
        self.read_unsigned_double(start, length) / TENTHS_SCALE
    }

    /// Read a course over ground in degrees
    pub fn read_course_over_ground(&self, start: usize, length: usize) -> f64 {
        self.read_unsigned_double(start, length) / TENTHS_SCALE
    }

    /// Read a draught in meters
    pub fn read_draught(&self, start: usize, length: usize) -> f64 {
        self.read_unsigned_double(start, length) / TENTHS_SCALE
    }

    /// Read the raw rate of turn, `None` when the sentinel -128 is transmitted
    pub fn read_rate_of_turn(&self, start: usize, length: usize) -> Option<i32> {
        match self.read_int(start, length) {
            RATE_OF_TURN_NOT_AVAILABLE => None,
            rot => Some(rot),
        }
    }

    /// Read the true heading in degrees, `None` when the sentinel 511 is transmitted
    pub fn read_true_heading(&self, start: usize, length: usize) -> Option<u32> {
        match self.read_uint(start, length) {
            TRUE_HEADING_NOT_AVAILABLE => None,
            heading => Some(heading),
        }
    }

    /// Data terminal ready flag; a zero bit means ready
    pub fn read_data_terminal_ready(&self, start: usize) -> bool {
        !self.bit(start)
    }

    /// Read a six-bit text field.
    ///
    /// Stops at the first `@` (value 0) or at the end of the field and trims
    /// trailing blanks.
    pub fn read_six_bit_string(&self, start: usize, length: usize) -> String {
        let mut text = String::with_capacity(length / 6);
        for i in 0..length / 6 {
            let value = self.read_uint(start + i * 6, 6) as u8;
            if value == 0 {
                break;
            }
            text.push(text_char(value));
        }
        text.trim_end().to_string()
    }

    // ---- writers ----

    /// Append an unsigned integer
    pub fn write_uint(&mut self, value: u32, length: usize) {
        self.write_raw(value as u64, length);
    }

    /// Append a two's complement signed integer
    pub fn write_int(&mut self, value: i32, length: usize) {
        self.write_raw(value as i64 as u64, length);
    }

    /// Append the numeric value of an enumerated field
    pub fn write_enum_tag(&mut self, tag: u32, length: usize) {
        self.write_uint(tag, length);
    }

    /// Append a boolean flag
    pub fn write_bool(&mut self, value: bool) {
        self.bits.push(value);
    }

    /// Append an MMSI, writing zero for `None`
    pub fn write_mmsi(&mut self, mmsi: Option<Mmsi>, length: usize) {
        self.write_uint(mmsi.map(|m| m.value()).unwrap_or(0), length);
    }

    /// Append the integral part of a non-negative number
    pub fn write_unsigned_double(&mut self, value: f64, length: usize) {
        self.write_raw(value.max(0.0).round() as u64, length);
    }

    /// Append a number as two's complement integer
    pub fn write_double(&mut self, value: f64, length: usize) {
        self.write_raw(value.round() as i64 as u64, length);
    }

    /// Append a latitude in degrees
    pub fn write_latitude(&mut self, degrees: f64, length: usize) {
        self.write_double(degrees * POSITION_SCALE, length);
    }

    /// Append a longitude in degrees
    pub fn write_longitude(&mut self, degrees: f64, length: usize) {
        self.write_double(degrees * POSITION_SCALE, length);
    }

    /// Append a speed over ground in knots
    pub fn write_speed_over_ground(&mut self, knots: f64, length: usize) {
        self.write_unsigned_double(knots * TENTHS_SCALE, length);
    }

    /// Append a course over ground in degrees
    pub fn write_course_over_ground(&mut self, degrees: f64, length: usize) {
        self.write_unsigned_double(degrees * TENTHS_SCALE, length);
    }

    /// Append a draught in meters
    pub fn write_draught(&mut self, meters: f64, length: usize) {
        self.write_unsigned_double(meters * TENTHS_SCALE, length);
    }

    /// Append a raw rate of turn, writing the sentinel for `None`
    pub fn write_rate_of_turn(&mut self, rate_of_turn: Option<i32>, length: usize) {
        self.write_int(rate_of_turn.unwrap_or(RATE_OF_TURN_NOT_AVAILABLE), length);
    }

    /// Append a true heading, writing the sentinel for `None`
    pub fn write_true_heading(&mut self, heading: Option<u32>, length: usize) {
        self.write_uint(heading.unwrap_or(TRUE_HEADING_NOT_AVAILABLE), length);
    }

    /// Append the data terminal ready flag
    pub fn write_data_terminal_ready(&mut self, ready: bool) {
        self.bits.push(!ready);
    }

    /// Append a six-bit text field of at most `length` bits.
    ///
    /// Text longer than the field is truncated. With `pad_to_length` the field
    /// is filled up with `@` so that exactly `length` bits are written.
    /// Returns the number of bits written.
    pub fn write_six_bit_string(
        &mut self,
        text: &str,
        length: usize,
        pad_to_length: bool,
    ) -> Result<usize> {
        if length % 6 != 0 {
            return Err(AisError::invalid_field_length(format!(
                "text field length {} is not a multiple of 6",
                length
            )));
        }

        let mut written = 0;
        for c in text.chars().take(length / 6) {
            self.write_uint(text_value(c) as u32, 6);
            written += 6;
        }
        while pad_to_length && written < length {
            self.write_uint(0, 6);
            written += 6;
        }
        Ok(written)
    }
}

impl From<Vec<bool>> for BitPayload {
    fn from(bits: Vec<bool>) -> Self {
        BitPayload::from_bits(bits)
    }
}
