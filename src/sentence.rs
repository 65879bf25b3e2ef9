//! AIS sentence framing
//!
//! Format:
//! `!AIVDM,<count>,<number>,<group id>,<channel>,<payload>,<fill bits>*<checksum>`
//!
//! The checksum is the XOR of all bytes between `!` and `*`, written as two
//! hexadecimal digits.

use std::str::FromStr;

use crate::core::{Channel, SentenceKind};
use crate::error::{AisError, Result};

/// Number of comma separated fields following the packet header
pub const FIELD_COUNT: usize = 6;

/// Calculate the checksum over the sentence body (without `!` and `*`)
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// One framed AIS sentence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sentence {
    /// VDM or VDO
    pub kind: SentenceKind,
    /// Total number of sentences of this message (1-9)
    pub fragment_count: u8,
    /// Position of this sentence within the message, starting at 1
    pub fragment_number: u8,
    /// Sequential message id shared by all fragments of a multi-sentence message
    pub group_id: Option<u8>,
    /// Radio channel, if reported
    pub channel: Option<Channel>,
    /// Armored payload
    pub payload: String,
    /// Number of padding bits in the last payload character
    pub fill_bits: u8,
}

impl Sentence {
    /// Build a sentence from the six fields following the packet header
    pub fn from_fields(kind: SentenceKind, fields: &[&str]) -> Result<Self> {
        if fields.len() != FIELD_COUNT {
            return Err(AisError::invalid_sentence(format!(
                "expected {} fields, got {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        let fragment_count = parse_number(fields[0], "fragment count")?;
        let fragment_number = parse_number(fields[1], "fragment number")?;
        let group_id = match fields[2].trim() {
            "" => None,
            id => Some(parse_number(id, "group id")?),
        };
        let fill_bits = match fields[5].trim() {
            "" => 0,
            fill => parse_number(fill, "fill bits")?,
        };

        Ok(Sentence {
            kind,
            fragment_count,
            fragment_number,
            group_id,
            channel: Channel::from_field(fields[3].trim()),
            payload: fields[4].to_string(),
            fill_bits,
        })
    }

    /// The sentence without the leading `!` and trailing checksum
    fn body(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            &self.kind.header()[1..],
            self.fragment_count,
            self.fragment_number,
            self.group_id.map(|id| id.to_string()).unwrap_or_default(),
            self.channel.map(|c| c.to_string()).unwrap_or_default(),
            self.payload,
            self.fill_bits
        )
    }

    /// Whether this sentence is a complete message on its own
    pub fn is_single_fragment(&self) -> bool {
        self.fragment_count == 1
    }
}

fn parse_number(field: &str, name: &str) -> Result<u8> {
    field.trim().parse::<u8>().map_err(|_| {
        AisError::invalid_sentence(format!("{} {:?} is not a number", name, field))
    })
}

impl FromStr for Sentence {
    type Err = AisError;

    /// Parse and validate a complete sentence including its checksum
    fn from_str(sentence: &str) -> Result<Self> {
        let sentence = sentence.trim_end();
        if sentence.is_empty() {
            return Err(AisError::invalid_sentence("empty sentence"));
        }
        if !sentence.starts_with('!') {
            return Err(AisError::invalid_sentence(format!(
                "sentence must start with '!': {}",
                sentence
            )));
        }

        let checksum_index = sentence.find('*').ok_or_else(|| {
            AisError::invalid_sentence(format!("unable to find checksum: {}", sentence))
        })?;

        let transmitted = sentence
            .get(checksum_index + 1..)
            .filter(|digits| digits.len() == 2)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .ok_or_else(|| {
                AisError::invalid_sentence(format!("malformed checksum: {}", sentence))
            })?;

        let body = &sentence[1..checksum_index];
        let calculated = checksum(body);
        if transmitted != calculated {
            return Err(AisError::checksum_mismatch(format!(
                "checksum {:02X}, calculated {:02X}: {}",
                transmitted, calculated, sentence
            )));
        }

        let parts: Vec<&str> = sentence[..checksum_index].split(',').collect();
        let kind = SentenceKind::from_header(parts[0])?;
        Sentence::from_fields(kind, &parts[1..])
    }
}

impl std::fmt::Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = self.body();
        write!(f, "!{}*{:02X}", body, checksum(&body))
    }
}
