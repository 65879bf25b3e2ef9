//! High-level AIS sentence parser and encoder
//!
//! The parser validates framing, reassembles multi-sentence messages and hands
//! complete payloads to the [`MessageDispatcher`]. In the other direction it
//! turns messages into one or more sentences.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use log::{debug, warn};

use crate::core::{Channel, SentenceKind};
use crate::dispatch::MessageDispatcher;
use crate::error::{AisError, Result};
use crate::message::Message;
use crate::payload::BitPayload;
use crate::sentence::Sentence;

/// Maximum number of armored characters per outgoing sentence
pub const MAX_PAYLOAD_LENGTH: usize = 60;

/// Maximum number of sentences a message may be split into
pub const MAX_FRAGMENTS: usize = 9;

/// AIS sentence parser and encoder
///
/// One parser instance may be shared between threads; fragment reassembly is
/// serialized by an internal lock.
#[derive(Debug)]
pub struct Parser {
    dispatcher: MessageDispatcher,
    /// Header of generated sentences
    pub generated_sentences: SentenceKind,
    /// Armored fragments of incomplete messages, by group id
    fragments: Mutex<HashMap<u8, Vec<String>>>,
    next_group_id: AtomicU8,
}

impl Parser {
    /// Create a new parser
    pub fn new(throw_on_unknown_message: bool) -> Self {
        Parser {
            dispatcher: MessageDispatcher::new(throw_on_unknown_message),
            generated_sentences: SentenceKind::Vdo,
            fragments: Mutex::new(HashMap::new()),
            next_group_id: AtomicU8::new(1),
        }
    }

    /// The dispatcher used to decode and encode payloads
    pub fn dispatcher(&self) -> &MessageDispatcher {
        &self.dispatcher
    }

    /// Decode a raw sentence.
    ///
    /// Framing errors (prefix, missing or wrong checksum, unknown header) are
    /// returned as errors. `Ok(None)` means the sentence was valid but did not
    /// complete a message: it was one fragment of several, its payload was
    /// empty or undecodable, or its type is unknown to a lenient parser.
    pub fn parse(&self, sentence: &str) -> Result<Option<Message>> {
        let sentence: Sentence = sentence.parse()?;
        self.parse_sentence(&sentence)
    }

    /// Decode a sentence that has already been split into its fields.
    ///
    /// `fields` are the six fields following the packet header; no checksum
    /// is verified.
    pub fn parse_fields(&self, kind: SentenceKind, fields: &[&str]) -> Result<Option<Message>> {
        let sentence = Sentence::from_fields(kind, fields)?;
        self.parse_sentence(&sentence)
    }

    /// Decode a framed sentence
    pub fn parse_sentence(&self, sentence: &Sentence) -> Result<Option<Message>> {
        if sentence.payload.trim().is_empty() {
            return Ok(None);
        }

        if sentence.is_single_fragment() {
            return self.decode_and_dispatch(&sentence.payload, sentence.fill_bits);
        }

        let group_id = sentence.group_id.unwrap_or(0);
        let fragment_count = sentence.fragment_count as usize;
        let fragment_number = sentence.fragment_number as usize;

        let mut fragments = self
            .fragments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if fragment_number == 1 {
            // Replaces any unfinished group with the same id
            let mut parts = Vec::with_capacity(fragment_count);
            parts.push(sentence.payload.clone());
            fragments.insert(group_id, parts);
            return Ok(None);
        }

        let in_sequence = fragment_number <= fragment_count
            && fragments
                .get(&group_id)
                .map_or(false, |parts| parts.len() + 1 == fragment_number);
        if !in_sequence {
            debug!(
                "Dropping incomplete AIS message group {} at fragment {}/{}",
                group_id, fragment_number, fragment_count
            );
            fragments.remove(&group_id);
            return Ok(None);
        }
        if let Some(parts) = fragments.get_mut(&group_id) {
            parts.push(sentence.payload.clone());
        }

        if fragment_number == fragment_count {
            let complete = fragments
                .get(&group_id)
                .map_or(false, |parts| parts.len() == fragment_count);
            if complete {
                if let Some(parts) = fragments.remove(&group_id) {
                    let armored = parts.concat();
                    return self.decode_and_dispatch(&armored, sentence.fill_bits);
                }
            }
        }

        Ok(None)
    }

    fn decode_and_dispatch(&self, armored: &str, fill_bits: u8) -> Result<Option<Message>> {
        let payload = match BitPayload::from_armored(armored, fill_bits) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Unable to decode AIS payload {}: {}", armored, e);
                return Ok(None);
            }
        };
        self.dispatcher.decode(&payload)
    }

    /// Number of message groups currently waiting for more fragments
    pub fn pending_groups(&self) -> usize {
        self.fragments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Encode a message into as many sentences as needed
    pub fn to_sentences(&self, message: &Message) -> Result<Vec<Sentence>> {
        let payload = self.dispatcher.encode(message)?;
        let (armored, fill_bits) = payload.to_armored();

        // Armored text is ASCII, so byte offsets are character boundaries
        let chunks: Vec<&str> = (0..armored.len())
            .step_by(MAX_PAYLOAD_LENGTH)
            .map(|start| &armored[start..armored.len().min(start + MAX_PAYLOAD_LENGTH)])
            .collect();

        if chunks.len() > MAX_FRAGMENTS {
            return Err(AisError::encoding_overflow(format!(
                "{} needs {} sentences, at most {} are allowed",
                message.message_type(),
                chunks.len(),
                MAX_FRAGMENTS
            )));
        }

        let group_id = if chunks.len() > 1 {
            Some(self.next_group_id())
        } else {
            None
        };

        let fragment_count = chunks.len() as u8;
        let sentences = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                let fragment_number = index as u8 + 1;
                Sentence {
                    kind: self.generated_sentences,
                    fragment_count,
                    fragment_number,
                    group_id,
                    channel: Some(Channel::A),
                    payload: chunk.to_string(),
                    // Only the last sentence carries padding
                    fill_bits: if fragment_number == fragment_count {
                        fill_bits
                    } else {
                        0
                    },
                }
            })
            .collect();

        Ok(sentences)
    }

    /// Next sequential message id, cycling through 1 to 9
    fn next_group_id(&self) -> u8 {
        let previous = self
            .next_group_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| {
                Some(if id >= MAX_FRAGMENTS as u8 { 1 } else { id + 1 })
            });
        match previous {
            Ok(id) | Err(id) => id,
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(false)
    }
}

/// Builder for AIS parsers
pub struct ParserBuilder {
    throw_on_unknown_message: bool,
    generated_sentences: SentenceKind,
}

impl ParserBuilder {
    /// Create a new parser builder
    pub fn new() -> Self {
        ParserBuilder {
            throw_on_unknown_message: false,
            generated_sentences: SentenceKind::Vdo,
        }
    }

    /// Fail on message types without a decoder instead of skipping them
    pub fn with_throw_on_unknown_message(mut self, throw: bool) -> Self {
        self.throw_on_unknown_message = throw;
        self
    }

    /// Set the header of generated sentences
    pub fn with_generated_sentences(mut self, kind: SentenceKind) -> Self {
        self.generated_sentences = kind;
        self
    }

    /// Build the parser
    pub fn build(self) -> Parser {
        let mut parser = Parser::new(self.throw_on_unknown_message);
        parser.generated_sentences = self.generated_sentences;
        parser
    }
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
