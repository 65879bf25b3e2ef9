//! # AIS Codec
//!
//! A Rust library for decoding and encoding AIS (Automatic Identification System)
//! sentences and for estimating the collision risk between AIS targets.
//!
//! AIS messages travel as `!AIVDM`/`!AIVDO` sentences carrying a six-bit armored
//! binary payload. This library provides:
//!
//! - Sentence framing and checksum validation
//! - Reassembly of messages spread over several sentences
//! - Typed access to the payload bits and dispatch by message type
//! - Dead reckoning of moving targets and CPA/TCPA based risk classification
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization support
//!
//! ## Example
//!
//! ```
//! use ais_codec::{Message, Parser};
//!
//! let parser = Parser::default();
//! let message = parser.parse("!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5C")?;
//! if let Some(Message::PositionReportClassA(report)) = message {
//!     println!("{} at {}, {}", report.header.mmsi, report.latitude, report.longitude);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod estimation;
pub mod message;
pub mod parser;
pub mod payload;
pub mod position;
pub mod risk;
pub mod sentence;
pub mod target;

pub use core::{Channel, MessageType, Mmsi, MmsiType, SentenceKind};
pub use error::{AisError, Result};
pub use estimation::TrackEstimationParameters;
pub use message::{Message, PositionReportClassA, StaticAndVoyageData};
pub use parser::{Parser, ParserBuilder};
pub use payload::BitPayload;
pub use position::GeographicPosition;
pub use risk::{SafetyState, ShipRelativePosition};
pub use sentence::Sentence;
pub use target::{AisTarget, MovingTarget, Ship};

/// AIS wire format constants
pub mod wire {
    /// Bits per armored payload character
    pub const BITS_PER_CHARACTER: usize = 6;

    /// Length of the header common to all messages
    pub const HEADER_BITS: usize = crate::message::HEADER_BITS;

    /// Maximum number of armored characters per generated sentence
    pub const MAX_PAYLOAD_LENGTH: usize = crate::parser::MAX_PAYLOAD_LENGTH;

    /// Maximum number of sentences per message
    pub const MAX_FRAGMENTS: usize = crate::parser::MAX_FRAGMENTS;

    /// Highest message type tag
    pub const MAX_MESSAGE_TYPE: u8 = 27;
}
