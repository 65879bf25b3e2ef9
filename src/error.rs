//! Error types for AIS decoding, encoding and track estimation

use thiserror::Error;

/// Result type for AIS operations
pub type Result<T> = std::result::Result<T, AisError>;

/// Error types encountered while handling AIS sentences and targets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AisError {
    /// Sentence framing is broken (prefix, delimiter or field count)
    #[error("Invalid sentence: {0}")]
    InvalidSentence(String),

    /// The transmitted checksum does not match the sentence content
    #[error("Checksum mismatch: {0}")]
    ChecksumMismatch(String),

    /// Packet header is neither `!AIVDM` nor `!AIVDO`
    #[error("Unknown header: {0}")]
    UnknownHeader(String),

    /// Armored payload contains characters outside the six-bit alphabet
    #[error("Invalid armored payload: {0}")]
    InvalidArmor(String),

    /// Message type tag has no registered decoder
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// Message is too long to fit into nine sentences
    #[error("Encoding overflow: {0}")]
    EncodingOverflow(String),

    /// Message cannot be encoded
    #[error("Unsupported message: {0}")]
    UnsupportedMessage(String),

    /// A field length does not fit the requested encoding
    #[error("Invalid field length: {0}")]
    InvalidFieldLength(String),

    /// MMSI outside the 30-bit range
    #[error("Invalid MMSI: {0}")]
    InvalidMmsi(String),

    /// Invalid step size, time range or other call argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Track estimation parameters could not be read
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The own ship has no usable position
    #[error("No valid position: {0}")]
    NoValidPosition(String),

    /// Estimated tracks of two targets do not line up
    #[error("Internal error, inconsistent tracks: {0}")]
    InconsistentTracks(String),
}

impl AisError {
    /// Create a new InvalidSentence error
    pub fn invalid_sentence(msg: impl Into<String>) -> Self {
        AisError::InvalidSentence(msg.into())
    }

    /// Create a new ChecksumMismatch error
    pub fn checksum_mismatch(msg: impl Into<String>) -> Self {
        AisError::ChecksumMismatch(msg.into())
    }

    /// Create a new UnknownHeader error
    pub fn unknown_header(msg: impl Into<String>) -> Self {
        AisError::UnknownHeader(msg.into())
    }

    /// Create a new InvalidArmor error
    pub fn invalid_armor(msg: impl Into<String>) -> Self {
        AisError::InvalidArmor(msg.into())
    }

    /// Create a new UnknownMessageType error
    pub fn unknown_message_type(msg: impl Into<String>) -> Self {
        AisError::UnknownMessageType(msg.into())
    }

    /// Create a new EncodingOverflow error
    pub fn encoding_overflow(msg: impl Into<String>) -> Self {
        AisError::EncodingOverflow(msg.into())
    }

    /// Create a new UnsupportedMessage error
    pub fn unsupported_message(msg: impl Into<String>) -> Self {
        AisError::UnsupportedMessage(msg.into())
    }

    /// Create a new InvalidFieldLength error
    pub fn invalid_field_length(msg: impl Into<String>) -> Self {
        AisError::InvalidFieldLength(msg.into())
    }

    /// Create a new InvalidMmsi error
    pub fn invalid_mmsi(msg: impl Into<String>) -> Self {
        AisError::InvalidMmsi(msg.into())
    }

    /// Create a new InvalidArgument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AisError::InvalidArgument(msg.into())
    }

    /// Create a new InvalidConfiguration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        AisError::InvalidConfiguration(msg.into())
    }

    /// Create a new NoValidPosition error
    pub fn no_valid_position(msg: impl Into<String>) -> Self {
        AisError::NoValidPosition(msg.into())
    }

    /// Create a new InconsistentTracks error
    pub fn inconsistent_tracks(msg: impl Into<String>) -> Self {
        AisError::InconsistentTracks(msg.into())
    }

    /// Whether this error stems from broken sentence framing
    pub fn is_framing_error(&self) -> bool {
        matches!(
            self,
            AisError::InvalidSentence(_) | AisError::ChecksumMismatch(_) | AisError::UnknownHeader(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AisError::checksum_mismatch("expected 5C, got 5F");
        assert!(err.to_string().contains("Checksum mismatch"));
        assert!(err.to_string().contains("5C"));
    }

    #[test]
    fn test_framing_classification() {
        assert!(AisError::invalid_sentence("x").is_framing_error());
        assert!(AisError::unknown_header("x").is_framing_error());
        assert!(!AisError::encoding_overflow("x").is_framing_error());
    }
}
