//! Message type dispatch
//!
//! A fixed table maps each six-bit message type tag to the decoder for its
//! layout. Tags 1 to 27 are known; everything else is unknown and handled
//! according to the dispatcher's strictness.

use log::warn;

use crate::error::{AisError, Result};
use crate::message::{
    Message, PositionReportClassA, RawMessage, StaticAndVoyageData, HEADER_BITS,
};
use crate::payload::BitPayload;
use crate::wire::MAX_MESSAGE_TYPE;

type DecodeFn = fn(&BitPayload) -> Result<Message>;

fn decode_position_report(payload: &BitPayload) -> Result<Message> {
    PositionReportClassA::from_payload(payload).map(Message::PositionReportClassA)
}

fn decode_static_and_voyage_data(payload: &BitPayload) -> Result<Message> {
    StaticAndVoyageData::from_payload(payload).map(Message::StaticAndVoyageData)
}

fn decode_raw(payload: &BitPayload) -> Result<Message> {
    RawMessage::from_payload(payload).map(Message::Raw)
}

/// Decoders indexed by message type tag
const DECODERS: [Option<DecodeFn>; MAX_MESSAGE_TYPE as usize + 1] = [
    None,
    Some(decode_position_report),
    Some(decode_position_report),
    Some(decode_position_report),
    Some(decode_raw),
    Some(decode_static_and_voyage_data),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
    Some(decode_raw),
];

/// Routes payloads to the decoder of their message type and messages back
/// to bits
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDispatcher {
    throw_on_unknown_message: bool,
}

impl MessageDispatcher {
    /// Create a dispatcher.
    ///
    /// With `throw_on_unknown_message` an unknown type tag is an error,
    /// otherwise it is logged and skipped.
    pub fn new(throw_on_unknown_message: bool) -> Self {
        MessageDispatcher {
            throw_on_unknown_message,
        }
    }

    /// Whether unknown message types are reported as errors
    pub fn throws_on_unknown_message(&self) -> bool {
        self.throw_on_unknown_message
    }

    /// Decode a payload into a typed message
    pub fn decode(&self, payload: &BitPayload) -> Result<Option<Message>> {
        let tag = payload.message_type_tag();
        match DECODERS.get(tag as usize).copied().flatten() {
            Some(decoder) => decoder(payload).map(Some),
            None if self.throw_on_unknown_message => Err(AisError::unknown_message_type(
                format!("no decoder for message type {}", tag),
            )),
            None => {
                warn!("Ignoring AIS message with unknown type {}", tag);
                Ok(None)
            }
        }
    }

    /// Encode a message into its payload
    pub fn encode(&self, message: &Message) -> Result<BitPayload> {
        let payload = match message {
            Message::PositionReportClassA(report) => report.to_payload()?,
            Message::StaticAndVoyageData(data) => data.to_payload()?,
            Message::Raw(raw) => raw.to_payload()?,
        };

        if payload.len() <= HEADER_BITS {
            return Err(AisError::unsupported_message(format!(
                "{} has no body to encode",
                message.message_type()
            )));
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MessageType, Mmsi};
    use crate::message::MessageHeader;

    fn payload_with_tag(tag: u32) -> BitPayload {
        let mut payload = BitPayload::new();
        payload.write_uint(tag, 6);
        payload.write_uint(0, 2);
        payload.write_uint(123456789, 30);
        payload.write_uint(0, 130);
        payload
    }

    #[test]
    fn test_table_covers_all_known_types() {
        for tag in 1..=MAX_MESSAGE_TYPE {
            assert!(DECODERS[tag as usize].is_some(), "tag {}", tag);
            assert!(MessageType::try_from(tag).is_ok());
        }
        assert!(DECODERS[0].is_none());
    }

    #[test]
    fn test_dispatch_by_tag() -> Result<()> {
        let dispatcher = MessageDispatcher::new(true);
        for tag in 1..=3 {
            let message = dispatcher.decode(&payload_with_tag(tag))?;
            assert!(matches!(message, Some(Message::PositionReportClassA(_))));
        }
        let message = dispatcher.decode(&payload_with_tag(18))?;
        match message {
            Some(Message::Raw(raw)) => {
                assert_eq!(raw.header.message_type, MessageType::StandardClassBCsPositionReport);
                assert_eq!(raw.header.mmsi.value(), 123456789);
            }
            other => panic!("unexpected {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_unknown_type_strictness() {
        let strict = MessageDispatcher::new(true);
        let lenient = MessageDispatcher::new(false);
        for tag in [0, 28, 63] {
            assert!(matches!(
                strict.decode(&payload_with_tag(tag)),
                Err(AisError::UnknownMessageType(_))
            ));
            assert_eq!(lenient.decode(&payload_with_tag(tag)), Ok(None));
        }
    }

    #[test]
    fn test_encode_rejects_header_only() -> Result<()> {
        let mut payload = BitPayload::new();
        MessageHeader::new(MessageType::UtcAndDateInquiry, Mmsi::new(1)?).write_to(&mut payload);
        let message = Message::Raw(RawMessage::from_payload(&payload)?);
        let dispatcher = MessageDispatcher::default();
        assert!(matches!(
            dispatcher.encode(&message),
            Err(AisError::UnsupportedMessage(_))
        ));
        Ok(())
    }
}
