//! Core identifiers of the AIS protocol

use crate::error::{AisError, Result};

/// VHF data link channel a sentence was received on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// Channel A (161.975 MHz)
    A,
    /// Channel B (162.025 MHz)
    B,
}

impl Channel {
    /// Wire representation of the channel
    pub fn as_char(&self) -> char {
        match self {
            Channel::A => 'A',
            Channel::B => 'B',
        }
    }

    /// Parse the channel field of a sentence.
    ///
    /// Some receivers report `1`/`2` instead of `A`/`B`; an empty field is
    /// treated as unknown.
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "A" | "1" => Some(Channel::A),
            "B" | "2" => Some(Channel::B),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Sentence identifier: reports from other stations or from our own transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SentenceKind {
    /// `!AIVDM`, data received from other vessels
    Vdm,
    /// `!AIVDO`, data about our own vessel
    Vdo,
}

impl SentenceKind {
    /// The complete packet header including the `!` prefix and talker id
    pub fn header(&self) -> &'static str {
        match self {
            SentenceKind::Vdm => "!AIVDM",
            SentenceKind::Vdo => "!AIVDO",
        }
    }

    /// Recognize a packet header
    pub fn from_header(header: &str) -> Result<Self> {
        match header {
            "!AIVDM" => Ok(SentenceKind::Vdm),
            "!AIVDO" => Ok(SentenceKind::Vdo),
            other => Err(AisError::unknown_header(format!(
                "packet header {} is not an AIS header",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// Maritime Mobile Service Identity (30 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mmsi(u32);

/// Station class derived from the leading digits of an MMSI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MmsiType {
    /// A regular ship station (MIDxxxxxx)
    Ship,
    /// Group of ships (0MIDxxxxx)
    Group,
    /// Coast or base station (00MIDxxxx)
    BaseStation,
    /// SAR aircraft (111MIDxxx)
    SarAircraft,
    /// Aid to navigation (99MIDxxxx)
    AtoN,
    /// Craft associated with a parent ship (98MIDxxxx)
    AuxiliaryCraft,
    /// AIS search and rescue transmitter (970xxyyyy)
    AisSart,
    /// Man overboard device (972xxyyyy)
    Mob,
    /// EPIRB with AIS locating signal (974xxyyyy)
    Epirb,
    /// Handheld or diver radio (8MIDxxxxx)
    Handheld,
    /// Anything else (including test and invalid numbers)
    Other,
}

impl Mmsi {
    /// Largest value representable in the 30-bit MMSI field
    pub const MAX: u32 = (1 << 30) - 1;

    /// Create a new MMSI, validating it fits in 30 bits
    pub fn new(value: u32) -> Result<Self> {
        if value > Self::MAX {
            return Err(AisError::invalid_mmsi(format!(
                "MMSI {} exceeds 30 bits",
                value
            )));
        }
        Ok(Mmsi(value))
    }

    /// Get the raw numeric value
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Classify the station from the MMSI digit pattern
    pub fn mmsi_type(&self) -> MmsiType {
        if self.0 > 999_999_999 {
            return MmsiType::Other;
        }
        let digits = format!("{:09}", self.0);
        let first = digits.as_bytes()[0];
        match first {
            b'0' if digits.starts_with("00") => MmsiType::BaseStation,
            b'0' => MmsiType::Group,
            b'1' if digits.starts_with("111") => MmsiType::SarAircraft,
            b'2'..=b'7' => MmsiType::Ship,
            b'8' => MmsiType::Handheld,
            b'9' if digits.starts_with("970") => MmsiType::AisSart,
            b'9' if digits.starts_with("972") => MmsiType::Mob,
            b'9' if digits.starts_with("974") => MmsiType::Epirb,
            b'9' if digits.starts_with("98") => MmsiType::AuxiliaryCraft,
            b'9' if digits.starts_with("99") => MmsiType::AtoN,
            _ => MmsiType::Other,
        }
    }
}

impl TryFrom<u32> for Mmsi {
    type Error = AisError;

    fn try_from(value: u32) -> Result<Self> {
        Mmsi::new(value)
    }
}

impl std::fmt::Display for Mmsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

/// AIS message types 1 to 27
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageType {
    /// Scheduled class A position report
    PositionReportClassA = 1,
    /// Class A position report on an assigned schedule
    PositionReportClassAAssignedSchedule = 2,
    /// Class A position report answering an interrogation
    PositionReportClassAResponseToInterrogation = 3,
    /// Position and UTC time of a base station
    BaseStationReport = 4,
    /// Class A static and voyage data
    StaticAndVoyageRelatedData = 5,
    /// Binary data for a single station
    BinaryAddressedMessage = 6,
    /// Acknowledge of an addressed binary message
    BinaryAcknowledge = 7,
    /// Binary data for all stations
    BinaryBroadcastMessage = 8,
    /// Position report of a SAR aircraft
    StandardSarAircraftPositionReport = 9,
    /// Request for UTC time and date
    UtcAndDateInquiry = 10,
    /// UTC time and date from a mobile station
    UtcAndDateResponse = 11,
    /// Safety text for a single station
    AddressedSafetyRelatedMessage = 12,
    /// Acknowledge of an addressed safety message
    SafetyRelatedAcknowledgement = 13,
    /// Safety text for all stations
    SafetyRelatedBroadcastMessage = 14,
    /// Request for specific messages from other stations
    Interrogation = 15,
    /// Assigns a reporting schedule to a station
    AssignmentModeCommand = 16,
    /// DGNSS corrections from a base station
    DgnssBinaryBroadcastMessage = 17,
    /// Class B position report
    StandardClassBCsPositionReport = 18,
    /// Class B position report with static data
    ExtendedClassBCsPositionReport = 19,
    /// Reserves slots for base stations
    DataLinkManagement = 20,
    /// Position and status of an aid to navigation
    AidToNavigationReport = 21,
    /// Regional channel and power settings
    ChannelManagement = 22,
    /// Assigns a reporting schedule to a group of stations
    GroupAssignmentCommand = 23,
    /// Class B static data, sent in two parts
    StaticDataReport = 24,
    /// Short binary message in one slot
    SingleSlotBinaryMessage = 25,
    /// Binary message spanning several slots
    MultipleSlotBinaryMessage = 26,
    /// Position report for satellite reception
    PositionReportForLongRangeApplications = 27,
}

impl MessageType {
    /// Numeric tag as transmitted in the first six bits
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// Whether this type is one of the three class A position reports
    pub fn is_position_report_class_a(&self) -> bool {
        matches!(
            self,
            MessageType::PositionReportClassA
                | MessageType::PositionReportClassAAssignedSchedule
                | MessageType::PositionReportClassAResponseToInterrogation
        )
    }
}

impl TryFrom<u8> for MessageType {
    type Error = AisError;

    fn try_from(value: u8) -> Result<Self> {
        use MessageType::*;
        let message_type = match value {
            1 => PositionReportClassA,
            2 => PositionReportClassAAssignedSchedule,
            3 => PositionReportClassAResponseToInterrogation,
            4 => BaseStationReport,
            5 => StaticAndVoyageRelatedData,
            6 => BinaryAddressedMessage,
            7 => BinaryAcknowledge,
            8 => BinaryBroadcastMessage,
            9 => StandardSarAircraftPositionReport,
            10 => UtcAndDateInquiry,
            11 => UtcAndDateResponse,
            12 => AddressedSafetyRelatedMessage,
            13 => SafetyRelatedAcknowledgement,
            14 => SafetyRelatedBroadcastMessage,
            15 => Interrogation,
            16 => AssignmentModeCommand,
            17 => DgnssBinaryBroadcastMessage,
            18 => StandardClassBCsPositionReport,
            19 => ExtendedClassBCsPositionReport,
            20 => DataLinkManagement,
            21 => AidToNavigationReport,
            22 => ChannelManagement,
            23 => GroupAssignmentCommand,
            24 => StaticDataReport,
            25 => SingleSlotBinaryMessage,
            26 => MultipleSlotBinaryMessage,
            27 => PositionReportForLongRangeApplications,
            _ => {
                return Err(AisError::unknown_message_type(format!(
                    "no message type with tag {}",
                    value
                )))
            }
        };
        Ok(message_type)
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self, self.tag())
    }
}
