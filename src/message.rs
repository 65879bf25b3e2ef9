//! AIS message types and their bit layouts
//!
//! Every message starts with the same 38-bit header:
//! - Bits 0-5: Message type
//! - Bits 6-7: Repeat indicator
//! - Bits 8-37: MMSI of the sender
//!
//! Position reports (types 1-3) and static/voyage data (type 5) have a
//! dedicated layout here; all other types are kept as [`RawMessage`].

use crate::core::{MessageType, Mmsi};
use crate::error::{AisError, Result};
use crate::payload::BitPayload;

/// Number of bits of the common message header
pub const HEADER_BITS: usize = 38;

/// Header common to all AIS messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageHeader {
    /// Message type
    pub message_type: MessageType,
    /// How often the message has been repeated (0-3)
    pub repeat: u8,
    /// Source station
    pub mmsi: Mmsi,
}

impl MessageHeader {
    /// Create a header for a freshly generated message
    pub fn new(message_type: MessageType, mmsi: Mmsi) -> Self {
        MessageHeader {
            message_type,
            repeat: 0,
            mmsi,
        }
    }

    /// Decode the header from the first 38 bits
    pub fn from_payload(payload: &BitPayload) -> Result<Self> {
        let tag = payload.message_type_tag();
        let message_type = MessageType::try_from(tag)?;
        Ok(MessageHeader {
            message_type,
            repeat: payload.read_uint(6, 2) as u8,
            mmsi: Mmsi::new(payload.read_uint(8, 30))?,
        })
    }

    /// Append the header to an empty payload
    pub fn write_to(&self, payload: &mut BitPayload) {
        payload.write_enum_tag(self.message_type.tag() as u32, 6);
        payload.write_uint(self.repeat as u32 & 0x3, 2);
        payload.write_uint(self.mmsi.value(), 30);
    }
}

/// Navigational status reported by class A transceivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavigationStatus {
    UnderWayUsingEngine = 0,
    AtAnchor = 1,
    NotUnderCommand = 2,
    RestrictedManeuverability = 3,
    ConstrainedByDraught = 4,
    Moored = 5,
    Aground = 6,
    EngagedInFishing = 7,
    UnderWaySailing = 8,
    ReservedForHsc = 9,
    ReservedForWig = 10,
    PowerDrivenVesselTowingAstern = 11,
    PowerDrivenVesselPushingAheadOrTowingAlongside = 12,
    Reserved = 13,
    AisSartActive = 14,
    NotDefined = 15,
}

impl NavigationStatus {
    /// Map the 4-bit field value; every value is defined
    pub fn from_raw(value: u32) -> Self {
        use NavigationStatus::*;
        match value & 0xF {
            0 => UnderWayUsingEngine,
            1 => AtAnchor,
            2 => NotUnderCommand,
            3 => RestrictedManeuverability,
            4 => ConstrainedByDraught,
            5 => Moored,
            6 => Aground,
            7 => EngagedInFishing,
            8 => UnderWaySailing,
            9 => ReservedForHsc,
            10 => ReservedForWig,
            11 => PowerDrivenVesselTowingAstern,
            12 => PowerDrivenVesselPushingAheadOrTowingAlongside,
            13 => Reserved,
            14 => AisSartActive,
            _ => NotDefined,
        }
    }
}

/// Special maneuver indicator of a position report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ManeuverIndicator {
    NotAvailable = 0,
    NoSpecialManeuver = 1,
    SpecialManeuver = 2,
    Reserved = 3,
}

impl ManeuverIndicator {
    /// Map the 2-bit field value
    pub fn from_raw(value: u32) -> Self {
        match value & 0x3 {
            0 => ManeuverIndicator::NotAvailable,
            1 => ManeuverIndicator::NoSpecialManeuver,
            2 => ManeuverIndicator::SpecialManeuver,
            _ => ManeuverIndicator::Reserved,
        }
    }
}

/// Broad ship categories derived from the two-digit ship type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipCategory {
    NotAvailable,
    WingInGround,
    Fishing,
    Towing,
    DredgingOrUnderwaterOps,
    DivingOps,
    MilitaryOps,
    Sailing,
    PleasureCraft,
    HighSpeedCraft,
    PilotVessel,
    SearchAndRescue,
    Tug,
    PortTender,
    AntiPollution,
    LawEnforcement,
    MedicalTransport,
    NonCombatant,
    Passenger,
    Cargo,
    Tanker,
    Other,
    Reserved,
}

/// Ship and cargo type code (0-99) of the static data report
///
/// The tens digit gives the kind of vessel; for most kinds the units digit
/// encodes the hazard category of the cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipType(pub u8);

impl ShipType {
    /// No ship type transmitted
    pub const NOT_AVAILABLE: ShipType = ShipType(0);

    /// Get the raw code
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Category of the vessel
    pub fn category(&self) -> ShipCategory {
        use ShipCategory::*;
        match self.0 {
            0 => NotAvailable,
            20..=29 => WingInGround,
            30 => Fishing,
            31 | 32 => Towing,
            33 => DredgingOrUnderwaterOps,
            34 => DivingOps,
            35 => MilitaryOps,
            36 => Sailing,
            37 => PleasureCraft,
            40..=49 => HighSpeedCraft,
            50 => PilotVessel,
            51 => SearchAndRescue,
            52 => Tug,
            53 => PortTender,
            54 => AntiPollution,
            55 => LawEnforcement,
            58 => MedicalTransport,
            59 => NonCombatant,
            60..=69 => Passenger,
            70..=79 => Cargo,
            80..=89 => Tanker,
            90..=99 => Other,
            _ => Reserved,
        }
    }

    /// Hazardous cargo category A to D, if the code encodes one
    pub fn hazard_category(&self) -> Option<char> {
        let has_cargo_digit = matches!(self.0, 20..=29 | 40..=49 | 60..=99);
        match (has_cargo_digit, self.0 % 10) {
            (true, d @ 1..=4) => Some((b'A' + d - 1) as char),
            _ => None,
        }
    }
}

/// Position report of a class A transceiver (message types 1, 2 and 3)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionReportClassA {
    pub header: MessageHeader,
    pub navigation_status: NavigationStatus,
    /// Raw rate of turn (ROT_AIS), `None` if not available
    pub rate_of_turn: Option<i32>,
    /// Knots
    pub speed_over_ground: f64,
    /// True if the position accuracy is better than 10 m
    pub position_accuracy: bool,
    /// Degrees, 181 means not available
    pub longitude: f64,
    /// Degrees, 91 means not available
    pub latitude: f64,
    /// Degrees, 360 means not available
    pub course_over_ground: f64,
    /// Degrees
    pub true_heading: Option<u32>,
    /// UTC second of the report
    pub timestamp: u8,
    pub maneuver_indicator: ManeuverIndicator,
    pub spare: u8,
    /// Receiver autonomous integrity monitoring in use
    pub raim: bool,
    pub radio_status: u32,
}

impl PositionReportClassA {
    /// Total length of the report in bits
    pub const BITS: usize = 168;

    /// Create a report with all optional fields set to "not available"
    pub fn new(mmsi: Mmsi) -> Self {
        PositionReportClassA {
            header: MessageHeader::new(MessageType::PositionReportClassA, mmsi),
            navigation_status: NavigationStatus::NotDefined,
            rate_of_turn: None,
            speed_over_ground: 0.0,
            position_accuracy: false,
            longitude: 181.0,
            latitude: 91.0,
            course_over_ground: 360.0,
            true_heading: None,
            timestamp: 60,
            maneuver_indicator: ManeuverIndicator::NotAvailable,
            spare: 0,
            raim: false,
            radio_status: 0,
        }
    }

    /// Rate of turn in degrees per minute, decoded from the raw ROT_AIS value.
    ///
    /// Raw values of +/-127 mean "turning faster than 5 degrees per 30 seconds"
    /// without a measured value and map to `None`, as does a missing rate.
    pub fn rate_of_turn_degrees_per_minute(&self) -> Option<f64> {
        match self.rate_of_turn {
            Some(raw) if raw.abs() < 127 => {
                let magnitude = (raw as f64 / 4.733).powi(2);
                Some(magnitude.copysign(raw as f64))
            }
            _ => None,
        }
    }

    /// Decode a report from its payload
    pub fn from_payload(payload: &BitPayload) -> Result<Self> {
        let header = MessageHeader::from_payload(payload)?;
        if !header.message_type.is_position_report_class_a() {
            return Err(AisError::unknown_message_type(format!(
                "expected a class A position report, got {}",
                header.message_type
            )));
        }

        Ok(PositionReportClassA {
            header,
            navigation_status: NavigationStatus::from_raw(payload.read_enum_tag(38, 4)),
            rate_of_turn: payload.read_rate_of_turn(42, 8),
            speed_over_ground: payload.read_speed_over_ground(50, 10),
            position_accuracy: payload.read_bool(60),
            longitude: payload.read_longitude(61, 28),
            latitude: payload.read_latitude(89, 27),
            course_over_ground: payload.read_course_over_ground(116, 12),
            true_heading: payload.read_true_heading(128, 9),
            timestamp: payload.read_uint(137, 6) as u8,
            maneuver_indicator: ManeuverIndicator::from_raw(payload.read_enum_tag(143, 2)),
            spare: payload.read_uint(145, 3) as u8,
            raim: payload.read_bool(148),
            radio_status: payload.read_uint(149, 19),
        })
    }

    /// Encode the report
    pub fn to_payload(&self) -> Result<BitPayload> {
        let mut payload = BitPayload::new();
        self.header.write_to(&mut payload);
        payload.write_enum_tag(self.navigation_status as u32, 4);
        payload.write_rate_of_turn(self.rate_of_turn, 8);
        payload.write_speed_over_ground(self.speed_over_ground, 10);
        payload.write_bool(self.position_accuracy);
        payload.write_longitude(self.longitude, 28);
        payload.write_latitude(self.latitude, 27);
        payload.write_course_over_ground(self.course_over_ground, 12);
        payload.write_true_heading(self.true_heading, 9);
        payload.write_uint(self.timestamp as u32, 6);
        payload.write_enum_tag(self.maneuver_indicator as u32, 2);
        payload.write_uint(self.spare as u32, 3);
        payload.write_bool(self.raim);
        payload.write_uint(self.radio_status, 19);
        Ok(payload)
    }
}

/// Static and voyage related data (message type 5)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticAndVoyageData {
    pub header: MessageHeader,
    pub ais_version: u8,
    pub imo_number: u32,
    pub call_sign: String,
    pub ship_name: String,
    pub ship_type: ShipType,
    /// Meters from the GNSS antenna to the bow
    pub dimension_to_bow: u16,
    pub dimension_to_stern: u16,
    pub dimension_to_port: u8,
    pub dimension_to_starboard: u8,
    /// Electronic position fixing device type
    pub position_fix_type: u8,
    pub eta_month: u8,
    pub eta_day: u8,
    pub eta_hour: u8,
    pub eta_minute: u8,
    /// Meters
    pub draught: f64,
    pub destination: String,
    pub data_terminal_ready: bool,
    pub spare: u8,
}

impl StaticAndVoyageData {
    /// Total length of the message in bits
    pub const BITS: usize = 424;

    /// Create an otherwise empty report for a ship
    pub fn new(mmsi: Mmsi) -> Self {
        StaticAndVoyageData {
            header: MessageHeader::new(MessageType::StaticAndVoyageRelatedData, mmsi),
            ais_version: 0,
            imo_number: 0,
            call_sign: String::new(),
            ship_name: String::new(),
            ship_type: ShipType::NOT_AVAILABLE,
            dimension_to_bow: 0,
            dimension_to_stern: 0,
            dimension_to_port: 0,
            dimension_to_starboard: 0,
            position_fix_type: 0,
            eta_month: 0,
            eta_day: 0,
            eta_hour: 24,
            eta_minute: 60,
            draught: 0.0,
            destination: String::new(),
            data_terminal_ready: true,
            spare: 0,
        }
    }

    /// Decode the message from its payload
    pub fn from_payload(payload: &BitPayload) -> Result<Self> {
        let header = MessageHeader::from_payload(payload)?;
        if header.message_type != MessageType::StaticAndVoyageRelatedData {
            return Err(AisError::unknown_message_type(format!(
                "expected static and voyage data, got {}",
                header.message_type
            )));
        }

        Ok(StaticAndVoyageData {
            header,
            ais_version: payload.read_uint(38, 2) as u8,
            imo_number: payload.read_uint(40, 30),
            call_sign: payload.read_six_bit_string(70, 42),
            ship_name: payload.read_six_bit_string(112, 120),
            ship_type: ShipType(payload.read_enum_tag(232, 8) as u8),
            dimension_to_bow: payload.read_uint(240, 9) as u16,
            dimension_to_stern: payload.read_uint(249, 9) as u16,
            dimension_to_port: payload.read_uint(258, 6) as u8,
            dimension_to_starboard: payload.read_uint(264, 6) as u8,
            position_fix_type: payload.read_enum_tag(270, 4) as u8,
            eta_month: payload.read_uint(274, 4) as u8,
            eta_day: payload.read_uint(278, 5) as u8,
            eta_hour: payload.read_uint(283, 5) as u8,
            eta_minute: payload.read_uint(288, 6) as u8,
            draught: payload.read_draught(294, 8),
            destination: payload.read_six_bit_string(302, 120),
            data_terminal_ready: payload.read_data_terminal_ready(422),
            spare: payload.read_uint(423, 1) as u8,
        })
    }

    /// Encode the message
    pub fn to_payload(&self) -> Result<BitPayload> {
        let mut payload = BitPayload::new();
        self.header.write_to(&mut payload);
        payload.write_uint(self.ais_version as u32, 2);
        payload.write_uint(self.imo_number, 30);
        payload.write_six_bit_string(&self.call_sign, 42, true)?;
        payload.write_six_bit_string(&self.ship_name, 120, true)?;
        payload.write_enum_tag(self.ship_type.value() as u32, 8);
        payload.write_uint(self.dimension_to_bow as u32, 9);
        payload.write_uint(self.dimension_to_stern as u32, 9);
        payload.write_uint(self.dimension_to_port as u32, 6);
        payload.write_uint(self.dimension_to_starboard as u32, 6);
        payload.write_enum_tag(self.position_fix_type as u32, 4);
        payload.write_uint(self.eta_month as u32, 4);
        payload.write_uint(self.eta_day as u32, 5);
        payload.write_uint(self.eta_hour as u32, 5);
        payload.write_uint(self.eta_minute as u32, 6);
        payload.write_draught(self.draught, 8);
        payload.write_six_bit_string(&self.destination, 120, true)?;
        payload.write_data_terminal_ready(self.data_terminal_ready);
        payload.write_uint(self.spare as u32, 1);
        Ok(payload)
    }
}

/// A message without a dedicated layout; the complete payload is retained
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMessage {
    pub header: MessageHeader,
    /// The full payload including the header bits
    pub payload: BitPayload,
}

impl RawMessage {
    /// Keep the payload of a message of any known type
    pub fn from_payload(payload: &BitPayload) -> Result<Self> {
        Ok(RawMessage {
            header: MessageHeader::from_payload(payload)?,
            payload: payload.clone(),
        })
    }

    /// Rebuild the payload, with the current header in front of the retained body
    pub fn to_payload(&self) -> Result<BitPayload> {
        let mut payload = BitPayload::new();
        self.header.write_to(&mut payload);
        let body = self.payload.bits();
        let significant = self.payload.significant_len();
        for &bit in body.iter().take(significant).skip(HEADER_BITS) {
            payload.write_bool(bit);
        }
        Ok(payload)
    }
}

/// A decoded AIS message
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// Message types 1, 2 and 3
    PositionReportClassA(PositionReportClassA),
    /// Message type 5
    StaticAndVoyageData(StaticAndVoyageData),
    /// Any other known message type
    Raw(RawMessage),
}

impl Message {
    /// Get the common header
    pub fn header(&self) -> &MessageHeader {
        match self {
            Message::PositionReportClassA(report) => &report.header,
            Message::StaticAndVoyageData(data) => &data.header,
            Message::Raw(raw) => &raw.header,
        }
    }

    /// Get the message type
    pub fn message_type(&self) -> MessageType {
        self.header().message_type
    }

    /// Get the sender
    pub fn mmsi(&self) -> Mmsi {
        self.header().mmsi
    }
}
