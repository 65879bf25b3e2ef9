//! AIS targets as seen by the receiver
//!
//! Targets are plain values. A store outside this crate creates them when an
//! MMSI is first heard, applies decoded messages and evicts them when they time
//! out. Estimation never touches a stored target; it works on copies.

use chrono::{DateTime, Utc};

use crate::core::Mmsi;
use crate::message::{NavigationStatus, PositionReportClassA, ShipType, StaticAndVoyageData};
use crate::position::GeographicPosition;
use crate::risk::ShipRelativePosition;

/// Properties shared by all targets
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetInfo {
    mmsi: Mmsi,
    /// Time the position was last updated or estimated for
    pub last_seen: DateTime<Utc>,
    /// Last reported or estimated position; invalid until first reported
    pub position: GeographicPosition,
    /// Station name, if one was broadcast
    pub name: Option<String>,
    /// Warnings for this target are muted until this time
    pub suppression_until: Option<DateTime<Utc>>,
    /// Latest result of the collision risk computation
    pub relative_position: Option<Box<ShipRelativePosition>>,
}

impl TargetInfo {
    /// Create a target without a known position
    pub fn new(mmsi: Mmsi, last_seen: DateTime<Utc>) -> Self {
        TargetInfo {
            mmsi,
            last_seen,
            position: GeographicPosition::from_lat_lon(91.0, 181.0),
            name: None,
            suppression_until: None,
            relative_position: None,
        }
    }

    /// The identity of the target; fixed once created
    pub fn mmsi(&self) -> Mmsi {
        self.mmsi
    }

    /// Whether warnings are currently suppressed
    pub fn is_suppressed(&self, now: DateTime<Utc>) -> bool {
        self.suppression_until.map_or(false, |until| now < until)
    }
}

/// A target that reports course and speed
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovingTarget {
    /// Identity and position
    pub info: TargetInfo,
    /// Degrees per minute, positive to starboard
    pub rate_of_turn: Option<f64>,
    /// Degrees
    pub course_over_ground: f64,
    /// Knots
    pub speed_over_ground: f64,
    /// Degrees
    pub true_heading: Option<f64>,
    /// Set on every extrapolated copy
    pub is_estimate: bool,
}

impl MovingTarget {
    /// Create a target at rest with unknown position
    pub fn new(mmsi: Mmsi, last_seen: DateTime<Utc>) -> Self {
        MovingTarget {
            info: TargetInfo::new(mmsi, last_seen),
            rate_of_turn: None,
            course_over_ground: 0.0,
            speed_over_ground: 0.0,
            true_heading: None,
            is_estimate: false,
        }
    }

    /// The identity of the target
    pub fn mmsi(&self) -> Mmsi {
        self.info.mmsi
    }

    /// Time of the current position
    pub fn last_seen(&self) -> DateTime<Utc> {
        self.info.last_seen
    }

    /// Current position
    pub fn position(&self) -> &GeographicPosition {
        &self.info.position
    }

    /// Take over the kinematics of a class A position report received at `time`.
    ///
    /// Fields the report marks as not available leave the previous values
    /// untouched, except for rate of turn and heading which become unknown.
    pub fn apply_position_report(&mut self, report: &PositionReportClassA, time: DateTime<Utc>) {
        let position = GeographicPosition::from_lat_lon(report.latitude, report.longitude);
        if position.contains_valid_position() {
            self.info.position = position;
        }
        if report.course_over_ground < 360.0 {
            self.course_over_ground = report.course_over_ground;
        }
        if report.speed_over_ground < 102.3 {
            self.speed_over_ground = report.speed_over_ground;
        }
        self.rate_of_turn = report.rate_of_turn_degrees_per_minute();
        self.true_heading = report.true_heading.map(f64::from);
        self.info.last_seen = time;
        self.is_estimate = false;
    }
}

/// AIS transceiver class of a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransceiverClass {
    /// No class-specific message received yet
    #[default]
    Unknown,
    /// Class A (SOLAS vessels)
    A,
    /// Class B (smaller craft)
    B,
}

/// A vessel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ship {
    /// Kinematics and identity
    pub moving: MovingTarget,
    /// Radio call sign
    pub call_sign: Option<String>,
    /// Type of ship and cargo
    pub ship_type: ShipType,
    /// Meters from the GNSS antenna to the bow
    pub dimension_to_bow: u16,
    pub dimension_to_stern: u16,
    pub dimension_to_port: u8,
    pub dimension_to_starboard: u8,
    /// Voyage destination as entered by the crew
    pub destination: Option<String>,
    /// Meters
    pub draught: Option<f64>,
    pub navigation_status: NavigationStatus,
    pub transceiver_class: TransceiverClass,
}

impl Ship {
    /// Create a ship with no static data
    pub fn new(mmsi: Mmsi, last_seen: DateTime<Utc>) -> Self {
        Ship {
            moving: MovingTarget::new(mmsi, last_seen),
            call_sign: None,
            ship_type: ShipType::NOT_AVAILABLE,
            dimension_to_bow: 0,
            dimension_to_stern: 0,
            dimension_to_port: 0,
            dimension_to_starboard: 0,
            destination: None,
            draught: None,
            navigation_status: NavigationStatus::NotDefined,
            transceiver_class: TransceiverClass::Unknown,
        }
    }

    /// Overall length in meters
    pub fn length(&self) -> u32 {
        self.dimension_to_bow as u32 + self.dimension_to_stern as u32
    }

    /// Overall beam in meters
    pub fn beam(&self) -> u32 {
        self.dimension_to_port as u32 + self.dimension_to_starboard as u32
    }

    /// Apply a class A position report
    pub fn apply_position_report(&mut self, report: &PositionReportClassA, time: DateTime<Utc>) {
        self.moving.apply_position_report(report, time);
        self.navigation_status = report.navigation_status;
        self.transceiver_class = TransceiverClass::A;
    }

    /// Apply static and voyage data. Does not count as a position update.
    pub fn apply_static_data(&mut self, data: &StaticAndVoyageData) {
        self.moving.info.name = non_empty(&data.ship_name);
        self.call_sign = non_empty(&data.call_sign);
        self.destination = non_empty(&data.destination);
        self.ship_type = data.ship_type;
        self.dimension_to_bow = data.dimension_to_bow;
        self.dimension_to_stern = data.dimension_to_stern;
        self.dimension_to_port = data.dimension_to_port;
        self.dimension_to_starboard = data.dimension_to_starboard;
        self.draught = (data.draught > 0.0).then_some(data.draught);
        self.transceiver_class = TransceiverClass::A;
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// A search and rescue aircraft
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SarAircraft {
    /// Kinematics and identity
    pub moving: MovingTarget,
}

impl SarAircraft {
    /// Create an aircraft with unknown position
    pub fn new(mmsi: Mmsi, last_seen: DateTime<Utc>) -> Self {
        SarAircraft {
            moving: MovingTarget::new(mmsi, last_seen),
        }
    }

    /// Meters, taken from the position
    pub fn altitude(&self) -> f64 {
        self.moving.info.position.altitude
    }
}

/// A buoy, beacon or other aid to navigation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AidToNavigation {
    /// Identity and charted position
    pub info: TargetInfo,
    /// The aid exists only as a broadcast, not physically
    pub is_virtual: bool,
    /// Type code of the aid (0-31)
    pub aid_type: u8,
}

impl AidToNavigation {
    /// Create a physical aid of unspecified type
    pub fn new(mmsi: Mmsi, last_seen: DateTime<Utc>) -> Self {
        AidToNavigation {
            info: TargetInfo::new(mmsi, last_seen),
            is_virtual: false,
            aid_type: 0,
        }
    }
}

/// A fixed AIS station ashore
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStation {
    /// Identity and position
    pub info: TargetInfo,
}

impl BaseStation {
    /// Create a base station with unknown position
    pub fn new(mmsi: Mmsi, last_seen: DateTime<Utc>) -> Self {
        BaseStation {
            info: TargetInfo::new(mmsi, last_seen),
        }
    }
}

/// Any tracked AIS station
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AisTarget {
    /// A vessel
    Ship(Ship),
    /// A search and rescue aircraft
    SarAircraft(SarAircraft),
    /// An aid to navigation
    AidToNavigation(AidToNavigation),
    /// A base station
    BaseStation(BaseStation),
}

impl AisTarget {
    /// Properties shared by all kinds of target
    pub fn info(&self) -> &TargetInfo {
        match self {
            AisTarget::Ship(ship) => &ship.moving.info,
            AisTarget::SarAircraft(aircraft) => &aircraft.moving.info,
            AisTarget::AidToNavigation(aid) => &aid.info,
            AisTarget::BaseStation(station) => &station.info,
        }
    }

    /// Mutable access to the shared properties
    pub fn info_mut(&mut self) -> &mut TargetInfo {
        match self {
            AisTarget::Ship(ship) => &mut ship.moving.info,
            AisTarget::SarAircraft(aircraft) => &mut aircraft.moving.info,
            AisTarget::AidToNavigation(aid) => &mut aid.info,
            AisTarget::BaseStation(station) => &mut station.info,
        }
    }

    /// The identity of the target
    pub fn mmsi(&self) -> Mmsi {
        self.info().mmsi
    }

    /// Time of the current position
    pub fn last_seen(&self) -> DateTime<Utc> {
        self.info().last_seen
    }

    /// Current position
    pub fn position(&self) -> &GeographicPosition {
        &self.info().position
    }

    /// Station name, if one was broadcast
    pub fn name(&self) -> Option<&str> {
        self.info().name.as_deref()
    }

    /// Kinematics, for targets that move
    pub fn as_moving(&self) -> Option<&MovingTarget> {
        match self {
            AisTarget::Ship(ship) => Some(&ship.moving),
            AisTarget::SarAircraft(aircraft) => Some(&aircraft.moving),
            AisTarget::AidToNavigation(_) | AisTarget::BaseStation(_) => None,
        }
    }
}

impl From<Ship> for AisTarget {
    fn from(ship: Ship) -> Self {
        AisTarget::Ship(ship)
    }
}

impl From<SarAircraft> for AisTarget {
    fn from(aircraft: SarAircraft) -> Self {
        AisTarget::SarAircraft(aircraft)
    }
}

impl From<AidToNavigation> for AisTarget {
    fn from(aid: AidToNavigation) -> Self {
        AisTarget::AidToNavigation(aid)
    }
}

impl From<BaseStation> for AisTarget {
    fn from(station: BaseStation) -> Self {
        AisTarget::BaseStation(station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::payload::BitPayload;
    use chrono::{Duration, TimeZone};

    fn time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_target_has_no_position() -> Result<()> {
        let ship = Ship::new(Mmsi::new(211000001)?, time());
        assert!(!ship.moving.position().contains_valid_position());
        assert_eq!(ship.moving.mmsi().value(), 211000001);
        assert!(!ship.moving.is_estimate);
        Ok(())
    }

    #[test]
    fn test_apply_position_report() -> Result<()> {
        let payload = BitPayload::from_armored("13GmFd002pwrel@LpMu8L6qn8Vp0", 0)?;
        let report = PositionReportClassA::from_payload(&payload)?;

        let mut ship = Ship::new(report.header.mmsi, time());
        let received = time() + Duration::seconds(5);
        ship.apply_position_report(&report, received);

        assert_eq!(ship.moving.last_seen(), received);
        assert!((ship.moving.position().latitude - 50.4755).abs() < 1e-6);
        assert!((ship.moving.speed_over_ground - 18.4).abs() < 1e-9);
        assert!((ship.moving.course_over_ground - 216.0).abs() < 1e-9);
        assert_eq!(ship.moving.true_heading, Some(220.0));
        assert_eq!(ship.moving.rate_of_turn, Some(0.0));
        assert_eq!(ship.transceiver_class, TransceiverClass::A);
        Ok(())
    }

    #[test]
    fn test_unavailable_position_is_ignored() -> Result<()> {
        let mut ship = Ship::new(Mmsi::new(211000001)?, time());
        ship.moving.info.position = GeographicPosition::from_lat_lon(54.0, 10.0);
        let report = PositionReportClassA::new(Mmsi::new(211000001)?);
        ship.apply_position_report(&report, time());
        assert_eq!(ship.moving.position().latitude, 54.0);
        assert_eq!(ship.moving.true_heading, None);
        Ok(())
    }

    #[test]
    fn test_apply_static_data() -> Result<()> {
        let mut data = StaticAndVoyageData::new(Mmsi::new(235083598)?);
        data.ship_name = "WILLSUPPLY".to_string();
        data.call_sign = "2EAZ3".to_string();
        data.dimension_to_bow = 12;
        data.dimension_to_stern = 8;
        data.dimension_to_port = 3;
        data.dimension_to_starboard = 4;
        data.draught = 1.6;

        let mut target = AisTarget::from(Ship::new(data.header.mmsi, time()));
        if let AisTarget::Ship(ship) = &mut target {
            ship.apply_static_data(&data);
            assert_eq!(ship.length(), 20);
            assert_eq!(ship.beam(), 7);
            assert_eq!(ship.destination, None);
            assert_eq!(ship.draught, Some(1.6));
        }
        assert_eq!(target.name(), Some("WILLSUPPLY"));
        assert_eq!(target.last_seen(), time());
        Ok(())
    }

    #[test]
    fn test_variants() -> Result<()> {
        let mmsi = Mmsi::new(992111111)?;
        let aid: AisTarget = AidToNavigation::new(mmsi, time()).into();
        assert!(aid.as_moving().is_none());
        let station: AisTarget = BaseStation::new(Mmsi::new(2111111)?, time()).into();
        assert!(station.as_moving().is_none());

        let mut aircraft = SarAircraft::new(Mmsi::new(111211111)?, time());
        aircraft.moving.info.position = GeographicPosition::new(54.0, 10.0, 300.0);
        assert_eq!(aircraft.altitude(), 300.0);
        let aircraft: AisTarget = aircraft.into();
        assert!(aircraft.as_moving().is_some());
        Ok(())
    }

    #[test]
    fn test_suppression() -> Result<()> {
        let mut info = TargetInfo::new(Mmsi::new(1)?, time());
        assert!(!info.is_suppressed(time()));
        info.suppression_until = Some(time() + Duration::minutes(10));
        assert!(info.is_suppressed(time()));
        assert!(!info.is_suppressed(time() + Duration::minutes(11)));
        Ok(())
    }
}
