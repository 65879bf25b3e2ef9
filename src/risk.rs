//! Collision risk between the own ship and other targets
//!
//! For moving targets both tracks are extrapolated over the same time window
//! and the closest point of approach (CPA) is searched along them. Static and
//! lost targets are judged by their current distance only.

use chrono::{DateTime, Duration, Utc};

use crate::core::Mmsi;
use crate::error::{AisError, Result};
use crate::estimation::TrackEstimationParameters;
use crate::position::{dist_and_dir, normalize_signed_degrees};
use crate::target::{AisTarget, MovingTarget, TargetInfo};

/// Classification of a target relative to the own ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SafetyState {
    /// Not computed yet
    #[default]
    Unknown,
    /// The closest approach stays clear of the warning limits
    Safe,
    /// The closest approach lies outside the estimation window
    FarAway,
    /// The target comes closer than the warning distance within the warning time
    Dangerous,
    /// The target has not been heard from for too long
    Lost,
}

/// Position of a target relative to another at one point in time
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipRelativePosition {
    /// The observing ship
    pub from: Mmsi,
    /// The observed target
    pub to: Mmsi,
    /// Meters
    pub distance: f64,
    /// True bearing from `from` to `to`, degrees
    pub bearing: f64,
    /// Bearing relative to the heading of `from`, negative to port
    pub relative_bearing: Option<f64>,
    /// Meters
    pub closest_point_of_approach: Option<f64>,
    /// When the closest approach happens
    pub time_of_closest_point_of_approach: Option<DateTime<Utc>>,
    /// Risk classification of the target
    pub safety_state: SafetyState,
    /// The time this relation was computed for
    pub calculation_time: DateTime<Utc>,
}

impl ShipRelativePosition {
    fn new(
        from: Mmsi,
        to: Mmsi,
        (distance, bearing): (f64, f64),
        relative_bearing: Option<f64>,
        safety_state: SafetyState,
        calculation_time: DateTime<Utc>,
    ) -> Self {
        ShipRelativePosition {
            from,
            to,
            distance,
            bearing,
            relative_bearing,
            closest_point_of_approach: None,
            time_of_closest_point_of_approach: None,
            safety_state,
            calculation_time,
        }
    }

    /// Time from `now` until the closest approach; negative if it has passed
    pub fn time_to_closest_point_of_approach(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.time_of_closest_point_of_approach.map(|time| time - now)
    }
}

impl TargetInfo {
    /// Time since the target was last seen
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_seen
    }
}

impl AisTarget {
    /// Geodesic distance between the last known positions, in meters
    pub fn distance_to(&self, other: &AisTarget) -> f64 {
        dist_and_dir(self.position(), other.position()).0
    }

    /// Time since the target was last seen
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        self.info().age(now)
    }
}

impl MovingTarget {
    /// Assess the collision risk of every target in `others` at time `now`.
    ///
    /// Targets without a valid position are skipped. Fails if the own ship has
    /// no valid position.
    pub fn relative_positions_to<'a, I>(
        &self,
        others: I,
        now: DateTime<Utc>,
        parameters: &TrackEstimationParameters,
    ) -> Result<Vec<ShipRelativePosition>>
    where
        I: IntoIterator<Item = &'a AisTarget>,
    {
        if !self.position().contains_valid_position() {
            return Err(AisError::no_valid_position(format!(
                "own ship {} has no valid position",
                self.mmsi()
            )));
        }

        let step = parameters.normal_step_size;
        let (start, end) = match (
            now.checked_sub_signed(parameters.start_time_offset),
            now.checked_add_signed(parameters.end_time_offset),
        ) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AisError::invalid_argument(format!(
                    "track window -{} to +{} around {} is out of range",
                    parameters.start_time_offset, parameters.end_time_offset, now
                )))
            }
        };

        let own = self.estimate_position_at(now, step)?;
        let own_track = own.estimated_track(start, end, step)?;
        let relative_bearing = |bearing: f64| {
            own.true_heading
                .map(|heading| normalize_signed_degrees(bearing - heading))
        };

        let mut positions = Vec::new();
        for other in others {
            if !other.position().contains_valid_position() {
                continue;
            }

            let lost = other
                .last_seen()
                .checked_add_signed(parameters.target_lost_timeout)
                .map_or(false, |deadline| deadline < now);
            let moving = if lost { None } else { other.as_moving() };

            let Some(moving) = moving else {
                // Lost or static: judge by the current distance
                let distance_and_bearing = dist_and_dir(self.position(), other.position());
                let state = if lost {
                    SafetyState::Lost
                } else if distance_and_bearing.0 < parameters.warning_distance {
                    SafetyState::Dangerous
                } else {
                    SafetyState::Safe
                };
                positions.push(ShipRelativePosition::new(
                    self.mmsi(),
                    other.mmsi(),
                    distance_and_bearing,
                    relative_bearing(distance_and_bearing.1),
                    state,
                    now,
                ));
                continue;
            };

            let distance_and_bearing = dist_and_dir(own.position(), other.position());
            let other_track = moving.estimated_track(start, end, step)?;
            if other_track.len() != own_track.len() || own_track.is_empty() {
                return Err(AisError::inconsistent_tracks(format!(
                    "own track has {} points, track of {} has {}",
                    own_track.len(),
                    other.mmsi(),
                    other_track.len()
                )));
            }

            let mut minimum_distance = f64::INFINITY;
            let mut minimum_index = 0;
            for (index, (a, b)) in own_track.iter().zip(&other_track).enumerate() {
                let (distance, _) = dist_and_dir(a.position(), b.position());
                if distance < minimum_distance {
                    minimum_distance = distance;
                    minimum_index = index;
                }
            }

            let mut position = ShipRelativePosition::new(
                self.mmsi(),
                other.mmsi(),
                distance_and_bearing,
                relative_bearing(distance_and_bearing.1),
                SafetyState::Safe,
                now,
            );

            if minimum_index == 0 || minimum_index == own_track.len() - 1 {
                position.safety_state = SafetyState::FarAway;
            } else {
                let time = own_track[minimum_index].last_seen();
                position.closest_point_of_approach = Some(minimum_distance);
                position.time_of_closest_point_of_approach = Some(time);

                let time_to_closest = time - now;
                if minimum_distance < parameters.warning_distance
                    && time_to_closest > -Duration::minutes(1)
                    && time_to_closest < parameters.warning_time
                {
                    position.safety_state = SafetyState::Dangerous;
                }
            }

            positions.push(position);
        }

        Ok(positions)
    }

    /// Assess the collision risk of a single target.
    ///
    /// Returns `None` if the target has no valid position.
    pub fn relative_position_to(
        &self,
        other: &AisTarget,
        now: DateTime<Utc>,
        parameters: &TrackEstimationParameters,
    ) -> Result<Option<ShipRelativePosition>> {
        Ok(self
            .relative_positions_to(std::iter::once(other), now, parameters)?
            .into_iter()
            .next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::GeographicPosition;
    use crate::target::{AidToNavigation, BaseStation, Ship};
    use chrono::TimeZone;

    const NAUTICAL_MILE: f64 = 1852.0;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 1, 10, 10, 0).unwrap()
    }

    fn ship(mmsi: u32, lat: f64, lon: f64, course: f64, speed: f64) -> Result<Ship> {
        let mut ship = Ship::new(Mmsi::new(mmsi)?, now());
        ship.moving.info.position = GeographicPosition::new(lat, lon, 440.0);
        ship.moving.course_over_ground = course;
        ship.moving.speed_over_ground = speed;
        Ok(ship)
    }

    fn seconds_between(a: Duration, b: Duration) -> i64 {
        (a - b).num_seconds().abs()
    }

    #[test]
    fn test_crossing_ahead() -> Result<()> {
        let mut own = ship(269110660, 47.05, 9.05, 0.0, 5.0)?;
        own.moving.true_heading = Some(0.0);
        let other: AisTarget = ship(296123456, 47.1, 9.1, 270.0, 10.0)?.into();

        let position = own
            .moving
            .relative_position_to(&other, now(), &TrackEstimationParameters::default())?
            .expect("valid target");

        assert_eq!(position.from.value(), 269110660);
        assert_eq!(position.to.value(), 296123456);
        assert!((position.distance / NAUTICAL_MILE - 3.635).abs() < 0.005);
        assert_eq!(position.safety_state, SafetyState::Safe);
        let cpa = position.closest_point_of_approach.expect("cpa");
        assert!((cpa / NAUTICAL_MILE - 1.766).abs() < 0.01, "cpa {}", cpa);
        let tcpa = position.time_to_closest_point_of_approach(now()).expect("tcpa");
        assert!(seconds_between(tcpa, Duration::minutes(17)) <= 20, "tcpa {}", tcpa);
        assert_eq!(position.relative_bearing, Some(position.bearing));
        Ok(())
    }

    #[test]
    fn test_crossing_astern_has_negative_tcpa() -> Result<()> {
        let own = ship(269110660, 47.05, 9.05, 0.0, 5.0)?;
        let other: AisTarget = ship(296123456, 47.1, 9.1, 90.0, 10.0)?.into();

        let position = own
            .moving
            .relative_position_to(&other, now(), &TrackEstimationParameters::default())?
            .expect("valid target");

        assert_eq!(position.safety_state, SafetyState::Safe);
        let cpa = position.closest_point_of_approach.expect("cpa");
        assert!((cpa / NAUTICAL_MILE - 3.6).abs() < 0.01, "cpa {}", cpa);
        let tcpa = position.time_to_closest_point_of_approach(now()).expect("tcpa");
        let expected = -(Duration::minutes(2) + Duration::seconds(40));
        assert!(seconds_between(tcpa, expected) <= 20, "tcpa {}", tcpa);
        assert_eq!(position.relative_bearing, None);
        Ok(())
    }

    #[test]
    fn test_head_on_is_dangerous() -> Result<()> {
        let mut own = ship(211000001, 54.0, 10.0, 0.0, 10.0)?;
        own.moving.true_heading = Some(0.0);
        let other_position = crate::position::calc_coords(own.moving.position(), 0.0, 2.0 * NAUTICAL_MILE);
        let other: AisTarget =
            ship(211000002, other_position.latitude, other_position.longitude, 180.0, 10.0)?.into();

        let position = own
            .moving
            .relative_position_to(&other, now(), &TrackEstimationParameters::default())?
            .expect("valid target");

        assert!((position.distance - 2.0 * NAUTICAL_MILE).abs() < 1.0);
        assert!(position.relative_bearing.expect("heading known").abs() < 1e-6);
        assert!(position.closest_point_of_approach.expect("cpa") < 10.0);
        let tcpa = position.time_to_closest_point_of_approach(now()).expect("tcpa");
        assert!(seconds_between(tcpa, Duration::minutes(6)) <= 10, "tcpa {}", tcpa);
        assert_eq!(position.safety_state, SafetyState::Dangerous);
        Ok(())
    }

    #[test]
    fn test_closest_approach_outside_window_is_far_away() -> Result<()> {
        let own = ship(211000001, 54.0, 10.0, 0.0, 0.0)?;
        let other_position = crate::position::calc_coords(own.moving.position(), 90.0, 10.0 * NAUTICAL_MILE);
        let other: AisTarget =
            ship(211000002, other_position.latitude, other_position.longitude, 90.0, 10.0)?.into();

        let position = own
            .moving
            .relative_position_to(&other, now(), &TrackEstimationParameters::default())?
            .expect("valid target");

        assert_eq!(position.safety_state, SafetyState::FarAway);
        assert_eq!(position.closest_point_of_approach, None);
        assert_eq!(position.time_of_closest_point_of_approach, None);
        assert!((position.distance - 10.0 * NAUTICAL_MILE).abs() < 1.0);
        Ok(())
    }

    #[test]
    fn test_lost_target_is_never_dangerous() -> Result<()> {
        let mut own = ship(211000001, 54.0, 10.0, 0.0, 10.0)?;
        own.moving.info.last_seen = now() - Duration::minutes(1);
        let mut other = ship(211000002, 54.003, 10.0, 180.0, 10.0)?;
        other.moving.info.last_seen = now() - Duration::minutes(11);
        let other: AisTarget = other.into();

        let position = own
            .moving
            .relative_position_to(&other, now(), &TrackEstimationParameters::default())?
            .expect("valid target");

        assert_eq!(position.safety_state, SafetyState::Lost);
        assert_eq!(position.closest_point_of_approach, None);
        // Measured from the reported, not the extrapolated, own position
        let expected = dist_and_dir(own.moving.position(), other.position()).0;
        assert!((position.distance - expected).abs() < 1e-9);
        assert!(position.distance < TrackEstimationParameters::default().warning_distance);
        Ok(())
    }

    #[test]
    fn test_static_targets() -> Result<()> {
        let own = ship(211000001, 54.0, 10.0, 0.0, 0.0)?;
        let parameters = TrackEstimationParameters::default();

        let mut near = AidToNavigation::new(Mmsi::new(992111111)?, now());
        near.info.position = crate::position::calc_coords(own.moving.position(), 45.0, 1000.0);
        let mut far = BaseStation::new(Mmsi::new(2111111)?, now());
        far.info.position = crate::position::calc_coords(own.moving.position(), 225.0, 3000.0);
        let unknown = BaseStation::new(Mmsi::new(2111112)?, now());

        let targets: Vec<AisTarget> = vec![near.into(), far.into(), unknown.into()];
        let positions = own.moving.relative_positions_to(&targets, now(), &parameters)?;

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].safety_state, SafetyState::Dangerous);
        assert!((positions[0].distance - 1000.0).abs() < 1e-3);
        assert!((positions[0].bearing - 45.0).abs() < 1e-6);
        assert_eq!(positions[0].relative_bearing, None);
        assert_eq!(positions[1].safety_state, SafetyState::Safe);
        assert_eq!(positions[1].to.value(), 2111111);
        Ok(())
    }

    #[test]
    fn test_own_ship_without_position() -> Result<()> {
        let own = Ship::new(Mmsi::new(211000001)?, now());
        let other: AisTarget = ship(211000002, 54.0, 10.0, 0.0, 0.0)?.into();
        let result = own
            .moving
            .relative_position_to(&other, now(), &TrackEstimationParameters::default());
        assert!(matches!(result, Err(AisError::NoValidPosition(_))));
        Ok(())
    }

    #[test]
    fn test_target_without_position_is_skipped() -> Result<()> {
        let own = ship(211000001, 54.0, 10.0, 0.0, 0.0)?;
        let other: AisTarget = Ship::new(Mmsi::new(211000002)?, now()).into();
        let position = own
            .moving
            .relative_position_to(&other, now(), &TrackEstimationParameters::default())?;
        assert_eq!(position, None);
        Ok(())
    }

    #[test]
    fn test_unrepresentable_time_window_is_rejected() -> Result<()> {
        let own = ship(211000001, 54.0, 10.0, 0.0, 5.0)?;
        let other: AisTarget = ship(211000002, 54.1, 10.0, 180.0, 5.0)?.into();
        let far_future = Duration::days(146_000_000);

        let mut parameters = TrackEstimationParameters::default();
        parameters.start_time_offset = far_future;
        let result = own.moving.relative_position_to(&other, now(), &parameters);
        assert!(matches!(result, Err(AisError::InvalidArgument(_))));

        let mut parameters = TrackEstimationParameters::default();
        parameters.end_time_offset = far_future;
        let result = own.moving.relative_position_to(&other, now(), &parameters);
        assert!(matches!(result, Err(AisError::InvalidArgument(_))));

        // A lost timeout beyond the calendar means the target is never lost
        let mut parameters = TrackEstimationParameters::default();
        parameters.target_lost_timeout = far_future;
        let position = own
            .moving
            .relative_position_to(&other, now(), &parameters)?
            .expect("valid target");
        assert_ne!(position.safety_state, SafetyState::Lost);
        Ok(())
    }

    #[test]
    fn test_distance_and_age() -> Result<()> {
        let a: AisTarget = ship(211000001, 54.0, 10.0, 0.0, 0.0)?.into();
        let b: AisTarget = ship(211000002, 54.0, 10.0, 0.0, 0.0)?.into();
        assert_eq!(a.distance_to(&b), 0.0);
        assert_eq!(a.age(now() + Duration::seconds(30)), Duration::seconds(30));
        Ok(())
    }
}
