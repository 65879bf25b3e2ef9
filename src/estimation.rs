//! Dead reckoning of moving targets
//!
//! Positions are extrapolated along the great circle given by course and speed
//! over ground. When a target reports a noticeable rate of turn, the track is
//! integrated in steps, rotating the course between steps.

use chrono::{DateTime, Duration, Utc};

use crate::error::{AisError, Result};
use crate::position::{calc_coords, knots_to_meters_per_second, normalize_degrees};
use crate::target::MovingTarget;

/// Rates of turn up to this magnitude (degrees per minute) are treated as straight travel
pub const STRAIGHT_TRAVEL_RATE_OF_TURN: f64 = 1.0;

/// Parameters of the track estimation and collision risk computation
///
/// Distances are in meters. With the `serde` feature every field is optional
/// in the serialized form and durations are given in seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackEstimationParameters {
    /// How far into the past tracks are extrapolated
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub start_time_offset: Duration,
    /// How far into the future tracks are extrapolated
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub end_time_offset: Duration,
    /// Integration step of the tracks
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub normal_step_size: Duration,
    /// Closest point of approach below which a target is dangerous
    pub warning_distance: f64,
    /// Targets are only dangerous if the closest approach happens within this time
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub warning_time: Duration,
    /// Targets not heard from for this long are lost
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub target_lost_timeout: Duration,
    /// Lost targets are dropped by the target store after this time
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub target_eviction_timeout: Duration,
    /// The own position must be more recent than this for risk checks
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub maximum_position_age: Duration,
    /// A warning for the same target is repeated after this time at the earliest
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub warning_repeat_timeout: Duration,
    /// Interval of the periodic risk check
    #[cfg_attr(feature = "serde", serde(with = "seconds"))]
    pub safety_check_interval: Duration,
    /// Raise a warning when the own position is missing or outdated
    pub warn_if_gnss_missing: bool,
}

impl Default for TrackEstimationParameters {
    fn default() -> Self {
        TrackEstimationParameters {
            start_time_offset: Duration::minutes(20),
            end_time_offset: Duration::minutes(20),
            normal_step_size: Duration::seconds(10),
            warning_distance: 1852.0,
            warning_time: Duration::minutes(10),
            target_lost_timeout: Duration::minutes(10),
            target_eviction_timeout: Duration::minutes(20),
            maximum_position_age: Duration::seconds(20),
            warning_repeat_timeout: Duration::minutes(30),
            safety_check_interval: Duration::seconds(5),
            warn_if_gnss_missing: true,
        }
    }
}

#[cfg(feature = "serde")]
impl TrackEstimationParameters {
    /// Read parameters from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AisError::invalid_configuration(e.to_string()))
    }

    /// Serialize the parameters to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AisError::invalid_configuration(e.to_string()))
    }
}

#[cfg(feature = "serde")]
mod seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::as_seconds(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "duration must be a non-negative number of seconds, got {}",
                seconds
            )));
        }
        let millis = (seconds * 1000.0).round();
        if millis >= i64::MAX as f64 {
            return Err(serde::de::Error::custom(format!(
                "duration of {} seconds is out of range",
                seconds
            )));
        }
        Duration::try_milliseconds(millis as i64).ok_or_else(|| {
            serde::de::Error::custom(format!("duration of {} seconds is out of range", seconds))
        })
    }
}

fn as_seconds(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(micros) => micros as f64 / 1e6,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}

fn check_step_size(step: Duration) -> Result<()> {
    if step <= Duration::milliseconds(1) {
        return Err(AisError::invalid_argument(format!(
            "step size must be greater than 1ms, got {}",
            step
        )));
    }
    Ok(())
}

impl MovingTarget {
    /// Extrapolate the target by `extrapolation` (negative values go back in
    /// time), integrating turns in steps of `step`.
    ///
    /// Returns a new snapshot marked as an estimate; `self` is left untouched.
    pub fn estimate_position(&self, extrapolation: Duration, step: Duration) -> Result<MovingTarget> {
        check_step_size(step)?;
        let magnitude = if extrapolation < Duration::zero() {
            -extrapolation
        } else {
            extrapolation
        };
        let step = step.min(magnitude);

        let mut estimate = self.clone();
        estimate.is_estimate = true;
        let target_time = self
            .info
            .last_seen
            .checked_add_signed(extrapolation)
            .ok_or_else(|| {
                AisError::invalid_argument(format!(
                    "extrapolating {} by {} is out of range",
                    self.info.last_seen, extrapolation
                ))
            })?;
        let speed = knots_to_meters_per_second(self.speed_over_ground);

        let rate_of_turn = match self.rate_of_turn {
            Some(rot) if rot.abs() > STRAIGHT_TRAVEL_RATE_OF_TURN => rot,
            _ => {
                let distance = speed * as_seconds(extrapolation);
                estimate.info.position =
                    calc_coords(&self.info.position, self.course_over_ground, distance);
                estimate.info.last_seen = target_time;
                return Ok(estimate);
            }
        };

        let course_change = rate_of_turn * as_seconds(step) / 60.0;
        let step_distance = speed * as_seconds(step);
        let mut current = self.info.last_seen;

        if extrapolation > Duration::zero() {
            // Turn, then move
            while current < target_time {
                current = current + step;
                estimate.course_over_ground =
                    normalize_degrees(estimate.course_over_ground + course_change);
                estimate.info.position = calc_coords(
                    &estimate.info.position,
                    estimate.course_over_ground,
                    step_distance,
                );
                estimate.info.last_seen = current;
            }
        } else {
            // Move back, then undo the turn
            while current > target_time {
                current = current - step;
                estimate.info.position = calc_coords(
                    &estimate.info.position,
                    estimate.course_over_ground,
                    -step_distance,
                );
                estimate.course_over_ground =
                    normalize_degrees(estimate.course_over_ground - course_change);
                estimate.info.last_seen = current;
            }
        }

        Ok(estimate)
    }

    /// Extrapolate the target to the given time
    pub fn estimate_position_at(&self, time: DateTime<Utc>, step: Duration) -> Result<MovingTarget> {
        self.estimate_position(time - self.info.last_seen, step)
    }

    /// Estimated snapshots from `start` to `end`, `step` apart.
    ///
    /// The first element is the target at `start`; the last one is at or just
    /// after `end`.
    pub fn estimated_track(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Vec<MovingTarget>> {
        check_step_size(step)?;
        if start >= end {
            return Err(AisError::invalid_argument(format!(
                "track start {} must be before its end {}",
                start, end
            )));
        }

        let mut current = start;
        let mut estimate = self.estimate_position_at(start, step)?;
        let mut track = Vec::new();
        while current < end {
            current = current + step;
            let next = estimate.estimate_position(step, step)?;
            track.push(estimate);
            estimate = next;
        }
        track.push(estimate);
        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Mmsi;
    use crate::position::{dist_and_dir, GeographicPosition};
    use chrono::TimeZone;

    fn time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ship(course: f64, speed: f64, rate_of_turn: Option<f64>) -> Result<MovingTarget> {
        let mut target = MovingTarget::new(Mmsi::new(211000001)?, time());
        target.info.position = GeographicPosition::from_lat_lon(54.0, 10.0);
        target.course_over_ground = course;
        target.speed_over_ground = speed;
        target.rate_of_turn = rate_of_turn;
        Ok(target)
    }

    #[test]
    fn test_straight_travel() -> Result<()> {
        let target = ship(90.0, 10.0, None)?;
        let estimate = target.estimate_position(Duration::hours(1), Duration::seconds(10))?;

        let (distance, bearing) = dist_and_dir(target.position(), estimate.position());
        assert!((distance - 18_520.0).abs() < 0.01);
        assert!((bearing - 90.0).abs() < 1e-6);
        assert_eq!(estimate.last_seen(), time() + Duration::hours(1));
        assert!(estimate.is_estimate);
        assert_eq!(estimate.course_over_ground, 90.0);

        // The source snapshot is unchanged
        assert!(!target.is_estimate);
        assert_eq!(target.last_seen(), time());
        assert_eq!(target.position().latitude, 54.0);
        Ok(())
    }

    #[test]
    fn test_backward_travel() -> Result<()> {
        let target = ship(90.0, 10.0, Some(0.5))?;
        let estimate = target.estimate_position(Duration::minutes(-30), Duration::seconds(10))?;

        let (distance, bearing) = dist_and_dir(target.position(), estimate.position());
        assert!((distance - 9_260.0).abs() < 0.01);
        assert!((bearing - 270.0).abs() < 1e-6);
        assert_eq!(estimate.last_seen(), time() - Duration::minutes(30));
        Ok(())
    }

    #[test]
    fn test_stationary_target() -> Result<()> {
        let target = ship(123.0, 0.0, None)?;
        let estimate = target.estimate_position(Duration::minutes(10), Duration::seconds(10))?;
        assert_eq!(estimate.position(), target.position());
        assert_eq!(estimate.last_seen(), time() + Duration::minutes(10));
        Ok(())
    }

    #[test]
    fn test_turning_half_circle() -> Result<()> {
        // 6 degrees per minute turns by 180 degrees in 30 minutes
        let target = ship(0.0, 10.0, Some(6.0))?;
        let estimate = target.estimate_position(Duration::minutes(30), Duration::seconds(10))?;

        assert!((estimate.course_over_ground - 180.0).abs() < 1e-6);
        assert_eq!(estimate.last_seen(), time() + Duration::minutes(30));

        // The turning circle has a circumference of 10 nautical miles
        let (distance, bearing) = dist_and_dir(target.position(), estimate.position());
        assert!(distance > 5_850.0 && distance < 5_950.0, "distance {}", distance);
        assert!((bearing - 90.0).abs() < 2.0, "bearing {}", bearing);
        Ok(())
    }

    #[test]
    fn test_turn_backward_inverts_forward() -> Result<()> {
        let target = ship(350.0, 12.0, Some(-20.0))?;
        let forward = target.estimate_position(Duration::minutes(10), Duration::seconds(10))?;
        assert!((forward.course_over_ground - 150.0).abs() < 1e-6);

        let back = forward.estimate_position(Duration::minutes(-10), Duration::seconds(10))?;
        assert!((back.course_over_ground - 350.0).abs() < 1e-6);
        assert!(dist_and_dir(target.position(), back.position()).0 < 1.0);
        assert_eq!(back.last_seen(), time());
        Ok(())
    }

    #[test]
    fn test_step_is_clamped_to_extrapolation() -> Result<()> {
        let target = ship(0.0, 10.0, Some(60.0))?;
        let estimate = target.estimate_position(Duration::seconds(5), Duration::seconds(10))?;
        // One step of 5 seconds at one degree per second
        assert!((estimate.course_over_ground - 5.0).abs() < 1e-9);
        assert_eq!(estimate.last_seen(), time() + Duration::seconds(5));
        Ok(())
    }

    #[test]
    fn test_invalid_step_size() -> Result<()> {
        let target = ship(0.0, 10.0, None)?;
        for step in [Duration::zero(), Duration::milliseconds(1), Duration::seconds(-1)] {
            assert!(matches!(
                target.estimate_position(Duration::minutes(1), step),
                Err(AisError::InvalidArgument(_))
            ));
        }
        Ok(())
    }

    #[test]
    fn test_extrapolation_beyond_calendar_fails() -> Result<()> {
        let target = ship(0.0, 10.0, None)?;
        let result = target.estimate_position(Duration::days(146_000_000), Duration::seconds(10));
        assert!(matches!(result, Err(AisError::InvalidArgument(_))));
        Ok(())
    }

    #[test]
    fn test_estimate_position_at() -> Result<()> {
        let target = ship(180.0, 6.0, None)?;
        let at = time() + Duration::minutes(10);
        let estimate = target.estimate_position_at(at, Duration::seconds(10))?;
        assert_eq!(estimate.last_seen(), at);
        assert!((dist_and_dir(target.position(), estimate.position()).0 - 1852.0).abs() < 0.01);
        Ok(())
    }

    #[test]
    fn test_estimated_track() -> Result<()> {
        let target = ship(45.0, 8.0, Some(3.0))?;
        let start = time() - Duration::minutes(1);
        let end = time() + Duration::minutes(1);
        let track = target.estimated_track(start, end, Duration::seconds(10))?;

        assert_eq!(track.len(), 13);
        assert_eq!(track[0].last_seen(), start);
        assert_eq!(track[12].last_seen(), end);
        for pair in track.windows(2) {
            assert_eq!(pair[1].last_seen() - pair[0].last_seen(), Duration::seconds(10));
        }
        assert!(track.iter().all(|t| t.is_estimate));
        Ok(())
    }

    #[test]
    fn test_estimated_track_arguments() -> Result<()> {
        let target = ship(45.0, 8.0, None)?;
        assert!(target
            .estimated_track(time(), time(), Duration::seconds(10))
            .is_err());
        assert!(target
            .estimated_track(time(), time() - Duration::minutes(1), Duration::seconds(10))
            .is_err());
        assert!(target
            .estimated_track(time(), time() + Duration::minutes(1), Duration::microseconds(500))
            .is_err());
        Ok(())
    }

    #[test]
    fn test_default_parameters() {
        let parameters = TrackEstimationParameters::default();
        assert_eq!(parameters.normal_step_size, Duration::seconds(10));
        assert_eq!(parameters.maximum_position_age, Duration::seconds(20));
        assert!(parameters.start_time_offset > Duration::zero());
        assert!(parameters.warning_distance > 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_parameters_from_json() -> Result<()> {
        let parameters = TrackEstimationParameters::from_json(
            r#"{ "warning_distance": 500.0, "warning_time": 300 }"#,
        )?;
        assert_eq!(parameters.warning_distance, 500.0);
        assert_eq!(parameters.warning_time, Duration::minutes(5));
        assert_eq!(parameters.normal_step_size, Duration::seconds(10));

        let again = TrackEstimationParameters::from_json(&parameters.to_json()?)?;
        assert_eq!(again, parameters);
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_out_of_range_durations_are_rejected() {
        for json in [
            r#"{ "warning_time": -1e300 }"#,
            r#"{ "warning_time": 1e300 }"#,
            r#"{ "start_time_offset": -60 }"#,
            r#"{ "normal_step_size": 9.3e15 }"#,
        ] {
            assert!(
                matches!(
                    TrackEstimationParameters::from_json(json),
                    Err(AisError::InvalidConfiguration(_))
                ),
                "{} was accepted",
                json
            );
        }
        assert!(TrackEstimationParameters::from_json(r#"{ "warning_time": 0 }"#).is_ok());
    }
}
