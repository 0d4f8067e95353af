use serde::{Deserialize, Serialize};

use crate::observation::Observation;

/// Mean Earth radius, km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A symmetric, non-negative pairwise distance over (latitude, longitude)
/// coordinate pairs in decimal degrees.
///
/// Kept as a trait so the windowing logic never has to know which metric is
/// in use. Coordinates are validated at parse time, so implementations may
/// assume latitudes in [-90, 90] and longitudes in [-180, 180].
pub trait SpaceMetric {
    fn distance(
        &self,
        a: (f64, f64),
        b: (f64, f64),
    ) -> f64;
}

/// Great-circle distance on a sphere. Output unit follows the radius
/// (kilometers for the default Earth radius).
#[derive(Debug, Clone, Copy)]
pub struct Haversine {
    pub radius: f64,
}

impl Default for Haversine {
    fn default() -> Self {
        Haversine {
            radius: EARTH_RADIUS_KM,
        }
    }
}

impl SpaceMetric for Haversine {
    fn distance(
        &self,
        a: (f64, f64),
        b: (f64, f64),
    ) -> f64 {
        let (lat1, lon1) = a;
        let (lat2, lon2) = b;

        let d_lat = (lat2 - lat1).to_radians();
        let d_lon = (lon2 - lon1).to_radians();
        let h = (d_lat / 2.0).sin().powi(2)
            + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

        2.0 * self.radius * h.sqrt().min(1.0).asin()
    }
}

/// Metric selection for the config surface.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    Haversine,
}

impl MetricKind {
    pub fn build(
        &self,
        sphere_radius: f64,
    ) -> Box<dyn SpaceMetric> {
        match self {
            MetricKind::Haversine => Box::new(Haversine {
                radius: sphere_radius,
            }),
        }
    }
}

/// One distance per live-window element, oldest first. Empty window means no
/// work and no metric calls.
pub fn evaluate_window<'a>(
    metric: &dyn SpaceMetric,
    window: impl Iterator<Item = &'a Observation>,
    current: &Observation,
) -> Vec<f64> {
    window
        .map(|prior| metric.distance(prior.coordinates(), current.coordinates()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        let metric = Haversine::default();
        let d = metric.distance((30.0, -90.0), (30.0, -90.0));
        assert_eq!(d, 0.0);
    }

    #[test]
    fn one_degree_longitude_at_equator() {
        let metric = Haversine::default();
        let d = metric.distance((0.0, 0.0), (0.0, 1.0));
        // One degree of arc on a 6371 km sphere is ~111.19 km.
        assert!((d - 111.19).abs() < 0.05, "got {}", d);
    }

    #[test]
    fn is_symmetric() {
        let metric = Haversine::default();
        let a = (40.7128, -74.0060);
        let b = (51.5074, -0.1278);
        assert_eq!(metric.distance(a, b), metric.distance(b, a));
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let metric = Haversine::default();
        let d = metric.distance((0.0, 0.0), (0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - half_circumference).abs() < 1e-6, "got {}", d);
    }

    #[test]
    fn empty_window_evaluates_to_nothing() {
        let metric = Haversine::default();
        let distances = evaluate_window(&metric, std::iter::empty(), &obs(0.0, 0.0));
        assert!(distances.is_empty());
    }

    #[test]
    fn distances_follow_window_order() {
        let metric = Haversine::default();
        let window = [obs(0.0, 0.0), obs(0.0, 0.5), obs(0.0, 1.0)];
        let current = obs(0.0, 1.0);
        let distances = evaluate_window(&metric, window.iter(), &current);
        assert_eq!(distances.len(), 3);
        assert!(distances[0] > distances[1]);
        assert_eq!(distances[2], 0.0);
    }

    fn obs(
        latitude: f64,
        longitude: f64,
    ) -> Observation {
        Observation {
            timestamp: chrono::NaiveDateTime::parse_from_str(
                "01/01/2020 00:00",
                "%m/%d/%Y %H:%M",
            )
            .unwrap(),
            latitude,
            longitude,
        }
    }
}
