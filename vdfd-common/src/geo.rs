//! Route distance and ordering utilities
//!
//! Distances are great-circle miles. Ordering uses a greedy nearest-neighbor
//! heuristic: it produces a reasonable visiting order quickly but is not
//! guaranteed to be the shortest route.

use crate::models::{check_coordinate, RouteStats, Waypoint};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Average driving speed used for route duration estimates
pub const DEFAULT_AVERAGE_SPEED_MPH: f64 = 30.0;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance between two coordinates, in miles
pub fn distance_between(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h just past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Sum of leg distances in sequence order
pub fn total_distance(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|leg| distance_between(leg[0].coordinate(), leg[1].coordinate()))
        .sum()
}

/// Driving time in whole minutes at `average_speed` mph
///
/// Returns `None` when the speed is zero, negative or not finite.
pub fn estimate_duration(distance: f64, average_speed: f64) -> Option<u32> {
    if !average_speed.is_finite() || average_speed <= 0.0 {
        return None;
    }
    Some((distance / average_speed * 60.0).round() as u32)
}

/// Reorder waypoints by repeatedly visiting the closest unvisited stop
///
/// With two or fewer waypoints the input is returned unchanged. Without a
/// start point the first waypoint stays first. Ties go to the earliest
/// remaining waypoint. `order` is reassigned 1..N in visiting order.
pub fn optimize_order(waypoints: Vec<Waypoint>, start_point: Option<Coordinate>) -> Vec<Waypoint> {
    if waypoints.len() <= 2 {
        return waypoints;
    }

    let mut remaining = waypoints;
    let mut visited = Vec::with_capacity(remaining.len());

    let mut current = match start_point {
        Some(start) => start,
        None => {
            let first = remaining.remove(0);
            let position = first.coordinate();
            visited.push(first);
            position
        }
    };

    while !remaining.is_empty() {
        let mut nearest = 0;
        let mut best = f64::INFINITY;
        for (index, waypoint) in remaining.iter().enumerate() {
            let distance = distance_between(current, waypoint.coordinate());
            if distance < best {
                best = distance;
                nearest = index;
            }
        }

        let next = remaining.remove(nearest);
        current = next.coordinate();
        visited.push(next);
    }

    for (index, waypoint) in visited.iter_mut().enumerate() {
        waypoint.order = index as u32 + 1;
    }
    visited
}

/// Statistics for a waypoint sequence
pub fn compute_stats(waypoints: &[Waypoint], now: i64) -> RouteStats {
    let total = total_distance(waypoints);
    RouteStats {
        total_distance: total,
        total_duration: estimate_duration(total, DEFAULT_AVERAGE_SPEED_MPH).unwrap_or_default(),
        waypoint_count: waypoints.len(),
        completed_count: waypoints.iter().filter(|w| w.completed).count(),
        last_updated: now,
    }
}

/// Display string for a coordinate with no known address
pub fn format_coordinate(lat: f64, lng: f64) -> String {
    format!("{:.6}, {:.6}", lat, lng)
}

/// Address to show when reverse geocoding is unavailable or fails
pub fn fallback_address(lat: f64, lng: f64) -> Result<String> {
    check_coordinate(lat, lng)?;
    Ok(format_coordinate(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(lat: f64, lng: f64, name: &str, order: u32) -> Waypoint {
        Waypoint::new(lat, lng, name, order)
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Coordinate::new(37.7749, -122.4194);
        assert_eq!(distance_between(p, p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(40.7128, -74.0060);
        let b = Coordinate::new(34.0522, -118.2437);
        assert_eq!(distance_between(a, b), distance_between(b, a));
    }

    #[test]
    fn test_distance_known_value() {
        // New York to Los Angeles is about 2445 miles great-circle
        let ny = Coordinate::new(40.7128, -74.0060);
        let la = Coordinate::new(34.0522, -118.2437);
        let d = distance_between(ny, la);
        assert!((d - 2445.0).abs() < 10.0, "got {}", d);

        // One degree of longitude on the equator
        let d = distance_between(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((d - 69.09).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_antipodal_distance_is_finite() {
        let a = Coordinate::new(-70.27585092261097, -112.61640922580017);
        let b = Coordinate::new(70.27585092261097, 67.38359077419983);
        let d = distance_between(a, b);
        assert!(d.is_finite(), "got {}", d);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_MILES).abs() < 1e-6, "got {}", d);

        let stats = compute_stats(&[wp(a.lat, a.lng, "a", 1), wp(b.lat, b.lng, "b", 2)], 0);
        assert!(stats.total_distance.is_finite());
    }

    #[test]
    fn test_total_distance_short_lists() {
        assert_eq!(total_distance(&[]), 0.0);
        assert_eq!(total_distance(&[wp(10.0, 10.0, "a", 1)]), 0.0);
    }

    #[test]
    fn test_total_distance_sums_legs() {
        let stops = vec![wp(0.0, 0.0, "a", 1), wp(0.0, 1.0, "b", 2), wp(0.0, 2.0, "c", 3)];
        let leg = distance_between(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((total_distance(&stops) - 2.0 * leg).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_address() {
        assert_eq!(fallback_address(37.7749, -122.4194).unwrap(), "37.774900, -122.419400");
        assert!(fallback_address(91.0, 0.0).is_err());
        assert!(fallback_address(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_estimate_duration() {
        assert_eq!(estimate_duration(30.0, 30.0), Some(60));
        assert_eq!(estimate_duration(10.0, DEFAULT_AVERAGE_SPEED_MPH), Some(20));
        assert_eq!(estimate_duration(0.0, 30.0), Some(0));
        assert_eq!(estimate_duration(10.0, 0.0), None);
        assert_eq!(estimate_duration(10.0, -5.0), None);
        assert_eq!(estimate_duration(10.0, f64::NAN), None);
    }

    #[test]
    fn test_optimize_two_or_fewer_unchanged() {
        let stops = vec![wp(1.0, 1.0, "far", 5), wp(0.0, 0.0, "near", 9)];
        let result = optimize_order(stops.clone(), Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(result, stops);
        assert!(optimize_order(vec![], None).is_empty());
    }

    #[test]
    fn test_optimize_keeps_first_without_start() {
        let stops = vec![
            wp(0.0, 3.0, "start", 1),
            wp(0.0, 0.0, "far", 2),
            wp(0.0, 2.0, "near", 3),
            wp(0.0, 1.0, "mid", 4),
        ];
        let result = optimize_order(stops, None);
        let names: Vec<&str> = result.iter().map(|w| w.address.as_str()).collect();
        assert_eq!(names, vec!["start", "near", "mid", "far"]);
        let orders: Vec<u32> = result.iter().map(|w| w.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_optimize_from_start_point() {
        let stops = vec![wp(0.0, 3.0, "c", 1), wp(0.0, 1.0, "a", 2), wp(0.0, 2.0, "b", 3)];
        let result = optimize_order(stops, Some(Coordinate::new(0.0, 0.0)));
        let names: Vec<&str> = result.iter().map(|w| w.address.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_optimize_ties_prefer_earlier() {
        let stops = vec![wp(0.0, -1.0, "west", 1), wp(0.0, 1.0, "east", 2), wp(0.0, 5.0, "far", 3)];
        let result = optimize_order(stops, Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(result[0].address, "west");
    }

    #[test]
    fn test_optimize_is_permutation() {
        let stops: Vec<Waypoint> = (0..12)
            .map(|i| {
                let f = i as f64;
                wp((f * 7.3) % 5.0, (f * 3.1) % 4.0, &format!("s{}", i), 12 - i)
            })
            .collect();
        let result = optimize_order(stops.clone(), None);
        assert_eq!(result.len(), stops.len());

        let mut before: Vec<String> = stops.iter().map(|w| w.address.clone()).collect();
        let mut after: Vec<String> = result.iter().map(|w| w.address.clone()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        let orders: Vec<u32> = result.iter().map(|w| w.order).collect();
        assert_eq!(orders, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_compute_stats() {
        let mut done = wp(0.0, 1.0, "b", 2);
        done.completed = true;
        let stops = vec![wp(0.0, 0.0, "a", 1), done];
        let stats = compute_stats(&stops, 42);
        assert_eq!(stats.waypoint_count, 2);
        assert_eq!(stats.completed_count, 1);
        assert_eq!(stats.total_duration, estimate_duration(stats.total_distance, 30.0).unwrap());
        assert_eq!(stats.last_updated, 42);
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(40.7128, -74.006), "40.712800, -74.006000");
    }
}
