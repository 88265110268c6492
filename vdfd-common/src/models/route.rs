//! Route records: ordered waypoints with derived statistics

use super::{check_coordinate, present};
use crate::geo::{self, Coordinate};
use crate::models::Lead;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coordinate with a display address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// One stop in a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    /// Sequence position; 1-based after optimization
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Unix milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_arrival_time: Option<i64>,
    /// Minutes spent at the stop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_duration: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
}

impl Waypoint {
    pub fn new(lat: f64, lng: f64, address: impl Into<String>, order: u32) -> Self {
        Self {
            lat,
            lng,
            address: address.into(),
            order,
            notes: None,
            estimated_arrival_time: None,
            visit_duration: None,
            completed: false,
            lead_id: None,
        }
    }

    /// Waypoint visiting a tagged lead
    pub fn from_lead(lead: &Lead, order: u32) -> Self {
        Self {
            lat: lead.lat,
            lng: lead.lng,
            address: lead.address.clone(),
            order,
            notes: Some(lead.notes.clone()),
            estimated_arrival_time: None,
            visit_duration: None,
            completed: false,
            lead_id: Some(lead.id.clone()),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Derived route statistics
///
/// Recomputed from the waypoints on every write; never taken from input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    /// Miles
    pub total_distance: f64,
    /// Minutes
    pub total_duration: u32,
    pub waypoint_count: usize,
    pub completed_count: usize,
    /// Unix milliseconds
    pub last_updated: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStatus {
    #[default]
    Draft,
    Planned,
    InProgress,
    Completed,
    Archived,
}

impl RouteStatus {
    pub const ALL: [RouteStatus; 5] = [
        RouteStatus::Draft,
        RouteStatus::Planned,
        RouteStatus::InProgress,
        RouteStatus::Completed,
        RouteStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Draft => "draft",
            RouteStatus::Planned => "planned",
            RouteStatus::InProgress => "in-progress",
            RouteStatus::Completed => "completed",
            RouteStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RouteStatus::Draft => "Draft",
            RouteStatus::Planned => "Planned",
            RouteStatus::InProgress => "In Progress",
            RouteStatus::Completed => "Completed",
            RouteStatus::Archived => "Archived",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RouteStatus::Draft | RouteStatus::Archived => "gray",
            RouteStatus::Planned => "blue",
            RouteStatus::InProgress => "yellow",
            RouteStatus::Completed => "green",
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RouteStatus::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown route status: {}", s)))
    }
}

/// Driving route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    pub waypoints: Vec<Waypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Location>,

    pub stats: RouteStats,
    pub is_optimized: bool,

    pub shared_with: Vec<String>,
    pub is_public: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<i64>,

    pub tags: Vec<String>,
    /// Hex color for map display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    pub status: RouteStatus,
}

/// User-supplied fields for a new route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteInput {
    pub name: String,
    pub description: Option<String>,
    pub waypoints: Vec<Waypoint>,
    pub start_location: Option<Location>,
    pub end_location: Option<Location>,
    pub is_optimized: bool,
    pub shared_with: Vec<String>,
    pub is_public: bool,
    pub scheduled_date: Option<i64>,
    pub completed_date: Option<i64>,
    pub tags: Vec<String>,
    pub color: Option<String>,
    pub status: RouteStatus,
}

/// Partial route update; `stats` cannot be supplied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteUpdate {
    pub name: Option<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub waypoints: Option<Vec<Waypoint>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Option<Location>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Option<Location>>,
    pub is_optimized: Option<bool>,
    pub shared_with: Option<Vec<String>>,
    pub is_public: Option<bool>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Option<i64>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<Option<i64>>,
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    pub status: Option<RouteStatus>,
}

impl Route {
    pub fn new(id: String, user_id: String, input: RouteInput, now: i64) -> Result<Self> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user id must not be empty".to_string()));
        }
        let route = Self {
            id,
            user_id,
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
            stats: geo::compute_stats(&input.waypoints, now),
            waypoints: input.waypoints,
            start_location: input.start_location,
            end_location: input.end_location,
            is_optimized: input.is_optimized,
            shared_with: input.shared_with,
            is_public: input.is_public,
            scheduled_date: input.scheduled_date,
            completed_date: input.completed_date,
            tags: input.tags,
            color: input.color,
            status: input.status,
        };
        route.validate()?;
        Ok(route)
    }

    /// Merge a partial update into a copy of this route, recomputing stats
    pub fn merged(&self, update: RouteUpdate, now: i64) -> Result<Self> {
        let mut route = self.clone();

        if let Some(v) = update.name {
            route.name = v;
        }
        if let Some(v) = update.description {
            route.description = v;
        }
        if let Some(v) = update.waypoints {
            route.waypoints = v;
            // A new stop list invalidates any earlier optimization
            route.is_optimized = false;
        }
        if let Some(v) = update.start_location {
            route.start_location = v;
        }
        if let Some(v) = update.end_location {
            route.end_location = v;
        }
        if let Some(v) = update.is_optimized {
            route.is_optimized = v;
        }
        if let Some(v) = update.shared_with {
            route.shared_with = v;
        }
        if let Some(v) = update.is_public {
            route.is_public = v;
        }
        if let Some(v) = update.scheduled_date {
            route.scheduled_date = v;
        }
        if let Some(v) = update.completed_date {
            route.completed_date = v;
        }
        if let Some(v) = update.tags {
            route.tags = v;
        }
        if let Some(v) = update.color {
            route.color = v;
        }
        if let Some(v) = update.status {
            route.status = v;
        }

        route.updated_at = now.max(self.updated_at);
        route.stats = geo::compute_stats(&route.waypoints, route.updated_at);
        route.validate()?;
        Ok(route)
    }

    /// Reorder the waypoints with the greedy nearest-neighbor heuristic
    ///
    /// Uses `start_point`, else the route's start location, else the first
    /// waypoint as the fixed first stop. Orders are renumbered 1..N even
    /// when there are too few stops to reorder.
    pub fn optimized(&self, start_point: Option<Coordinate>, now: i64) -> Self {
        let mut route = self.clone();
        let start = start_point.or_else(|| self.start_location.as_ref().map(Location::coordinate));

        let mut waypoints = geo::optimize_order(self.waypoints.clone(), start);
        for (index, waypoint) in waypoints.iter_mut().enumerate() {
            waypoint.order = index as u32 + 1;
        }

        route.waypoints = waypoints;
        route.is_optimized = true;
        route.updated_at = now.max(self.updated_at);
        route.stats = geo::compute_stats(&route.waypoints, route.updated_at);
        route
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("route name must not be empty".to_string()));
        }
        for waypoint in &self.waypoints {
            check_coordinate(waypoint.lat, waypoint.lng)?;
        }
        for location in self.start_location.iter().chain(self.end_location.iter()) {
            check_coordinate(location.lat, location.lng)?;
        }
        Ok(())
    }
}
