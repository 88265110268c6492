//! Lead record: one tagged property and its condition assessment

use super::{check_amount, check_coordinate, present};
use crate::scoring::distress_score;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Property classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Single family home
    #[default]
    Sfh,
    Duplex,
    Multi,
    Vacant,
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Sfh,
        PropertyType::Duplex,
        PropertyType::Multi,
        PropertyType::Vacant,
        PropertyType::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Sfh => "sfh",
            PropertyType::Duplex => "duplex",
            PropertyType::Multi => "multi",
            PropertyType::Vacant => "vacant",
            PropertyType::Commercial => "commercial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown property type: {}", s)))
    }
}

/// Lead lifecycle status
///
/// Any status may follow any other; transitions are not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Dead,
    Closed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Dead,
        LeadStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Dead => "dead",
            LeadStatus::Closed => "closed",
        }
    }

    /// Display label for the status
    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::New => "New Lead",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Dead => "Dead Lead",
            LeadStatus::Closed => "Closed Deal",
        }
    }

    /// Display color for the status
    pub fn color(&self) -> &'static str {
        match self {
            LeadStatus::New => "blue",
            LeadStatus::Contacted => "yellow",
            LeadStatus::Qualified => "green",
            LeadStatus::Dead => "red",
            LeadStatus::Closed => "purple",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LeadStatus::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown lead status: {}", s)))
    }
}

/// Priority rating, 1 (very low) to 5 (very high) inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PriorityRating(u8);

impl PriorityRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidInput(format!(
                "priority rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Very Low",
            2 => "Low",
            3 => "Medium",
            4 => "High",
            _ => "Very High",
        }
    }

    /// All valid ratings, lowest first
    pub fn all() -> impl Iterator<Item = PriorityRating> {
        (Self::MIN..=Self::MAX).map(PriorityRating)
    }
}

impl Default for PriorityRating {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for PriorityRating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PriorityRating> for u8 {
    fn from(rating: PriorityRating) -> u8 {
        rating.0
    }
}

/// Street view camera angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreetViewPov {
    /// Compass direction, 0-360 degrees
    pub heading: f64,
    /// Up/down tilt, -90 to 90 degrees
    pub pitch: f64,
    pub zoom: f64,
}

impl Default for StreetViewPov {
    fn default() -> Self {
        Self {
            heading: 0.0,
            pitch: 0.0,
            zoom: 1.0,
        }
    }
}

impl StreetViewPov {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=360.0).contains(&self.heading) {
            return Err(Error::InvalidInput(format!(
                "heading must be within 0-360, got {}",
                self.heading
            )));
        }
        if !(-90.0..=90.0).contains(&self.pitch) {
            return Err(Error::InvalidInput(format!(
                "pitch must be within -90..90, got {}",
                self.pitch
            )));
        }
        if !self.zoom.is_finite() || self.zoom < 0.0 {
            return Err(Error::InvalidInput(format!(
                "zoom must be non-negative, got {}",
                self.zoom
            )));
        }
        Ok(())
    }
}

/// Property condition indicators
///
/// Seven fixed flags plus any number of free-text extra indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DistressIndicators {
    pub overgrown_lawn: bool,
    pub boarded_windows: bool,
    pub roof_damage: bool,
    pub peeling_paint: bool,
    pub broken_fences: bool,
    pub for_sale_sign: bool,
    pub code_violations: bool,
    #[serde(default)]
    pub other: Vec<String>,
}

impl DistressIndicators {
    /// Number of fixed flags
    pub const FIXED_COUNT: usize = 7;

    /// The fixed flags in declaration order
    pub fn fixed_flags(&self) -> [bool; Self::FIXED_COUNT] {
        [
            self.overgrown_lawn,
            self.boarded_windows,
            self.roof_damage,
            self.peeling_paint,
            self.broken_fences,
            self.for_sale_sign,
            self.code_violations,
        ]
    }

    /// How many fixed flags are set
    pub fn flagged_count(&self) -> usize {
        self.fixed_flags().iter().filter(|set| **set).count()
    }
}

/// Tagged property record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub user_id: String,

    /// Unix milliseconds
    pub created_at: i64,
    /// Unix milliseconds
    pub updated_at: i64,

    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub pov: StreetViewPov,

    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<f64>,

    /// Always `distress_score(&indicators)`
    pub distress_score: u8,
    pub indicators: DistressIndicators,

    pub notes: String,
    pub priority_rating: PriorityRating,
    /// Data URIs or URLs, in capture order
    pub screenshots: Vec<String>,
    pub tags: Vec<String>,

    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    /// Grantee user ids, or "public"
    pub shared_with: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact_date: Option<i64>,

    /// After repair value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_offer: Option<f64>,
}

/// User-supplied fields for a new lead
///
/// Carries no identity, timestamps or score; those are assigned on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadInput {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub pov: StreetViewPov,
    pub property_type: PropertyType,
    pub estimated_value: Option<f64>,
    pub indicators: DistressIndicators,
    pub notes: String,
    pub priority_rating: PriorityRating,
    pub screenshots: Vec<String>,
    pub tags: Vec<String>,
    pub status: LeadStatus,
    pub claimed_by: Option<String>,
    pub shared_with: Vec<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub owner_email: Option<String>,
    pub last_contact_date: Option<i64>,
    pub arv: Option<f64>,
    pub repair_estimate: Option<f64>,
    pub max_offer: Option<f64>,
}

impl Default for LeadInput {
    fn default() -> Self {
        Self {
            address: String::new(),
            lat: 0.0,
            lng: 0.0,
            pov: StreetViewPov::default(),
            property_type: PropertyType::Sfh,
            estimated_value: None,
            indicators: DistressIndicators::default(),
            notes: String::new(),
            priority_rating: PriorityRating::default(),
            screenshots: Vec::new(),
            tags: Vec::new(),
            status: LeadStatus::New,
            claimed_by: None,
            shared_with: Vec::new(),
            owner_name: None,
            owner_phone: None,
            owner_email: None,
            last_contact_date: None,
            arv: None,
            repair_estimate: None,
            max_offer: None,
        }
    }
}

/// Partial update: every present field replaces the stored value
///
/// Optional record fields use `Option<Option<T>>`: absent leaves the value
/// alone, `null` clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadUpdate {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub pov: Option<StreetViewPov>,
    pub property_type: Option<PropertyType>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<Option<f64>>,
    pub indicators: Option<DistressIndicators>,
    pub notes: Option<String>,
    pub priority_rating: Option<PriorityRating>,
    pub screenshots: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<LeadStatus>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<Option<String>>,
    pub shared_with: Option<Vec<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub last_contact_date: Option<Option<i64>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub arv: Option<Option<f64>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub repair_estimate: Option<Option<f64>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub max_offer: Option<Option<f64>>,
}

impl Lead {
    /// Assemble a new lead from user input
    ///
    /// The distress score is derived from the indicators; `created_at` and
    /// `updated_at` both take `now`.
    pub fn new(id: String, user_id: String, input: LeadInput, now: i64) -> Result<Self> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user id must not be empty".to_string()));
        }
        let lead = Self {
            id,
            user_id,
            created_at: now,
            updated_at: now,
            address: input.address,
            lat: input.lat,
            lng: input.lng,
            pov: input.pov,
            property_type: input.property_type,
            estimated_value: input.estimated_value,
            distress_score: distress_score(&input.indicators),
            indicators: input.indicators,
            notes: input.notes,
            priority_rating: input.priority_rating,
            screenshots: input.screenshots,
            tags: dedup_tags(input.tags),
            status: input.status,
            claimed_by: input.claimed_by,
            shared_with: input.shared_with,
            owner_name: input.owner_name,
            owner_phone: input.owner_phone,
            owner_email: input.owner_email,
            last_contact_date: input.last_contact_date,
            arv: input.arv,
            repair_estimate: input.repair_estimate,
            max_offer: input.max_offer,
        };
        lead.validate()?;
        Ok(lead)
    }

    /// Merge a partial update into a copy of this lead
    ///
    /// Shallow replacement of present fields, score recomputed, `updated_at`
    /// set to `now` (never earlier than the previous value). The original is
    /// left untouched if the merged record fails validation.
    pub fn merged(&self, update: LeadUpdate, now: i64) -> Result<Self> {
        let mut lead = self.clone();

        if let Some(v) = update.address {
            lead.address = v;
        }
        if let Some(v) = update.lat {
            lead.lat = v;
        }
        if let Some(v) = update.lng {
            lead.lng = v;
        }
        if let Some(v) = update.pov {
            lead.pov = v;
        }
        if let Some(v) = update.property_type {
            lead.property_type = v;
        }
        if let Some(v) = update.estimated_value {
            lead.estimated_value = v;
        }
        if let Some(v) = update.indicators {
            lead.indicators = v;
        }
        if let Some(v) = update.notes {
            lead.notes = v;
        }
        if let Some(v) = update.priority_rating {
            lead.priority_rating = v;
        }
        if let Some(v) = update.screenshots {
            lead.screenshots = v;
        }
        if let Some(v) = update.tags {
            lead.tags = dedup_tags(v);
        }
        if let Some(v) = update.status {
            lead.status = v;
        }
        if let Some(v) = update.claimed_by {
            lead.claimed_by = v;
        }
        if let Some(v) = update.shared_with {
            lead.shared_with = v;
        }
        if let Some(v) = update.owner_name {
            lead.owner_name = v;
        }
        if let Some(v) = update.owner_phone {
            lead.owner_phone = v;
        }
        if let Some(v) = update.owner_email {
            lead.owner_email = v;
        }
        if let Some(v) = update.last_contact_date {
            lead.last_contact_date = v;
        }
        if let Some(v) = update.arv {
            lead.arv = v;
        }
        if let Some(v) = update.repair_estimate {
            lead.repair_estimate = v;
        }
        if let Some(v) = update.max_offer {
            lead.max_offer = v;
        }

        lead.distress_score = distress_score(&lead.indicators);
        lead.updated_at = now.max(self.updated_at);
        lead.validate()?;
        Ok(lead)
    }

    /// Check field ranges
    pub fn validate(&self) -> Result<()> {
        check_coordinate(self.lat, self.lng)?;
        self.pov.validate()?;
        check_amount("estimatedValue", self.estimated_value)?;
        check_amount("arv", self.arv)?;
        check_amount("repairEstimate", self.repair_estimate)?;
        check_amount("maxOffer", self.max_offer)?;
        if self.updated_at < self.created_at {
            return Err(Error::InvalidInput(
                "updatedAt must not precede createdAt".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tags are set-like: drop repeats, keep first occurrence order
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}
