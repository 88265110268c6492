//! Lead filtering and summary statistics

use crate::models::{Lead, LeadStatus, PriorityRating, PropertyType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Criteria for narrowing a user's leads
///
/// Empty lists and `None` bounds match everything. A lead matches `tags`
/// when it carries at least one of them. Date bounds apply to `createdAt`
/// and are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadFilterOptions {
    pub status: Vec<LeadStatus>,
    pub property_type: Vec<PropertyType>,
    pub priority_rating: Vec<PriorityRating>,
    pub min_distress_score: Option<u8>,
    pub max_distress_score: Option<u8>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub tags: Vec<String>,
}

impl LeadFilterOptions {
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_distress_score, self.max_distress_score) {
            if min > max {
                return Err(Error::InvalidInput(format!(
                    "minDistressScore {} exceeds maxDistressScore {}",
                    min, max
                )));
            }
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(Error::InvalidInput(
                    "startDate must not be after endDate".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        if !self.status.is_empty() && !self.status.contains(&lead.status) {
            return false;
        }
        if !self.property_type.is_empty() && !self.property_type.contains(&lead.property_type) {
            return false;
        }
        if !self.priority_rating.is_empty() && !self.priority_rating.contains(&lead.priority_rating) {
            return false;
        }
        if self.min_distress_score.is_some_and(|min| lead.distress_score < min) {
            return false;
        }
        if self.max_distress_score.is_some_and(|max| lead.distress_score > max) {
            return false;
        }
        if self.start_date.is_some_and(|start| lead.created_at < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| lead.created_at > end) {
            return false;
        }
        if !self.tags.is_empty() && !lead.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        true
    }

    /// Keep the matching leads, preserving order
    pub fn apply(&self, leads: Vec<Lead>) -> Vec<Lead> {
        leads.into_iter().filter(|lead| self.matches(lead)).collect()
    }
}

/// Summary of a set of leads
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total: usize,
    pub by_status: BTreeMap<LeadStatus, usize>,
    pub by_property_type: BTreeMap<PropertyType, usize>,
    pub by_priority: BTreeMap<u8, usize>,
    /// 0.0 when there are no leads
    pub average_distress_score: f64,
    /// Sum of estimated values; absent when no lead has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
    /// Created within the last 7 days
    pub this_week: usize,
    /// Created within the last 30 days
    pub this_month: usize,
}

impl LeadStats {
    /// Compute statistics relative to `now` (Unix milliseconds)
    pub fn compute(leads: &[Lead], now: i64) -> Self {
        let mut by_status: BTreeMap<LeadStatus, usize> =
            LeadStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut by_property_type: BTreeMap<PropertyType, usize> =
            PropertyType::ALL.iter().map(|t| (*t, 0)).collect();
        let mut by_priority: BTreeMap<u8, usize> =
            PriorityRating::all().map(|p| (p.value(), 0)).collect();

        let mut score_sum = 0u64;
        let mut total_value: Option<f64> = None;
        let mut this_week = 0;
        let mut this_month = 0;

        for lead in leads {
            *by_status.entry(lead.status).or_default() += 1;
            *by_property_type.entry(lead.property_type).or_default() += 1;
            *by_priority.entry(lead.priority_rating.value()).or_default() += 1;
            score_sum += lead.distress_score as u64;

            if let Some(value) = lead.estimated_value {
                *total_value.get_or_insert(0.0) += value;
            }

            let age = now - lead.created_at;
            if age <= 7 * DAY_MS {
                this_week += 1;
            }
            if age <= 30 * DAY_MS {
                this_month += 1;
            }
        }

        let average_distress_score = if leads.is_empty() {
            0.0
        } else {
            score_sum as f64 / leads.len() as f64
        };

        Self {
            total: leads.len(),
            by_status,
            by_property_type,
            by_priority,
            average_distress_score,
            total_value,
            this_week,
            this_month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DistressIndicators, LeadInput};

    const NOW: i64 = 1_700_000_000_000;

    fn lead(id: &str, created_at: i64, status: LeadStatus, flags: usize, tags: &[&str]) -> Lead {
        let indicators = DistressIndicators {
            overgrown_lawn: flags > 0,
            boarded_windows: flags > 1,
            roof_damage: flags > 2,
            ..Default::default()
        };
        let input = LeadInput {
            address: format!("{} Main St", id),
            status,
            indicators,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        Lead::new(id.into(), "u1".into(), input, created_at).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let leads = vec![lead("a", NOW, LeadStatus::New, 0, &[])];
        assert_eq!(LeadFilterOptions::default().apply(leads.clone()), leads);
    }

    #[test]
    fn test_filter_by_status_and_score() {
        let leads = vec![
            lead("a", NOW, LeadStatus::New, 3, &[]),
            lead("b", NOW, LeadStatus::Dead, 3, &[]),
            lead("c", NOW, LeadStatus::New, 1, &[]),
        ];
        let filter = LeadFilterOptions {
            status: vec![LeadStatus::New],
            min_distress_score: Some(40),
            ..Default::default()
        };
        let ids: Vec<String> = filter.apply(leads).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a".to_string()]);
    }

    #[test]
    fn test_filter_by_date_and_tags() {
        let leads = vec![
            lead("old", NOW - 10 * DAY_MS, LeadStatus::New, 0, &["corner"]),
            lead("new", NOW, LeadStatus::New, 0, &["corner", "hot"]),
            lead("untagged", NOW, LeadStatus::New, 0, &[]),
        ];
        let filter = LeadFilterOptions {
            start_date: Some(NOW - DAY_MS),
            tags: vec!["hot".into(), "vacant".into()],
            ..Default::default()
        };
        let ids: Vec<String> = filter.apply(leads).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["new".to_string()]);
    }

    #[test]
    fn test_filter_validation() {
        let filter = LeadFilterOptions {
            min_distress_score: Some(80),
            max_distress_score: Some(20),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
        assert!(LeadFilterOptions::default().validate().is_ok());
    }

    #[test]
    fn test_stats() {
        let mut valued = lead("a", NOW, LeadStatus::New, 3, &[]);
        valued.estimated_value = Some(100_000.0);
        let leads = vec![
            valued,
            lead("b", NOW - 10 * DAY_MS, LeadStatus::Contacted, 0, &[]),
            lead("c", NOW - 40 * DAY_MS, LeadStatus::Contacted, 0, &[]),
        ];

        let stats = LeadStats::compute(&leads, NOW);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_status[&LeadStatus::Contacted], 2);
        assert_eq!(stats.by_status[&LeadStatus::Closed], 0);
        assert_eq!(stats.by_property_type[&PropertyType::Sfh], 3);
        assert_eq!(stats.by_priority[&3], 3);
        assert_eq!(stats.by_priority[&1], 0);
        assert!((stats.average_distress_score - 43.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.total_value, Some(100_000.0));
        assert_eq!(stats.this_week, 1);
        assert_eq!(stats.this_month, 2);
    }

    #[test]
    fn test_stats_empty() {
        let stats = LeadStats::compute(&[], NOW);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_distress_score, 0.0);
        assert_eq!(stats.total_value, None);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["byStatus"]["new"], 0);
        assert_eq!(json["byPriority"]["5"], 0);
    }
}
