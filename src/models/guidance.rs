use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AdvisorKind, AdvisorResult, RecommendationRecord};

/// Aggregated output of a full guidance run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceBundle {
    pub user_id: String,
    pub advisor_results: BTreeMap<AdvisorKind, AdvisorResult>,
    pub consolidated: ConsolidatedRecommendations,
    /// Mean confidence of advisors that returned; 0.0 when none did
    pub confidence_score: f64,
    /// Advisors whose task failed outright and were left out of aggregation
    pub failed_advisors: Vec<AdvisorKind>,
    pub generated_at: DateTime<Utc>,
}

impl GuidanceBundle {
    pub fn recommendation_count(&self) -> usize {
        self.consolidated.career_paths.len()
            + self.consolidated.courses.len()
            + self.consolidated.colleges.len()
    }
}

/// Capped cross-advisor view, one list per category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsolidatedRecommendations {
    pub career_paths: Vec<RecommendationRecord>,
    pub courses: Vec<RecommendationRecord>,
    pub colleges: Vec<RecommendationRecord>,
    pub timeline: Vec<TimelinePhase>,
    pub resources: Vec<ResourceCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelinePhase {
    pub phase: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceCategory {
    pub category: String,
    pub items: Vec<ResourceItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

fn phase(name: &str, actions: [&str; 3]) -> TimelinePhase {
    TimelinePhase {
        phase: name.to_string(),
        actions: actions.iter().map(|a| a.to_string()).collect(),
    }
}

fn category(name: &str, items: [(&str, &str, &str); 3]) -> ResourceCategory {
    ResourceCategory {
        category: name.to_string(),
        items: items
            .iter()
            .map(|(name, kind, url)| ResourceItem {
                name: name.to_string(),
                kind: kind.to_string(),
                url: url.to_string(),
            })
            .collect(),
    }
}

/// Fixed three-phase plan attached to every bundle
pub fn standard_timeline() -> Vec<TimelinePhase> {
    vec![
        phase(
            "Immediate (Next 1-2 months)",
            [
                "Complete aptitude and interest assessments",
                "Research recommended career paths",
                "Identify skill gaps and development needs",
            ],
        ),
        phase(
            "Short-term (3-6 months)",
            [
                "Apply to recommended courses and colleges",
                "Start skill development programs",
                "Network with professionals in target fields",
            ],
        ),
        phase(
            "Medium-term (6-12 months)",
            [
                "Begin academic program",
                "Gain practical experience through internships",
                "Build portfolio and professional profile",
            ],
        ),
    ]
}

/// Fixed reference links attached to every bundle
pub fn standard_resources() -> Vec<ResourceCategory> {
    vec![
        category(
            "Skill Development",
            [
                ("Coursera", "Online Courses", "https://coursera.org"),
                ("Udemy", "Skill Training", "https://udemy.com"),
                ("edX", "University Courses", "https://edx.org"),
            ],
        ),
        category(
            "Government Resources",
            [
                ("SWAYAM", "Free Online Courses", "https://swayam.gov.in"),
                ("Skill India", "Skill Development", "https://skillindia.gov.in"),
                ("Digital India", "Digital Literacy", "https://digitalindia.gov.in"),
            ],
        ),
        category(
            "Career Guidance",
            [
                ("National Career Service", "Job Portal", "https://ncs.gov.in"),
                (
                    "LinkedIn Learning",
                    "Professional Development",
                    "https://linkedin.com/learning",
                ),
                ("Internshala", "Internships", "https://internshala.com"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_timeline_has_three_phases() {
        let timeline = standard_timeline();
        assert_eq!(timeline.len(), 3);
        assert!(timeline.iter().all(|p| p.actions.len() == 3));
        assert_eq!(timeline[0].phase, "Immediate (Next 1-2 months)");
    }

    #[test]
    fn test_resource_item_serializes_type_field() {
        let resources = standard_resources();
        let value = serde_json::to_value(&resources[1].items[0]).unwrap();
        assert_eq!(value["name"], "SWAYAM");
        assert_eq!(value["type"], "Free Online Courses");
    }
}
