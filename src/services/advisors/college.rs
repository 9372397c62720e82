use serde_json::{json, Value};

use crate::{
    db::{Collection, Record, RecordFilter},
    models::{AdvisorKind, Profile, RecommendationDomain, RecommendationRecord},
};

use super::{candidate_preview, enrich_by_key, joined, pretty, CandidateQuery, Domain};

const SYSTEM_PROMPT: &str = "You are a college search expert specializing in government colleges \
in India. Help students find suitable colleges based on location, courses, facilities, and \
admission criteria. Prioritize government colleges with good infrastructure and placement \
records. Always answer with a single JSON object.";

const CANDIDATE_LIMIT: usize = 50;
const PREVIEW_LIMIT: usize = 10;
const PREVIEW_FACILITIES: usize = 5;

/// Finds colleges, preferring the student's state
#[derive(Debug, Clone, Copy, Default)]
pub struct CollegeFinder;

impl Domain for CollegeFinder {
    const KIND: AdvisorKind = AdvisorKind::CollegeFinder;
    const RECORD_DOMAIN: RecommendationDomain = RecommendationDomain::College;
    const RECOMMENDATIONS_KEY: &'static str = "recommendations";

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn candidate_query(&self, profile: &Profile) -> Option<CandidateQuery> {
        let filter = match profile.state() {
            Some(state) => RecordFilter::new().with("location.state", state),
            None => RecordFilter::new(),
        };

        Some(CandidateQuery {
            collection: Collection::Colleges,
            filter,
            limit: CANDIDATE_LIMIT,
        })
    }

    fn build_prompt(&self, profile: &Profile, candidates: &[Record]) -> String {
        format!(
            r#"Find the best colleges for this student.

Student Profile:
- Location: {location}
- Interests: {interests}
- Academic Performance: {academics}
- Preferred Courses: {goals}

Available Colleges (sample):
{colleges}

Provide:
1. Top 5 college recommendations with match score
2. Admission requirements and cutoffs
3. Facilities and infrastructure analysis
4. Distance and accessibility factors
5. Placement statistics and outcomes

Use the exact college name from the list as "college_name" when recommending an available college.
Respond with JSON in this shape:
{{
  "confidence": <number between 0 and 1>,
  "recommendations": [
    {{"college_name": "...", "match_score": <0-100>, "reasoning": "...", "admission_requirements": "...", "placement_outlook": "..."}}
  ],
  "reasoning": "...",
  "next_steps": ["..."]
}}"#,
            location = profile.location_summary(),
            interests = joined(&profile.interests),
            academics = pretty(&profile.academic_performance),
            goals = joined(&profile.career_goals),
            colleges = candidate_preview(
                candidates,
                PREVIEW_LIMIT,
                &["name", "location", "type", "facilities"],
                PREVIEW_FACILITIES
            ),
        )
    }

    fn enrich(
        &self,
        recommendations: Vec<RecommendationRecord>,
        candidates: &[Record],
    ) -> Vec<RecommendationRecord> {
        enrich_by_key(recommendations, candidates, "name", |college, details| {
            details.insert("college_details".to_string(), Value::Object(college.clone()));
            for field in ["contact", "facilities", "rankings"] {
                details.insert(
                    field.to_string(),
                    college.get(field).cloned().unwrap_or_else(|| json!({})),
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Advisor, AdvisorAgent};
    use super::*;
    use crate::db::records::MockRecordStore;
    use crate::models::Profile;
    use std::sync::Arc;

    fn colleges() -> Vec<Record> {
        vec![record(json!({
            "name": "Government Engineering College Thrissur",
            "location": {"state": "Kerala", "city": "Thrissur"},
            "type": "Government",
            "facilities": ["Library", "Hostel", "Labs", "Sports", "Wi-Fi", "Canteen"],
            "contact": {"phone": "0487-2334144"},
            "rankings": {"nirf": 120}
        }))]
    }

    #[test]
    fn test_query_filters_by_state_when_known() {
        let query = CollegeFinder.candidate_query(&student()).unwrap();
        assert_eq!(query.collection, Collection::Colleges);
        assert_eq!(query.limit, 50);
        assert_eq!(query.filter.to_value(), json!({"location": {"state": "Kerala"}}));

        let anywhere = CollegeFinder.candidate_query(&Profile::new("u")).unwrap();
        assert!(anywhere.filter.is_empty());
    }

    #[test]
    fn test_prompt_truncates_facilities() {
        let prompt = CollegeFinder.build_prompt(&student(), &colleges());

        assert!(prompt.contains("Government Engineering College Thrissur"));
        assert!(prompt.contains("\"Wi-Fi\""));
        assert!(!prompt.contains("Canteen"));
        assert!(!prompt.contains("0487-2334144"));
    }

    #[tokio::test]
    async fn test_enriches_matching_college() {
        let mut store = MockRecordStore::new();
        store
            .expect_find_records()
            .withf(|collection, filter, _| {
                *collection == Collection::Colleges
                    && filter.to_value() == json!({"location": {"state": "Kerala"}})
            })
            .times(1)
            .returning(|_, _, _| Ok(colleges()));

        let reply = r#"{"confidence": 78,
            "recommendations": [{"college_name": "Government Engineering College Thrissur", "match_score": "88%"}],
            "reasoning": "Close to home",
            "next_steps": ["Check KEAM cutoffs"]}"#;

        let advisor = AdvisorAgent::new(CollegeFinder, gateway_replying(reply), Arc::new(store));
        let result = advisor.process(&student()).await.unwrap();

        assert_eq!(result.confidence, 0.78);
        let college = &result.recommendations[0];
        assert_eq!(college.match_percentage, Some(88.0));
        assert_eq!(college.details["contact"]["phone"], "0487-2334144");
        assert_eq!(college.details["rankings"]["nirf"], 120);
        assert_eq!(college.details["facilities"].as_array().unwrap().len(), 6);
        assert_eq!(college.details["college_details"]["type"], "Government");
    }
}
