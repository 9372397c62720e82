use serde_json::{json, Value};

use crate::{
    db::{Collection, Record, RecordFilter},
    models::{AdvisorKind, Profile, RecommendationDomain, RecommendationRecord},
};

use super::{candidate_preview, enrich_by_key, joined, pretty, CandidateQuery, Domain};

const SYSTEM_PROMPT: &str = "You are a course recommendation specialist with expertise in Indian \
higher education. Analyze student profiles to recommend suitable degree courses, streams, and \
specializations. Consider government college offerings, placement statistics, and career \
outcomes. Always answer with a single JSON object.";

const CANDIDATE_LIMIT: usize = 50;
const PREVIEW_LIMIT: usize = 20;

/// Ranks catalog courses against the profile
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseRecommender;

impl Domain for CourseRecommender {
    const KIND: AdvisorKind = AdvisorKind::CourseRecommender;
    const RECORD_DOMAIN: RecommendationDomain = RecommendationDomain::Course;
    const RECOMMENDATIONS_KEY: &'static str = "recommendations";

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn candidate_query(&self, _profile: &Profile) -> Option<CandidateQuery> {
        Some(CandidateQuery {
            collection: Collection::Courses,
            filter: RecordFilter::new(),
            limit: CANDIDATE_LIMIT,
        })
    }

    fn build_prompt(&self, profile: &Profile, candidates: &[Record]) -> String {
        format!(
            r#"Based on the student profile, recommend the best courses from the available options.

Student Profile:
- Grade: {grade}
- Interests: {interests}
- Aptitude Scores: {aptitude}
- Career Goals: {goals}

Available Courses:
{courses}

Provide:
1. Top 5 course recommendations with match percentage
2. Detailed reasoning for each recommendation
3. Career prospects for each course
4. Prerequisites and eligibility criteria
5. Course difficulty assessment

Use the exact course title from the list as "course_name" when recommending an available course.
Respond with JSON in this shape:
{{
  "confidence": <number between 0 and 1>,
  "recommendations": [
    {{"course_name": "...", "match_percentage": <0-100>, "reasoning": "...", "career_prospects": ["..."], "prerequisites": ["..."], "difficulty": "..."}}
  ],
  "reasoning": "...",
  "next_steps": ["..."]
}}"#,
            grade = profile.grade,
            interests = joined(&profile.interests),
            aptitude = pretty(&profile.aptitude_scores),
            goals = joined(&profile.career_goals),
            courses = candidate_preview(
                candidates,
                PREVIEW_LIMIT,
                &["title", "category", "duration"],
                5
            ),
        )
    }

    fn enrich(
        &self,
        recommendations: Vec<RecommendationRecord>,
        candidates: &[Record],
    ) -> Vec<RecommendationRecord> {
        enrich_by_key(recommendations, candidates, "title", |course, details| {
            details.insert("course_details".to_string(), Value::Object(course.clone()));
            details.insert(
                "duration".to_string(),
                course.get("duration").cloned().unwrap_or_else(|| json!("N/A")),
            );
            details.insert(
                "average_salary".to_string(),
                course.get("averageSalary").cloned().unwrap_or_else(|| json!(0)),
            );
            details.insert(
                "top_recruiters".to_string(),
                course.get("topRecruiters").cloned().unwrap_or_else(|| json!([])),
            );
        })
    }
}
