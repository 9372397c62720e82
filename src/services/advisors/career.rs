use crate::{
    db::Record,
    models::{AdvisorKind, Profile, RecommendationDomain},
};

use super::{joined, pretty, CandidateQuery, Domain};

const SYSTEM_PROMPT: &str = "You are an expert career advisor with deep knowledge of the Indian \
education system and job market. Your role is to analyze student profiles and provide \
personalized career guidance. Consider aptitude scores, interests, academic performance, and \
market trends. Provide actionable advice with clear reasoning. Always answer with a single JSON \
object.";

/// Suggests career paths from the profile alone
#[derive(Debug, Clone, Copy, Default)]
pub struct CareerAdvisor;

impl Domain for CareerAdvisor {
    const KIND: AdvisorKind = AdvisorKind::CareerAdvisor;
    const RECORD_DOMAIN: RecommendationDomain = RecommendationDomain::CareerPath;
    const RECOMMENDATIONS_KEY: &'static str = "career_paths";

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn candidate_query(&self, _profile: &Profile) -> Option<CandidateQuery> {
        None
    }

    fn build_prompt(&self, profile: &Profile, _candidates: &[Record]) -> String {
        format!(
            r#"Analyze this student profile and provide comprehensive career guidance.

Student Details:
- Age: {age}
- Grade: {grade}
- Interests: {interests}
- Location: {location}
- Career Goals: {goals}

Aptitude Scores:
{aptitude}

Academic Performance:
{academics}

Personality Traits:
{traits}

Provide:
1. Top 3 career paths with detailed analysis
2. Reasoning for each recommendation
3. Required skills and qualifications
4. Next steps and timeline
5. Potential challenges and solutions

Respond with JSON in this shape:
{{
  "confidence": <number between 0 and 1>,
  "career_paths": [
    {{"title": "...", "match_percentage": <0-100>, "reasoning": "...", "required_skills": ["..."], "challenges": ["..."]}}
  ],
  "reasoning": "...",
  "next_steps": ["..."]
}}"#,
            age = profile.age,
            grade = profile.grade,
            interests = joined(&profile.interests),
            location = profile.location_summary(),
            goals = joined(&profile.career_goals),
            aptitude = pretty(&profile.aptitude_scores),
            academics = pretty(&profile.academic_performance),
            traits = pretty(&profile.personality_traits),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Advisor, AdvisorAgent};
    use super::*;
    use crate::db::records::MockRecordStore;
    use std::sync::Arc;

    #[test]
    fn test_prompt_embeds_profile() {
        let prompt = CareerAdvisor.build_prompt(&student(), &[]);

        assert!(prompt.contains("- Interests: python, data"));
        assert!(prompt.contains("- Career Goals: data scientist"));
        assert!(prompt.contains("- Location: state: Kerala"));
        assert!(prompt.contains("\"numerical\": 82.0"));
        assert!(prompt.contains("\"career_paths\""));
    }

    #[tokio::test]
    async fn test_maps_career_paths_without_record_lookup() {
        // No expectations: any lookup would panic
        let records = Arc::new(MockRecordStore::new());
        let reply = r#"Here you go:
{"confidence": 0.92,
 "career_paths": [
   {"title": "Data Scientist", "match_percentage": 90, "reasoning": "Strong numerical aptitude", "required_skills": ["Python", "Statistics"]},
   {"title": "ML Engineer", "match_percentage": 84},
   "Business Analyst"
 ],
 "reasoning": "Interests align with analytics",
 "next_steps": ["Take an intro statistics course"]}"#;

        let advisor = AdvisorAgent::new(CareerAdvisor, gateway_replying(reply), records);
        let result = advisor.process(&student()).await.unwrap();

        assert_eq!(result.advisor, AdvisorKind::CareerAdvisor);
        assert_eq!(result.confidence, 0.92);
        assert_eq!(result.reasoning, "Interests align with analytics");
        assert_eq!(result.next_actions, vec!["Take an intro statistics course"]);

        let titles: Vec<_> = result.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Data Scientist", "ML Engineer", "Business Analyst"]);
        assert_eq!(result.recommendations[0].match_percentage, Some(90.0));
        assert_eq!(
            result.recommendations[0].details["required_skills"],
            serde_json::json!(["Python", "Statistics"])
        );
        assert!(result
            .recommendations
            .iter()
            .all(|r| r.domain == RecommendationDomain::CareerPath));
    }
}
