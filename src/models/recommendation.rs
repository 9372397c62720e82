use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;

/// Identifies one of the registered advisors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorKind {
    CareerAdvisor,
    CourseRecommender,
    CollegeFinder,
}

impl AdvisorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisorKind::CareerAdvisor => "career_advisor",
            AdvisorKind::CourseRecommender => "course_recommender",
            AdvisorKind::CollegeFinder => "college_finder",
        }
    }
}

impl Display for AdvisorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category a recommendation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationDomain {
    CareerPath,
    Course,
    College,
}

impl RecommendationDomain {
    /// Keys the model may use for the record's title, most specific first
    fn title_keys(&self) -> &'static [&'static str] {
        match self {
            RecommendationDomain::CareerPath => &["title", "career", "career_path", "name", "field"],
            RecommendationDomain::Course => &["course_name", "title", "course", "name"],
            RecommendationDomain::College => &["college_name", "name", "college", "title"],
        }
    }
}

const MATCH_KEYS: &[&str] = &["match_percentage", "match_score", "match", "confidence", "score"];
const REASONING_KEYS: &[&str] = &["reasoning", "reason", "rationale", "why"];

/// Field names of [`RecommendationRecord`] that `details` must never shadow
const RESERVED_KEYS: &[&str] = &["domain", "title", "match_percentage", "reasoning"];

/// A single recommendation produced by an advisor
///
/// Fields the model returns beyond title, match and reasoning are kept in
/// `details`, and enrichment from the record store is merged there too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRecord {
    pub domain: RecommendationDomain,
    pub title: String,
    pub match_percentage: Option<f64>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl RecommendationRecord {
    pub fn new(domain: RecommendationDomain, title: impl Into<String>) -> Self {
        Self {
            domain,
            title: title.into(),
            match_percentage: None,
            reasoning: String::new(),
            details: Map::new(),
        }
    }

    /// Maps one entry of a model-provided recommendation list
    ///
    /// Bare strings become title-only records. Objects without any usable
    /// title, and every other JSON type, are skipped.
    pub fn from_model_item(domain: RecommendationDomain, item: &Value) -> Option<Self> {
        match item {
            Value::String(title) if !title.trim().is_empty() => {
                Some(Self::new(domain, title.trim()))
            }
            Value::Object(fields) => {
                let mut details = fields.clone();

                let title = take_first(&mut details, domain.title_keys(), |v| {
                    v.as_str()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })?;
                let match_percentage = take_first(&mut details, MATCH_KEYS, parse_percentage);
                let reasoning =
                    take_first(&mut details, REASONING_KEYS, |v| v.as_str().map(str::to_string))
                        .unwrap_or_default();
                rename_reserved(&mut details);

                Some(Self {
                    domain,
                    title,
                    match_percentage,
                    reasoning,
                    details,
                })
            }
            _ => None,
        }
    }
}

/// Removes and converts the first key whose value converts successfully
fn take_first<T>(
    fields: &mut Map<String, Value>,
    keys: &[&str],
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let key = keys
        .iter()
        .find(|key| fields.get(**key).and_then(&convert).is_some())?;
    fields.remove(*key).and_then(|v| convert(&v))
}

/// Moves leftover keys that collide with the flattened fixed fields to `model_<key>`
fn rename_reserved(details: &mut Map<String, Value>) {
    for key in RESERVED_KEYS {
        if let Some(value) = details.remove(*key) {
            details.insert(format!("model_{key}"), value);
        }
    }
}

/// Reads `85`, `0.85`, `"85%"` or `"85"` as a percentage in [0, 100]
fn parse_percentage(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    let percentage = if raw > 0.0 && raw <= 1.0 { raw * 100.0 } else { raw };
    Some(percentage.clamp(0.0, 100.0))
}

/// Normalizes a model-reported confidence into [0, 1]
///
/// Values above 1 are read as percentages.
pub fn normalize_confidence(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    let confidence = if raw > 1.0 { raw / 100.0 } else { raw };
    confidence.clamp(0.0, 1.0)
}

/// Output of one advisor invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisorResult {
    pub advisor: AdvisorKind,
    pub confidence: f64,
    pub recommendations: Vec<RecommendationRecord>,
    pub reasoning: String,
    pub next_actions: Vec<String>,
}

/// Confidence reported when an advisor had to fall back
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

impl AdvisorResult {
    pub fn new(
        advisor: AdvisorKind,
        confidence: f64,
        recommendations: Vec<RecommendationRecord>,
        reasoning: String,
        next_actions: Vec<String>,
    ) -> Self {
        Self {
            advisor,
            confidence: normalize_confidence(confidence),
            recommendations,
            reasoning,
            next_actions,
        }
    }

    /// Degraded result used when parsing or an upstream call fails
    pub fn fallback(advisor: AdvisorKind) -> Self {
        let reasoning = match advisor {
            AdvisorKind::CareerAdvisor => "Unable to process request due to technical issues",
            AdvisorKind::CourseRecommender => "Unable to process course recommendations",
            AdvisorKind::CollegeFinder => "Unable to process college recommendations",
        };
        Self {
            advisor,
            confidence: FALLBACK_CONFIDENCE,
            recommendations: Vec::new(),
            reasoning: reasoning.to_string(),
            next_actions: vec!["retry later".to_string()],
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback(self.advisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_course_item_maps_known_keys() {
        let item = json!({
            "course_name": "B.Sc Data Science",
            "match_percentage": "92%",
            "reasoning": "Strong numerical aptitude",
            "career_prospects": ["Analyst"]
        });

        let record = RecommendationRecord::from_model_item(RecommendationDomain::Course, &item).unwrap();

        assert_eq!(record.title, "B.Sc Data Science");
        assert_eq!(record.match_percentage, Some(92.0));
        assert_eq!(record.reasoning, "Strong numerical aptitude");
        assert_eq!(record.details.len(), 1);
        assert_eq!(record.details["career_prospects"], json!(["Analyst"]));
    }

    #[test]
    fn test_string_item_becomes_title() {
        let record =
            RecommendationRecord::from_model_item(RecommendationDomain::CareerPath, &json!(" Data Engineer "))
                .unwrap();
        assert_eq!(record.title, "Data Engineer");
        assert_eq!(record.match_percentage, None);
    }

    #[test]
    fn test_items_without_title_are_skipped() {
        assert!(RecommendationRecord::from_model_item(
            RecommendationDomain::College,
            &json!({"match_score": 80})
        )
        .is_none());
        assert!(RecommendationRecord::from_model_item(RecommendationDomain::College, &json!(42)).is_none());
        assert!(RecommendationRecord::from_model_item(RecommendationDomain::College, &json!("")).is_none());
    }

    #[test]
    fn test_fractional_match_is_scaled() {
        let item = json!({"title": "Actuary", "confidence": 0.75});
        let record = RecommendationRecord::from_model_item(RecommendationDomain::CareerPath, &item).unwrap();
        assert_eq!(record.match_percentage, Some(75.0));
    }

    #[test]
    fn test_normalize_confidence() {
        assert_eq!(normalize_confidence(0.9), 0.9);
        assert_eq!(normalize_confidence(85.0), 0.85);
        assert_eq!(normalize_confidence(-1.0), 0.0);
        assert_eq!(normalize_confidence(500.0), 1.0);
        assert_eq!(normalize_confidence(f64::NAN), 0.0);
    }

    #[test]
    fn test_fallback_result_shape() {
        let result = AdvisorResult::fallback(AdvisorKind::CollegeFinder);
        assert_eq!(result.confidence, 0.5);
        assert!(result.recommendations.is_empty());
        assert_eq!(result.next_actions, vec!["retry later"]);
        assert!(result.is_fallback());
    }

    #[test]
    fn test_record_serializes_details_flat() {
        let mut record = RecommendationRecord::new(RecommendationDomain::College, "NIT Calicut");
        record.details.insert("rankings".to_string(), json!({"nirf": 25}));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["domain"], "college");
        assert_eq!(value["title"], "NIT Calicut");
        assert_eq!(value["rankings"]["nirf"], 25);
    }

    #[test]
    fn test_model_domain_key_does_not_shadow_tag() {
        let item = json!({"title": "Data Scientist", "domain": "Technology", "match_percentage": 90});
        let record = RecommendationRecord::from_model_item(RecommendationDomain::CareerPath, &item).unwrap();

        assert_eq!(record.details["model_domain"], "Technology");
        assert!(!record.details.contains_key("domain"));

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"domain\"").count(), 1);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["domain"], "career_path");

        let parsed: RecommendationRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_second_title_key_does_not_shadow_title() {
        let item = json!({
            "course_name": "B.Sc Data Science",
            "title": "Data Science Degree",
            "match_percentage": 88,
            "match_score": 70,
            "reasoning": "Fits",
            "reason": "Also fits"
        });
        let record = RecommendationRecord::from_model_item(RecommendationDomain::Course, &item).unwrap();

        assert_eq!(record.title, "B.Sc Data Science");
        assert_eq!(record.details["model_title"], "Data Science Degree");

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"title\"").count(), 1);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["title"], "B.Sc Data Science");
        assert_eq!(value["match_percentage"], 88.0);
        assert_eq!(value["reasoning"], "Fits");

        let parsed: RecommendationRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.title, "B.Sc Data Science");
    }

    #[test]
    fn test_leftover_match_and_reasoning_keys_are_renamed() {
        let item = json!({
            "college_name": "NIT Calicut",
            "match_score": 91,
            "match_percentage": "n/a",
            "why": "Close to home",
            "reasoning": 42
        });
        let record = RecommendationRecord::from_model_item(RecommendationDomain::College, &item).unwrap();

        assert_eq!(record.match_percentage, Some(91.0));
        assert_eq!(record.reasoning, "Close to home");
        assert_eq!(record.details["model_match_percentage"], "n/a");
        assert_eq!(record.details["model_reasoning"], 42);
        assert!(!record.details.contains_key("match_percentage"));
        assert!(!record.details.contains_key("reasoning"));
    }

    #[test]
    fn test_advisor_kind_round_trips_as_snake_case() {
        assert_eq!(
            serde_json::to_value(AdvisorKind::CourseRecommender).unwrap(),
            json!("course_recommender")
        );
        assert_eq!(AdvisorKind::CollegeFinder.to_string(), "college_finder");
    }
}
