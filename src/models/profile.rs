use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::db::Record;

const DEFAULT_AGE: u32 = 18;
const DEFAULT_GRADE: &str = "12th";

/// Student profile handed to every advisor
///
/// Built once per guidance request and never mutated afterwards. Ordered maps
/// keep prompt rendering deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: String,
    #[serde(default = "default_age")]
    pub age: u32,
    #[serde(default = "default_grade")]
    pub grade: String,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Aptitude test category -> score
    #[serde(default)]
    pub aptitude_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub academic_performance: Map<String, Value>,
    /// Location descriptor, e.g. `state` and `city`
    #[serde(default)]
    pub location: BTreeMap<String, String>,
    #[serde(default)]
    pub career_goals: Vec<String>,
    #[serde(default)]
    pub personality_traits: BTreeMap<String, f64>,
}

fn default_age() -> u32 {
    DEFAULT_AGE
}

fn default_grade() -> String {
    DEFAULT_GRADE.to_string()
}

/// Request-level values that take precedence over the stored user document
#[derive(Debug, Clone, Default)]
pub struct ProfileOverrides {
    pub interests: Vec<String>,
    pub career_goals: Vec<String>,
    pub location: BTreeMap<String, String>,
}

impl Profile {
    /// Creates a profile with defaults for everything but the identifier
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            age: DEFAULT_AGE,
            grade: DEFAULT_GRADE.to_string(),
            interests: Vec::new(),
            aptitude_scores: BTreeMap::new(),
            academic_performance: Map::new(),
            location: BTreeMap::new(),
            career_goals: Vec::new(),
            personality_traits: BTreeMap::new(),
        }
    }

    /// Assembles a profile from a stored user document and its aptitude results
    ///
    /// Overrides replace the stored value only when they are non-empty. Aptitude
    /// results are keyed by `test_type`; a later result for the same test wins.
    pub fn from_user_record(
        user_id: &str,
        user: &Record,
        aptitude_results: &[Record],
        overrides: ProfileOverrides,
    ) -> Self {
        let aptitude_scores = aptitude_results
            .iter()
            .map(|result| {
                let test_type = result
                    .get("test_type")
                    .and_then(Value::as_str)
                    .unwrap_or("general")
                    .to_string();
                let score = result.get("score").and_then(Value::as_f64).unwrap_or(0.0);
                (test_type, score)
            })
            .collect();

        let interests = if overrides.interests.is_empty() {
            string_list(user.get("interests"))
        } else {
            overrides.interests
        };

        let career_goals = if overrides.career_goals.is_empty() {
            string_list(user.get("career_goals"))
        } else {
            overrides.career_goals
        };

        let location = if overrides.location.is_empty() {
            string_map(user.get("location"))
        } else {
            overrides.location
        };

        Self {
            user_id: user_id.to_string(),
            age: user
                .get("age")
                .and_then(Value::as_u64)
                .and_then(|age| u32::try_from(age).ok())
                .unwrap_or(DEFAULT_AGE),
            grade: user
                .get("grade")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_GRADE)
                .to_string(),
            interests,
            aptitude_scores,
            academic_performance: user
                .get("academic_performance")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            location,
            career_goals,
            personality_traits: user
                .get("personality_traits")
                .and_then(Value::as_object)
                .map(|traits| {
                    traits
                        .iter()
                        .filter_map(|(k, v)| v.as_f64().map(|w| (k.clone(), w)))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// The state the student lives in, when known
    pub fn state(&self) -> Option<&str> {
        self.location
            .get("state")
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Renders the location descriptor as `key: value` pairs
    pub fn location_summary(&self) -> String {
        if self.location.is_empty() {
            return "Not specified".to_string();
        }
        self.location
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_user_record_reads_stored_fields() {
        let user = record(json!({
            "user_id": "u1",
            "age": 17,
            "grade": "11th",
            "interests": ["python", "data"],
            "career_goals": ["data scientist"],
            "location": {"state": "Kerala", "city": "Kochi"},
            "academic_performance": {"maths": 92},
            "personality_traits": {"openness": 0.8, "note": "ignored"}
        }));
        let aptitude = vec![
            record(json!({"test_type": "logical", "score": 78})),
            record(json!({"score": 55})),
        ];

        let profile = Profile::from_user_record("u1", &user, &aptitude, ProfileOverrides::default());

        assert_eq!(profile.age, 17);
        assert_eq!(profile.grade, "11th");
        assert_eq!(profile.interests, vec!["python", "data"]);
        assert_eq!(profile.state(), Some("Kerala"));
        assert_eq!(profile.aptitude_scores.get("logical"), Some(&78.0));
        assert_eq!(profile.aptitude_scores.get("general"), Some(&55.0));
        assert_eq!(profile.personality_traits.len(), 1);
        assert_eq!(profile.academic_performance["maths"], 92);
    }

    #[test]
    fn test_out_of_range_age_uses_default() {
        let user = record(json!({"age": 5_000_000_000u64}));

        let profile = Profile::from_user_record("u1", &user, &[], ProfileOverrides::default());

        assert_eq!(profile.age, 18);
    }

    #[test]
    fn test_overrides_win_when_present() {
        let user = record(json!({"interests": ["art"], "location": {"state": "Goa"}}));
        let overrides = ProfileOverrides {
            interests: vec!["robotics".to_string()],
            career_goals: Vec::new(),
            location: BTreeMap::from([("state".to_string(), "Punjab".to_string())]),
        };

        let profile = Profile::from_user_record("u2", &user, &[], overrides);

        assert_eq!(profile.interests, vec!["robotics"]);
        assert_eq!(profile.state(), Some("Punjab"));
        assert_eq!(profile.age, 18);
        assert_eq!(profile.grade, "12th");
    }

    #[test]
    fn test_deserialize_minimal_profile() {
        let profile: Profile = serde_json::from_value(json!({"user_id": "u3"})).unwrap();
        assert_eq!(profile, Profile::new("u3"));
        assert_eq!(profile.location_summary(), "Not specified");
        assert_eq!(profile.state(), None);
    }
}
