//! Domain advisors
//!
//! Every advisor follows the same pipeline: fetch candidate records, build a
//! prompt, call the completion gateway, interpret the text, map and enrich the
//! recommendations. [`AdvisorAgent`] owns that pipeline and a [`Domain`]
//! supplies the per-domain pieces.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{
    db::{Collection, Record, RecordFilter, RecordStore},
    error::AppResult,
    models::{AdvisorKind, AdvisorResult, Profile, RecommendationDomain, RecommendationRecord},
    services::{completion::CompletionGateway, interpreter::interpret},
};

pub mod career;
pub mod college;
pub mod course;

pub use career::CareerAdvisor;
pub use college::CollegeFinder;
pub use course::CourseRecommender;

/// Confidence assumed when the model omits one
const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Anything the orchestrator can fan out to
#[async_trait::async_trait]
pub trait Advisor: Send + Sync {
    fn kind(&self) -> AdvisorKind;

    async fn process(&self, profile: &Profile) -> AppResult<AdvisorResult>;
}

/// Bounded lookup of candidate records for a prompt
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub collection: Collection,
    pub filter: RecordFilter,
    pub limit: usize,
}

/// Per-domain prompt and enrichment rules
pub trait Domain: Send + Sync + 'static {
    const KIND: AdvisorKind;
    const RECORD_DOMAIN: RecommendationDomain;
    /// Key of the recommendation list in the model's JSON
    const RECOMMENDATIONS_KEY: &'static str;

    fn system_prompt(&self) -> &'static str;

    fn temperature(&self) -> f32 {
        0.7
    }

    /// Records to show the model, or `None` when the domain needs none
    fn candidate_query(&self, profile: &Profile) -> Option<CandidateQuery>;

    fn build_prompt(&self, profile: &Profile, candidates: &[Record]) -> String;

    fn enrich(
        &self,
        recommendations: Vec<RecommendationRecord>,
        _candidates: &[Record],
    ) -> Vec<RecommendationRecord> {
        recommendations
    }
}

/// Runs a [`Domain`] against the gateway and record store
pub struct AdvisorAgent<D> {
    domain: D,
    gateway: CompletionGateway,
    records: Arc<dyn RecordStore>,
}

impl<D: Domain> AdvisorAgent<D> {
    pub fn new(domain: D, gateway: CompletionGateway, records: Arc<dyn RecordStore>) -> Self {
        Self {
            domain,
            gateway,
            records,
        }
    }

    /// `Ok(None)` means the model answered but nothing could be parsed
    async fn run(&self, profile: &Profile) -> AppResult<Option<AdvisorResult>> {
        let candidates = match self.domain.candidate_query(profile) {
            Some(query) => {
                self.records
                    .find_records(query.collection, &query.filter, query.limit)
                    .await?
            }
            None => Vec::new(),
        };

        let prompt = self.domain.build_prompt(profile, &candidates);
        let raw = self
            .gateway
            .complete(
                &prompt,
                Some(self.domain.system_prompt()),
                self.domain.temperature(),
            )
            .await?;

        let structured = interpret(&raw);
        let Some(parsed) = structured.as_object() else {
            return Ok(None);
        };

        let recommendations = self
            .domain
            .enrich(map_recommendations::<D>(parsed), &candidates);

        Ok(Some(AdvisorResult::new(
            D::KIND,
            parsed
                .get("confidence")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_CONFIDENCE),
            recommendations,
            parsed
                .get("reasoning")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            string_items(parsed.get("next_steps")),
        )))
    }
}

#[async_trait::async_trait]
impl<D: Domain> Advisor for AdvisorAgent<D> {
    fn kind(&self) -> AdvisorKind {
        D::KIND
    }

    /// Never returns `Err`; every failure becomes the fallback result
    async fn process(&self, profile: &Profile) -> AppResult<AdvisorResult> {
        match self.run(profile).await {
            Ok(Some(result)) => {
                tracing::info!(
                    advisor = %D::KIND,
                    user_id = %profile.user_id,
                    confidence = result.confidence,
                    recommendations = result.recommendations.len(),
                    "Advisor completed"
                );
                Ok(result)
            }
            Ok(None) => {
                tracing::warn!(
                    advisor = %D::KIND,
                    user_id = %profile.user_id,
                    "Model output could not be parsed, using fallback"
                );
                Ok(AdvisorResult::fallback(D::KIND))
            }
            Err(e) => {
                tracing::error!(
                    advisor = %D::KIND,
                    user_id = %profile.user_id,
                    error = %e,
                    "Advisor failed, using fallback"
                );
                Ok(AdvisorResult::fallback(D::KIND))
            }
        }
    }
}

fn map_recommendations<D: Domain>(parsed: &Map<String, Value>) -> Vec<RecommendationRecord> {
    parsed
        .get(D::RECOMMENDATIONS_KEY)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| RecommendationRecord::from_model_item(D::RECORD_DOMAIN, item))
                .collect()
        })
        .unwrap_or_default()
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Merges matching candidate data into recommendations by exact name
///
/// `key` is the candidate field compared against the recommendation title.
/// Recommendations without a match pass through unchanged.
pub(crate) fn enrich_by_key(
    recommendations: Vec<RecommendationRecord>,
    candidates: &[Record],
    key: &str,
    merge: impl Fn(&Record, &mut Map<String, Value>),
) -> Vec<RecommendationRecord> {
    let by_key: std::collections::HashMap<&str, &Record> = candidates
        .iter()
        .filter_map(|record| record.get(key).and_then(Value::as_str).map(|k| (k, record)))
        .collect();

    recommendations
        .into_iter()
        .map(|mut recommendation| {
            if let Some(record) = by_key.get(recommendation.title.as_str()) {
                merge(record, &mut recommendation.details);
            }
            recommendation
        })
        .collect()
}

/// Pretty JSON of the first `limit` candidates restricted to `fields`
///
/// Array fields are cut to their first `max_items` entries.
pub(crate) fn candidate_preview(
    candidates: &[Record],
    limit: usize,
    fields: &[&str],
    max_items: usize,
) -> String {
    let preview: Vec<Value> = candidates
        .iter()
        .take(limit)
        .map(|record| {
            let subset: Map<String, Value> = fields
                .iter()
                .filter_map(|field| {
                    let value = match record.get(*field)? {
                        Value::Array(items) => {
                            Value::Array(items.iter().take(max_items).cloned().collect())
                        }
                        other => other.clone(),
                    };
                    Some((field.to_string(), value))
                })
                .collect();
            Value::Object(subset)
        })
        .collect();

    serde_json::to_string_pretty(&preview).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

pub(crate) fn joined(items: &[String]) -> String {
    if items.is_empty() {
        "None specified".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::services::completion::{CompletionClient, MockCompletionClient};
    use std::time::Duration;

    pub fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    pub fn gateway_replying(reply: &'static str) -> CompletionGateway {
        let mut client = MockCompletionClient::new();
        client.expect_name().return_const("mock");
        client
            .expect_complete()
            .returning(move |_| Ok(reply.to_string()));
        gateway_with(client)
    }

    pub fn gateway_with(client: MockCompletionClient) -> CompletionGateway {
        let client: Arc<dyn CompletionClient> = Arc::new(client);
        CompletionGateway::with_retry(client, 3, Duration::from_millis(1))
    }

    pub fn student() -> Profile {
        let mut profile = Profile::new("student-1");
        profile.interests = vec!["python".to_string(), "data".to_string()];
        profile.career_goals = vec!["data scientist".to_string()];
        profile
            .aptitude_scores
            .insert("numerical".to_string(), 82.0);
        profile
            .location
            .insert("state".to_string(), "Kerala".to_string());
        profile
    }
}
