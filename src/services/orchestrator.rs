use chrono::Utc;
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    db::RecordStore,
    error::AppError,
    models::{
        standard_resources, standard_timeline, AdvisorKind, AdvisorResult,
        ConsolidatedRecommendations, GuidanceBundle, Profile, RecommendationDomain,
    },
    services::{
        advisors::{Advisor, AdvisorAgent, CareerAdvisor, CollegeFinder, CourseRecommender},
        completion::CompletionGateway,
    },
};

const MAX_CAREER_PATHS: usize = 3;
const MAX_COURSES: usize = 5;
const MAX_COLLEGES: usize = 5;

/// Fans a profile out to every registered advisor and merges the results
pub struct Orchestrator {
    advisors: Vec<Arc<dyn Advisor>>,
}

impl Orchestrator {
    /// Advisors are consulted, and their results read, in the given order
    pub fn new(advisors: Vec<Arc<dyn Advisor>>) -> Self {
        Self { advisors }
    }

    /// Career, course and college advisors sharing one gateway and store
    pub fn standard(gateway: CompletionGateway, records: Arc<dyn RecordStore>) -> Self {
        Self::new(vec![
            Arc::new(AdvisorAgent::new(
                CareerAdvisor,
                gateway.clone(),
                records.clone(),
            )),
            Arc::new(AdvisorAgent::new(
                CourseRecommender,
                gateway.clone(),
                records.clone(),
            )),
            Arc::new(AdvisorAgent::new(CollegeFinder, gateway, records)),
        ])
    }

    pub fn advisor(&self, kind: AdvisorKind) -> Option<Arc<dyn Advisor>> {
        self.advisors
            .iter()
            .find(|advisor| advisor.kind() == kind)
            .cloned()
    }

    pub fn kinds(&self) -> Vec<AdvisorKind> {
        self.advisors.iter().map(|advisor| advisor.kind()).collect()
    }

    pub async fn get_guidance(&self, profile: &Profile) -> GuidanceBundle {
        tracing::info!(
            user_id = %profile.user_id,
            advisors = self.advisors.len(),
            "Starting guidance run"
        );

        // Spawn all advisors so they run concurrently
        let mut tasks = Vec::with_capacity(self.advisors.len());
        for advisor in &self.advisors {
            let advisor = advisor.clone();
            let profile = profile.clone();
            let kind = advisor.kind();
            let task = tokio::spawn(async move { advisor.process(&profile).await });
            tasks.push((kind, task));
        }

        // Collect results in registration order
        let mut results: Vec<AdvisorResult> = Vec::new();
        let mut failed_advisors = Vec::new();

        for (kind, task) in tasks {
            let error = match task.await {
                Ok(Ok(result)) => {
                    results.push(result);
                    continue;
                }
                Ok(Err(e)) => e,
                Err(e) => AppError::Internal(e.to_string()),
            };

            tracing::error!(
                advisor = %kind,
                user_id = %profile.user_id,
                error = %error,
                "Advisor failed, excluding from guidance"
            );
            failed_advisors.push(kind);
        }

        let confidence_score = mean_confidence(&results);
        let consolidated = consolidate(&results);

        if !failed_advisors.is_empty() {
            tracing::warn!(
                user_id = %profile.user_id,
                success_count = results.len(),
                error_count = failed_advisors.len(),
                "Partial guidance"
            );
        }

        let bundle = GuidanceBundle {
            user_id: profile.user_id.clone(),
            advisor_results: results
                .into_iter()
                .map(|result| (result.advisor, result))
                .collect::<BTreeMap<_, _>>(),
            consolidated,
            confidence_score,
            failed_advisors,
            generated_at: Utc::now(),
        };

        tracing::info!(
            user_id = %bundle.user_id,
            confidence = bundle.confidence_score,
            recommendations = bundle.recommendation_count(),
            "Guidance run completed"
        );

        bundle
    }
}

/// Mean over the advisors that returned; 0.0 when none did
fn mean_confidence(results: &[AdvisorResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
}

fn consolidate(results: &[AdvisorResult]) -> ConsolidatedRecommendations {
    let take = |domain: RecommendationDomain, cap: usize| {
        results
            .iter()
            .flat_map(|result| result.recommendations.iter())
            .filter(|record| record.domain == domain)
            .take(cap)
            .cloned()
            .collect::<Vec<_>>()
    };

    ConsolidatedRecommendations {
        career_paths: take(RecommendationDomain::CareerPath, MAX_CAREER_PATHS),
        courses: take(RecommendationDomain::Course, MAX_COURSES),
        colleges: take(RecommendationDomain::College, MAX_COLLEGES),
        timeline: standard_timeline(),
        resources: standard_resources(),
    }
}
