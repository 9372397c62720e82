use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    db::{Collection, RecordFilter, MAX_LOOKUP_LIMIT},
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{AdvisorResult, GuidanceBundle, Profile, ProfileOverrides},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct GuidanceRequest {
    pub user_id: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub career_goals: Vec<String>,
    #[serde(default)]
    pub location: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct GuidanceResponse {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub guidance: GuidanceBundle,
    pub personalization_score: f64,
    pub recommendations_count: usize,
}

/// Full guidance for a stored user, with optional request overrides
pub async fn comprehensive(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<GuidanceRequest>,
) -> AppResult<Json<GuidanceResponse>> {
    require_user_id(&request.user_id)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_id,
        "Processing guidance request"
    );

    let by_user = RecordFilter::new().with("user_id", request.user_id.as_str());

    let user = state
        .records
        .find_one(Collection::Users, &by_user)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.user_id)))?;

    let aptitude_results = state
        .records
        .find_records(Collection::AptitudeResults, &by_user, MAX_LOOKUP_LIMIT)
        .await?;

    let profile = Profile::from_user_record(
        &request.user_id,
        &user,
        &aptitude_results,
        ProfileOverrides {
            interests: request.interests,
            career_goals: request.career_goals,
            location: request.location,
        },
    );

    let bundle = state.orchestrator.get_guidance(&profile).await;

    tracing::info!(
        request_id = %request_id,
        user_id = %profile.user_id,
        failed_advisors = bundle.failed_advisors.len(),
        "Guidance request completed"
    );

    Ok(Json(GuidanceResponse {
        user_id: profile.user_id,
        timestamp: bundle.generated_at,
        personalization_score: bundle.confidence_score,
        recommendations_count: bundle.recommendation_count(),
        guidance: bundle,
    }))
}

/// Full guidance for a caller-supplied profile
pub async fn for_profile(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<Profile>,
) -> AppResult<Json<GuidanceBundle>> {
    require_user_id(&profile.user_id)?;
    Ok(Json(state.orchestrator.get_guidance(&profile).await))
}

/// Runs one advisor without orchestration
pub async fn single_advisor(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(profile): Json<Profile>,
) -> AppResult<Json<AdvisorResult>> {
    require_user_id(&profile.user_id)?;

    let advisor = state
        .orchestrator
        .kinds()
        .into_iter()
        .find(|registered| registered.as_str() == kind)
        .and_then(|registered| state.orchestrator.advisor(registered))
        .ok_or_else(|| AppError::NotFound(format!("Unknown advisor: {kind}")))?;

    Ok(Json(advisor.process(&profile).await?))
}

fn require_user_id(user_id: &str) -> AppResult<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("user_id must not be empty".to_string()));
    }
    Ok(())
}
