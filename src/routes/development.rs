use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    routes::AppState,
    services::development::{self, LearningPath, SkillAnalysis},
};

#[derive(Debug, Deserialize)]
pub struct SkillAnalysisRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    pub target_career: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LearningPathRequest {
    pub career_goal: String,
    #[serde(default)]
    pub current_skills: Vec<String>,
}

/// Skill gaps and strengths for an optional target career
pub async fn analyze_skills(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SkillAnalysisRequest>,
) -> AppResult<Json<SkillAnalysis>> {
    let analysis = development::analyze_skills(
        &state.gateway,
        &request.skills,
        request.target_career.as_deref(),
    )
    .await?;
    Ok(Json(analysis))
}

/// Phased learning plan towards a career goal
pub async fn learning_path(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LearningPathRequest>,
) -> AppResult<Json<LearningPath>> {
    let path = development::generate_learning_path(
        &state.gateway,
        &request.career_goal,
        &request.current_skills,
    )
    .await?;
    Ok(Json(path))
}
