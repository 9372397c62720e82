use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    db::{Collection, Record, RecordFilter, MAX_LOOKUP_LIMIT},
    error::{AppError, AppResult},
    routes::AppState,
};

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct CourseQuery {
    category: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CollegeQuery {
    state: Option<String>,
    limit: Option<usize>,
}

/// Lists catalog courses, optionally by category
pub async fn courses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CourseQuery>,
) -> AppResult<Json<Vec<Record>>> {
    let filter = match params.category {
        Some(category) => RecordFilter::new().with("category", category),
        None => RecordFilter::new(),
    };
    let courses = state
        .records
        .find_records(Collection::Courses, &filter, page_limit(params.limit))
        .await?;
    Ok(Json(courses))
}

/// Lists colleges, optionally by state
pub async fn colleges(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CollegeQuery>,
) -> AppResult<Json<Vec<Record>>> {
    let filter = match params.state {
        Some(region) => RecordFilter::new().with("location.state", region),
        None => RecordFilter::new(),
    };
    let colleges = state
        .records
        .find_records(Collection::Colleges, &filter, page_limit(params.limit))
        .await?;
    Ok(Json(colleges))
}

/// Single college by its `id` field
pub async fn college_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Record>> {
    let filter = RecordFilter::new().with("id", id.as_str());
    state
        .records
        .find_one(Collection::Colleges, &filter)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("College not found: {id}")))
}

/// States that have at least one college
pub async fn college_locations(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let values = state
        .records
        .distinct_values(Collection::Colleges, "location.state")
        .await?;
    Ok(Json(json!({ "locations": sorted_labels(values) })))
}

/// College types present in the catalog
pub async fn college_types(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let values = state
        .records
        .distinct_values(Collection::Colleges, "type")
        .await?;
    Ok(Json(json!({ "types": sorted_labels(values) })))
}

/// Course categories present in the catalog
pub async fn course_categories(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let values = state
        .records
        .distinct_values(Collection::Courses, "category")
        .await?;
    Ok(Json(json!({ "categories": sorted_labels(values) })))
}

/// Non-empty string values, sorted and deduplicated
fn sorted_labels(values: Vec<Value>) -> Vec<String> {
    let mut labels: Vec<String> = values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

fn page_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LOOKUP_LIMIT)
}
