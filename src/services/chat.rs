use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{
    db::{Collection, Record, RecordFilter, RecordStore},
    error::{AppError, AppResult},
    services::completion::CompletionGateway,
};

const CHAT_TEMPERATURE: f32 = 0.7;
const MAX_SUGGESTIONS: usize = 4;

const STANDARD_SUGGESTIONS: [&str; 5] = [
    "Tell me more about specific courses",
    "What are the best colleges for my interests?",
    "How can I prepare for entrance exams?",
    "What career paths align with my aptitude scores?",
    "Show me scholarship opportunities",
];

/// Keyword to topical suggestion; the first matching keyword wins
const TOPICAL_SUGGESTIONS: [(&str, &str); 3] = [
    ("college", "Compare colleges in my area"),
    ("career", "Explore related career options"),
    ("exam", "Get exam preparation tips"),
];

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub follow_up_suggestions: Vec<String>,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub context_used: bool,
}

/// Answers a free-form question with the stored user's context
pub async fn respond(
    gateway: &CompletionGateway,
    records: &dyn RecordStore,
    user_id: &str,
    message: &str,
    context: Map<String, Value>,
) -> AppResult<ChatReply> {
    if message.trim().is_empty() {
        return Err(AppError::InvalidInput("Message must not be empty".to_string()));
    }

    let user = records
        .find_one(Collection::Users, &RecordFilter::new().with("user_id", user_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let context = enrich_context(context, &user);
    let response = gateway
        .complete(message, Some(&system_prompt(&context)), CHAT_TEMPERATURE)
        .await?;

    tracing::info!(
        user_id = %user_id,
        response_chars = response.len(),
        "Chat reply generated"
    );

    Ok(ChatReply {
        response,
        follow_up_suggestions: follow_up_suggestions(message),
        user_id: user_id.to_string(),
        timestamp: Utc::now(),
        context_used: !context.is_empty(),
    })
}

/// Caller context plus the stored user's interests, grade and location
pub fn enrich_context(mut context: Map<String, Value>, user: &Record) -> Map<String, Value> {
    let field = |key: &str, default: Value| user.get(key).cloned().unwrap_or(default);

    let history = context.get("history").cloned().unwrap_or_else(|| json!([]));
    context.insert("user_interests".to_string(), field("interests", json!([])));
    context.insert("user_grade".to_string(), field("grade", json!("")));
    context.insert("user_location".to_string(), field("location", json!({})));
    context.insert("conversation_history".to_string(), history);
    context
}

pub fn system_prompt(context: &Map<String, Value>) -> String {
    let context = serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are an intelligent career guidance counselor. Use the following context to provide \
personalized advice:

User Context: {context}

Provide helpful, actionable career guidance. Be empathetic and understanding.
If asked about specific colleges, courses, or career paths, provide detailed information.
Always encourage the student and provide hope and motivation."
    )
}

pub fn follow_up_suggestions(message: &str) -> Vec<String> {
    let lowered = message.to_lowercase();
    let topical = TOPICAL_SUGGESTIONS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, suggestion)| *suggestion);

    topical
        .into_iter()
        .chain(STANDARD_SUGGESTIONS)
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}
