//! Skill gap analysis and learning path planning
//!
//! Both are single model calls interpreted with [`interpret`]; an unparseable
//! answer degrades to a fixed shape that keeps the raw text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    services::{
        completion::CompletionGateway,
        interpreter::{interpret, StructuredResult},
    },
};

const SKILLS_SYSTEM_PROMPT: &str = "You are a skills assessment expert who helps people identify \
their strengths and areas for improvement in their professional development. Always answer with \
a single JSON object.";

const LEARNING_PATH_SYSTEM_PROMPT: &str = "You are an expert learning and development advisor who \
creates comprehensive, realistic learning paths for career transitions and skill development. \
Always answer with a single JSON object.";

const PLANNING_TEMPERATURE: f32 = 0.6;
const FALLBACK_TIMELINE: &str = "6-12 months";
const FALLBACK_PHASE: &str = "Learning Phase";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillAnalysis {
    pub skill_gaps: Vec<String>,
    pub strengths: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub recommended_courses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearningPath {
    pub timeline: String,
    pub phases: Vec<LearningPhase>,
    pub certifications: Vec<String>,
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LearningPhase {
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub skills: Vec<String>,
    pub resources: Vec<String>,
    pub milestones: Vec<String>,
}

pub async fn analyze_skills(
    gateway: &CompletionGateway,
    skills: &[String],
    target_career: Option<&str>,
) -> AppResult<SkillAnalysis> {
    if skills.iter().all(|s| s.trim().is_empty()) {
        return Err(AppError::InvalidInput("Skills list is required".to_string()));
    }

    let target = target_career.filter(|t| !t.trim().is_empty());
    let prompt = format!(
        r#"Analyze the following skills{context}:
Skills: {skills}
Target Career: {target}

Provide analysis in JSON format:
{{
  "gaps": ["skill_gap1", "skill_gap2"],
  "strengths": ["strength1", "strength2"],
  "suggestions": ["improvement1", "improvement2"],
  "courses": ["recommended_course1", "recommended_course2"]
}}

Focus on:
1. Identifying skill gaps for the target career
2. Highlighting existing strengths
3. Providing specific improvement suggestions
4. Recommending relevant courses or certifications"#,
        context = target
            .map(|t| format!(" for a career in {t}"))
            .unwrap_or_default(),
        skills = skills.join(", "),
        target = target.unwrap_or("General career guidance"),
    );

    let raw = gateway
        .complete(&prompt, Some(SKILLS_SYSTEM_PROMPT), PLANNING_TEMPERATURE)
        .await?;

    Ok(match interpret(&raw) {
        StructuredResult::Parsed(object) => SkillAnalysis {
            skill_gaps: strings(&object, "gaps"),
            strengths: strings(&object, "strengths"),
            improvement_suggestions: strings(&object, "suggestions"),
            recommended_courses: strings(&object, "courses"),
        },
        StructuredResult::Degraded { raw_response } => {
            tracing::warn!("Skill analysis could not be parsed, returning raw text");
            SkillAnalysis {
                improvement_suggestions: vec![raw_response],
                ..SkillAnalysis::default()
            }
        }
    })
}

pub async fn generate_learning_path(
    gateway: &CompletionGateway,
    career_goal: &str,
    current_skills: &[String],
) -> AppResult<LearningPath> {
    if career_goal.trim().is_empty() {
        return Err(AppError::InvalidInput("career_goal must not be empty".to_string()));
    }

    let prompt = format!(
        r#"Create a personalized learning path for someone who wants to pursue: {career_goal}

Current skills: {skills}

Provide a structured learning path in JSON format:
{{
  "timeline": "recommended_duration",
  "phases": [
    {{
      "phase": "Phase 1",
      "duration": "timeframe",
      "skills": ["skill1", "skill2"],
      "resources": ["resource1", "resource2"],
      "milestones": ["milestone1", "milestone2"]
    }}
  ],
  "certifications": ["cert1", "cert2"],
  "projects": ["project1", "project2"]
}}

Include:
1. Realistic timeline broken into phases
2. Skills to develop in each phase
3. Learning resources and courses
4. Key milestones and certifications
5. Practical projects to build portfolio"#,
        skills = if current_skills.is_empty() {
            "None specified".to_string()
        } else {
            current_skills.join(", ")
        },
    );

    let raw = gateway
        .complete(&prompt, Some(LEARNING_PATH_SYSTEM_PROMPT), PLANNING_TEMPERATURE)
        .await?;

    Ok(match interpret(&raw) {
        StructuredResult::Parsed(object) => LearningPath {
            timeline: object
                .get("timeline")
                .and_then(Value::as_str)
                .unwrap_or(FALLBACK_TIMELINE)
                .to_string(),
            phases: object
                .get("phases")
                .and_then(Value::as_array)
                .map(|phases| phases.iter().filter_map(phase_from_value).collect())
                .unwrap_or_default(),
            certifications: strings(&object, "certifications"),
            projects: strings(&object, "projects"),
        },
        StructuredResult::Degraded { raw_response } => {
            tracing::warn!(career_goal = %career_goal, "Learning path could not be parsed");
            LearningPath {
                timeline: FALLBACK_TIMELINE.to_string(),
                phases: vec![LearningPhase {
                    phase: FALLBACK_PHASE.to_string(),
                    skills: vec![raw_response],
                    ..LearningPhase::default()
                }],
                certifications: Vec::new(),
                projects: Vec::new(),
            }
        }
    })
}

fn phase_from_value(value: &Value) -> Option<LearningPhase> {
    let object = value.as_object()?;
    Some(LearningPhase {
        phase: object.get("phase").and_then(Value::as_str)?.to_string(),
        duration: object
            .get("duration")
            .and_then(Value::as_str)
            .map(str::to_string),
        skills: strings(object, "skills"),
        resources: strings(object, "resources"),
        milestones: strings(object, "milestones"),
    })
}

fn strings(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
