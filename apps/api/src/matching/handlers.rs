//! Axum route handlers for the Matching API.

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::matching::chat;
use crate::matching::engine::{MatchError, Recommendation, SkillsInput, Suggestions};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub skills: Option<SkillsInput>,
    /// Integer or integer string; validated by `parse_topn`.
    #[serde(default)]
    pub topn: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub results: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CareerSkillsParams {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CareerSkillsResponse {
    pub name: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Payload helpers
// ────────────────────────────────────────────────────────────────────────────

/// Lenient body parsing: a body that is not JSON (or is `null`) counts as an
/// empty payload. Valid JSON of the wrong shape is a validation error.
fn lenient_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) | Err(_) => Ok(T::default()),
        Ok(value) => serde_json::from_value(value)
            .map_err(|e| AppError::Validation(format!("Invalid request payload: {e}"))),
    }
}

/// Coerces `topn` into a positive count. Accepts JSON integers and integer
/// strings; zero, negatives, fractions and anything else are rejected.
pub fn parse_topn(raw: Option<&Value>, default: usize) -> Result<usize, MatchError> {
    let invalid = || MatchError::InvalidArgument("topn must be a positive integer".to_string());

    let n = match raw {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(invalid)?,
        Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };

    match usize::try_from(n) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/recommend
///
/// Ranks careers against the caller's skills. No vocabulary hit → empty results.
pub async fn handle_recommend(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RecommendResponse>, AppError> {
    let request: RecommendRequest = lenient_json(&body)?;
    let topn = parse_topn(request.topn.as_ref(), state.config.default_topn)?;
    let skills = request.skills.unwrap_or_default().into_vec();

    let results = state.matcher.recommend_by_skills(&skills, topn)?;
    tracing::debug!(
        "recommend: {} skills, topn {topn} → {} results",
        skills.len(),
        results.len()
    );

    Ok(Json(RecommendResponse { results }))
}

/// GET /api/suggest?q=
///
/// Typeahead over vocabulary terms and career names.
pub async fn handle_suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<Suggestions> {
    let q = params.q.unwrap_or_default();
    Json(state.matcher.suggest(q.trim()))
}

/// GET /api/careers/skills?name=
pub async fn handle_career_skills(
    State(state): State<AppState>,
    Query(params): Query<CareerSkillsParams>,
) -> Json<CareerSkillsResponse> {
    let name = params.name.unwrap_or_default();
    let skills = state.matcher.skills_for_career(&name).to_vec();
    Json(CareerSkillsResponse { name, skills })
}

/// POST /api/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request: ChatRequest = lenient_json(&body)?;
    let message = request.message.unwrap_or_default();
    let reply = chat::reply(&state.matcher, &message)?;
    Ok(Json(ChatResponse { reply }))
}
