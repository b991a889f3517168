//! Matching tool endpoints
//!
//! Mutations answer `{message, panel}` where `panel` is the re-rendered tool
//! panel. Rejected actions answer 400 with the tool's message.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use hw_common::curation::{issue_body, MailDraft, Outcome};
use hw_common::Prayer;

use super::ApiError;
use crate::records;
use crate::views::tool_panel::{self, ToolPanel};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VersionBody {
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct PhelpsBody {
    pub version: String,
    pub phelps: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageBody {
    pub version: String,
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct NameBody {
    pub version: String,
    /// `None` when the prompt was cancelled; empty proposes clearing the name
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub version: String,
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct ClearBody {
    #[serde(default)]
    pub confirmed: bool,
}

/// Mutation response
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub panel: ToolPanel,
}

async fn respond(state: &AppState, outcome: Outcome) -> Json<ActionResponse> {
    Json(ActionResponse {
        message: outcome.message(),
        panel: tool_panel::render(state).await,
    })
}

async fn load(state: &AppState, version: &str) -> Result<Prayer, ApiError> {
    records::load_prayer(state.gateway.as_ref(), &state.prayers, version)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Prayer with ID {version} not found.")))
}

/// GET /api/curation
pub async fn get_panel(State(state): State<AppState>) -> Json<ToolPanel> {
    Json(tool_panel::render(&state).await)
}

/// POST /api/curation/pin
pub async fn pin(
    State(state): State<AppState>,
    Json(body): Json<VersionBody>,
) -> Result<Json<ActionResponse>, ApiError> {
    let prayer = load(&state, &body.version).await?;
    let outcome = state.curation.lock().await.pin(&prayer)?;
    Ok(respond(&state, outcome).await)
}

/// POST /api/curation/unpin
pub async fn unpin(State(state): State<AppState>) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = state.curation.lock().await.unpin()?;
    Ok(respond(&state, outcome).await)
}

/// POST /api/curation/equivalence
pub async fn propose_equivalence(
    State(state): State<AppState>,
    Json(body): Json<VersionBody>,
) -> Result<Json<ActionResponse>, ApiError> {
    let prayer = load(&state, &body.version).await?;
    let outcome = state.curation.lock().await.propose_equivalence(&prayer)?;
    Ok(respond(&state, outcome).await)
}

/// POST /api/curation/phelps
pub async fn propose_phelps(
    State(state): State<AppState>,
    Json(body): Json<PhelpsBody>,
) -> Result<Json<ActionResponse>, ApiError> {
    let prayer = load(&state, &body.version).await?;
    let outcome = state.curation.lock().await.propose_phelps(&prayer, &body.phelps)?;
    Ok(respond(&state, outcome).await)
}

/// POST /api/curation/language
pub async fn propose_language(
    State(state): State<AppState>,
    Json(body): Json<LanguageBody>,
) -> Result<Json<ActionResponse>, ApiError> {
    let prayer = load(&state, &body.version).await?;
    let outcome = state.curation.lock().await.propose_language(&prayer, &body.language)?;
    Ok(respond(&state, outcome).await)
}

/// POST /api/curation/name
///
/// A cancelled prompt (`name` absent) changes nothing.
pub async fn propose_name(
    State(state): State<AppState>,
    Json(body): Json<NameBody>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Some(name) = body.name else {
        return Ok(Json(ActionResponse {
            message: None,
            panel: tool_panel::render(&state).await,
        }));
    };
    let prayer = load(&state, &body.version).await?;
    let outcome = state.curation.lock().await.propose_name(&prayer, &name)?;
    Ok(respond(&state, outcome).await)
}

/// POST /api/curation/note
pub async fn propose_note(
    State(state): State<AppState>,
    Json(body): Json<NoteBody>,
) -> Result<Json<ActionResponse>, ApiError> {
    let prayer = load(&state, &body.version).await?;
    let outcome = state.curation.lock().await.propose_note(&prayer, &body.note)?;
    Ok(respond(&state, outcome).await)
}

/// DELETE /api/curation/items/:index
pub async fn remove_proposal(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = {
        let mut tool = state.curation.lock().await;
        if index >= tool.proposals().len() {
            warn!(index, "Remove requested for missing proposal");
            return Err(ApiError::NotFound(format!("No collected item at position {index}.")));
        }
        tool.remove_proposal(index)?
    };
    Ok(respond(&state, outcome).await)
}

/// POST /api/curation/clear
pub async fn clear_all(
    State(state): State<AppState>,
    Json(body): Json<ClearBody>,
) -> Result<Json<ActionResponse>, ApiError> {
    let outcome = state.curation.lock().await.clear_all(body.confirmed)?;
    Ok(respond(&state, outcome).await)
}

#[derive(Debug, Deserialize)]
pub struct MailQuery {
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Serialize)]
pub struct MailResponse {
    #[serde(flatten)]
    pub draft: MailDraft,
    pub mailto: String,
}

/// GET /api/curation/mail?base_url=...
pub async fn mail_draft(
    State(state): State<AppState>,
    Query(query): Query<MailQuery>,
) -> Result<Json<MailResponse>, ApiError> {
    let draft = state.handoff.mail_draft(&*state.curation.lock().await, &query.base_url)?;
    let mailto = draft.mailto_url();
    Ok(Json(MailResponse { draft, mailto }))
}

#[derive(Debug, Deserialize)]
pub struct IssueQuery {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub fragment: String,
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub body: String,
    pub new_issue_url: String,
}

/// GET /api/curation/issue?origin=...&fragment=...
pub async fn issue(
    State(state): State<AppState>,
    Query(query): Query<IssueQuery>,
) -> Result<Json<IssueResponse>, ApiError> {
    let body = issue_body(&*state.curation.lock().await, &query.origin, &query.fragment)?;
    Ok(Json(IssueResponse {
        body,
        new_issue_url: state.handoff.new_issue_url.clone(),
    }))
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

/// GET /api/curation/query-url
pub async fn query_url(State(state): State<AppState>) -> Result<Json<UrlResponse>, ApiError> {
    let url = state.handoff.query_url(&*state.curation.lock().await)?;
    Ok(Json(UrlResponse { url }))
}

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub channel: String,
    #[serde(default)]
    pub base_url: String,
}

/// GET /api/curation/chat?channel=whatsapp|telegram
///
/// The message is the mail body.
pub async fn chat_link(
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<UrlResponse>, ApiError> {
    let draft = state.handoff.mail_draft(&*state.curation.lock().await, &query.base_url)?;
    let url = match query.channel.as_str() {
        "whatsapp" => state.handoff.whatsapp_url(&draft.body)?,
        "telegram" => state.handoff.telegram_url(&draft.body)?,
        other => return Err(ApiError::BadRequest(format!("Unknown chat channel: {other}"))),
    };
    Ok(Json(UrlResponse { url }))
}
