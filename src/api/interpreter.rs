//! API effect interpreter using reqwest.
//!
//! This module implements the `ApiInterpreter` trait, executing effects against the
//! backend's REST endpoints.
//!
//! Key implementation details:
//! - Authenticated effects without a token fail before any request is built
//! - A missing profile (404 or `profile: null`) is a normal `Profile(None)` response
//! - Error bodies are mined for the backend's `detail` message
//! - No retries: every failure is returned to the caller as-is

use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::effects::{ApiEffect, ApiInterpreter, ApiResponse};
use crate::types::{AccessToken, CreatedTeam, Identity, Profile, TeamId, Tournament, TournamentId, UserId};

use super::client::ApiClient;
use super::error::{ApiError, ApiErrorKind, extract_detail};

// ─── Wire Types ───────────────────────────────────────────────────────────────

/// Body of `GET /users/me`.
#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    #[serde(default)]
    profile: Option<Profile>,
}

/// Body of `POST /teams/tournaments/{id}/teams`.
#[derive(Debug, Serialize)]
struct CreateTeamBody<'a> {
    name: &'a str,
}

/// Response of `POST /teams/tournaments/{id}/teams`.
#[derive(Debug, Deserialize)]
struct CreateTeamEnvelope {
    data: CreatedTeam,
}

/// Body of `POST /teams/{id}/members`.
#[derive(Debug, Serialize)]
struct AddMembersBody<'a> {
    user_ids: &'a [UserId],
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl ApiInterpreter for ApiClient {
    async fn interpret(
        &self,
        effect: ApiEffect,
        token: Option<AccessToken>,
    ) -> Result<ApiResponse, ApiError> {
        interpret_api_effect(self, effect, token).await
    }
}

/// Interprets an API effect, executing it against the backend.
///
/// # Arguments
///
/// * `client` - The client scoped to the backend
/// * `effect` - The effect to execute
/// * `token` - The current session's bearer token, if signed in
#[instrument(skip(client, effect, token), fields(effect = effect.name()))]
pub async fn interpret_api_effect(
    client: &ApiClient,
    effect: ApiEffect,
    token: Option<AccessToken>,
) -> Result<ApiResponse, ApiError> {
    let token = match token {
        Some(t) if !t.is_empty() => Some(t),
        _ => None,
    };
    if effect.requires_auth() && token.is_none() {
        return Err(ApiError::auth("not signed in"));
    }

    debug!("Issuing API request");
    let token = token.as_ref();
    match effect {
        ApiEffect::FetchProfile => fetch_profile(client, token).await,
        ApiEffect::FetchTournament { slug } => fetch_tournament(client, &slug).await,
        ApiEffect::CreateTeam {
            tournament_id,
            name,
        } => create_team(client, token, &tournament_id, &name).await,
        ApiEffect::SearchMembers { query } => search_members(client, token, &query).await,
        ApiEffect::AddTeamMembers { team_id, user_ids } => {
            add_team_members(client, token, &team_id, &user_ids).await
        }
    }
}

/// Sends a request, turning non-success statuses into classified errors.
async fn send(request: RequestBuilder, token: Option<&AccessToken>) -> Result<Response, ApiError> {
    let request = match token {
        Some(t) => request.bearer_auth(t.as_str()),
        None => request,
    };
    let response = request.send().await.map_err(ApiError::from_reqwest)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status.as_u16(), extract_detail(&body)))
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(ApiError::from_reqwest)
}

// ─── Profile & Tournament ─────────────────────────────────────────────────────

async fn fetch_profile(
    client: &ApiClient,
    token: Option<&AccessToken>,
) -> Result<ApiResponse, ApiError> {
    let url = client.endpoint(&["users", "me"])?;
    match send(client.inner().get(url), token).await {
        Ok(response) => {
            let envelope: ProfileEnvelope = decode(response).await?;
            Ok(ApiResponse::Profile(envelope.profile))
        }
        Err(e) if e.kind == ApiErrorKind::NotFound => Ok(ApiResponse::Profile(None)),
        Err(e) => Err(e),
    }
}

async fn fetch_tournament(client: &ApiClient, slug: &str) -> Result<ApiResponse, ApiError> {
    let url = client.endpoint(&["tournaments", "slug", slug])?;
    let response = send(client.inner().get(url), None)
        .await
        .map_err(|e| match e.kind {
            ApiErrorKind::NotFound => ApiError {
                message: format!("tournament {:?} not found", slug),
                ..e
            },
            _ => e,
        })?;
    let tournament: Tournament = decode(response).await?;
    Ok(ApiResponse::Tournament(tournament))
}

// ─── Teams ────────────────────────────────────────────────────────────────────

async fn create_team(
    client: &ApiClient,
    token: Option<&AccessToken>,
    tournament_id: &TournamentId,
    name: &str,
) -> Result<ApiResponse, ApiError> {
    let url = client.endpoint(&["teams", "tournaments", tournament_id.as_str(), "teams"])?;
    let request = client.inner().post(url).json(&CreateTeamBody { name });
    let envelope: CreateTeamEnvelope = decode(send(request, token).await?).await?;
    Ok(ApiResponse::TeamCreated(envelope.data))
}

async fn add_team_members(
    client: &ApiClient,
    token: Option<&AccessToken>,
    team_id: &TeamId,
    user_ids: &[UserId],
) -> Result<ApiResponse, ApiError> {
    let url = client.endpoint(&["teams", team_id.as_str(), "members"])?;
    let request = client.inner().post(url).json(&AddMembersBody { user_ids });
    // The response body echoes the inserted rows; only the status matters here.
    send(request, token).await?;
    Ok(ApiResponse::MembersAdded)
}

// ─── Search ───────────────────────────────────────────────────────────────────

async fn search_members(
    client: &ApiClient,
    token: Option<&AccessToken>,
    query: &str,
) -> Result<ApiResponse, ApiError> {
    let url = client.endpoint(&["users", "search", query])?;
    let candidates: Vec<Identity> = decode(send(client.inner().get(url), token).await?).await?;
    Ok(ApiResponse::Candidates(candidates))
}
