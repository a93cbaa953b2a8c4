//! HTTP Handlers

use std::sync::Arc;

use auth::{AuditSink, Principal};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::ContentItemId;

use crate::application::{BrowseContentUseCase, ManageContentUseCase};
use crate::domain::repository::ContentRepository;
use crate::domain::value_object::ContentKind;
use crate::error::{ContentError, ContentResult};
use crate::presentation::dto::{
    BrowseQuery, ContentListResponse, ContentRequest, ContentResponse,
};

/// Shared state for content handlers
pub struct ContentAppState<C>
where
    C: ContentRepository + Send + Sync + 'static,
{
    pub repo: Arc<C>,
    pub audit: Arc<dyn AuditSink>,
}

impl<C> Clone for ContentAppState<C>
where
    C: ContentRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            audit: self.audit.clone(),
        }
    }
}

impl<C> ContentAppState<C>
where
    C: ContentRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<C>, audit: Arc<dyn AuditSink>) -> Self {
        Self { repo, audit }
    }

    fn manage(&self) -> ManageContentUseCase<C> {
        ManageContentUseCase::new(self.repo.clone(), self.audit.clone())
    }
}

// ============================================================================
// Public
// ============================================================================

/// GET /{kind}
pub async fn list_published<C>(
    State(state): State<ContentAppState<C>>,
    Path(kind): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> ContentResult<Json<ContentListResponse>>
where
    C: ContentRepository + Send + Sync + 'static,
{
    let kind = parse_kind(&kind)?;
    let course_id = match query.course.as_deref() {
        Some(raw) => Some(parse_item_id(raw)?),
        None => None,
    };

    let items = BrowseContentUseCase::new(state.repo.clone())
        .list(kind, course_id)
        .await?;

    Ok(Json(items.into()))
}

/// GET /{kind}/{key}, key is an id or a slug
pub async fn get_published<C>(
    State(state): State<ContentAppState<C>>,
    Path((kind, key)): Path<(String, String)>,
) -> ContentResult<Json<ContentResponse>>
where
    C: ContentRepository + Send + Sync + 'static,
{
    let kind = parse_kind(&kind)?;
    let item = BrowseContentUseCase::new(state.repo.clone())
        .get(kind, &key)
        .await?;

    Ok(Json(item.into()))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /{kind}, drafts included
pub async fn list_all<C>(
    State(state): State<ContentAppState<C>>,
    Path(kind): Path<String>,
) -> ContentResult<Json<ContentListResponse>>
where
    C: ContentRepository + Send + Sync + 'static,
{
    let kind = parse_kind(&kind)?;
    let items = state.manage().list(kind).await?;

    Ok(Json(items.into()))
}

/// POST /{kind}
pub async fn create<C>(
    State(state): State<ContentAppState<C>>,
    principal: Principal,
    Path(kind): Path<String>,
    body: Result<Json<ContentRequest>, JsonRejection>,
) -> ContentResult<impl IntoResponse>
where
    C: ContentRepository + Send + Sync + 'static,
{
    let kind = parse_kind(&kind)?;
    let request = json_body(body)?;

    let item = state
        .manage()
        .create(principal.identity_id, kind, request.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ContentResponse::from(item))))
}

/// PUT /{kind}/{id}
pub async fn update<C>(
    State(state): State<ContentAppState<C>>,
    principal: Principal,
    Path((kind, id)): Path<(String, String)>,
    body: Result<Json<ContentRequest>, JsonRejection>,
) -> ContentResult<Json<ContentResponse>>
where
    C: ContentRepository + Send + Sync + 'static,
{
    let kind = parse_kind(&kind)?;
    let id = parse_item_id(&id)?;
    let request = json_body(body)?;

    let item = state
        .manage()
        .update(principal.identity_id, kind, &id, request.into())
        .await?;

    Ok(Json(item.into()))
}

/// DELETE /{kind}/{id}
pub async fn delete<C>(
    State(state): State<ContentAppState<C>>,
    principal: Principal,
    Path((kind, id)): Path<(String, String)>,
) -> ContentResult<StatusCode>
where
    C: ContentRepository + Send + Sync + 'static,
{
    let kind = parse_kind(&kind)?;
    let id = parse_item_id(&id)?;

    state
        .manage()
        .delete(principal.identity_id, kind, &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_kind(raw: &str) -> ContentResult<ContentKind> {
    ContentKind::from_path(raw).ok_or(ContentError::NotFound)
}

fn parse_item_id(raw: &str) -> ContentResult<ContentItemId> {
    raw.parse()
        .map_err(|_| ContentError::InvalidInput("Invalid content id".to_string()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ContentResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ContentError::InvalidInput(rejection.body_text()))
}
