use axum::extract::{Extension, Multipart, Path, State};
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use super::caller_identity;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CallerContext};
use crate::state::AppState;
use crate::services::media::MediaHost;
use crate::store::models::Journal;
use crate::store::{IdentityStore, JournalStore};

/// Fields accepted by the create/update multipart forms. Update treats every
/// field as optional; create requires a non-empty title.
#[derive(Default)]
struct JournalForm {
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
    image: Option<(String, Bytes)>,
}

async fn read_form(mut multipart: Multipart) -> Result<JournalForm, ApiError> {
    let mut form = JournalForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => form.title = Some(text(field).await?),
            Some("content") => form.content = Some(text(field).await?),
            Some("category") => form.category = Some(text(field).await?),
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid image field: {}", e)))?;
                if !data.is_empty() {
                    form.image = Some((filename, data));
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid form field: {}", e)))
}

/// Upload an attached image to the media host, if one was provided. Failure
/// aborts the request before any journal mutation happens.
async fn upload_image(state: &AppState, form: &JournalForm) -> Result<Option<String>, ApiError> {
    match &form.image {
        Some((filename, bytes)) => {
            let uploaded = state.media.upload(filename, bytes.clone()).await?;
            Ok(Some(uploaded.url))
        }
        None => Ok(None),
    }
}

/// GET /api/v1/journal - the caller's own entries, resolved from the
/// ownership set fetched fresh from the identity store.
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Vec<Journal>> {
    let identity = caller_identity(&state, &caller).await?;
    let journals = state.journals.find_by_ids(&identity.journal_ids).await?;

    tracing::info!("fetched {} journal entries for '{}'", journals.len(), caller.username);
    Ok(ApiResponse::success(journals))
}

/// GET /api/v1/journal/all - every entry in the system.
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Vec<Journal>> {
    let journals = state.journals.find_all().await?;
    Ok(ApiResponse::success(journals))
}

/// GET /api/v1/journal/id/:id
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Journal> {
    let journal = state
        .journals
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Journal entry not found"))?;

    Ok(ApiResponse::success(journal))
}

/// POST /api/v1/journal - create an entry from a multipart form (`title`,
/// `content`, `category`, optional `image` file) and add it to the caller's
/// ownership set.
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    multipart: Multipart,
) -> ApiResult<Journal> {
    let form = read_form(multipart).await?;

    let title = form.title.as_deref().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title field can't be empty"));
    }

    // Upload before touching the store: a media failure must leave no
    // half-created entry behind.
    let image_url = upload_image(&state, &form).await?;

    let mut identity = caller_identity(&state, &caller).await?;

    let journal = Journal::new(
        title,
        form.content.unwrap_or_default(),
        form.category.filter(|c| !c.trim().is_empty()),
        image_url,
    );

    state.journals.save(&journal).await?;

    identity.journal_ids.push(journal.id);
    identity.updated_at = Utc::now();
    state.identities.save(&identity).await?;

    tracing::info!("journal entry {} created for '{}'", journal.id, caller.username);
    Ok(ApiResponse::created(journal))
}

/// PUT /api/v1/journal/id/:id - partial update; only provided fields change.
/// Existence is checked before ownership so "absent" and "not yours" stay
/// distinct (404 vs 403).
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Journal> {
    let form = read_form(multipart).await?;

    let mut journal = state
        .journals
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Journal entry not found"))?;

    let identity = caller_identity(&state, &caller).await?;
    if !identity.owns(journal.id) {
        tracing::warn!("'{}' attempted to update journal {} they do not own", caller.username, id);
        return Err(ApiError::forbidden("You are not allowed to modify this journal entry"));
    }

    let image_url = upload_image(&state, &form).await?;

    if let Some(title) = form.title.filter(|t| !t.trim().is_empty()) {
        journal.title = title.trim().to_string();
    }
    if let Some(content) = form.content {
        journal.content = content;
    }
    if let Some(category) = form.category.filter(|c| !c.trim().is_empty()) {
        journal.category = Some(category);
    }
    if let Some(url) = image_url {
        journal.image_url = Some(url);
    }
    journal.updated_at = Utc::now();

    state.journals.save(&journal).await?;

    tracing::info!("journal entry {} updated by '{}'", journal.id, caller.username);
    Ok(ApiResponse::success(journal))
}

/// DELETE /api/v1/journal/id/:id - same 404-then-403 ordering as update;
/// removes the entry from the caller's ownership set before deleting it.
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let journal = state
        .journals
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Journal entry not found"))?;

    let mut identity = caller_identity(&state, &caller).await?;
    if !identity.owns(journal.id) {
        tracing::warn!("'{}' attempted to delete journal {} they do not own", caller.username, id);
        return Err(ApiError::forbidden("You are not allowed to delete this journal entry"));
    }

    identity.journal_ids.retain(|owned| *owned != journal.id);
    identity.updated_at = Utc::now();
    state.identities.save(&identity).await?;

    state.journals.delete(journal.id).await?;

    tracing::info!("journal entry {} deleted by '{}'", journal.id, caller.username);
    Ok(ApiResponse::success(serde_json::json!({
        "deleted": journal.id
    })))
}
