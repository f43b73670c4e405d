use crate::auth::AdminId;
use crate::error::AppError;
use crate::i18n::LanguageRegistry;
use crate::qr;
use crate::records::{InfoRecord, RecordFields};
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

type AppResult<T> = Result<T, AppError>;

/// Unwrap a JSON body, turning axum's rejection into our 400 shape.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}

fn target_or_default(target_lang: Option<String>) -> String {
    target_lang
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| LanguageRegistry::get().canonical().code.to_string())
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ==================== Translation ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatePayload {
    text: Option<String>,
    target_lang: Option<String>,
}

/// POST /api/translate
pub async fn translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslatePayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let payload = body(payload)?;
    let text = payload
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Text is required for translation".to_string()))?;
    let target = target_or_default(payload.target_lang);

    let result = state.translator.translate(&text, &target).await;

    Ok(Json(json!({
        "success": true,
        "data": {
            "originalText": text,
            "translatedText": result.text,
            "targetLanguage": target,
            "usedFallback": result.used_fallback,
        }
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    texts: Option<Value>,
    target_lang: Option<String>,
}

/// POST /api/translate/batch
///
/// Any JSON array is accepted. Items that are not strings can't be
/// translated and come back as they were sent.
pub async fn translate_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let payload = body(payload)?;
    let items = match payload.texts {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(AppError::BadRequest(
                "Texts array is required for batch translation".to_string(),
            ))
        }
    };
    let target = target_or_default(payload.target_lang);

    let texts: Vec<String> = items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect();
    let mut translated = state
        .translator
        .translate_batch(&texts, &target)
        .await
        .into_iter();

    let translated_items: Vec<Value> = items
        .iter()
        .map(|item| match item {
            Value::String(original) => {
                Value::String(translated.next().unwrap_or_else(|| original.clone()))
            }
            other => other.clone(),
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "originalTexts": items,
            "translatedTexts": translated_items,
            "targetLanguage": target,
        }
    })))
}

/// GET /api/translate/languages
pub async fn languages() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": { "languages": LanguageRegistry::get().list() }
    }))
}

// ==================== Info records ====================

/// Ids that don't parse can't match anything the caller owns.
fn parse_id(id: &str, not_found: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound(not_found.to_string()))
}

/// POST /api/info
pub async fn create_record(
    AdminId(admin_id): AdminId,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecordFields>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let fields = body(payload)?;
    if !fields.has_essentials() {
        return Err(AppError::BadRequest(
            "Medicine name, usage, and dosage are required".to_string(),
        ));
    }
    let content = fields.into_content()?;

    let unique_id = Uuid::new_v4().to_string();
    let qr_code_url = qr::view_url(&state.config.frontend_url, &unique_id);
    let qr_code_data_url = qr::data_url(&qr_code_url)?;

    let record = InfoRecord::new(
        content,
        admin_id,
        unique_id,
        qr_code_url.clone(),
        Some(qr_code_data_url.clone()),
    );
    state.store.insert(&record).await?;

    info!("Created info record {} for admin {}", record.unique_id, admin_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Info record created successfully",
            "data": {
                "infoRecord": record,
                "qrCodeUrl": qr_code_url,
                "qrCodeDataUrl": qr_code_data_url,
            }
        })),
    ))
}

/// GET /api/info
pub async fn list_records(
    AdminId(admin_id): AdminId,
    State(state): State<Arc<AppState>>,
) -> AppResult<impl IntoResponse> {
    let records = state.store.list_by_admin(admin_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "total": records.len(),
            "infoRecords": records,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    lang: Option<String>,
}

/// GET /api/info/view/:unique_id (public)
///
/// With `?lang=xx` the free-text fields are also returned translated.
pub async fn view_record(
    State(state): State<Arc<AppState>>,
    Path(unique_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .store
        .find_active_by_unique_id(&unique_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Info record not found or inactive".to_string()))?;

    let mut data = json!({
        "infoRecord": &record,
        "qrCodeImage": &record.qr_code_image,
        "qrCodeUrl": &record.qr_code_url,
    });

    let target = target_or_default(query.lang);
    if target != LanguageRegistry::get().canonical().code {
        let (keys, texts): (Vec<&str>, Vec<String>) =
            record.translatable_fields().into_iter().unzip();
        let translated = state.translator.translate_batch(&texts, &target).await;

        let fields: serde_json::Map<String, Value> = keys
            .into_iter()
            .map(str::to_string)
            .zip(translated.into_iter().map(Value::String))
            .collect();

        data["translation"] = json!({
            "targetLanguage": target,
            "fields": fields,
        });
    }

    Ok(Json(json!({ "success": true, "data": data })))
}

/// PUT /api/info/:id
pub async fn update_record(
    AdminId(admin_id): AdminId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<RecordFields>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    const NOT_FOUND: &str = "Info record not found or you do not have permission to update it";

    let fields = body(payload)?;
    let id = parse_id(&id, NOT_FOUND)?;
    let mut record = state
        .store
        .find_for_admin(id, admin_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    let content = record.content().merged_with(fields)?;
    record.set_content(content);
    state.store.update(&record).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Info record updated successfully",
        "data": { "infoRecord": record }
    })))
}

/// DELETE /api/info/:id
pub async fn delete_record(
    AdminId(admin_id): AdminId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    const NOT_FOUND: &str = "Info record not found or you do not have permission to delete it";

    let id = parse_id(&id, NOT_FOUND)?;
    if !state.store.delete_for_admin(id, admin_id).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }

    info!("Deleted info record {} for admin {}", id, admin_id);

    Ok(Json(json!({
        "success": true,
        "message": "Info record deleted successfully"
    })))
}

/// PATCH /api/info/:id/toggle
pub async fn toggle_record(
    AdminId(admin_id): AdminId,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    const NOT_FOUND: &str = "Info record not found or you do not have permission to modify it";

    let id = parse_id(&id, NOT_FOUND)?;
    let mut record = state
        .store
        .find_for_admin(id, admin_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    record.is_active = !record.is_active;
    record.updated_at = Utc::now();
    state.store.update(&record).await?;

    let status = if record.is_active { "activated" } else { "deactivated" };

    Ok(Json(json!({
        "success": true,
        "message": format!("Info record {} successfully", status),
        "data": { "infoRecord": record }
    })))
}
