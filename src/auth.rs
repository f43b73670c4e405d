//! Caller identity for admin routes.
//!
//! Account management lives elsewhere; this service only needs to know which
//! admin is asking. The admin id travels in `X-Admin-Id`, and when an API key
//! is configured the request must also carry it in `X-API-Key`.

use crate::error::AppError;
use crate::server::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

pub const ADMIN_ID_HEADER: &str = "x-admin-id";
pub const API_KEY_HEADER: &str = "x-api-key";

/// The authenticated admin making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminId(pub Uuid);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(expected) = &state.config.api_key {
            let provided = header_str(parts, API_KEY_HEADER).unwrap_or_default();
            if !constant_time_compare(provided, expected) {
                return Err(AppError::Unauthorized(
                    "Invalid or missing API key".to_string(),
                ));
            }
        }

        let admin_id = header_str(parts, ADMIN_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no admin id".to_string()))?;

        Uuid::parse_str(admin_id.trim())
            .map(AdminId)
            .map_err(|_| AppError::Unauthorized("Not authorized, invalid admin id".to_string()))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Constant-time string comparison to prevent timing attacks on the API key
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::MemoryStore;
    use axum::http::Request;
    use std::time::Duration;

    fn state(api_key: Option<&str>) -> Arc<AppState> {
        let config = Config {
            port: 0,
            frontend_url: "http://localhost:3000".to_string(),
            database_url: None,
            api_key: api_key.map(str::to_string),
            libretranslate_url: "http://127.0.0.1:1/translate".to_string(),
            mymemory_url: "http://127.0.0.1:1/get".to_string(),
            translation_timeout: Duration::from_millis(200),
            translation_pacing: Duration::ZERO,
            translation_user_agent: "test".to_string(),
        };
        AppState::new(config, Arc::new(MemoryStore::new())).expect("state")
    }

    async fn extract(
        state: &Arc<AppState>,
        headers: &[(&str, &str)],
    ) -> Result<AdminId, AppError> {
        let mut builder = Request::builder().uri("/api/info");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AdminId::from_request_parts(&mut parts, state).await
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[tokio::test]
    async fn test_admin_id_extracted_without_api_key_configured() {
        let id = Uuid::new_v4();
        let header = id.to_string();
        let admin = extract(&state(None), &[("X-Admin-Id", header.as_str())])
            .await
            .expect("authorized");
        assert_eq!(admin, AdminId(id));
    }

    #[tokio::test]
    async fn test_missing_admin_id_rejected() {
        let err = extract(&state(None), &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_malformed_admin_id_rejected() {
        let err = extract(&state(None), &[("X-Admin-Id", "admin-1")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid admin id"));
    }

    #[tokio::test]
    async fn test_api_key_required_when_configured() {
        let state = state(Some("s3cret"));
        let id = Uuid::new_v4().to_string();
        let id = id.as_str();

        let err = extract(&state, &[("X-Admin-Id", id)]).await.unwrap_err();
        assert!(err.to_string().contains("API key"));

        let err = extract(&state, &[("X-Admin-Id", id), ("X-API-Key", "wrong!")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let ok = extract(&state, &[("X-Admin-Id", id), ("X-API-Key", "s3cret")]).await;
        assert!(ok.is_ok());
    }
}
