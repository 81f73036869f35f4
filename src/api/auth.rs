//! 요청에서 세션 추출
//!
//! `Authorization: Bearer <token>` 헤더를 우선하고, 헤더를 붙일 수 없는 WebSocket 을 위해
//! `?token=` 쿼리도 받습니다.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use url::form_urlencoded;

use crate::api::error::ApiError;
use crate::domain::Session;
use crate::server::ServerState;

/// 인증된 세션
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<ServerState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::MissingToken)?;
        let session = state.backend.session(&token).await?;
        Ok(AuthSession(session))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    from_header.filter(|t| !t.is_empty()).or_else(|| {
        let query = parts.uri.query()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .filter(|t| !t.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_header_token() {
        let request = Request::builder()
            .uri("/api/v1/dashboard")
            .header(AUTHORIZATION, "Bearer abc-123")
            .body(())
            .unwrap();
        assert_eq!(bearer_token(&parts(request)).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_query_token_fallback() {
        let request = Request::builder().uri("/ws?token=xyz").body(()).unwrap();
        assert_eq!(bearer_token(&parts(request)).as_deref(), Some("xyz"));

        let request = Request::builder().uri("/ws").body(()).unwrap();
        assert_eq!(bearer_token(&parts(request)), None);
    }
}
