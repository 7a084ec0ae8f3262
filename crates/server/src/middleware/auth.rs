use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, HeaderMap, Uri},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{now_timestamp, AuthUser};
use crate::AppState;

pub const SESSION_COOKIE: &str = "parley_session";

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Pull a session token from, in order: the `token` query parameter, an
/// `Authorization: Bearer` header, or the session cookie.
pub fn token_from_request(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_query = Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.token);

    let from_header = || {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
    };

    let from_cookie = || {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    };

    from_query
        .or_else(from_header)
        .or_else(from_cookie)
        .filter(|t| !t.is_empty())
}

/// Resolve a bearer token to a user. Unknown and expired sessions are both
/// reported as `Unauthorized`.
pub async fn authenticate(db: &SqlitePool, token: Option<&str>) -> AppResult<AuthUser> {
    let token = token.ok_or(AppError::Unauthorized)?;
    crate::db::users::find_session_user(db, token, &now_timestamp())
        .await?
        .ok_or(AppError::Unauthorized)
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_request(&parts.headers, &parts.uri);
        authenticate(&state.db, token.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_token_wins_over_header_and_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer from-header".parse().unwrap());
        headers.insert("cookie", "parley_session=from-cookie".parse().unwrap());

        let with_query: Uri = "/gateway?x=1&token=from-query".parse().unwrap();
        let bare: Uri = "/gateway".parse().unwrap();
        assert_eq!(
            token_from_request(&headers, &with_query).as_deref(),
            Some("from-query")
        );
        assert_eq!(token_from_request(&headers, &bare).as_deref(), Some("from-header"));
    }

    #[test]
    fn cookie_is_last_resort() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "theme=dark; parley_session=abc".parse().unwrap());
        let bare: Uri = "/gateway".parse().unwrap();
        let empty: Uri = "/gateway?token=".parse().unwrap();
        assert_eq!(token_from_request(&headers, &bare).as_deref(), Some("abc"));
        assert_eq!(token_from_request(&HeaderMap::new(), &empty), None);
    }
}
