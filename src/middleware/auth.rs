use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::state::AppState;
use crate::store::IdentityStore;

/// Ephemeral per-request record of the authenticated caller. Installed as a
/// request extension by [`authenticate`]; lives for one request only.
#[derive(Clone, Debug)]
pub struct CallerContext {
    pub username: String,
    pub roles: Vec<String>,
}

impl CallerContext {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == crate::store::models::ROLE_ADMIN)
    }
}

/// Request authenticator, run once per inbound request before any handler.
///
/// Fails OPEN to anonymous: a missing header, malformed token, unknown user,
/// store fault or failed validation all let the request proceed without a
/// caller context. Rejection is the route guards' job, which keeps
/// authentication and authorization independently testable.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    // Idempotent: never overwrite a context installed earlier in the chain.
    if request.extensions().get::<CallerContext>().is_some() {
        return next.run(request).await;
    }

    if let Some(context) = resolve_caller(&state, &headers).await {
        tracing::debug!("authenticated request for '{}'", context.username);
        request.extensions_mut().insert(context);
    }

    next.run(request).await
}

async fn resolve_caller(state: &AppState, headers: &HeaderMap) -> Option<CallerContext> {
    let token = bearer_token(headers)?;

    let claims = match state.codec.decode(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("rejected bearer token: {}", e);
            return None;
        }
    };

    let identity = match state.identities.find_by_username(&claims.sub).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            tracing::warn!("token subject '{}' has no identity", claims.sub);
            return None;
        }
        Err(e) => {
            tracing::error!("identity lookup failed for '{}': {}", claims.sub, e);
            return None;
        }
    };

    if !auth::validate(&claims, &identity) {
        tracing::warn!("token validation failed for '{}'", claims.sub);
        return None;
    }

    Some(CallerContext {
        username: identity.username,
        roles: identity.roles,
    })
}

/// Extract the token from an `Authorization: Bearer <token>` header. Anything
/// else (absent, non-bearer, empty) is treated as "no credential presented".
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_requires_prefix() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }
}
