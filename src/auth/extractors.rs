use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::jwt::TokenService;
use crate::error::AppError;

/// The caller's identity (their lowercase email), resolved from the bearer token.
///
/// Every protected handler takes this extractor; a request that fails here
/// never reaches handler code. No database access happens during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Authorization(None))?;

        let token = bearer_token(header).ok_or(AppError::Authorization(None))?;

        match tokens.verify(token) {
            Ok(subject) => Ok(AuthUser(subject)),
            Err(reason) => {
                warn!(%reason, "bearer token rejected");
                Err(AppError::from(reason))
            }
        }
    }
}

/// `Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use jsonwebtoken::Algorithm;
    use time::{Duration, OffsetDateTime};

    use crate::{auth::jwt::TokenError, config::JwtConfig};

    #[derive(Clone)]
    struct TestState {
        tokens: Arc<TokenService>,
    }

    impl FromRef<TestState> for Arc<TokenService> {
        fn from_ref(s: &TestState) -> Self {
            s.tokens.clone()
        }
    }

    fn state() -> TestState {
        TestState {
            tokens: Arc::new(TokenService::new(&JwtConfig {
                secret: "extractor-secret".into(),
                algorithm: Algorithm::HS256,
                ttl_minutes: 10,
            })),
        }
    }

    async fn resolve(state: &TestState, header: Option<&str>) -> Result<AuthUser, AppError> {
        let mut req = Request::builder().uri("/courses");
        if let Some(h) = header {
            req = req.header(AUTHORIZATION, h);
        }
        let (mut parts, _) = req.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state).await
    }

    #[test]
    fn parses_bearer_scheme() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[tokio::test]
    async fn resolves_valid_token() {
        let st = state();
        let token = st.tokens.issue("ada@example.com").unwrap();
        let user = resolve(&st, Some(format!("Bearer {token}").as_str())).await.unwrap();
        assert_eq!(user, AuthUser("ada@example.com".into()));
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let err = resolve(&state(), None).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(None)));
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn each_rejection_reason_is_kept_internally() {
        let st = state();

        let err = resolve(&st, Some("Bearer nonsense")).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(Some(TokenError::Malformed))));

        let past = OffsetDateTime::now_utc() - Duration::hours(1);
        let stale = st
            .tokens
            .issue_at("ada@example.com", Duration::minutes(1), past)
            .unwrap();
        let err = resolve(&st, Some(format!("Bearer {stale}").as_str())).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(Some(TokenError::Expired))));

        let foreign = TokenService::new(&JwtConfig {
            secret: "someone-else".into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 10,
        })
        .issue("ada@example.com")
        .unwrap();
        let err = resolve(&st, Some(format!("Bearer {foreign}").as_str())).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(Some(TokenError::BadSignature))));
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
