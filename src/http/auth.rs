//! Admin session guard

use crate::adapters::database::SessionVerifier;
use crate::domain::{BackupError, Result};
use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;
use std::sync::Arc;

/// Requires a bearer token resolving to a session with an admin role
#[derive(Clone)]
pub struct AdminGuard {
    verifier: Arc<dyn SessionVerifier>,
    roles: Vec<String>,
}

impl AdminGuard {
    pub fn new(verifier: Arc<dyn SessionVerifier>, roles: Vec<String>) -> Self {
        Self { verifier, roles }
    }

    /// Check the request's bearer token
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Authentication`] for a missing, unknown or
    /// non-admin token, and the verifier's error if the lookup fails.
    pub async fn authorize(&self, req: &HttpRequest) -> Result<()> {
        let token = bearer_token(req)
            .ok_or_else(|| BackupError::Authentication("Missing bearer token".to_string()))?;

        let session = self
            .verifier
            .verify(token)
            .await?
            .ok_or_else(|| BackupError::Authentication("Invalid or expired session".to_string()))?;

        if !self.roles.iter().any(|role| role == &session.role) {
            return Err(BackupError::Authentication(format!(
                "Role '{}' may not run exports",
                session.role
            )));
        }

        Ok(())
    }
}

/// Token of an `Authorization: Bearer <token>` header
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionVerifier;
    use actix_web::test::TestRequest;

    fn guard() -> AdminGuard {
        let verifier = InMemorySessionVerifier::new()
            .with_session("admin-token", "admin")
            .with_session("agent-token", "agent");
        AdminGuard::new(Arc::new(verifier), vec!["admin".to_string()])
    }

    #[test]
    fn test_bearer_token() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "bearer abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        assert_eq!(bearer_token(&TestRequest::default().to_http_request()), None);
    }

    #[actix_web::test]
    async fn test_authorize() {
        let guard = guard();

        let admin = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer admin-token"))
            .to_http_request();
        assert!(guard.authorize(&admin).await.is_ok());

        let agent = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer agent-token"))
            .to_http_request();
        assert!(matches!(
            guard.authorize(&agent).await,
            Err(BackupError::Authentication(_))
        ));

        let unknown = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer nope"))
            .to_http_request();
        assert!(guard.authorize(&unknown).await.is_err());
    }
}
