use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use bookapi_authz::{verify_password, AuthzError, BasicCredentials, Principal};
use bookapi_http::AppError;
use bookapi_kernel::AppContext;

use super::accounts::find_by_email;

/// The caller identified by `Authorization: Basic base64(email:password)`.
///
/// Rejects with 401 when the header is missing, malformed, names an unknown
/// user or carries the wrong password.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthzError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthzError::MalformedCredentials)?;
        let credentials = BasicCredentials::parse(header)?;

        let Some(user) = find_by_email(&ctx.db, &credentials.username).await? else {
            tracing::debug!(email = %credentials.username, "login for unknown user");
            return Err(AuthzError::InvalidCredentials.into());
        };

        // argon2 verification blocks; run it off the async workers
        let hash = user.password.clone();
        let password = credentials.password;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(anyhow::Error::from)??;
        if !matches {
            tracing::debug!(user_id = user.id, "wrong password");
            return Err(AuthzError::InvalidCredentials.into());
        }

        Ok(Self(Principal::new(user.id, user.email.clone(), user.roles())))
    }
}
