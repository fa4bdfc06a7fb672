/// Session authentication and authorization middleware
///
/// `require_auth` resolves the session cookie and attaches an [`AuthUser`]
/// to the request extensions. `require_role` and `require_permission` run
/// after it and only read that extension.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::post, Router};
/// use taskboard_api::app::AppState;
/// use taskboard_api::middleware::auth::{require_auth, require_role};
///
/// # fn example(state: AppState) -> Router {
/// # async fn handler() {}
/// Router::new()
///     .route("/admin/thing", post(handler))
///     .route_layer(middleware::from_fn(require_role(["admin"])))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
///     .with_state(state)
/// # }
/// ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use futures::future::BoxFuture;
use std::sync::Arc;
use taskboard_shared::auth::AuthUser;

use crate::{
    app::AppState,
    cookie::session_token,
    error::{ApiError, BANNED, INSUFFICIENT_PERMISSIONS},
};

/// Rejects requests without a live session
///
/// # Errors
///
/// - `401 Unauthorized`: no cookie, unknown or expired session, missing user,
///   or the session store failed
/// - `403 Forbidden`: the user is banned and the ban has not expired
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = session_token(&jar).ok_or_else(ApiError::unauthorized)?;

    let resolved = match state.sessions.resolve(&token).await {
        Ok(Some(resolved)) => resolved,
        Ok(None) => return Err(ApiError::unauthorized()),
        Err(err) => {
            tracing::error!(error = %err, "Session lookup failed");
            return Err(ApiError::unauthorized());
        }
    };

    if resolved.user.is_banned_at(Utc::now()) {
        tracing::debug!(user_id = %resolved.user.id, "Banned user rejected");
        return Err(ApiError::Forbidden(BANNED.to_string()));
    }

    req.extensions_mut().insert(AuthUser::from(&resolved.user));
    Ok(next.run(req).await)
}

/// Middleware allowing users holding any of `roles`
///
/// Mount with `axum::middleware::from_fn` behind [`require_auth`].
pub fn require_role<I, S>(
    roles: I,
) -> impl Fn(Request, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let roles: Arc<[String]> = roles.into_iter().map(Into::into).collect();

    move |req: Request, next: Next| {
        let roles = roles.clone();
        Box::pin(async move {
            let allowed = match req.extensions().get::<AuthUser>() {
                Some(user) => {
                    let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
                    user.has_any_role(&roles)
                }
                None => return ApiError::unauthorized().into_response(),
            };

            if !allowed {
                return ApiError::Forbidden(INSUFFICIENT_PERMISSIONS.to_string()).into_response();
            }
            next.run(req).await
        })
    }
}

/// Middleware allowing users whose roles grant every action on `resource`
///
/// Mount with `axum::middleware::from_fn` behind [`require_auth`].
pub fn require_permission<I, S>(
    resource: &str,
    actions: I,
) -> impl Fn(Request, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let resource: Arc<str> = Arc::from(resource);
    let actions: Arc<[String]> = actions.into_iter().map(Into::into).collect();

    move |req: Request, next: Next| {
        let resource = resource.clone();
        let actions = actions.clone();
        Box::pin(async move {
            let allowed = match req.extensions().get::<AuthUser>() {
                Some(user) => {
                    let actions: Vec<&str> = actions.iter().map(String::as_str).collect();
                    user.has_permission(&resource, &actions)
                }
                None => return ApiError::unauthorized().into_response(),
            };

            if !allowed {
                tracing::debug!(resource = %resource, "Permission denied");
                return ApiError::Forbidden(INSUFFICIENT_PERMISSIONS.to_string()).into_response();
            }
            next.run(req).await
        })
    }
}
