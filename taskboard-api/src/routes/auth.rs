/// Authentication endpoints
///
/// E-mail/password accounts with cookie sessions, plus user moderation for
/// admins.
///
/// # Endpoints
///
/// - `POST /api/auth/sign-up/email` - Create an account and sign in
/// - `POST /api/auth/sign-in/email` - Sign in
/// - `POST /api/auth/sign-out` - Delete the current session
/// - `GET /api/auth/get-session` - Current session or `null`
/// - `GET /api/me` - Current session or 401
/// - `POST /api/auth/admin/set-role` - Replace a user's roles (`user:set-role`)
/// - `POST /api/auth/admin/ban-user` - Ban a user (`user:ban`)
/// - `POST /api/auth/admin/unban-user` - Lift a ban (`user:ban`)

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::auth::session::{ClientInfo, IssuedSession, ResolvedSession, SignUp};
use taskboard_shared::models::user::User;
use validator::Validate;

use crate::{
    app::AppState,
    cookie::{clear_session_cookie, session_cookie, session_token},
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
};

/// Sign-up request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    /// Avatar URL
    pub image: Option<String>,
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-out response
#[derive(Debug, Serialize, Deserialize)]
pub struct SignOutResponse {
    pub success: bool,
}

/// Set-role request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,

    /// One role or a list; an empty list resets to `user`
    pub role: RoleList,
}

/// `"admin"` or `["admin", "user"]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RoleList {
    One(String),
    Many(Vec<String>),
}

impl RoleList {
    fn into_vec(self) -> Vec<String> {
        match self {
            RoleList::One(role) => vec![role],
            RoleList::Many(roles) => roles,
        }
    }
}

/// Ban request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BanUserRequest {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,

    pub ban_reason: Option<String>,

    /// Seconds until the ban lifts, at most 100 years; omitted means permanent
    #[validate(range(
        min = 1,
        max = 3153600000i64,
        message = "Ban duration must be between 1 second and 100 years"
    ))]
    pub ban_expires_in: Option<i64>,
}

/// Unban request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UnbanUserRequest {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,
}

/// Moderation response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Create an account and sign it in
///
/// # Response
///
/// `201 Created` with `{session, user}` and the session cookie.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: E-mail already registered
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> ApiResult<Response> {
    let issued = state
        .sessions
        .sign_up(
            SignUp {
                email: req.email,
                password: req.password,
                name: req.name,
                image: req.image,
            },
            client_info(&headers),
        )
        .await?;

    Ok(with_session(&state, jar, StatusCode::CREATED, issued))
}

/// Sign in with e-mail and password
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: "Invalid email or password"
/// - `403 Forbidden`: The user is banned
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<SignInRequest>,
) -> ApiResult<Response> {
    let issued = state
        .sessions
        .sign_in(&req.email, &req.password, client_info(&headers))
        .await?;

    Ok(with_session(&state, jar, StatusCode::OK, issued))
}

/// Delete the current session and clear the cookie
///
/// Succeeds without a cookie too.
pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    if let Some(token) = session_token(&jar) {
        state.sessions.sign_out(&token).await?;
    }

    let jar = jar.add(clear_session_cookie(state.config.api.production));
    Ok((jar, Json(SignOutResponse { success: true })).into_response())
}

/// Current session, or `null` when signed out or banned
pub async fn get_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<Json<Option<ResolvedSession>>> {
    let resolved = current_session(&state, &jar)
        .await?
        .filter(|resolved| !resolved.user.is_banned_at(Utc::now()));
    Ok(Json(resolved))
}

/// Current session
///
/// # Errors
///
/// - `401 Unauthorized`: No live session
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<Json<ResolvedSession>> {
    current_session(&state, &jar)
        .await?
        .map(Json)
        .ok_or_else(ApiError::unauthorized)
}

/// Replace a user's roles
///
/// # Errors
///
/// - `403 Forbidden`: The caller lacks `user:set-role`
/// - `404 Not Found`: Unknown user
pub async fn set_role(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SetRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .admin
        .set_role(&req.user_id, &req.role.into_vec())
        .await?;
    Ok(Json(UserResponse { user }))
}

/// Ban a user
///
/// # Errors
///
/// - `403 Forbidden`: The caller lacks `user:ban`
/// - `404 Not Found`: Unknown user
pub async fn ban_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BanUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .admin
        .ban(
            &req.user_id,
            req.ban_reason,
            req.ban_expires_in.map(Duration::seconds),
        )
        .await?;
    Ok(Json(UserResponse { user }))
}

/// Lift a ban
///
/// # Errors
///
/// - `403 Forbidden`: The caller lacks `user:ban`
/// - `404 Not Found`: Unknown user
pub async fn unban_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UnbanUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.admin.unban(&req.user_id).await?;
    Ok(Json(UserResponse { user }))
}

async fn current_session(
    state: &AppState,
    jar: &CookieJar,
) -> ApiResult<Option<ResolvedSession>> {
    match session_token(jar) {
        Some(token) => Ok(state.sessions.resolve(&token).await?),
        None => Ok(None),
    }
}

fn with_session(
    state: &AppState,
    jar: CookieJar,
    status: StatusCode,
    issued: IssuedSession,
) -> Response {
    let jar = jar.add(session_cookie(
        issued.token.clone(),
        state.sessions.ttl(),
        state.config.api.production,
    ));

    (status, jar, Json(ResolvedSession::from(issued))).into_response()
}

/// Client details from the `User-Agent` and `X-Forwarded-For` headers
fn client_info(headers: &HeaderMap) -> ClientInfo {
    ClientInfo {
        ip_address: header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string()),
        user_agent: header_str(headers, header::USER_AGENT.as_str()).map(str::to_string),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
