/// Integration tests for sessions, bans and the role/permission gates

mod common;

use axum::http::{Method, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use chrono::{Duration, Utc};
use common::{test_config, TestContext, PASSWORD};
use serde_json::json;
use taskboard_api::middleware::auth::{require_auth, require_permission, require_role};
use tower::ServiceExt;

fn session_cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[tokio::test]
async fn test_sign_up_sign_out_sign_in_flow() {
    let ctx = TestContext::new();

    let res = ctx
        .post(
            "/api/auth/sign-up/email",
            None,
            json!({ "email": "ada@example.com", "password": PASSWORD, "name": "Ada" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["user"]["email"], "ada@example.com");
    assert!(res.body["user"].get("passwordHash").is_none());
    assert!(res.body["session"].get("tokenHash").is_none());

    let set_cookie = res.set_cookie().unwrap().to_string();
    assert!(set_cookie.starts_with("taskboard.session_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=3600"));
    assert!(!set_cookie.contains("Secure"));
    let cookie = session_cookie_pair(&set_cookie);

    let res = ctx.post("/api/projects", Some(&cookie), json!({ "name": "Mine" })).await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = ctx
        .request(Method::GET, "/api/auth/get-session", Some(&cookie), None)
        .await;
    assert_eq!(res.body["user"]["name"], "Ada");

    let res = ctx.post("/api/auth/sign-out", Some(&cookie), json!({})).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "success": true }));
    assert!(res.set_cookie().unwrap().contains("Max-Age=0"));

    let res = ctx.post("/api/projects", Some(&cookie), json!({ "name": "Stale" })).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = ctx
        .post(
            "/api/auth/sign-in/email",
            None,
            json!({ "email": "ADA@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = session_cookie_pair(res.set_cookie().unwrap());

    let res = ctx.post("/api/projects", Some(&cookie), json!({ "name": "Again" })).await;
    assert_eq!(res.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_secure_cookie_in_production() {
    let mut config = test_config();
    config.api.production = true;
    let ctx = TestContext::with_config(config);

    let res = ctx
        .post(
            "/api/auth/sign-up/email",
            None,
            json!({ "email": "prod@example.com", "password": PASSWORD, "name": "Prod" }),
        )
        .await;
    assert!(res.set_cookie().unwrap().contains("; Secure"));
}

#[tokio::test]
async fn test_wrong_credentials() {
    let ctx = TestContext::new();
    let user = ctx.user().await;

    let res = ctx
        .post(
            "/api/auth/sign-in/email",
            None,
            json!({ "email": user.user.email, "password": "not the password" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.body,
        json!({ "message": "Unauthorized", "error": "Invalid email or password" })
    );
    assert!(res.set_cookie().is_none());
}

#[tokio::test]
async fn test_duplicate_sign_up_is_conflict() {
    let ctx = TestContext::new();
    let user = ctx.user().await;

    let res = ctx
        .post(
            "/api/auth/sign-up/email",
            None,
            json!({ "email": user.user.email.to_uppercase(), "password": PASSWORD, "name": "Dup" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], "User already exists");
}

#[tokio::test]
async fn test_sign_up_validation() {
    let ctx = TestContext::new();

    let res = ctx
        .post(
            "/api/auth/sign-up/email",
            None,
            json!({ "email": "nope", "password": "short", "name": "Ada" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body["details"],
        json!([
            { "path": "body.email", "message": "Invalid email format" },
            { "path": "body.password", "message": "Password must be between 8 and 128 characters" }
        ])
    );
}

#[tokio::test]
async fn test_me() {
    let ctx = TestContext::new();
    let user = ctx.user().await;

    let res = ctx.request(Method::GET, "/api/me", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = ctx
        .request(Method::GET, "/api/me", Some(&user.cookie()), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["id"], user.user.id.as_str());
    assert_eq!(res.body["session"]["userId"], user.user.id.as_str());
}

#[tokio::test]
async fn test_get_session_without_cookie_is_null() {
    let ctx = TestContext::new();

    let res = ctx.get("/api/auth/get-session").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!(null));
}

#[tokio::test]
async fn test_expired_session_is_unauthorized() {
    let ctx = TestContext::new();
    let user = ctx.user().await;
    let cookie = ctx.expired_session(&user.user).await;

    let res = ctx.post("/api/projects", Some(&cookie), json!({ "name": "Late" })).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = ctx.get("/api/projects").await;
    assert_eq!(res.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_banned_user_is_forbidden() {
    let ctx = TestContext::new();
    let banned = ctx.banned_user(None).await;

    let res = ctx
        .post("/api/projects", Some(&banned.cookie()), json!({ "name": "Spam" }))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(
        res.body,
        json!({ "message": "Forbidden", "error": "You have been banned from this application" })
    );

    let res = ctx
        .request(Method::GET, "/api/auth/get-session", Some(&banned.cookie()), None)
        .await;
    assert_eq!(res.body, json!(null));

    let res = ctx
        .post(
            "/api/auth/sign-in/email",
            None,
            json!({ "email": banned.user.email, "password": PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ban_until_future_is_forbidden() {
    let ctx = TestContext::new();
    let banned = ctx.banned_user(Some(Utc::now() + Duration::hours(1))).await;

    let res = ctx
        .post("/api/projects", Some(&banned.cookie()), json!({ "name": "Spam" }))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_ban_is_allowed() {
    let ctx = TestContext::new();
    let user = ctx.banned_user(Some(Utc::now() - Duration::minutes(1))).await;

    let res = ctx
        .post("/api/projects", Some(&user.cookie()), json!({ "name": "Back" }))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_bans_and_unbans() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    let target = ctx.user().await;

    let res = ctx
        .post(
            "/api/auth/admin/ban-user",
            Some(&admin.cookie()),
            json!({ "userId": target.user.id, "banReason": "spam" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["banned"], true);
    assert_eq!(res.body["user"]["banReason"], "spam");

    let res = ctx
        .post("/api/projects", Some(&target.cookie()), json!({ "name": "x" }))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = ctx
        .post(
            "/api/auth/admin/unban-user",
            Some(&admin.cookie()),
            json!({ "userId": target.user.id }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["banned"], false);

    let res = ctx
        .post("/api/projects", Some(&target.cookie()), json!({ "name": "x" }))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_routes_need_permission() {
    let ctx = TestContext::new();
    let user = ctx.user().await;
    let other = ctx.user().await;

    let res = ctx
        .post(
            "/api/auth/admin/ban-user",
            Some(&user.cookie()),
            json!({ "userId": other.user.id }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["error"], "Forbidden: Insufficient permissions");

    let res = ctx
        .post(
            "/api/auth/admin/set-role",
            None,
            json!({ "userId": other.user.id, "role": "admin" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_set_role_and_unknown_user() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    let target = ctx.user().await;

    let res = ctx
        .post(
            "/api/auth/admin/set-role",
            Some(&admin.cookie()),
            json!({ "userId": target.user.id, "role": ["admin", "user"] }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["role"], "admin,user");

    let res = ctx
        .post(
            "/api/auth/admin/ban-user",
            Some(&admin.cookie()),
            json!({ "userId": "missing" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "User not found");
}

#[tokio::test]
async fn test_ban_duration_is_bounded() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    let target = ctx.user().await;

    let res = ctx
        .post(
            "/api/auth/admin/ban-user",
            Some(&admin.cookie()),
            json!({ "userId": target.user.id, "banExpiresIn": i64::MAX }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body["details"],
        json!([{
            "path": "body.banExpiresIn",
            "message": "Ban duration must be between 1 second and 100 years"
        }])
    );

    let res = ctx
        .post(
            "/api/projects",
            Some(&target.cookie()),
            json!({ "name": "Still allowed" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = ctx
        .post(
            "/api/auth/admin/ban-user",
            Some(&admin.cookie()),
            json!({ "userId": target.user.id, "banExpiresIn": 3600 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["user"]["banExpires"].is_string());
}

fn gated_app(ctx: &TestContext) -> Router {
    Router::new()
        .route(
            "/admin-only",
            get(|| async { "ok" }).route_layer(from_fn(require_role(["admin"]))),
        )
        .route(
            "/list-users",
            get(|| async { "ok" }).route_layer(from_fn(require_permission("user", ["list"]))),
        )
        .route_layer(from_fn_with_state(ctx.state.clone(), require_auth))
        .with_state(ctx.state.clone())
}

async fn gated_status(app: &Router, uri: &str, cookie: Option<&str>) -> StatusCode {
    let mut request = axum::http::Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(axum::http::header::COOKIE, cookie);
    }
    let request = request.body(axum::body::Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_role_and_permission_gates() {
    let ctx = TestContext::new();
    let app = gated_app(&ctx);
    let user = ctx.user().await;
    let admin = ctx.admin().await;

    assert_eq!(
        gated_status(&app, "/admin-only", None).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        gated_status(&app, "/admin-only", Some(&user.cookie())).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        gated_status(&app, "/admin-only", Some(&admin.cookie())).await,
        StatusCode::OK
    );
    assert_eq!(
        gated_status(&app, "/list-users", Some(&user.cookie())).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        gated_status(&app, "/list-users", Some(&admin.cookie())).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_gate_without_auth_layer_is_unauthorized() {
    let app: Router = Router::new().route(
        "/admin-only",
        get(|| async { "ok" }).route_layer(from_fn(require_role(["admin"]))),
    );

    assert_eq!(
        gated_status(&app, "/admin-only", None).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let res = ctx.get("/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "healthy");
    assert_eq!(res.body["database"], "connected");
    assert_eq!(res.body["version"], env!("CARGO_PKG_VERSION"));
}
