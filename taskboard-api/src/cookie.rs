/// Session cookie handling
///
/// The browser holds the plaintext session token in `taskboard.session_token`:
///
/// ```text
/// Set-Cookie: taskboard.session_token=<hex>; HttpOnly; SameSite=Lax; Path=/; Max-Age=604800
/// ```
///
/// `Secure` is added when running in production.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;

/// Session cookie name
pub const SESSION_COOKIE: &str = "taskboard.session_token";

/// Reads the session token from the request cookies
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim_matches('"').to_string())
        .filter(|token| !token.is_empty())
}

/// Cookie carrying a new session token
pub fn session_cookie(token: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    let mut cookie = base(token, secure);
    cookie.set_max_age(time::Duration::seconds(ttl.num_seconds().max(0)));
    cookie
}

/// Cookie that makes the browser drop the session cookie
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = base(String::new(), secure);
    cookie.make_removal();
    cookie
}

fn base(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}
