use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use cookie::{Cookie, SameSite};

use crate::error::{AppError, AppResult};
use crate::session::{generate_session_key, Session, SessionData, SESSION_COOKIE};
use crate::state::AppState;

/// Session middleware - loads the session named by the cookie into request
/// extensions, then persists it and refreshes the cookie after the handler ran
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let incoming_key = session_key_from_headers(request.headers());

    let (key, data) = match incoming_key {
        Some(key) => match state.sessions.load(&key).await? {
            Some(data) => (Some(key), data),
            None => (None, SessionData::default()),
        },
        None => (None, SessionData::default()),
    };

    let session = Session::new(key, data);
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    let session = session.into_state().await;
    if !session.modified {
        return Ok(response);
    }

    if session.rotate {
        if let Some(old_key) = &session.key {
            state.sessions.delete(old_key).await?;
        }
    }

    let ttl = state.config.session_ttl_seconds;

    if session.data.is_empty() {
        // Nothing left to remember; drop the server-side copy and the cookie
        if let (Some(old_key), false) = (&session.key, session.rotate) {
            state.sessions.delete(old_key).await?;
        }
        if session.key.is_some() {
            append_cookie(&mut response, removal_cookie())?;
        }
        return Ok(response);
    }

    let key = match session.key {
        Some(key) if !session.rotate => key,
        _ => generate_session_key(),
    };

    state.sessions.save(&key, &session.data, ttl).await?;
    append_cookie(
        &mut response,
        session_cookie(key, ttl, state.config.session_cookie_secure),
    )?;

    Ok(response)
}

fn session_key_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(key: String, ttl_seconds: u64, secure: bool) -> Cookie<'static> {
    let max_age = cookie::time::Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));

    Cookie::build((SESSION_COOKIE, key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

fn append_cookie(response: &mut Response, cookie: Cookie<'static>) -> AppResult<()> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}
