//! Request helpers shared by the session extractor, flash messages and host checks.

use axum::http::{HeaderMap, Uri, header};

/// Values of every cookie called `name` in the request's `Cookie` headers.
pub fn cookie_values<'a>(headers: &'a HeaderMap, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(move |cookie| match cookie.trim().split_once('=') {
            Some((cookie_name, value)) if cookie_name == name => Some(value),
            _ => None,
        })
}

/// Host the client addressed, without port: the `Host` header, falling back to the URI authority.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let authority = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))?;

    let host = match authority.rsplit_once(':') {
        // IPv6 literals keep their brackets, e.g. `[::1]:8000`
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) && !host.ends_with(':') => host,
        _ => authority.as_str(),
    };

    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}
