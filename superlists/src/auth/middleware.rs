use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{AppState, auth::utils::request_host, errors::Error};

/// Whether `host` matches an `allowed_hosts` entry.
///
/// `*` matches anything and a leading dot matches the domain and all of its subdomains.
pub(crate) fn host_allowed(host: &str, allowed_hosts: &[String]) -> bool {
    allowed_hosts.iter().any(|pattern| {
        let pattern = pattern.to_ascii_lowercase();
        if pattern == "*" {
            return true;
        }
        match pattern.strip_prefix('.') {
            Some(domain) => host == domain || host.ends_with(&pattern),
            None => host == pattern,
        }
    })
}

/// Reject requests addressed to a host that is not in `allowed_hosts`.
pub async fn allowed_hosts_middleware(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, Error> {
    let allowed = &state.config.allowed_hosts;
    if allowed.iter().any(|h| h == "*") {
        return Ok(next.run(request).await);
    }

    match request_host(request.headers(), request.uri()) {
        Some(host) if host_allowed(&host, allowed) => Ok(next.run(request).await),
        host => {
            debug!(?host, "Rejected request for a host outside allowed_hosts");
            Err(Error::BadRequest {
                message: "Invalid host header".to_string(),
            })
        }
    }
}
