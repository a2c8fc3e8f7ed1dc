//! HTTP handlers for static asset serving.

use axum::{
    body::Body,
    extract::Path,
    http::{Response, header},
};
use tracing::instrument;

use crate::{errors::Error, static_assets};

/// Serve an embedded file from `static/`.
#[instrument(err)]
pub async fn serve_static(Path(path): Path<String>) -> Result<Response<Body>, Error> {
    let content = static_assets::Assets::get(&path).ok_or_else(|| Error::NotFound {
        resource: "Static asset".to_string(),
        id: path.clone(),
    })?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(content.data.into_owned()))
        .map_err(|e| Error::Internal {
            operation: format!("build static asset response: {e}"),
        })
}
