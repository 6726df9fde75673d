use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;
use tracing::debug;

#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

pub async fn static_handler(Path(path): Path<String>) -> Response {
    serve_static_file(&path)
}

/// Assets are compiled into the binary and only change with a new build.
const ASSET_CACHE_CONTROL: &str = "public, max-age=3600";

pub fn serve_static_file(path: &str) -> Response {
    let path = path.trim_start_matches('/');
    let Some(asset) = StaticAssets::get(path) else {
        debug!("No embedded asset at {}", path);
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        [
            (header::CONTENT_TYPE, mime.as_ref()),
            (header::CACHE_CONTROL, ASSET_CACHE_CONTROL),
        ],
        asset.data.into_owned(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_embedded_with_js_mime() {
        let response = serve_static_file("/script.js");
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains("javascript"));
        assert_eq!(response.headers()[header::CACHE_CONTROL], ASSET_CACHE_CONTROL);
    }

    #[test]
    fn test_unknown_asset_is_not_found() {
        let response = serve_static_file("missing.css");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
