//! Static content module
//!
//! Serves the embedded front-end page and, when configured, assets from the
//! static directory.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, response};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Front-end page: form controls plus a canvas plot of `/koch` output
const INDEX_HTML: &str = include_str!("index.html");

/// Serve the front-end page
pub fn serve_index(ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
    build_static_response(
        Bytes::from_static(INDEX_HTML.as_bytes()),
        "text/html; charset=utf-8",
        ctx,
    )
}

/// Serve `relative` from the static directory
pub async fn serve_directory(
    ctx: &RequestContext<'_>,
    dir: &str,
    relative: &str,
) -> Response<Full<Bytes>> {
    match load_from_directory(dir, relative).await {
        Some((content, content_type)) => {
            build_static_response(Bytes::from(content), content_type, ctx)
        }
        None => http::build_404_response(),
    }
}

/// Load a file below `static_dir`, refusing paths that escape it
pub async fn load_from_directory(
    static_dir: &str,
    relative: &str,
) -> Option<(Vec<u8>, &'static str)> {
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }

    let static_dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log at warning level
    let Ok(file_path) = static_dir_canonical.join(relative).canonicalize() else {
        return None;
    };
    if !file_path.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative} -> {}",
            file_path.display()
        ));
        return None;
    }
    if !file_path.is_file() {
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Build static response with `ETag` revalidation
fn build_static_response(
    data: Bytes,
    content_type: &str,
    ctx: &RequestContext<'_>,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }
    response::build_cached_response(data, content_type, &etag, ctx.is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_static_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "koch-server-static-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(dir.join("js")).unwrap();
        std::fs::write(dir.join("js/plot.js"), "console.log('plot');").unwrap();
        dir
    }

    #[test]
    fn test_index_page_calls_endpoint() {
        assert!(INDEX_HTML.contains("/koch?"));
        assert!(INDEX_HTML.contains("<canvas"));
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = temp_static_dir("load");
        let (content, content_type) = load_from_directory(dir.to_str().unwrap(), "js/plot.js")
            .await
            .unwrap();
        assert_eq!(content, b"console.log('plot');");
        assert_eq!(content_type, "application/javascript");
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_traversal_and_directories_rejected() {
        let dir = temp_static_dir("traversal");
        let dir_str = dir.to_str().unwrap();
        assert!(load_from_directory(dir_str, "../../etc/passwd").await.is_none());
        assert!(load_from_directory(dir_str, "js").await.is_none());
        assert!(load_from_directory(dir_str, "").await.is_none());
        assert!(load_from_directory(dir_str, "missing.css").await.is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_index_revalidation() {
        let ctx = RequestContext {
            path: "/",
            query: None,
            is_head: false,
            if_none_match: None,
        };
        let first = serve_index(&ctx);
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();
        let revisit = RequestContext {
            if_none_match: Some(etag),
            ..ctx
        };
        assert_eq!(serve_index(&revisit).status(), hyper::StatusCode::NOT_MODIFIED);
    }
}
