//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::config::{AppState, Config};
use crate::handler::{koch, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Prefix under which `routes.static_dir` is exposed
pub const STATIC_PREFIX: &str = "/static/";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let uri = req.uri();
    let config = &state.config;

    // 1. Check HTTP method
    // 2. Check body size
    let early = check_http_method(method, config.http.enable_cors)
        .or_else(|| check_body_size(&req, config.http.max_body_size));

    let response = match early {
        Some(resp) => resp,
        None => {
            // 3. Log headers if enabled
            logger::log_headers_count(req.headers().len(), config.logging.show_headers);

            // 4. Extract headers for caching
            let ctx = RequestContext {
                path: uri.path(),
                query: uri.query(),
                is_head: *method == Method::HEAD,
                if_none_match: header_string(&req, "if-none-match"),
            };

            // 5. Dispatch
            route_request(&ctx, config).await
        }
    };
    let response = finalize(response, config);

    if config.logging.access_log {
        let mut entry = AccessLogEntry::new(method.as_str(), uri.path(), uri.query());
        entry.remote_addr = peer_addr.ip().to_string();
        entry.http_version = http_version(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry);
    }

    Ok(response)
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route request based on path and configuration
pub async fn route_request(ctx: &RequestContext<'_>, config: &Config) -> Response<Full<Bytes>> {
    let routes = &config.routes;

    // 0. Health check endpoints (highest priority, always fast)
    if routes.health.enabled
        && (ctx.path == routes.health.liveness_path || ctx.path == routes.health.readiness_path)
    {
        return http::build_health_response("ok");
    }

    match ctx.path {
        "/koch" => koch::handle_koch(ctx, &config.koch).await,
        "/" | "/index.html" => static_files::serve_index(ctx),
        path => match (&routes.static_dir, path.strip_prefix(STATIC_PREFIX)) {
            (Some(dir), Some(relative)) => static_files::serve_directory(ctx, dir, relative).await,
            _ => http::build_404_response(),
        },
    }
}

/// Headers added to every response
fn finalize(mut response: Response<Full<Bytes>>, config: &Config) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    if let Ok(name) = HeaderValue::from_str(&config.http.server_name) {
        headers.insert(SERVER, name);
    }
    if config.http.enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn config() -> Config {
        Config::load_from("no-such-config-file").unwrap()
    }

    fn ctx(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            query: None,
            is_head: false,
            if_none_match: None,
        }
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_method_check() {
        assert!(check_http_method(&Method::GET, false).is_none());
        assert!(check_http_method(&Method::HEAD, false).is_none());
        assert_eq!(
            check_http_method(&Method::OPTIONS, false).unwrap().status(),
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            check_http_method(&Method::POST, false).unwrap().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_health_probes() {
        let cfg = config();
        for path in ["/healthz", "/readyz"] {
            let resp = route_request(&ctx(path), &cfg).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body_bytes(resp).await, Bytes::from(r#"{"status":"ok"}"#));
        }
    }

    #[tokio::test]
    async fn test_health_disabled() {
        let mut cfg = config();
        cfg.routes.health.enabled = false;
        let resp = route_request(&ctx("/healthz"), &cfg).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_page() {
        let resp = route_request(&ctx("/"), &config()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
        let body = body_bytes(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("/koch"));
    }

    #[tokio::test]
    async fn test_koch_route() {
        let cfg = config();
        let request = RequestContext {
            query: Some("order=0"),
            ..ctx("/koch")
        };
        let resp = route_request(&request, &cfg).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(json["x"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_health_answers_while_large_curve_renders() {
        let cfg = Arc::new(config());
        let heavy_cfg = Arc::clone(&cfg);
        let heavy = tokio::spawn(async move {
            let request = RequestContext {
                query: Some("mode=half&side=right&order=9"),
                ..ctx("/koch")
            };
            route_request(&request, &heavy_cfg).await.status()
        });
        // Let the heavy request reach the blocking pool
        tokio::task::yield_now().await;

        let health = route_request(&ctx("/healthz"), &cfg).await;
        assert_eq!(health.status(), StatusCode::OK);
        assert!(!heavy.is_finished());
        assert_eq!(heavy.await.unwrap(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_static_disabled_by_default() {
        let resp = route_request(&ctx("/static/app.js"), &config()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let resp = route_request(&ctx("/nope"), &config()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_finalize_headers() {
        let mut cfg = config();
        cfg.http.enable_cors = true;
        let resp = finalize(http::build_404_response(), &cfg);
        assert_eq!(resp.headers()[SERVER], "koch-server");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
