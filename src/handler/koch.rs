//! Fractal endpoint
//!
//! `GET /koch?order=<int>&mode=<curve|half>&side=<left|right>` returns the
//! refined polyline as `{"x": [...], "y": [...]}`.

use crate::config::KochConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, response};
use crate::koch::{point_count, Coordinates, KochError, KochResult, Shape, Side};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::num::{IntErrorKind, ParseIntError};
use url::form_urlencoded;

/// Validated fractal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KochParams {
    pub shape: Shape,
    pub order: u32,
}

/// Raw query values; the first occurrence of each key wins
#[derive(Debug, Default)]
struct RawQuery {
    order: Option<String>,
    mode: Option<String>,
    side: Option<String>,
}

impl RawQuery {
    fn parse(query: Option<&str>) -> Self {
        let mut raw = Self::default();
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "order" => &mut raw.order,
                "mode" => &mut raw.mode,
                "side" => &mut raw.side,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        raw
    }
}

/// Parse and validate the query string against the endpoint settings
///
/// A blank value counts as absent for every key.
pub fn parse_params(query: Option<&str>, cfg: &KochConfig) -> KochResult<KochParams> {
    let raw = RawQuery::parse(query);
    let shape = parse_shape(present(raw.mode.as_deref()), present(raw.side.as_deref()), cfg)?;
    let order = parse_order(present(raw.order.as_deref()), cfg)?;
    Ok(KochParams { shape, order })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_shape(mode: Option<&str>, side: Option<&str>, cfg: &KochConfig) -> KochResult<Shape> {
    match mode.unwrap_or("curve") {
        "curve" => Ok(Shape::Curve),
        "half" => {
            let side = side.map_or(Ok(Side::default()), str::parse::<Side>)?;
            Ok(Shape::Half(side))
        }
        "snowflake" if cfg.enable_snowflake => Ok(Shape::Snowflake),
        _ => Err(KochError::InvalidMode(mode_message(cfg))),
    }
}

fn mode_message(cfg: &KochConfig) -> String {
    if cfg.enable_snowflake {
        "mode must be 'curve', 'half' or 'snowflake'".to_string()
    } else {
        "mode must be 'curve' or 'half'".to_string()
    }
}

/// Absent means the configured default; anything else must be an integer in
/// `0..=max_order`
fn parse_order(order: Option<&str>, cfg: &KochConfig) -> KochResult<u32> {
    let Some(raw) = order else {
        return Ok(cfg.default_order);
    };
    let too_large = || KochError::OrderTooLarge {
        order: raw.to_string(),
        max: cfg.max_order,
    };
    let value: i64 = raw.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow => too_large(),
        _ => KochError::InvalidOrder(raw.to_string()),
    })?;
    if value < 0 {
        return Err(KochError::InvalidOrder(raw.to_string()));
    }
    if value > i64::from(cfg.max_order) {
        return Err(too_large());
    }
    u32::try_from(value).map_err(|_| too_large())
}

/// Build the shape and refine it
pub fn compute(params: KochParams, scale: f64) -> KochResult<Coordinates> {
    let base = params.shape.base(scale);
    let expected = point_count(base.len(), params.order)?;
    let refined = base.refine(params.order);
    logger::log_debug(&format!(
        "[Koch] {} order {} -> {} points (closed: {})",
        params.shape,
        params.order,
        expected,
        params.shape.is_closed()
    ));
    Ok(refined.into())
}

/// Serialize coordinates to the compact JSON body
pub fn render(coords: &Coordinates) -> Result<Bytes, serde_json::Error> {
    serde_json::to_vec(coords).map(Bytes::from)
}

/// Handle `/koch`
///
/// Refinement and serialization run on the blocking pool so a large order
/// does not hold up other connections on the accept thread.
pub async fn handle_koch(ctx: &RequestContext<'_>, cfg: &KochConfig) -> Response<Full<Bytes>> {
    let params = match parse_params(ctx.query, cfg) {
        Ok(params) => params,
        Err(e) => return reject(ctx, &e),
    };

    let scale = cfg.scale;
    let outcome =
        tokio::task::spawn_blocking(move || compute(params, scale).map(|c| render(&c))).await;
    let body = match outcome {
        Ok(Ok(Ok(body))) => body,
        Ok(Err(e)) => return reject(ctx, &e),
        Ok(Ok(Err(e))) => {
            logger::log_error(&format!("Failed to serialize coordinates: {e}"));
            return internal_error(ctx);
        }
        Err(e) => {
            logger::log_error(&format!("Koch worker failed: {e}"));
            return internal_error(ctx);
        }
    };

    let etag = cache::generate_etag(&body);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }
    http::build_json_response(StatusCode::OK, body, Some(&etag), ctx.is_head)
}

fn reject(ctx: &RequestContext<'_>, e: &KochError) -> Response<Full<Bytes>> {
    logger::log_warning(&format!("[Koch] Rejected query {:?}: {e}", ctx.query));
    response::build_json_error(StatusCode::BAD_REQUEST, &e.to_string(), ctx.is_head)
}

fn internal_error(ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
    response::build_json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
        ctx.is_head,
    )
}
