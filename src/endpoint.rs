//! Address builders for the backend.
//!
//! The backend exposes HTTP data calls and the live stream under one base address,
//! e.g. `http://localhost:8000`. The stream address is derived from it by swapping the
//! scheme (`http` -> `ws`, `https` -> `wss`) and carries the selected symbol as a query
//! parameter.

use url::Url;

use crate::error::AppError;
use crate::model::symbol::Symbol;

pub const DEFAULT_STREAM_PATH: &str = "/ws/stream";
pub const PING_PATH: &str = "/api/ping";

fn stream_scheme(scheme: &str) -> Result<&'static str, AppError> {
    match scheme {
        "http" | "ws" => Ok("ws"),
        "https" | "wss" => Ok("wss"),
        other => Err(AppError::UnsupportedScheme(other.to_string())),
    }
}

fn http_scheme(scheme: &str) -> Result<&'static str, AppError> {
    match scheme {
        "http" | "ws" => Ok("http"),
        "https" | "wss" => Ok("https"),
        other => Err(AppError::UnsupportedScheme(other.to_string())),
    }
}

/// Rebuild `base` with `scheme`, appending `path` to whatever path the base already has.
fn join(base: &str, scheme: &str, path: &str) -> Result<Url, AppError> {
    let parsed = Url::parse(base.trim())?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::Config(format!("base URL '{}' has no host", base)))?;
    let mut authority = host.to_string();
    if let Some(port) = parsed.port() {
        authority = format!("{}:{}", authority, port);
    }
    let prefix = parsed.path().trim_end_matches('/');
    let suffix = path.trim_start_matches('/');
    let url = Url::parse(&format!("{}://{}{}/{}", scheme, authority, prefix, suffix))?;
    Ok(url)
}

/// Streaming endpoint for `symbol`, e.g. `ws://localhost:8000/ws/stream?symbol=AAPL`.
pub fn stream_url(base: &str, path: &str, symbol: &Symbol) -> Result<Url, AppError> {
    let scheme = stream_scheme(Url::parse(base.trim())?.scheme())?;
    let mut url = join(base, scheme, path)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("symbol", symbol.as_str());
    Ok(url)
}

/// HTTP endpoint under the same base, e.g. `http://localhost:8000/api/ping`.
pub fn api_url(base: &str, path: &str) -> Result<Url, AppError> {
    let scheme = http_scheme(Url::parse(base.trim())?.scheme())?;
    join(base, scheme, path)
}
