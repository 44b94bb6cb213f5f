//! Request routing dispatch module
//!
//! `GET /` (and `HEAD /`) answers with the local address of the accepting socket,
//! everything else falls through to a 404.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Addresses of the connection a request arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Address the accepting socket is bound to for this connection
    pub local_addr: SocketAddr,
    pub peer_addr: SocketAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Echo,
    NotFound,
}

/// Match method and path (query string already stripped) to a route
pub fn match_route(method: &Method, path: &str) -> Route {
    match (method, path) {
        (&Method::GET | &Method::HEAD, "/") => Route::Echo,
        _ => Route::NotFound,
    }
}

/// `response from <ip>:<port>`, IPv6 addresses without brackets
pub fn echo_body(local_addr: &SocketAddr) -> String {
    format!("response from {}:{}", local_addr.ip(), local_addr.port())
}

/// Build the response for a request, ignoring its body
pub fn dispatch<B>(req: &Request<B>, conn: &ConnectionInfo) -> Response<Full<Bytes>> {
    let is_head = *req.method() == Method::HEAD;
    match match_route(req.method(), req.uri().path()) {
        Route::Echo => {
            http::build_text_response(StatusCode::OK, echo_body(&conn.local_addr), is_head)
        }
        Route::NotFound => http::build_404_response(is_head),
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    conn: ConnectionInfo,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = dispatch(&req, &conn);

    if state.access_log() {
        let entry = access_entry(&req, &conn, &response, started);
        logger::log_access(&entry, state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(
    req: &Request<B>,
    conn: &ConnectionInfo,
    response: &Response<Full<Bytes>>,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        conn.peer_addr.to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or_default();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
