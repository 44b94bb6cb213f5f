// Connection handling module
// Serves one accepted TCP connection over HTTP/1.1

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler::{self, ConnectionInfo};
use crate::logger;

/// Record the connection's addresses and serve it on its own task.
///
/// The local address is read once here; every request on a keep-alive connection
/// reports the same one.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    let local_addr = match stream.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            logger::log_warning(&format!(
                "Dropping connection from {peer_addr}: local address unavailable: {e}"
            ));
            return;
        }
    };

    if state.access_log() {
        logger::log_connection_accepted(&peer_addr, &local_addr);
    }

    let conn = ConnectionInfo {
        local_addr,
        peer_addr,
    };
    tokio::spawn(serve_connection(stream, conn, Arc::clone(state)));
}

async fn serve_connection(stream: TcpStream, conn: ConnectionInfo, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let keep_alive = state.config.server.keep_alive;

    let service = service_fn(move |req| handler::handle_request(req, conn, Arc::clone(&state)));
    let connection = http1::Builder::new()
        .keep_alive(keep_alive)
        .serve_connection(io, service);

    if let Err(err) = connection.await {
        // Clients hanging up mid-request are routine
        if !err.is_incomplete_message() {
            logger::log_connection_error(&err);
        }
    }
}
