// Server loop module
// Accepts connections until shutdown is requested

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener`, bound to `addr`, until `shutdown` is notified.
///
/// Accept errors are logged and do not stop the loop. Connections already being served
/// keep running on their own tasks after the loop returns.
pub async fn start_server_loop(
    listener: TcpListener,
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                logger::log_server_stop(&addr);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::client::conn::http1::{handshake, SendRequest};
    use hyper::{Method, Request, StatusCode};
    use hyper_util::rt::TokioIo;
    use tokio::net::TcpStream;
    use tokio::task::{JoinHandle, JoinSet};

    struct TestServer {
        addr: SocketAddr,
        shutdown: Arc<Notify>,
        handle: JoinHandle<()>,
    }

    async fn spawn_server() -> TestServer {
        let mut cfg = Config::defaults();
        cfg.logging.access_log = false;
        let state = Arc::new(AppState::new(&cfg));

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(start_server_loop(listener, addr, state, Arc::clone(&shutdown)));

        TestServer {
            addr,
            shutdown,
            handle,
        }
    }

    async fn connect(addr: SocketAddr) -> SendRequest<Full<Bytes>> {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (sender, conn) = handshake(TokioIo::new(stream)).await.unwrap();
        tokio::spawn(conn);
        sender
    }

    async fn send(
        sender: &mut SendRequest<Full<Bytes>>,
        addr: SocketAddr,
        method: Method,
        path: &str,
    ) -> (StatusCode, String) {
        sender.ready().await.unwrap();
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("host", addr.to_string())
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = sender.send_request(req).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn request(addr: SocketAddr, method: Method, path: &str) -> (StatusCode, String) {
        let mut sender = connect(addr).await;
        send(&mut sender, addr, method, path).await
    }

    #[tokio::test]
    async fn test_get_root_reports_bound_port() {
        let server = spawn_server().await;

        let (status, body) = request(server.addr, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("response from 127.0.0.1:{}", server.addr.port()));
    }

    #[tokio::test]
    async fn test_unmatched_requests_get_404() {
        let server = spawn_server().await;

        for (method, path) in [(Method::POST, "/"), (Method::GET, "/missing")] {
            let (status, body) = request(server.addr, method, path).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, "Not found");
        }
    }

    #[tokio::test]
    async fn test_keep_alive_connection_serves_several_requests() {
        let server = spawn_server().await;
        let mut sender = connect(server.addr).await;
        let expected = format!("response from 127.0.0.1:{}", server.addr.port());

        let (status, body) = send(&mut sender, server.addr, Method::GET, "/").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, expected.as_str()));

        let (status, body) = send(&mut sender, server.addr, Method::GET, "/nope").await;
        assert_eq!((status, body.as_str()), (StatusCode::NOT_FOUND, "Not found"));

        let (status, body) = send(&mut sender, server.addr, Method::GET, "/").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, expected.as_str()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_are_independent() {
        let server = spawn_server().await;
        let expected = format!("response from 127.0.0.1:{}", server.addr.port());

        let mut set = JoinSet::new();
        for _ in 0..32 {
            let addr = server.addr;
            set.spawn(async move { request(addr, Method::GET, "/").await });
        }

        let mut completed = 0;
        while let Some(result) = set.join_next().await {
            let (status, body) = result.unwrap();
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, expected);
            completed += 1;
        }
        assert_eq!(completed, 32);
    }

    #[tokio::test]
    async fn test_second_instance_cannot_bind_running_port() {
        let server = spawn_server().await;

        let err = create_listener(server.addr).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);

        // The running instance is unaffected
        let (status, _) = request(server.addr, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let server = spawn_server().await;

        server.shutdown.notify_one();
        server.handle.await.unwrap();

        assert!(TcpStream::connect(server.addr).await.is_err());
    }
}
