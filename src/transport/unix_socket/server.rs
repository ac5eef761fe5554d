//! Unix socket server implementation

use std::{path::Path, sync::Arc};
use tokio::{
    fs,
    net::{UnixListener, UnixStream},
};
use tracing::{error, info, warn};

use crate::{
    backend::NetBackend,
    core::{identity::IdentitySource, service::ControlService},
    protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId},
    transport::unix_socket::{
        handler::RequestHandler,
        session::{SessionReader, UnixSocketSession},
    },
};

/// Unix socket server
pub struct UnixSocketServer<B: NetBackend, S: IdentitySource> {
    socket_path: String,
    handler: Arc<RequestHandler<B, S>>,
}

impl<B: NetBackend, S: IdentitySource> UnixSocketServer<B, S> {
    /// Create a new Unix socket server
    pub fn new(socket_path: String, service: Arc<ControlService<B, S>>) -> Self {
        Self {
            socket_path,
            handler: Arc::new(RequestHandler::new(service)),
        }
    }

    /// Start the server
    pub async fn start(&self) -> std::io::Result<()> {
        // Remove existing socket file if it exists
        if Path::new(&self.socket_path).exists() {
            fs::remove_file(&self.socket_path).await?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("Unix socket server listening on {}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let handler = self.handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_client(stream, handler).await {
                            error!("Error handling client: {}", e);
                        }
                    });
                }
                Err(e) => {
                    warn!("Error accepting connection: {}", e);
                }
            }
        }
    }

    async fn handle_client(
        stream: UnixStream,
        handler: Arc<RequestHandler<B, S>>,
    ) -> std::io::Result<()> {
        let (read_half, write_half) = stream.into_split();
        let session = UnixSocketSession::new(write_half);
        let mut reader = SessionReader::new(read_half);

        info!("New client connected: {}", session.id());

        loop {
            match reader.read_line().await? {
                Some(line) => {
                    if line.is_empty() {
                        continue;
                    }

                    let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                        Ok(request) => handler.handle_request(request).await,
                        Err(e) => {
                            warn!("Invalid JSON-RPC request: {}", e);
                            JsonRpcResponse::error(JsonRpcError::parse_error(), RequestId::Null)
                        }
                    };

                    if let Err(e) = session.send_response(&response).await {
                        error!("Error sending response: {}", e);
                        break;
                    }
                }
                None => {
                    // Client disconnected
                    info!("Client disconnected: {}", session.id());
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::MockNetBackend,
        config::Settings,
        core::identity::StubSource,
        protocol::{Request, RequestId},
    };
    use tempfile::tempdir;
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::UnixStream,
    };

    fn service(backend: Arc<MockNetBackend>) -> Arc<ControlService<MockNetBackend, StubSource>> {
        Arc::new(ControlService::new(backend, StubSource, Settings::default()))
    }

    #[tokio::test]
    async fn test_server_creation() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let backend = Arc::new(MockNetBackend::new());
        let _server = UnixSocketServer::new(
            socket_path.to_str().unwrap().to_string(),
            service(backend),
        );
    }

    #[tokio::test]
    async fn test_client_request_response() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let backend = Arc::new(MockNetBackend::new());
        backend.set_internet(true).await;

        let server = UnixSocketServer::new(
            socket_path.to_str().unwrap().to_string(),
            service(backend),
        );

        // Start server in background
        let socket_path_clone = socket_path.clone();
        tokio::spawn(async move {
            server.start().await.ok();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // Connect and send request
        let client = UnixStream::connect(&socket_path_clone).await.unwrap();
        let (read_half, mut write_half) = client.into_split();

        let request = JsonRpcRequest::new(Request::GetStatus, RequestId::Number(1));
        let json = serde_json::to_string(&request).unwrap();

        write_half.write_all(json.as_bytes()).await.unwrap();
        write_half.write_all(b"\n").await.unwrap();
        write_half.flush().await.unwrap();

        // Read response
        let mut line = String::new();
        BufReader::new(read_half).read_line(&mut line).await.unwrap();

        assert!(line.contains("\"jsonrpc\":\"2.0\""));
        assert!(line.contains("\"internet\":true"));
    }

    #[tokio::test]
    async fn test_malformed_request_gets_parse_error() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let backend = Arc::new(MockNetBackend::new());
        let server = UnixSocketServer::new(
            socket_path.to_str().unwrap().to_string(),
            service(backend),
        );

        let socket_path_clone = socket_path.clone();
        tokio::spawn(async move {
            server.start().await.ok();
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let client = UnixStream::connect(&socket_path_clone).await.unwrap();
        let (read_half, mut write_half) = client.into_split();

        write_half.write_all(b"this is not json\n").await.unwrap();
        write_half.flush().await.unwrap();

        let mut line = String::new();
        BufReader::new(read_half).read_line(&mut line).await.unwrap();

        assert!(line.contains("\"code\":-32700"));
        assert!(line.contains("\"id\":null"));
    }
}
