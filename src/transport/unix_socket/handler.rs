//! JSON-RPC request handler for Unix socket transport

use std::sync::Arc;

use crate::{
    backend::NetBackend,
    core::{error::ServiceError, identity::IdentitySource, service::ControlService},
    protocol::{
        ConnectResponse, JsonRpcError, JsonRpcRequest, JsonRpcResponse, NetworksResponse,
        ProxyStartedResponse, ProxyStoppedResponse, Request, RequestId, Response, SetupResponse,
        StatusResponse,
    },
};

/// JSON-RPC request handler
pub struct RequestHandler<B: NetBackend, S: IdentitySource> {
    service: Arc<ControlService<B, S>>,
}

impl<B: NetBackend, S: IdentitySource> RequestHandler<B, S> {
    /// Create a new request handler
    pub fn new(service: Arc<ControlService<B, S>>) -> Self {
        Self { service }
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;
        match request.request {
            Request::GetStatus => {
                let status = self.service.check_status().await;
                JsonRpcResponse::success(Response::Status(StatusResponse::ok(status)), id)
            }
            Request::ListNetworks => {
                let networks = self.service.list_networks().await;
                JsonRpcResponse::success(Response::Networks(NetworksResponse::ok(networks)), id)
            }
            Request::SetupNetwork(params) => {
                match self
                    .service
                    .configure_network(&params.ssid, &params.password)
                    .await
                {
                    Ok(()) => JsonRpcResponse::success(Response::Setup(SetupResponse::ok()), id),
                    Err(e) => JsonRpcResponse::error(map_error(e), id),
                }
            }
            Request::Connect => match self.service.connect().await {
                Ok(()) => JsonRpcResponse::success(Response::Connect(ConnectResponse::ok()), id),
                Err(e) => JsonRpcResponse::error(map_error(e), id),
            },
            Request::StartProxy => match self.service.start_proxy().await {
                Ok(access) => JsonRpcResponse::success(
                    Response::ProxyStarted(ProxyStartedResponse::ok(access)),
                    id,
                ),
                Err(e) => JsonRpcResponse::error(map_error(e), id),
            },
            Request::StopProxy => {
                self.service.stop_proxy().await;
                JsonRpcResponse::success(Response::ProxyStopped(ProxyStoppedResponse::ok()), id)
            }
            Request::GetDevice(params) => {
                match self
                    .service
                    .device_identity(&params.token, params.port)
                    .await
                {
                    Ok(identity) => JsonRpcResponse::success(Response::Device(identity), id),
                    Err(e) => JsonRpcResponse::error(map_error(e), id),
                }
            }
        }
    }
}

/// Map a service error onto the wire error taxonomy
fn map_error(e: ServiceError) -> JsonRpcError {
    use crate::core::error::NetError;

    match e {
        ServiceError::EmptySsid | ServiceError::PassphraseTooShort(_) => {
            JsonRpcError::validation_error(e.to_string())
        }
        ServiceError::InvalidToken(_) => JsonRpcError::invalid_token(e.to_string()),
        ServiceError::NoPortAvailable { .. } | ServiceError::LeaseTable { .. } => {
            JsonRpcError::resource_unavailable(e.to_string())
        }
        ServiceError::ConnectTimeout(_) => JsonRpcError::transient_failure(e.to_string()),
        ServiceError::Persistence { .. } => JsonRpcError::persistence_failure(e.to_string()),
        ServiceError::Serialization(_) => JsonRpcError::internal_error(e.to_string()),
        ServiceError::Backend(NetError::InterfaceMissing(_)) => {
            JsonRpcError::resource_unavailable(e.to_string())
        }
        ServiceError::Backend(_) => JsonRpcError::transient_failure(e.to_string()),
    }
}
