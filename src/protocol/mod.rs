//! Protocol message definitions

pub mod jsonrpc;
pub mod request;
pub mod response;

pub use {
    jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId},
    request::{GetDeviceParams, Request, SetupNetworkParams},
    response::{
        ConnectResponse, NetworksResponse, ProxyStartedResponse, ProxyStoppedResponse, Response,
        SetupResponse, StatusResponse,
    },
};
