pub mod handlers;
pub mod protocol;
pub mod router;
pub mod server;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use router::{RequestRouter, RpcMethod};
pub use server::{app, McpServer, ServerError};
