pub mod builtin;
pub mod registry;
pub mod types;

pub use builtin::providers_tool;
pub use registry::ToolRegistry;
pub use types::{FnTool, MethodHandler, Tool, ToolCapabilities, ToolError, ToolInfo};
