pub mod context;
pub mod error_handler;
pub mod request_id;

pub use context::RequestContext;
pub use error_handler::{configure_extractors, json_error_handler, method_not_allowed, query_error_handler};
pub use request_id::RequestId;
