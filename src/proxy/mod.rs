mod endpoint;
pub mod endpoints;
mod executor;

pub use endpoint::{AuthMode, EndpointSpec, ErrorStatus, OnFailure, UpstreamMethod};
pub use executor::ProxyExecutor;
