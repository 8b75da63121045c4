pub mod api;
pub mod proxy;

pub use api::ApiClient;
pub use proxy::ProxyClient;
