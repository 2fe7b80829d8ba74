pub mod editor;
pub mod health;
pub mod metrics;
pub mod proxy;

pub use editor::{editor_callback, issue_token};
pub use health::health_check;
pub use metrics::metrics_endpoint;
pub use proxy::proxy_document;
