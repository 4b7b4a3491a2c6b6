/// HTTP adapters: health check and Prometheus exposition
pub mod exposition;
mod router;
mod server;

pub use router::{api_router, monitor_router};
pub use server::HttpServer;
