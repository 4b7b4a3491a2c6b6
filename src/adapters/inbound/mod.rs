/// Inbound adapters - Drive the application from the outside
pub mod http;
