// Adapters behind the application ports

pub mod http_client;
pub mod notifier;

pub use http_client::ReqwestFetcher;
pub use notifier::LogNotifier;
