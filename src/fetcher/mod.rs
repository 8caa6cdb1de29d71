pub mod client;
pub mod errors;

pub use client::HttpSource;
pub use errors::FetchError;
