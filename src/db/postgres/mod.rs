mod client;
mod ops;
mod queries;

pub use client::PostgresClient;
