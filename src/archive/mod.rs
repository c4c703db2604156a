pub mod client;
pub mod download;
pub mod error;
pub mod paths;

#[cfg(test)]
pub(crate) mod mock;
