//! HTTP inbound adapter exposing the document pipeline as REST endpoints.

pub mod documents;
pub mod error;
pub mod health;
pub mod preview;
pub mod responses;
pub mod rewrite;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
