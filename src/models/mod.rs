//! Data models

mod plan;
mod provision;
mod server;

pub use plan::*;
pub use provision::*;
pub use server::*;
