mod basic;
mod config;
mod lock;
mod status;

pub use basic::*;
pub use config::*;
pub use lock::*;
pub use status::*;
