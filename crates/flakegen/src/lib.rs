#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
#[cfg(feature = "futures")]
mod futures;
mod generator;
mod id;
mod mutex;
mod store;
mod time;

pub use crate::error::*;
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::store::*;
pub use crate::time::*;
