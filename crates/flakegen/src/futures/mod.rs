mod generator;
#[cfg(feature = "async-tokio")]
mod runtime;
mod sleep_provider;

#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use runtime::*;
#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
pub use sleep_provider::*;
