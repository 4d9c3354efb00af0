mod cache;
mod interface;
mod memory;
mod memory_cache;

pub use cache::*;
pub use interface::*;
pub use memory::*;
pub use memory_cache::*;
