pub mod detection;
pub mod scratch;
pub mod types;

pub use scratch::ScratchDir;
pub use types::{MediaType, ScratchConfig};
