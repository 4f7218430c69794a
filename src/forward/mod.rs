mod client;
mod frame;
mod types;

pub use client::{Forwarder, collect};
pub use frame::{DATA_PREFIX, decode_frame};
pub use types::*;
