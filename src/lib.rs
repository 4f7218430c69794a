pub mod caps;
pub mod config;
pub mod error;
pub mod forward;
pub mod session;
pub mod text;

pub use error::{Error, Result};
pub use forward::{ChunkStream, Forwarder, InferenceRequest, ResponseChunk};
pub use session::{Session, SessionManager};
