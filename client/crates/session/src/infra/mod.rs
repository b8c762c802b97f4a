//! Infrastructure Layer
//!
//! Storage backends, the reqwest transport, and the cross-tab sync bus.

pub mod storage;
pub mod sync;
pub mod transport;

pub use storage::{FileStorage, MemoryStorage};
pub use sync::{SyncBus, SyncKind, SyncSignal, TabId};
pub use transport::ReqwestTransport;
