//! Conversation-scoped memory: the tools the model uses to remember facts,
//! and the one-time bootstrap that seeds a session from a profile document.

pub mod bootstrap;
pub mod profile;
pub mod tools;

pub use bootstrap::MemoryBootstrap;
pub use profile::{ProfileLoader, ProfileState};
pub use tools::{MemoryReceipt, MemoryTool, MemoryTools};
