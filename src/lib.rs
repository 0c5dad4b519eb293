pub mod llm;
pub mod tools;
pub mod agent;
pub mod message;
pub mod config;
pub mod error;
pub mod state;
pub mod memory;
pub mod city;
pub mod runner;
pub mod concierge;
pub mod repl;
pub mod prelude;

// re-export the proc-macro attribute for convenient use: `use travel_concierge::tool;` or `#[travel_concierge::tool(...)]`
#[allow(unused_imports)]
pub use travel_concierge_macros::tool;

// paths the `#[tool]` expansion refers to
#[doc(hidden)]
pub use async_trait;
#[doc(hidden)]
pub use serde;
#[doc(hidden)]
pub use serde_json;
