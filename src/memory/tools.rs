//! Session memory operations and the tools that expose them to the model.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::{SessionId, SessionStateService, StateValue};
use crate::tools::{
    error::ToolError,
    traits::{ArgSchema, Tool},
    ToolContext,
};

/// Confirmation returned by every memory operation: `{"status": ".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReceipt {
    pub status: String,
}

impl MemoryReceipt {
    fn stored(key: &str, value: &str) -> Self {
        Self {
            status: format!("Stored \"{}\": \"{}\"", key, value),
        }
    }

    fn removed(key: &str, value: &str) -> Self {
        Self {
            status: format!("Removed \"{}\": \"{}\"", key, value),
        }
    }
}

/// Read/write helpers over session state.
#[derive(Debug, Clone)]
pub struct MemoryTools {
    state: Arc<SessionStateService>,
}

impl MemoryTools {
    pub fn new(state: Arc<SessionStateService>) -> Self {
        Self { state }
    }

    /// Store `value` at `key`, replacing whatever was there.
    pub fn memorize(&self, session_id: &SessionId, key: &str, value: &str) -> MemoryReceipt {
        self.state.put(session_id, key, value);
        MemoryReceipt::stored(key, value)
    }

    /// Append `value` to the list at `key` unless it is already there.
    ///
    /// A missing key starts a new list. A key holding a non-list value is
    /// replaced by `[value]`; the old value is lost.
    pub fn memorize_list(&self, session_id: &SessionId, key: &str, value: &str) -> MemoryReceipt {
        let record = self.state.get_or_init(session_id);
        record.modify(key, |slot| match slot {
            Some(StateValue::List(items)) => {
                if !items.iter().any(|item| item == value) {
                    items.push(value.to_string());
                }
            }
            Some(StateValue::Array(items)) => {
                if !items.iter().any(|item| item.as_str() == Some(value)) {
                    items.push(StateValue::from(value));
                }
            }
            _ => {
                if slot.is_some() {
                    tracing::debug!(%key, "overwriting non-list state with a new list");
                }
                *slot = Some(StateValue::List(vec![value.to_string()]));
            }
        });
        MemoryReceipt::stored(key, value)
    }

    /// Remove the first occurrence of `value` from the list at `key`.
    /// Absent keys and non-list values are left untouched.
    pub fn forget(&self, session_id: &SessionId, key: &str, value: &str) -> MemoryReceipt {
        let record = self.state.get_or_init(session_id);
        record.modify(key, |slot| match slot {
            Some(StateValue::List(items)) => {
                if let Some(pos) = items.iter().position(|item| item == value) {
                    items.remove(pos);
                }
            }
            Some(StateValue::Array(items)) => {
                if let Some(pos) = items.iter().position(|item| item.as_str() == Some(value)) {
                    items.remove(pos);
                }
            }
            _ => {}
        });
        MemoryReceipt::removed(key, value)
    }
}

#[derive(Debug, Deserialize)]
struct KeyValueArgs {
    key: String,
    value: String,
}

fn key_value_args(input: Value) -> Result<KeyValueArgs, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::ParamsNotMatched(e.to_string()))
}

fn receipt_value(name: &str, receipt: MemoryReceipt) -> Result<Value, ToolError> {
    serde_json::to_value(receipt).map_err(|e| ToolError::ExecutionError {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Clone, Copy)]
enum MemoryOp {
    Memorize,
    MemorizeList,
    Forget,
}

/// One memory operation exposed as a tool. The session comes from the
/// [`ToolContext`], never from the model.
pub struct MemoryTool {
    memory: MemoryTools,
    op: MemoryOp,
}

impl MemoryTool {
    pub fn memorize(memory: MemoryTools) -> Self {
        Self { memory, op: MemoryOp::Memorize }
    }

    pub fn memorize_list(memory: MemoryTools) -> Self {
        Self { memory, op: MemoryOp::MemorizeList }
    }

    pub fn forget(memory: MemoryTools) -> Self {
        Self { memory, op: MemoryOp::Forget }
    }

    /// All three memory tools over the same state.
    pub fn all(memory: MemoryTools) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(Self::memorize(memory.clone())),
            Arc::new(Self::memorize_list(memory.clone())),
            Arc::new(Self::forget(memory)),
        ]
    }
}

#[async_trait::async_trait]
impl Tool for MemoryTool {
    fn name(&self) -> &str {
        match self.op {
            MemoryOp::Memorize => "memorize",
            MemoryOp::MemorizeList => "memorize_list",
            MemoryOp::Forget => "forget",
        }
    }

    fn description(&self) -> &str {
        match self.op {
            MemoryOp::Memorize => "Memorize a piece of information about the user or the trip, replacing the previous value.",
            MemoryOp::MemorizeList => "Add a piece of information to a list kept in memory; duplicates are ignored.",
            MemoryOp::Forget => "Remove a piece of information from a list kept in memory.",
        }
    }

    fn args(&self) -> Vec<ArgSchema> {
        let value_doc = match self.op {
            MemoryOp::Memorize => "The information to store",
            MemoryOp::MemorizeList => "The value to append if not already present",
            MemoryOp::Forget => "The value to remove if present",
        };
        vec![
            ArgSchema::string("key", "The label indexing the memory"),
            ArgSchema::string("value", value_doc),
        ]
    }

    async fn run(&self, ctx: &ToolContext, input: Value) -> Result<Value, ToolError> {
        let args = key_value_args(input)?;
        tracing::debug!(tool = self.name(), session = %ctx.session_id, key = %args.key, "memory tool called");
        let session = &ctx.session_id;
        let receipt = match self.op {
            MemoryOp::Memorize => self.memory.memorize(session, &args.key, &args.value),
            MemoryOp::MemorizeList => self.memory.memorize_list(session, &args.key, &args.value),
            MemoryOp::Forget => self.memory.forget(session, &args.key, &args.value),
        };
        receipt_value(self.name(), receipt)
    }
}
