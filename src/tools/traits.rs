use super::error::ToolError;
use super::ToolContext;

// re-export ArgSchema for macros use
pub use super::schema::ArgSchema;
use super::schema::ToolSchema;

/// A function the agent can invoke on behalf of the model.
///
/// `run` receives the model's JSON arguments and returns a JSON result that is
/// echoed back to the model. Tools that report domain failures (unknown city,
/// etc.) do so inside the returned value; `Err` is reserved for calls that
/// could not be executed at all.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args(&self) -> Vec<ArgSchema>;
    async fn run(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<serde_json::Value, ToolError>;

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args: self.args(),
        }
    }
}
