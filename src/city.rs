//! Demo lookups exposed to the model: current time and weather by city.

pub mod time;
pub mod weather;

use serde::{Deserialize, Serialize};

pub use time::{GetCurrentTimeTool, get_current_time, normalize_city};
pub use weather::{GetWeatherTool, get_weather};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Result shape shared by the city tools: `{"status": .., "report": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReport {
    pub status: ToolStatus,
    pub report: String,
}

impl ToolReport {
    pub fn success(report: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Success,
            report: report.into(),
        }
    }

    pub fn error(report: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            report: report.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}
