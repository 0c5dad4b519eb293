use crate::tool;

use super::ToolReport;

/// Canned weather. Only New York is known.
#[tool(
    name = "get_weather",
    description = "Retrieves the current weather report for a specified city.",
    params(city = "The name of the city for which to retrieve the weather report")
)]
pub fn get_weather(city: String) -> ToolReport {
    tracing::debug!(%city, "get_weather called");
    if city.to_lowercase() == "new york" {
        tracing::info!("returning canned weather for New York");
        ToolReport::success(
            "The weather in New York is sunny with a temperature of 25 degrees Celsius (77 degrees Fahrenheit).",
        )
    } else {
        tracing::warn!(%city, "weather information not available");
        ToolReport::error(format!("Weather information for {} is not available.", city))
    }
}
