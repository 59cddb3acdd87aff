/// Weather lookup tool backed by a fixed table of mock conditions.
///
/// No network access: four cities are known, matched exactly and
/// case-sensitively. Any other location is still a successful call whose
/// text is "Location not found".

use serde::Deserialize;
use serde_json::Value;

use crate::core::error::ToolError;
use crate::core::protocol::{ToolHandler, ToolRegistry};
use crate::tools::{definition, parse_args};

/// Text returned for locations missing from the table.
pub const LOCATION_NOT_FOUND: &str = "Location not found";

const MOCK_WEATHER: [(&str, &str); 4] = [
    ("New York", "Sunny, 75°F"),
    ("Los Angeles", "Cloudy, 68°F"),
    ("Chicago", "Rainy, 60°F"),
    ("Miami", "Sunny, 85°F"),
];

/// Cities the table knows about, in table order.
pub fn known_locations() -> impl Iterator<Item = &'static str> {
    MOCK_WEATHER.iter().map(|(city, _)| *city)
}

/// Exact, case-sensitive lookup.
pub fn lookup(location: &str) -> Option<&'static str> {
    MOCK_WEATHER
        .iter()
        .find(|(city, _)| *city == location)
        .map(|(_, weather)| *weather)
}

/// Current weather description, or "Location not found".
///
/// # Arguments
/// * `location` - City name, e.g. "New York"
pub fn get_weather(location: &str) -> &'static str {
    lookup(location).unwrap_or(LOCATION_NOT_FOUND)
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    /// City to look up
    location: String,
}

/// Register the `get_weather` tool.
///
/// # Arguments
/// * `registry` - Mutable reference to the tool registry where the tool will be registered
pub fn register(registry: &mut ToolRegistry) {
    let tool = definition(
        "get_weather",
        "Get the current weather for a given location.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get the weather for"
                }
            },
            "required": ["location"]
        }),
    );

    let handler: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: WeatherArgs = parse_args(args)?;
        Ok(Value::String(get_weather(&args.location).to_string()))
    });

    registry.register(tool, handler);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_cities() {
        assert_eq!(get_weather("New York"), "Sunny, 75°F");
        assert_eq!(get_weather("Los Angeles"), "Cloudy, 68°F");
        assert_eq!(get_weather("Chicago"), "Rainy, 60°F");
        assert_eq!(get_weather("Miami"), "Sunny, 85°F");
    }

    #[test]
    fn test_unknown_city() {
        assert_eq!(get_weather("Boston"), LOCATION_NOT_FOUND);
        assert_eq!(get_weather("new york"), LOCATION_NOT_FOUND);
        assert_eq!(get_weather(""), LOCATION_NOT_FOUND);
    }

    #[test]
    fn test_tool_handler() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);

        let result = registry
            .call("get_weather", serde_json::json!({"location": "Miami"}))
            .unwrap()
            .unwrap();
        assert_eq!(result, serde_json::json!("Sunny, 85°F"));
        assert_eq!(known_locations().count(), 4);
    }
}
