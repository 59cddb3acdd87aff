/// Operator tooling: drive a profile's tools in-process without a client.
///
/// Used by the `mcp-inspector` binary for canned smoke runs, an interactive
/// prompt, configuration checks and sample client configuration.

use serde_json::{Value, json};
use std::fmt;
use std::io::{self, BufRead, Write};

use crate::core::config::{AzureOpenAiSettings, Config, Profile};
use crate::core::protocol::{ToolRegistry, error_text, result_text};
use crate::tools;

/// Result of invoking one tool from the inspector.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(String),
    Failure(String),
    UnknownTool { name: String, available: Vec<String> },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Same outcome with its text cut to `max` characters.
    pub fn truncated(self, max: usize) -> Self {
        match self {
            Outcome::Success(text) => Outcome::Success(truncate(&text, max)),
            Outcome::Failure(text) => Outcome::Failure(truncate(&text, max)),
            other => other,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(text) => write!(f, "✅ {}", text),
            Outcome::Failure(text) => write!(f, "❌ {}", text),
            Outcome::UnknownTool { name, available } => write!(
                f,
                "❌ Unknown tool: {}\n   Available tools: {}",
                name,
                available.join(", ")
            ),
        }
    }
}

/// Cut `text` to at most `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// A canned tool invocation for smoke runs.
#[derive(Debug, Clone)]
pub struct Case {
    pub name: &'static str,
    pub tool: &'static str,
    pub args: Value,
}

/// Sample invocations covering every tool; runs skip tools the profile lacks.
pub fn sample_cases() -> Vec<Case> {
    vec![
        Case { name: "Echo Test", tool: "echo", args: json!({"message": "Hello from the inspector!"}) },
        Case { name: "Current Directory", tool: "get_current_directory", args: json!({}) },
        Case { name: "List Directory", tool: "list_directory", args: json!({"directory_path": "."}) },
        Case { name: "Search Rust Files", tool: "search_files", args: json!({"pattern": "**/*.rs", "directory": "."}) },
        Case { name: "File Info - Cargo.toml", tool: "get_file_info", args: json!({"file_path": "Cargo.toml"}) },
        Case { name: "Read README", tool: "read_file", args: json!({"file_path": "README.md"}) },
        Case { name: "Addition", tool: "add", args: json!({"a": 2, "b": 3}) },
        Case { name: "Subtraction", tool: "subtract", args: json!({"a": 10, "b": 4}) },
        Case { name: "Multiplication", tool: "multiply", args: json!({"a": 6, "b": 7}) },
        Case { name: "Division By Zero", tool: "divide", args: json!({"a": 1, "b": 0}) },
        Case { name: "Weather - New York", tool: "get_weather", args: json!({"location": "New York"}) },
        Case { name: "Greeting", tool: "hello", args: json!({}) },
        Case { name: "Word Count", tool: "count_words", args: json!({"text": "the quick brown fox"}) },
    ]
}

/// A parsed line from the interactive prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Empty,
    Call { tool: String, args: Value },
    /// Required argument missing; holds the usage line
    Usage(&'static str),
}

/// Parse `<tool> [argument]`. Everything after the first space is the argument.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if matches!(line.to_lowercase().as_str(), "quit" | "exit" | "q") {
        return Command::Quit;
    }

    let (tool, rest) = match line.split_once(' ') {
        Some((tool, rest)) => (tool, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    let call = |args: Value| Command::Call { tool: tool.to_string(), args };
    match tool {
        "echo" => call(json!({"message": arg.unwrap_or("Hello!")})),
        "list_directory" => call(json!({"directory_path": arg.unwrap_or(".")})),
        "search_files" => call(json!({"pattern": arg.unwrap_or("*"), "directory": "."})),
        "read_file" => match arg {
            Some(path) => call(json!({"file_path": path})),
            None => Command::Usage("read_file <filename>"),
        },
        "get_file_info" => match arg {
            Some(path) => call(json!({"file_path": path})),
            None => Command::Usage("get_file_info <filename>"),
        },
        "write_file" => match arg.and_then(|a| a.split_once(' ')) {
            Some((path, content)) => call(json!({"file_path": path, "content": content})),
            None => Command::Usage("write_file <filename> <content>"),
        },
        "get_weather" => match arg {
            Some(location) => call(json!({"location": location})),
            None => Command::Usage("get_weather <city>"),
        },
        "hello" => match arg {
            Some(name) => call(json!({"name": name})),
            None => call(json!({})),
        },
        "count_words" => match arg {
            Some(text) => call(json!({"text": text})),
            None => Command::Usage("count_words <text>"),
        },
        "add" | "subtract" | "multiply" | "divide" => match parse_operands(arg) {
            Some((a, b)) => call(json!({"a": a, "b": b})),
            None => Command::Usage("<add|subtract|multiply|divide> <a> <b>"),
        },
        _ => call(json!({})),
    }
}

fn parse_operands(arg: Option<&str>) -> Option<(f64, f64)> {
    let mut numbers = arg?.split_whitespace().map(|n| n.parse::<f64>());
    match (numbers.next(), numbers.next(), numbers.next()) {
        (Some(Ok(a)), Some(Ok(b)), None) => Some((a, b)),
        _ => None,
    }
}

/// In-process tool driver for one profile.
pub struct Inspector {
    registry: ToolRegistry,
}

impl Inspector {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: tools::registry_for(config),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn invoke(&self, tool: &str, args: Value) -> Outcome {
        match self.registry.call(tool, args) {
            Some(Ok(value)) => Outcome::Success(result_text(&value)),
            Some(Err(e)) => Outcome::Failure(error_text(&e)),
            None => Outcome::UnknownTool {
                name: tool.to_string(),
                available: self.registry.names().iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// Run every sample case whose tool is registered. Returns (passed, failed).
    pub fn run_cases<W: Write>(&self, out: &mut W) -> io::Result<(usize, usize)> {
        let cases: Vec<Case> = sample_cases()
            .into_iter()
            .filter(|c| self.registry.contains(c.tool))
            .collect();

        let (mut passed, mut failed) = (0, 0);
        for (i, case) in cases.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, case.name)?;
            writeln!(out, "   Tool: {}", case.tool)?;
            writeln!(out, "   Params: {}", case.args)?;

            let outcome = self.invoke(case.tool, case.args.clone());
            if outcome.is_success() {
                passed += 1;
            } else {
                failed += 1;
            }
            writeln!(out, "   {}", outcome.truncated(150))?;
            writeln!(out)?;
        }
        Ok((passed, failed))
    }

    /// Interactive prompt. Ends on quit/exit/q or end of input.
    pub fn run_repl<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "Type tool commands to test them directly, e.g.:")?;
        writeln!(out, "  echo Hello World!")?;
        writeln!(out, "  list_directory .")?;
        writeln!(out, "  search_files *.rs")?;
        writeln!(out, "  quit (to exit)")?;

        let mut lines = input.lines();
        loop {
            write!(out, "MCP> ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            match parse_command(&line?) {
                Command::Quit => {
                    writeln!(out, "Goodbye!")?;
                    break;
                }
                Command::Empty => {}
                Command::Usage(usage) => writeln!(out, "   ❌ Usage: {}", usage)?,
                Command::Call { tool, args } => {
                    writeln!(out, "   {}", self.invoke(&tool, args))?;
                }
            }
        }
        Ok(())
    }
}

/// Print the resolved server configuration and the Azure OpenAI settings.
/// Returns true when the Azure settings are complete.
pub fn check_config<W: Write>(
    config: &Config,
    azure: &AzureOpenAiSettings,
    out: &mut W,
) -> io::Result<bool> {
    writeln!(out, "Server Configuration")?;
    writeln!(out, "{}", "=".repeat(50))?;
    match &config.source {
        Some(path) => writeln!(out, "Config file: {}", path.display())?,
        None => writeln!(out, "Config file: (none, using defaults and environment)")?,
    }
    writeln!(out, "Name: {}", config.name)?;
    writeln!(out, "Version: {}", config.version)?;
    writeln!(out, "Profile: {}", config.profile)?;
    writeln!(out, "Transport: {}", config.transport)?;
    writeln!(out, "Bind Address: {}", config.bind_addr())?;
    writeln!(out, "Worker Threads: {}", config.workers)?;
    writeln!(out)?;

    writeln!(out, "Azure OpenAI Configuration")?;
    writeln!(out, "{}", "=".repeat(50))?;
    match azure.masked_api_key() {
        Some(masked) => writeln!(out, "✅ API Key: {}", masked)?,
        None => writeln!(out, "❌ API Key: Not configured (set AZURE_OPENAI_API_KEY)")?,
    }
    match (&azure.endpoint, azure.endpoint_is_configured()) {
        (Some(endpoint), true) => writeln!(out, "✅ Endpoint: {}", endpoint)?,
        (Some(endpoint), false) => {
            writeln!(out, "❌ Endpoint: {} (still the template placeholder)", endpoint)?;
            writeln!(
                out,
                "   It should look like: https://YOUR-RESOURCE-NAME.openai.azure.com/"
            )?;
        }
        (None, _) => writeln!(out, "❌ Endpoint: Not configured (set AZURE_OPENAI_ENDPOINT)")?,
    }
    writeln!(out, "API Version: {}", azure.api_version)?;
    writeln!(out, "GPT-4 Deployment: {}", azure.gpt4_deployment)?;
    writeln!(out, "GPT-3.5 Deployment: {}", azure.gpt35_deployment)?;
    writeln!(out, "Embedding Deployment: {}", azure.embedding_deployment)?;

    Ok(azure.is_complete())
}

/// Sample `mcpServers` entry for desktop MCP clients.
pub fn client_config(profile: Profile, command: &str) -> Value {
    json!({
        "mcpServers": {
            format!("mcpdemo-{}", profile): {
                "command": command,
                "args": [],
                "env": {
                    "MCP_PROFILE": profile.as_str(),
                    "TRANSPORT": "stdio"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspector(profile: Profile) -> Inspector {
        Inspector::new(&Config::for_profile(profile))
    }

    #[test]
    fn test_parse_command_basics() {
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(
            parse_command("echo Hello World!"),
            Command::Call {
                tool: "echo".to_string(),
                args: json!({"message": "Hello World!"})
            }
        );
        assert_eq!(
            parse_command("list_directory"),
            Command::Call {
                tool: "list_directory".to_string(),
                args: json!({"directory_path": "."})
            }
        );
    }

    #[test]
    fn test_parse_command_required_arguments() {
        assert_eq!(parse_command("read_file"), Command::Usage("read_file <filename>"));
        assert_eq!(parse_command("get_weather"), Command::Usage("get_weather <city>"));
        assert!(matches!(parse_command("divide 1"), Command::Usage(_)));
        assert!(matches!(parse_command("add 1 two"), Command::Usage(_)));
        assert_eq!(
            parse_command("get_weather Los Angeles"),
            Command::Call {
                tool: "get_weather".to_string(),
                args: json!({"location": "Los Angeles"})
            }
        );
        assert_eq!(
            parse_command("divide 9 3"),
            Command::Call {
                tool: "divide".to_string(),
                args: json!({"a": 9.0, "b": 3.0})
            }
        );
    }

    #[test]
    fn test_invoke_outcomes() {
        let math = inspector(Profile::Math);
        assert_eq!(math.invoke("add", json!({"a": 1, "b": 2})), Outcome::Success("3.0".to_string()));
        assert_eq!(
            math.invoke("divide", json!({"a": 1, "b": 0})),
            Outcome::Failure("Error: Cannot divide by zero".to_string())
        );
        match math.invoke("get_weather", json!({})) {
            Outcome::UnknownTool { name, available } => {
                assert_eq!(name, "get_weather");
                assert_eq!(available, vec!["add", "subtract", "multiply", "divide"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_truncate_is_char_aware() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("°°°°", 2), "°°...");
        assert_eq!(truncate("exactly", 7), "exactly");
    }

    #[test]
    fn test_run_cases_only_uses_registered_tools() {
        let weather = inspector(Profile::Weather);
        let mut out = Vec::new();
        let (passed, failed) = weather.run_cases(&mut out).unwrap();
        assert_eq!((passed, failed), (1, 0));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Weather - New York"));
        assert!(text.contains("✅ Sunny, 75°F"));
        assert!(!text.contains("Echo Test"));
    }

    #[test]
    fn test_repl_session() {
        let weather = inspector(Profile::Weather);
        let input = "get_weather Chicago\nget_weather\necho hi\nquit\nget_weather Miami\n";
        let mut out = Vec::new();
        weather.run_repl(input.as_bytes(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("✅ Rainy, 60°F"));
        assert!(text.contains("❌ Usage: get_weather <city>"));
        assert!(text.contains("❌ Unknown tool: echo"));
        assert!(text.contains("Goodbye!"));
        // Nothing after quit is processed
        assert!(!text.contains("Sunny, 85°F"));
    }

    #[test]
    fn test_check_config_reports_missing_azure_settings() {
        let config = Config::for_profile(Profile::Directory);
        let azure = AzureOpenAiSettings::from_lookup(|_| None);
        let mut out = Vec::new();

        let complete = check_config(&config, &azure, &mut out).unwrap();
        assert!(!complete);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Profile: directory"));
        assert!(text.contains("❌ API Key: Not configured"));
        assert!(text.contains("❌ Endpoint: Not configured"));
    }

    #[test]
    fn test_client_config_shape() {
        let value = client_config(Profile::Weather, "/usr/local/bin/mcpdemo-server");
        let entry = &value["mcpServers"]["mcpdemo-weather"];
        assert_eq!(entry["command"], "/usr/local/bin/mcpdemo-server");
        assert_eq!(entry["env"]["MCP_PROFILE"], "weather");
        assert_eq!(entry["env"]["TRANSPORT"], "stdio");
    }
}
