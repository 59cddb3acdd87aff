/// MCP Inspector
///
/// Drives a profile's tools in-process, without an MCP client, and checks
/// the operator's environment.
///
/// Subcommands:
/// - run: call each registered tool with sample arguments (default)
/// - repl: interactive prompt, e.g. `echo Hello` or `get_weather Miami`
/// - check-config: report server and Azure OpenAI settings
/// - client-config: print a sample `mcpServers` block for desktop clients

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::process::ExitCode;

use mcpdemo::core::config::{AzureOpenAiSettings, Config, Profile};
use mcpdemo::core::error::ServerError;
use mcpdemo::core::logging;
use mcpdemo::inspector::{self, Inspector};

#[derive(Debug, Parser)]
#[command(name = "mcp-inspector", version, about = "Test MCP tools without a client")]
struct Cli {
    /// Tool profile to load; overrides MCP_PROFILE and the config file
    #[arg(short, long)]
    profile: Option<Profile>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Call every registered tool with sample arguments
    Run {
        /// Enter the interactive prompt afterwards
        #[arg(short, long)]
        interactive: bool,
    },
    /// Interactive tool prompt
    Repl,
    /// Report server and Azure OpenAI configuration
    CheckConfig,
    /// Print a sample client configuration block
    ClientConfig {
        /// Server executable the client should launch
        #[arg(long, default_value = "mcpdemo-server")]
        command: String,
    },
}

fn main() -> Result<ExitCode, ServerError> {
    dotenvy::dotenv().ok();
    logging::init_logging("warn");

    let cli = Cli::parse();
    let config = Config::load_with_profile(cli.profile)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Command::Run { interactive: false }) {
        Command::Run { interactive } => {
            let inspector = Inspector::new(&config);
            writeln!(out, "MCP Inspector - profile '{}'", config.profile)?;
            writeln!(out, "{}", "=".repeat(50))?;
            writeln!(out, "Available tools: {}", inspector.registry().names().join(", "))?;
            writeln!(out)?;

            let (passed, failed) = inspector.run_cases(&mut out)?;
            writeln!(out, "Summary: {} passed, {} failed", passed, failed)?;

            if interactive {
                writeln!(out)?;
                inspector.run_repl(io::stdin().lock(), &mut out)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Repl => {
            let inspector = Inspector::new(&config);
            writeln!(out, "MCP Inspector - profile '{}'", config.profile)?;
            inspector.run_repl(io::stdin().lock(), &mut out)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckConfig => {
            let azure = AzureOpenAiSettings::from_env();
            if inspector::check_config(&config, &azure, &mut out)? {
                writeln!(out, "\n✅ Configuration looks complete")?;
                Ok(ExitCode::SUCCESS)
            } else {
                writeln!(out, "\n❌ Configuration is incomplete; update your .env file")?;
                Ok(ExitCode::FAILURE)
            }
        }
        Command::ClientConfig { command } => {
            let value = inspector::client_config(config.profile, &command);
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(out, "{}", text)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
