use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::RestConfig;
use crate::content::ContentType;
use crate::logging::{self, LogConfig};
use crate::method::RestMethod;
use crate::registry::Role;
use crate::resource::TestStore;
use crate::server::{RestRequest, RestResponse, RestService};

/// Command-line interface for brrtrest
///
/// Dispatches requests against the demo `test` resource and inspects the
/// capability table.
#[derive(Parser, Debug)]
#[command(name = "brrtrest")]
#[command(about = "brrtrest REST dispatch CLI", long_about = None, version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch one request and print the response
    Request {
        /// HTTP method
        method: String,

        /// Request path, query string included (e.g. /rest/test/3.json)
        path: String,

        /// Request header as `Name: value`; repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Raw request body
        #[arg(short, long)]
        body: Option<String>,

        /// YAML configuration file
        #[arg(short, long, env = "BRRTREST_CONFIG")]
        config: Option<PathBuf>,

        /// Require `Authorization: Bearer <token>` on the demo resource
        #[arg(long, env = "BRRTREST_TOKEN")]
        token: Option<String>,
    },
    /// List the content table and the capability identifiers
    Types {
        /// YAML configuration file
        #[arg(short, long, env = "BRRTREST_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn parse_header(raw: &str) -> anyhow::Result<(&str, &str)> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => bail!("Invalid header '{raw}', expected 'Name: value'"),
    }
}

/// Status line, headers and body in HTTP/1.1 layout.
pub fn write_response(out: &mut impl Write, response: &RestResponse) -> std::io::Result<()> {
    writeln!(out, "HTTP/1.1 {} {}", response.status, response.reason())?;
    for (name, value) in &response.headers {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;
    if !response.body.is_empty() {
        writeln!(out, "{}", response.body)?;
    }
    Ok(())
}

/// Run a parsed command, writing its output to `out`.
pub fn execute(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match cli.command {
        Commands::Request {
            method,
            path,
            headers,
            body,
            config,
            token,
        } => {
            let config = RestConfig::from_sources(config.as_deref())?;
            let service = RestService::new(config)
                .context("Invalid dispatch configuration")?
                .with_demo(TestStore::seeded(), token);

            let mut request = RestRequest::new(method, &path);
            for raw in &headers {
                let (name, value) = parse_header(raw)?;
                request = request.with_header(name, value);
            }
            if let Some(body) = body {
                request = request.with_body(body);
            }
            let request = request.with_request_id_from_headers();
            debug!(request_id = %request.request_id, "CLI request built");

            let response = match service.handle(request) {
                Ok(response) => response,
                Err(signal) => service.write_signal(RestResponse::new(), &signal),
            };
            write_response(out, &response).context("Failed to write response")?;
            Ok(())
        }
        Commands::Types { config } => {
            let config = RestConfig::from_sources(config.as_deref())?;
            let registry = config.registry().context("Invalid dispatch configuration")?;
            writeln!(out, "{:<8} {:<28} CAPABILITY", "SHORT", "MIME")?;
            for t in ContentType::ALL {
                writeln!(
                    out,
                    "{:<8} {:<28} {}",
                    t.short_name(),
                    t.mime(),
                    registry.capability_id(Role::Content, t.short_name())
                )?;
            }
            writeln!(out)?;
            writeln!(out, "{:<8} {:<28} EXEC", "METHOD", "CAPABILITY")?;
            for m in RestMethod::ALL {
                writeln!(
                    out,
                    "{:<8} {:<28} {}",
                    m.as_str(),
                    registry.capability_id(Role::Method, m.as_str()),
                    registry.capability_id(Role::Exec, m.as_str())
                )?;
            }
            Ok(())
        }
    }
}

/// Parse the process arguments, initialise logging and run.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&LogConfig::from_env())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}
