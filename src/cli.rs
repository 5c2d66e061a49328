//! Command-line interface definition

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use cdp_client::ClientConfig;
use trace_session::{MemoryDumpMode, OutputDestination, TraceConfig};

/// Record tracing data from a Chrome DevTools Protocol endpoint
#[derive(Parser, Debug)]
#[command(name = "chrometrace", version, about)]
pub struct Cli {
    /// Host of the remote debugging endpoint
    #[arg(short = 'H', long, default_value = "localhost")]
    pub host: String,

    /// Port of the remote debugging endpoint
    #[arg(short = 'p', long, default_value_t = 9222)]
    pub port: u16,

    /// List the categories the endpoint can record, then exit
    #[arg(long)]
    pub show_categories: bool,

    /// Write the trace to this file instead of stdout
    #[arg(short = 'O', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Comma-separated categories to record
    #[arg(short = 'c', long, value_name = "LIST", value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Comma-separated categories to suppress
    #[arg(short = 'e', long, value_name = "LIST", value_delimiter = ',')]
    pub exclude_categories: Vec<String>,

    /// Collect systrace events alongside trace events
    #[arg(short = 's', long)]
    pub systrace: bool,

    /// Request periodic memory dumps: background, light, or detailed
    #[arg(long, value_name = "MODE")]
    pub memory_dump_mode: Option<MemoryDumpMode>,

    /// Milliseconds between periodic memory dumps
    #[arg(
        long,
        value_name = "MS",
        default_value_t = 2000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub memory_dump_interval: u64,

    /// Request one final memory dump right before stopping
    #[arg(long)]
    pub dump_memory_at_stop: bool,
}

impl Cli {
    /// Session configuration derived from the command line
    pub fn trace_config(&self) -> TraceConfig {
        let destination = match &self.output {
            Some(path) => OutputDestination::File(path.clone()),
            None => OutputDestination::Stdout,
        };
        let mut config = TraceConfig::default()
            .with_included_categories(self.categories.clone())
            .with_excluded_categories(self.exclude_categories.clone())
            .with_systrace(self.systrace)
            .with_memory_dump_interval(Duration::from_millis(self.memory_dump_interval))
            .with_dump_at_stop(self.dump_memory_at_stop)
            .with_destination(destination);
        if let Some(mode) = self.memory_dump_mode {
            config = config.with_memory_dumps(mode);
        }
        config
    }

    /// Endpoint location derived from the command line
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.host.clone(), self.port)
    }
}
