//! Command-line surface.

use clap::{Args, Parser, Subcommand};

use crate::protocol::Protocol;
use crate::stream::StreamConfig;

#[derive(Debug, Parser)]
#[command(name = "stream-bench", about = "HTTP multipart upload benchmark", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Streams a number of entities to a rest end point as MIME multipart/mixed.
    Stream(StreamArgs),
    /// Runs a local sink that accepts multipart uploads and counts the parts.
    Sink(SinkArgs),
}

#[derive(Debug, Args)]
pub struct StreamArgs {
    /// HTTP protocol preference order; the first successful handshake wins.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "http1")]
    pub protocols: Vec<Protocol>,

    /// Target URL to POST the multipart body to.
    #[arg(long)]
    pub url: String,

    /// Number of entities (multipart parts) to stream.
    #[arg(long, default_value_t = 1)]
    pub entities: usize,

    /// Advertised payload size in bytes; informational.
    #[arg(long, default_value_t = 0)]
    pub payload_size: u64,

    /// Path of the file to upload. When empty the run aborts before any
    /// network call.
    #[arg(long, default_value = "")]
    pub payload_path: String,

    /// Also print the response status and body on success.
    #[arg(short, long)]
    pub verbose: bool,
}

impl StreamArgs {
    pub fn into_config(self) -> StreamConfig {
        StreamConfig {
            protocols: self.protocols,
            url: self.url,
            entities: self.entities,
            payload_size: self.payload_size,
            payload_path: self.payload_path,
            verbose: self.verbose,
        }
    }
}

#[derive(Debug, Args)]
pub struct SinkArgs {
    /// Listen address for the sink server.
    #[arg(long, default_value = "0.0.0.0:3000")]
    pub listen: String,
}
