//! # CLI
//!
//! This module defines the command-line interface of `grpcweb` using `clap`.
//!
//! It is responsible for parsing user input and performing validation (e.g., ensuring headers are `key:value`);
use clap::{Parser, Subcommand};
use grpcweb_core::Format;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grpcweb", version, about = "gRPC-Web command line client")]
pub struct Cli {
    /// Path to the descriptor set (.bin) describing the server's services
    #[arg(long)]
    pub file_descriptor_set: PathBuf,

    /// Wire format: "text" (base64 bodies) or "binary"
    #[arg(long, default_value = "text", value_parser = parse_format)]
    pub format: Format,

    /// Give up on a call after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Perform a unary gRPC-Web call
    ///
    /// The JSON body is validated against the descriptor set and sent as Protobuf.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// grpcweb --file-descriptor-set echo.bin call http://localhost:8080 echo.EchoService/UnaryEcho --body '{"message": "hi"}'
    /// ```
    Call {
        /// The base URL of the gRPC-Web server or proxy (e.g. http://localhost:8080)
        url: String,
        /// Endpoint (package.Service/Method)
        #[arg(value_parser = parse_endpoint)]
        endpoint: (String, String),
        /// JSON body of the request message
        #[arg(long, value_parser = parse_body)]
        body: serde_json::Value,

        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },

    /// List available services or other resources
    List {
        #[command(subcommand)]
        sub: ListCommands,
    },
}

#[derive(Subcommand)]
pub enum ListCommands {
    /// List all services described by the descriptor set
    Services,
}

fn parse_endpoint(value: &str) -> Result<(String, String), String> {
    let (service, method) = value.split_once('/').ok_or_else(|| {
        format!("Invalid endpoint format: '{value}'. Expected 'package.Service/Method'",)
    })?;

    if service.trim().is_empty() || method.trim().is_empty() {
        return Err("Service and Method names cannot be empty".to_string());
    }

    Ok((service.to_string(), method.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| "Format must be 'key:value'".to_string())
}

fn parse_body(value: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(value).map_err(|e| format!("Invalid JSON: {e}"))
}

fn parse_format(value: &str) -> Result<Format, String> {
    value.parse().map_err(|e| format!("{e}"))
}
