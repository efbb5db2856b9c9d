//! # gRPC-Web CLI Entry Point
//!
//! The main executable for the `grpcweb` tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs logging.
//! 2. **Schema**: Loads the descriptor set used to transcode JSON to Protobuf.
//! 3. **Execution**: Delegates the request to the `GrpcWebClient`.
//! 4. **Presentation**: Prints each response message as it is decoded, then the final status.

mod cli;
mod descriptor;
mod formatter;

use clap::Parser;
use cli::{Cli, Commands, ListCommands};
use descriptor::DescriptorRegistry;
use formatter::{FormattedString, GenericError, ServiceList};
use grpcweb_core::codec::{Codec, JsonCodec};
use grpcweb_core::{CallError, CallEvent, ClientConfig, Format, GrpcWebClient, HttpRequestor};
use std::process;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    init_logging();

    let args = Cli::parse();

    let registry = match DescriptorRegistry::from_file(&args.file_descriptor_set) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    };

    match args.command {
        Commands::Call {
            url,
            endpoint,
            body,
            headers,
        } => {
            let settings = CallSettings {
                url,
                format: args.format,
                timeout: args.timeout.map(Duration::from_secs),
            };
            let (service, method) = endpoint;
            run_call(settings, &registry, service, method, body, headers).await;
        }
        Commands::List { sub } => match sub {
            ListCommands::Services => {
                println!(
                    "{}",
                    FormattedString::from(ServiceList(registry.service_names()))
                );
            }
        },
    }
}

/// Logs go to stderr so they never mix with response output. Filtered with `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

struct CallSettings {
    url: String,
    format: Format,
    timeout: Option<Duration>,
}

async fn run_call(
    settings: CallSettings,
    registry: &DescriptorRegistry,
    service: String,
    method: String,
    body: serde_json::Value,
    headers: Vec<(String, String)>,
) {
    let descriptor = match registry.method(&service, &method) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    };

    let mut builder = ClientConfig::builder(HttpRequestor::new()).format(settings.format);
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    let client = match builder.build() {
        Ok(config) => GrpcWebClient::new(config),
        Err(err) => {
            eprintln!(
                "{}",
                FormattedString::from(GenericError("Invalid client configuration", err))
            );
            process::exit(1);
        }
    };

    let mut codec = JsonCodec::for_method(&descriptor);
    let request = match codec.encode(body) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{}", FormattedString::from(CallError::Encode(err)));
            process::exit(1);
        }
    };

    let url = format!(
        "{}/{}/{}",
        settings.url.trim_end_matches('/'),
        service,
        method
    );
    tracing::info!(%url, format = %settings.format, "performing gRPC-Web call");

    let mut failed = false;
    client
        .rpc_call(
            &url,
            request,
            headers,
            |bytes| codec.decode(bytes),
            |event| match event {
                CallEvent::Message(value) => println!("{}", FormattedString::from(value)),
                CallEvent::Status(status) => {
                    failed = !status.is_ok();
                    println!("{}", FormattedString::from(status));
                }
                CallEvent::Failed(err) => {
                    failed = true;
                    eprintln!("{}", FormattedString::from(err));
                }
            },
        )
        .await;

    if failed {
        process::exit(1);
    }
}
