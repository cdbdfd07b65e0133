//! Tracing subscriber setup.

use std::sync::Once;
use tracing_subscriber::{
    fmt::{
        format::{DefaultFields, Format},
        writer::BoxMakeWriter,
        SubscriberBuilder,
    },
    EnvFilter,
};

use crate::config::{LogConfig, LogFormat};

// Log targets used like `debug!(target: LOOKUP, code = %code, "Prescription lookup")`
pub const CREATE: &str = "rxcode::create";
pub const LOOKUP: &str = "rxcode::lookup";
pub const API: &str = "rxcode::api";

static INIT: Once = Once::new();

type Subscriber = Box<dyn tracing::Subscriber + Send + Sync>;

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(config: &LogConfig) {
    INIT.call_once(|| {
        let subscriber = set_format(config, builder(config));
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("A global tracing subscriber is already installed");
        }
    });
}

/// `RUST_LOG` takes precedence over the configured level.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::builder().parse_lossy(config.level.to_string()))
}

pub fn builder(
    config: &LogConfig,
) -> SubscriberBuilder<DefaultFields, Format, EnvFilter, BoxMakeWriter> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(BoxMakeWriter::new(std::io::stdout))
}

pub fn set_format(
    config: &LogConfig,
    builder: SubscriberBuilder<DefaultFields, Format, EnvFilter, BoxMakeWriter>,
) -> Subscriber {
    match config.format {
        LogFormat::Pretty => Box::new(builder.pretty().finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
        LogFormat::Text => Box::new(builder.finish()),
    }
}
