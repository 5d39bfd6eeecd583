use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, thiserror::Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(#[from] tracing_subscriber::util::TryInitError);

/// Forwards `WARN` and `ERROR` records as formatted lines.
///
/// Lines look like `ERROR herald: event ready subscriber exception: ...`,
/// with the `source` field of herald diagnostics between target and message.
pub struct ChannelLayer {
    tx: UnboundedSender<String>,
}

impl ChannelLayer {
    pub fn new(tx: UnboundedSender<String>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(tx), rx)
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: Option<String>,
    source: Option<String>,
}

impl Visit for RecordVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{:?}", value)),
            "source" => self.source = Some(format!("{:?}", value)),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "source" => self.source = Some(value.to_string()),
            _ => {}
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for ChannelLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !matches!(*metadata.level(), Level::WARN | Level::ERROR) {
            return;
        }

        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);
        let message = visitor
            .message
            .unwrap_or_else(|| "(no message)".to_string());
        let formatted = match visitor.source {
            Some(source) => format!(
                "{} {}: {} {}",
                metadata.level(),
                metadata.target(),
                source,
                message
            ),
            None => format!("{} {}: {}", metadata.level(), metadata.target(), message),
        };

        // receiver gone means nobody is listening any more
        let _ = self.tx.send(formatted);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json_output: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl TelemetryConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Installs the global subscriber: plain or JSON formatted output.
pub fn init_subscriber(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let registry = tracing_subscriber::registry().with(config.filter());

    if config.json_output {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    Ok(())
}

/// Installs the global subscriber with a [`ChannelLayer`] instead of stdout.
pub fn init_channel_subscriber(
    config: &TelemetryConfig,
) -> Result<UnboundedReceiver<String>, TelemetryError> {
    let (layer, rx) = ChannelLayer::channel();

    tracing_subscriber::registry()
        .with(config.filter())
        .with(layer)
        .try_init()?;

    Ok(rx)
}
