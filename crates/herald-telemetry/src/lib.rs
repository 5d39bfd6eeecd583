mod subscriber;

pub use subscriber::{
    init_channel_subscriber, init_subscriber, ChannelLayer, TelemetryConfig, TelemetryError,
};
