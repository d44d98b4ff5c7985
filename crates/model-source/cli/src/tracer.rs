use std::io;

use tracing::dispatcher;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub(crate) fn init_once() {
    // Skip init if has been set
    if dispatcher::has_been_set() {
        return;
    }

    // stdout is reserved for the rendered manifests
    Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()
        .ok();
}
