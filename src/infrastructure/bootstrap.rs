//! Composition root: turns a [`Config`] into a running channel.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::notifier::LogNotifier;
use crate::application::Channel;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::{Clock, Notifier, NotifierRegistry};

/// Build the notifier registry. Always includes the log notifier; `extra`
/// notifiers are registered after it, in order.
pub fn build_notifier_registry(extra: Vec<Box<dyn Notifier>>) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    for notifier in extra {
        registry.register(notifier);
    }
    registry
}

/// Deploy a channel from configuration.
///
/// # Errors
///
/// Propagates ledger rejections from module registration.
pub fn deploy_channel(
    config: &Config,
    clock: Arc<dyn Clock>,
    extra_notifiers: Vec<Box<dyn Notifier>>,
) -> Result<Channel> {
    let notifiers = Arc::new(build_notifier_registry(extra_notifiers));
    info!(notifiers = notifiers.len(), "Deploying channel");
    let channel = Channel::deploy(&config.channel_settings(), clock, notifiers)?;
    Ok(channel)
}
