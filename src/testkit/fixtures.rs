//! A deployed channel wired for tests.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use super::config;
use super::notifier::RecordingNotifier;
use crate::adapter::outbound::clock::ManualClock;
use crate::application::{Channel, ChannelSettings};
use crate::domain::{AccountKey, Tokens};
use crate::port::NotifierRegistry;

/// Shorthand for a viewer account key.
pub fn viewer(name: &str) -> AccountKey {
    AccountKey::new(name)
}

/// A channel on a manual clock with a recording notifier attached.
///
/// Derefs to [`Channel`], so `test.prediction()` etc. work directly.
pub struct TestChannel {
    channel: Channel,
    pub clock: Arc<ManualClock>,
    pub events: RecordingNotifier,
}

impl TestChannel {
    /// Deploy with [`config::channel_settings`].
    pub fn deploy() -> Self {
        Self::with_settings(config::channel_settings())
    }

    pub fn with_settings(settings: ChannelSettings) -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 18, 0, 0)
            .single()
            .expect("valid start time");
        let clock = Arc::new(ManualClock::new(start));
        let events = RecordingNotifier::new();
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(events.clone()));

        let channel = Channel::deploy(&settings, clock.clone(), Arc::new(registry))
            .expect("deploy test channel");
        Self {
            channel,
            clock,
            events,
        }
    }

    pub fn admin(&self) -> AccountKey {
        self.channel.settings().administrator.clone()
    }

    pub fn balance(&self, account: &AccountKey) -> Tokens {
        self.channel.ledger().balance_of(account)
    }

    /// Give each viewer `sessions × reward` tokens by running attendance
    /// sessions. Leaves the last session open.
    pub fn fund(&self, viewers: &[&AccountKey], sessions: usize) {
        let admin = self.admin();
        for _ in 0..sessions {
            self.channel
                .attendance()
                .start_new_attendance(&admin, 30)
                .expect("start session");
            for viewer in viewers {
                self.channel
                    .attendance()
                    .mark_my_attendance(viewer)
                    .expect("mark attendance");
            }
        }
    }
}

impl Deref for TestChannel {
    type Target = Channel;

    fn deref(&self) -> &Channel {
        &self.channel
    }
}

impl DerefMut for TestChannel {
    fn deref_mut(&mut self) -> &mut Channel {
        &mut self.channel
    }
}
