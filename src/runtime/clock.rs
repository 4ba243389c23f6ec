//! Periodic tick sources.

use crate::config::{ClockConfig, ConfigError};
use crate::signal::{Connection, Signal};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::trace;

/// Callback invoked once per frame with the elapsed seconds.
pub type TickCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// A subscribable "fire every frame with a delta time" signal.
pub trait TickSource: Send + Sync {
    fn connect(&self, callback: TickCallback) -> TickConnection;
}

/// Subscription to a [`TickSource`]. Dropping it unsubscribes.
pub struct TickConnection {
    disconnect: Option<Box<dyn FnOnce() + Send>>,
}

impl TickConnection {
    pub fn new(disconnect: impl FnOnce() + Send + 'static) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }

    pub fn disconnect(self) {
        drop(self);
    }
}

impl Drop for TickConnection {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

/// A tick source the host advances by hand, one frame per
/// [`advance`](ManualClock::advance).
#[derive(Clone, Default)]
pub struct ManualClock {
    frames: Signal<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire one frame.
    pub fn advance(&self, delta_time: f64) {
        self.frames.fire(&delta_time);
    }

    pub fn subscriber_count(&self) -> usize {
        self.frames.subscriber_count()
    }
}

impl TickSource for ManualClock {
    fn connect(&self, callback: TickCallback) -> TickConnection {
        let connection: Connection = self.frames.connect(move |delta_time| callback(*delta_time));
        TickConnection::new(move || {
            connection.disconnect();
        })
    }
}

/// Fires frames from a tokio interval at [`ClockConfig::tick_rate_hz`].
///
/// Each subscription owns one timer task; disconnecting aborts it.
#[derive(Clone, Debug)]
pub struct IntervalClock {
    config: ClockConfig,
    period: Duration,
    handle: Handle,
}

impl IntervalClock {
    pub fn new(config: ClockConfig, handle: Handle) -> Result<Self, ConfigError> {
        let period = config.period()?;
        Ok(Self {
            config,
            period,
            handle,
        })
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }
}

impl TickSource for IntervalClock {
    fn connect(&self, callback: TickCallback) -> TickConnection {
        let period = self.period;
        let task = self.handle.spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = timer.tick().await;
            loop {
                let now = timer.tick().await;
                let delta_time = now.duration_since(last).as_secs_f64();
                last = now;
                trace!(delta_time, "frame");
                callback(delta_time);
            }
        });

        TickConnection::new(move || task.abort())
    }
}
