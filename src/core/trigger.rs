//! External scheduler which replays the remaining charge windows.

use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use async_trait::async_trait;
use chrono::{NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::{
    core::{
        clock::{Clocks, Frame},
        window::ChargeWindow,
    },
    prelude::*,
};

/// Wall-clock time of day with minute precision, formatted as `HH:MM`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, derive_more::From)]
pub struct TimeOfDay(pub NaiveTime);

impl TimeOfDay {
    pub const FORMAT: &str = "%H:%M";

    /// Shift by the specified offset, wrapping around midnight.
    pub fn shifted(self, offset: TimeDelta) -> Self {
        Self(self.0.overflowing_add_signed(offset).0)
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveTime::parse_from_str(s, Self::FORMAT)
            .map(Self)
            .with_context(|| format!("`{s}` is not a valid `HH:MM` time"))
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl Debug for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Daily cron schedule expression.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CronExpression {
    pub minute: u32,
    pub hour: u32,
}

impl CronExpression {
    pub fn daily_at(time: TimeOfDay) -> Self {
        Self { minute: time.0.minute(), hour: time.0.hour() }
    }
}

impl Display for CronExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cron({} {} * * ? *)", self.minute, self.hour)
    }
}

/// Single charge window on the device clock.
#[serde_as]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PayloadWindow {
    #[serde_as(as = "DisplayFromStr")]
    pub start: TimeOfDay,

    #[serde_as(as = "DisplayFromStr")]
    pub end: TimeOfDay,
}

impl PayloadWindow {
    pub fn from_charge_window(window: &ChargeWindow) -> Self {
        Self { start: window.start.device.time().into(), end: window.end.device.time().into() }
    }

    /// Time at which the window ends, as seen by the external scheduler.
    pub fn scheduler_end(&self, clocks: &Clocks) -> TimeOfDay {
        self.end.shifted(clocks.offset_between(Frame::Device, Frame::Scheduler))
    }
}

/// Replay input handed to the external scheduler.
#[must_use]
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub windows: Vec<PayloadWindow>,
}

impl Payload {
    pub fn from_charge_windows(windows: &[ChargeWindow]) -> Self {
        Self { windows: windows.iter().map(PayloadWindow::from_charge_window).collect() }
    }
}

impl FromStr for Payload {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("failed to parse the payload")
    }
}

#[async_trait]
pub trait Trigger: Sync {
    /// Fire `payload` daily according to `schedule`, until replaced or disarmed.
    async fn arm(&self, schedule: CronExpression, payload: &Payload) -> Result;

    async fn disarm(&self) -> Result;
}

/// Dry-run trigger which only logs the calls.
pub struct LogTrigger;

#[async_trait]
impl Trigger for LogTrigger {
    async fn arm(&self, schedule: CronExpression, payload: &Payload) -> Result {
        info!(%schedule, n_windows = payload.windows.len(), "would arm the trigger");
        Ok(())
    }

    async fn disarm(&self) -> Result {
        info!("would disarm the trigger");
        Ok(())
    }
}
