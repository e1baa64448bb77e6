//! Reconciling the clocks of the parties involved in a planning pass.
//!
//! Every instant is expressed as a wall-clock time in four frames:
//!
//! - the local clock of the machine running the planner,
//! - the clock of the pricing service,
//! - the clock of the inverter,
//! - the clock of the external scheduler that replays the remaining windows.
//!
//! The offsets are resolved once, at the start of the pass, and stay fixed afterwards.

use std::fmt::{Debug, Formatter};

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Frame {
    Local,
    Price,
    Device,
    Scheduler,
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Clocks {
    local: FixedOffset,
    price: FixedOffset,
    device: FixedOffset,
    scheduler: FixedOffset,
}

impl Clocks {
    /// Resolve the frame offsets as of `now`.
    pub fn reconcile<P: TimeZone, D: TimeZone, S: TimeZone>(
        now: DateTime<Utc>,
        local: FixedOffset,
        price: &P,
        device: &D,
        scheduler: &S,
    ) -> Self {
        Self {
            local,
            price: now.with_timezone(price).offset().fix(),
            device: now.with_timezone(device).offset().fix(),
            scheduler: now.with_timezone(scheduler).offset().fix(),
        }
    }

    const fn offset(&self, frame: Frame) -> FixedOffset {
        match frame {
            Frame::Local => self.local,
            Frame::Price => self.price,
            Frame::Device => self.device,
            Frame::Scheduler => self.scheduler,
        }
    }

    /// Offset to add to a wall-clock time in `from` to get the wall-clock time in `to`.
    pub fn offset_between(&self, from: Frame, to: Frame) -> TimeDelta {
        TimeDelta::seconds(i64::from(
            self.offset(to).local_minus_utc() - self.offset(from).local_minus_utc(),
        ))
    }

    /// Whole-hour offset from the local clock to the specified frame.
    pub fn offset_hours(&self, frame: Frame) -> i64 {
        self.offset_between(Frame::Local, frame).num_hours()
    }

    pub fn wall_clock(&self, at: DateTime<Utc>, frame: Frame) -> NaiveDateTime {
        at.with_timezone(&self.offset(frame)).naive_local()
    }

    pub fn stamp(&self, at: DateTime<Utc>) -> Stamp {
        Stamp {
            utc: at,
            local: self.wall_clock(at, Frame::Local),
            price: self.wall_clock(at, Frame::Price),
            device: self.wall_clock(at, Frame::Device),
            scheduler: self.wall_clock(at, Frame::Scheduler),
        }
    }
}

/// The same instant as seen by every clock.
#[derive(Copy, Clone, Eq, PartialEq, Serialize)]
pub struct Stamp {
    pub utc: DateTime<Utc>,
    pub local: NaiveDateTime,
    pub price: NaiveDateTime,
    pub device: NaiveDateTime,
    pub scheduler: NaiveDateTime,
}

impl Stamp {
    pub const fn get(&self, frame: Frame) -> NaiveDateTime {
        match frame {
            Frame::Local => self.local,
            Frame::Price => self.price,
            Frame::Device => self.device,
            Frame::Scheduler => self.scheduler,
        }
    }
}

impl Debug for Stamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.local.format("%Y-%m-%d %H:%M"))
    }
}
