use itertools::Itertools;
use serde::Serialize;

use crate::core::{clock::Stamp, scheduler::Schedule};

/// Maximal run of contiguous charging slots.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ChargeWindow {
    pub start: Stamp,
    pub end: Stamp,
}

impl ChargeWindow {
    /// Collapse the schedule's charging slots into windows.
    pub fn from_schedule(schedule: &Schedule) -> Vec<Self> {
        Self::merge(
            schedule
                .charging_slots()
                .map(|slot| Self { start: slot.times.start, end: slot.times.end }),
        )
    }

    /// Join windows which start exactly where the previous one ends.
    ///
    /// The input is expected in time order, merging already merged windows is a no-op.
    pub fn merge(windows: impl IntoIterator<Item = Self>) -> Vec<Self> {
        windows
            .into_iter()
            .coalesce(|previous, next| {
                if previous.end == next.start {
                    Ok(Self { start: previous.start, end: next.end })
                } else {
                    Err((previous, next))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
    use chrono_tz::{Europe::London, UTC};

    use super::*;
    use crate::{
        core::{
            clock::Clocks,
            scheduler::{BatteryLimits, Scheduler},
            slot::SlotTimes,
        },
        quantity::{energy::KilowattHours, rate::KilowattHourRate},
    };

    fn since() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 18, 22, 0, 0).unwrap()
    }

    fn clocks() -> Clocks {
        Clocks::reconcile(since(), FixedOffset::east_opt(0).unwrap(), &UTC, &London, &UTC)
    }

    fn window(start_slot: i64, end_slot: i64) -> ChargeWindow {
        let clocks = clocks();
        ChargeWindow {
            start: clocks.stamp(since() + TimeDelta::minutes(30 * start_slot)),
            end: clocks.stamp(since() + TimeDelta::minutes(30 * end_slot)),
        }
    }

    #[test]
    fn test_merge() {
        let windows =
            ChargeWindow::merge([window(0, 1), window(1, 2), window(4, 5), window(5, 6), window(7, 8)]);
        assert_eq!(windows, [window(0, 2), window(4, 6), window(7, 8)]);
    }

    #[test]
    fn test_merge_idempotent() {
        let once = ChargeWindow::merge([window(0, 1), window(1, 2), window(3, 4)]);
        let twice = ChargeWindow::merge(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_empty() {
        assert!(ChargeWindow::merge(Vec::<ChargeWindow>::new()).is_empty());
    }

    #[test]
    fn test_from_schedule() {
        let clocks = clocks();
        let prices = SlotTimes::half_hours(&clocks, since(), 4)
            .zip([-1.0, -1.0, 5.0, -1.0])
            .map(|(times, price)| (times, KilowattHourRate(price)))
            .collect::<Vec<_>>();
        let schedule = Scheduler::builder()
            .prices(&prices)
            .net_energy(&[KilowattHours::ZERO; 4])
            .battery(
                BatteryLimits::builder()
                    .remaining(KilowattHours(5.0))
                    .capacity(KilowattHours(5.0))
                    .lowest_threshold(KilowattHours(1.0))
                    .charge_per_slot(KilowattHours(1.0))
                    .build(),
            )
            .schedule();
        assert_eq!(ChargeWindow::from_schedule(&schedule), [window(0, 2), window(3, 4)]);
    }

    #[test]
    fn test_window_frames() {
        let window = window(0, 3);
        assert_eq!(window.start.device.format("%H:%M").to_string(), "23:00");
        assert_eq!(window.end.device.format("%H:%M").to_string(), "00:30");
        assert_eq!(window.end.scheduler.format("%H:%M").to_string(), "23:30");
    }
}
