//! Committing the planned windows to the inverter and handing the rest over to the trigger.

use async_trait::async_trait;
use bon::Builder;

use crate::{
    core::{
        clock::Clocks,
        retry::RetryPolicy,
        trigger::{CronExpression, Payload, PayloadWindow, Trigger},
    },
    prelude::*,
};

/// Inverter settings involved in the AC charging.
pub mod setting {
    pub const AC_CHARGE_1_START_TIME: u32 = 64;
    pub const AC_CHARGE_1_END_TIME: u32 = 65;
    pub const AC_CHARGE_ENABLE: u32 = 66;
}

#[async_trait]
pub trait Device: Sync {
    async fn write_setting(&self, id: u32, value: &str) -> Result;

    async fn read_setting(&self, id: u32) -> Result<String>;
}

/// Dry-run device which accepts every write.
pub struct LogDevice;

#[async_trait]
impl Device for LogDevice {
    async fn write_setting(&self, id: u32, value: &str) -> Result {
        info!(id, value, "would write the setting");
        Ok(())
    }

    async fn read_setting(&self, _id: u32) -> Result<String> {
        bail!("the dry-run device cannot read settings")
    }
}

#[derive(Builder)]
pub struct Dispatcher<'a> {
    device: &'a dyn Device,
    trigger: &'a dyn Trigger,
    clocks: &'a Clocks,
    retry_policy: RetryPolicy,

    /// Skip the read-back, for the devices which cannot read.
    #[builder(default)]
    unverified: bool,
}

impl Dispatcher<'_> {
    /// Commit the first window and schedule the remaining ones.
    #[instrument(skip_all, fields(n_windows = payload.windows.len()))]
    pub async fn dispatch(&self, payload: &Payload) -> Result {
        let Some((first, rest)) = payload.windows.split_first() else {
            info!("nothing to charge, disarming the trigger…");
            return self.trigger.disarm().await.context("failed to disarm the trigger");
        };

        self.commit(first).await?;

        if rest.is_empty() {
            info!("no windows left, disarming the trigger…");
            self.trigger.disarm().await.context("failed to disarm the trigger")
        } else {
            let schedule = CronExpression::daily_at(first.scheduler_end(self.clocks));
            info!(%schedule, n_remaining = rest.len(), "arming the trigger…");
            self.trigger
                .arm(schedule, &Payload { windows: rest.to_vec() })
                .await
                .context("failed to arm the trigger")
        }
    }

    #[instrument(skip_all, fields(start = %window.start, end = %window.end))]
    async fn commit(&self, window: &PayloadWindow) -> Result {
        info!("committing the charge window…");
        let start = window.start.to_string();
        let end = window.end.to_string();
        for (id, value) in [
            (setting::AC_CHARGE_1_START_TIME, start.as_str()),
            (setting::AC_CHARGE_1_END_TIME, end.as_str()),
            (setting::AC_CHARGE_ENABLE, "true"),
        ] {
            self.write_setting(id, value).await?;
        }
        Ok(())
    }

    async fn write_setting(&self, id: u32, value: &str) -> Result {
        let device = self.device;
        if self.unverified {
            return device.write_setting(id, value).await;
        }
        let is_matched = self
            .retry_policy
            .run(move |n_attempt| async move {
                device.write_setting(id, value).await?;
                let actual = device.read_setting(id).await?;
                if actual == value {
                    Ok(true)
                } else {
                    debug!(id, n_attempt, expected = value, %actual, "read-back mismatch");
                    Ok(false)
                }
            })
            .await
            .with_context(|| format!("failed to write setting #{id}"))?;
        if !is_matched {
            warn!(
                id,
                value,
                max_attempts = self.retry_policy.max_attempts.get(),
                "the setting does not match after all attempts, continuing",
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, num::NonZeroUsize, sync::Mutex, time::Duration};

    use chrono::{FixedOffset, TimeZone, Utc};
    use chrono_tz::{Europe::London, UTC};

    use super::*;
    use crate::core::trigger::TimeOfDay;

    const POLICY: RetryPolicy =
        RetryPolicy { max_attempts: NonZeroUsize::new(3).unwrap(), delay: Duration::ZERO };

    /// In-memory inverter, optionally ignoring writes to one of the settings.
    #[derive(Default)]
    struct FakeDevice {
        settings: Mutex<HashMap<u32, String>>,
        n_writes: Mutex<usize>,
        stuck_id: Option<u32>,
    }

    #[async_trait]
    impl Device for FakeDevice {
        async fn write_setting(&self, id: u32, value: &str) -> Result {
            *self.n_writes.lock().unwrap() += 1;
            if self.stuck_id != Some(id) {
                self.settings.lock().unwrap().insert(id, value.to_string());
            }
            Ok(())
        }

        async fn read_setting(&self, id: u32) -> Result<String> {
            Ok(self.settings.lock().unwrap().get(&id).cloned().unwrap_or_default())
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Arm(String, Payload),
        Disarm,
    }

    #[derive(Default)]
    struct FakeTrigger(Mutex<Vec<Call>>);

    #[async_trait]
    impl Trigger for FakeTrigger {
        async fn arm(&self, schedule: CronExpression, payload: &Payload) -> Result {
            self.0.lock().unwrap().push(Call::Arm(schedule.to_string(), payload.clone()));
            Ok(())
        }

        async fn disarm(&self) -> Result {
            self.0.lock().unwrap().push(Call::Disarm);
            Ok(())
        }
    }

    fn clocks() -> Clocks {
        let now = Utc.with_ymd_and_hms(2024, 7, 18, 12, 0, 0).unwrap();
        Clocks::reconcile(now, FixedOffset::east_opt(0).unwrap(), &UTC, &London, &UTC)
    }

    fn window(start: &str, end: &str) -> PayloadWindow {
        PayloadWindow {
            start: start.parse::<TimeOfDay>().unwrap(),
            end: end.parse::<TimeOfDay>().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_arms_remaining() -> Result {
        let device = FakeDevice::default();
        let trigger = FakeTrigger::default();
        let clocks = clocks();
        let payload =
            Payload { windows: vec![window("05:30", "06:00"), window("22:30", "23:00")] };

        Dispatcher::builder()
            .device(&device)
            .trigger(&trigger)
            .clocks(&clocks)
            .retry_policy(POLICY)
            .build()
            .dispatch(&payload)
            .await?;

        let settings = device.settings.lock().unwrap();
        assert_eq!(settings[&setting::AC_CHARGE_1_START_TIME], "05:30");
        assert_eq!(settings[&setting::AC_CHARGE_1_END_TIME], "06:00");
        assert_eq!(settings[&setting::AC_CHARGE_ENABLE], "true");
        assert_eq!(*device.n_writes.lock().unwrap(), 3);

        // The device is an hour ahead of the scheduler in summer:
        assert_eq!(
            *trigger.0.lock().unwrap(),
            [Call::Arm(
                "cron(0 5 * * ? *)".to_string(),
                Payload { windows: vec![window("22:30", "23:00")] },
            )],
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_last_window_disarms() -> Result {
        let device = FakeDevice::default();
        let trigger = FakeTrigger::default();
        let clocks = clocks();
        Dispatcher::builder()
            .device(&device)
            .trigger(&trigger)
            .clocks(&clocks)
            .retry_policy(POLICY)
            .build()
            .dispatch(&Payload { windows: vec![window("22:30", "23:00")] })
            .await?;
        assert_eq!(device.settings.lock().unwrap().len(), 3);
        assert_eq!(*trigger.0.lock().unwrap(), [Call::Disarm]);
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_nothing() -> Result {
        let device = FakeDevice::default();
        let trigger = FakeTrigger::default();
        let clocks = clocks();
        Dispatcher::builder()
            .device(&device)
            .trigger(&trigger)
            .clocks(&clocks)
            .retry_policy(POLICY)
            .build()
            .dispatch(&Payload::default())
            .await?;
        assert!(device.settings.lock().unwrap().is_empty());
        assert_eq!(*trigger.0.lock().unwrap(), [Call::Disarm]);
        Ok(())
    }

    #[tokio::test]
    async fn test_mismatch_is_not_fatal() -> Result {
        let device = FakeDevice { stuck_id: Some(setting::AC_CHARGE_1_END_TIME), ..Default::default() };
        let trigger = FakeTrigger::default();
        let clocks = clocks();
        let payload =
            Payload { windows: vec![window("01:00", "02:00"), window("04:00", "04:30")] };
        Dispatcher::builder()
            .device(&device)
            .trigger(&trigger)
            .clocks(&clocks)
            .retry_policy(POLICY)
            .build()
            .dispatch(&payload)
            .await?;

        // One write for the start, three attempts for the end, and one for the enable flag:
        assert_eq!(*device.n_writes.lock().unwrap(), 5);
        assert_eq!(trigger.0.lock().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unverified_writes_once() -> Result {
        let trigger = FakeTrigger::default();
        let clocks = clocks();
        Dispatcher::builder()
            .device(&LogDevice)
            .trigger(&trigger)
            .clocks(&clocks)
            .retry_policy(POLICY)
            .unverified(true)
            .build()
            .dispatch(&Payload { windows: vec![window("01:00", "02:00")] })
            .await?;
        assert_eq!(*trigger.0.lock().unwrap(), [Call::Disarm]);
        Ok(())
    }

    #[tokio::test]
    async fn test_single_attempt_still_writes() -> Result {
        let device = FakeDevice::default();
        let trigger = FakeTrigger::default();
        let clocks = clocks();
        Dispatcher::builder()
            .device(&device)
            .trigger(&trigger)
            .clocks(&clocks)
            .retry_policy(RetryPolicy { max_attempts: NonZeroUsize::MIN, delay: Duration::ZERO })
            .build()
            .dispatch(&Payload { windows: vec![window("05:30", "06:00")] })
            .await?;
        assert_eq!(*device.n_writes.lock().unwrap(), 3);
        assert_eq!(device.settings.lock().unwrap()[&setting::AC_CHARGE_1_START_TIME], "05:30");
        Ok(())
    }
}
