use std::num::NonZeroUsize;

use clap::Parser;

use crate::core::retry::RetryPolicy;

#[derive(Parser)]
pub struct DeviceArgs {
    /// Number of write attempts per setting before giving up on the read-back match.
    #[clap(long = "device-max-attempts", env = "DEVICE_MAX_ATTEMPTS", default_value = "3")]
    max_attempts: NonZeroUsize,

    /// Delay before re-issuing a mismatched setting.
    #[clap(long = "device-retry-delay", env = "DEVICE_RETRY_DELAY", default_value = "5s")]
    retry_delay: humantime::Duration,
}

impl DeviceArgs {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy { max_attempts: self.max_attempts, delay: self.retry_delay.into() }
    }
}
