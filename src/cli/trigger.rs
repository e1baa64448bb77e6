use clap::Parser;
use reqwest::Url;

use crate::{
    api::webhook::Webhook,
    core::trigger::{LogTrigger, Trigger},
    prelude::*,
};

#[derive(Parser)]
pub struct TriggerArgs {
    /// Webhook of the external scheduler which replays the remaining windows.
    #[clap(long = "trigger-url", env = "TRIGGER_URL")]
    pub url: Option<Url>,
}

impl TriggerArgs {
    pub fn new_trigger(&self, scout: bool) -> Result<Box<dyn Trigger>> {
        match &self.url {
            Some(url) if !scout => Ok(Box::new(Webhook::new(url.clone())?)),
            Some(_) => Ok(Box::new(LogTrigger)),
            None => {
                warn!("no trigger URL is configured, the remaining windows will only be logged");
                Ok(Box::new(LogTrigger))
            }
        }
    }
}
