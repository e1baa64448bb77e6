//! External scheduler reached through a webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::{
    core::trigger::{CronExpression, Payload, Trigger},
    prelude::*,
};

pub struct Webhook {
    client: Client,
    url: Url,
}

impl Webhook {
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder().user_agent("kestrel").timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, url })
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(state = ?request.state))]
    async fn put_rule(&self, request: &PutRuleRequest) -> Result {
        self.client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .with_context(|| format!("failed to call `{}`", self.url))?
            .error_for_status()
            .context("the scheduler rejected the rule")?;
        Ok(())
    }
}

#[async_trait]
impl Trigger for Webhook {
    #[instrument(skip_all, fields(schedule = %schedule))]
    async fn arm(&self, schedule: CronExpression, payload: &Payload) -> Result {
        info!(n_windows = payload.windows.len(), "arming…");
        let request = PutRuleRequest {
            schedule_expression: Some(schedule.to_string()),
            state: RuleState::Enabled,
            input: Some(serde_json::to_string(payload)?),
        };
        self.put_rule(&request).await
    }

    #[instrument(skip_all)]
    async fn disarm(&self) -> Result {
        info!("disarming…");
        let request = PutRuleRequest { schedule_expression: None, state: RuleState::Disabled, input: None };
        self.put_rule(&request).await
    }
}

#[derive(Serialize)]
struct PutRuleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule_expression: Option<String>,

    state: RuleState,

    /// Replay payload as a JSON string.
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<String>,
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum RuleState {
    Enabled,
    Disabled,
}
