//! HTTP webhook transport.

use serde::Serialize;
use std::time::Duration;

use super::{Alert, AlertTemplate, Notifier};
use crate::error::{MonitorError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON body posted to the webhook
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    recipients: &'a [String],
    body: &'a str,
    /// Plain-text field understood by chat webhooks
    content: String,
    address: &'a str,
    identifier: &'a str,
    downtime_secs: f64,
    timestamp: String,
}

/// POSTs each alert as JSON to a URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    template: AlertTemplate,
}

impl WebhookNotifier {
    pub fn new<S: Into<String>>(url: S, template: AlertTemplate) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(MonitorError::config(format!(
                "webhook URL must start with http:// or https://, got '{}'",
                url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("uptime-monitor/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url,
            template,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let rendered = self.template.render(alert);
        let payload = WebhookPayload {
            subject: &rendered.subject,
            recipients: &rendered.recipients,
            body: &rendered.body,
            content: format!("{}: {}", rendered.subject, rendered.body),
            address: &alert.address,
            identifier: &alert.identifier,
            downtime_secs: alert.downtime.as_secs_f64(),
            timestamp: alert.at.to_rfc3339(),
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(MonitorError::notification(format!(
                "webhook returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}
