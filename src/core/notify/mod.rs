//! Delivery of downtime alerts.

mod email;
mod template;
mod webhook;

pub use email::{EmailNotifier, SmtpConfig, DEFAULT_SMTP_PORT};
pub use template::{AlertTemplate, RenderedAlert, DEFAULT_BODY, DEFAULT_SUBJECT};
pub use webhook::WebhookNotifier;

use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Duration;

use crate::error::Result;

/// Everything a notifier needs, copied out of the monitor's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub address: String,
    pub identifier: String,
    pub downtime: Duration,
    pub threshold: Duration,
    pub at: DateTime<Local>,
}

/// Transport for downtime alerts.
///
/// Called at most once per outage per device. Errors are logged by the
/// monitor and never retried.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<()>;
}

/// Writes rendered alerts to the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    template: AlertTemplate,
}

impl LogNotifier {
    pub fn new(template: AlertTemplate) -> Self {
        Self { template }
    }
}

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let rendered = self.template.render(alert);
        if rendered.recipients.is_empty() {
            log::warn!("ALERT {}: {}", rendered.subject, rendered.body);
        } else {
            log::warn!(
                "ALERT {} (to {}): {}",
                rendered.subject,
                rendered.recipients.join(", "),
                rendered.body
            );
        }
        Ok(())
    }
}
