use serde::{Deserialize, Serialize};

use super::Alert;
use crate::core::monitor::events::TIME_FORMAT;

pub const DEFAULT_SUBJECT: &str = "Device Unresponsive Alert";
pub const DEFAULT_BODY: &str = "Device with MAC {MacAddress} and IP {IpAddress} has become unresponsive for more than {Threshold} seconds at {Time}.";

/// Subject, recipients and body used to render an alert.
///
/// The body understands `{IpAddress}`, `{MacAddress}`, `{Time}`,
/// `{Downtime}` and `{Threshold}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTemplate {
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Comma-separated list, as typed by the user
    #[serde(default)]
    pub recipients: String,
    #[serde(default = "default_body")]
    pub body: String,
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

fn default_body() -> String {
    DEFAULT_BODY.to_string()
}

impl Default for AlertTemplate {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            recipients: String::new(),
            body: default_body(),
        }
    }
}

/// A fully rendered alert ready for a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedAlert {
    pub subject: String,
    pub recipients: Vec<String>,
    pub body: String,
}

impl AlertTemplate {
    pub fn recipient_list(&self) -> Vec<String> {
        self.recipients
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn render(&self, alert: &Alert) -> RenderedAlert {
        let body = self
            .body
            .trim()
            .replace("{IpAddress}", &alert.address)
            .replace("{MacAddress}", &alert.identifier)
            .replace("{Time}", &alert.at.format(TIME_FORMAT).to_string())
            .replace(
                "{Downtime}",
                &format!("{:.1}", alert.downtime.as_secs_f64()),
            )
            .replace("{Threshold}", &format_secs(alert.threshold.as_secs_f64()));

        RenderedAlert {
            subject: self.subject.clone(),
            recipients: self.recipient_list(),
            body,
        }
    }
}

/// Whole seconds without a fraction, otherwise one decimal
fn format_secs(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as u64)
    } else {
        format!("{:.1}", secs)
    }
}
