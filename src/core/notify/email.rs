//! SMTP email transport.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Alert, AlertTemplate, Notifier};
use crate::error::{MonitorError, Result};

/// Submission port with STARTTLS
pub const DEFAULT_SMTP_PORT: u16 = 587;

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Mail server settings stored in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sender address, e.g. `Monitor <monitor@example.com>`
    pub from: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS; only disable for local relays
    #[serde(default = "default_starttls")]
    pub starttls: bool,
}

fn default_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_starttls() -> bool {
    true
}

impl SmtpConfig {
    pub fn new<H: Into<String>, F: Into<String>>(host: H, from: F) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SMTP_PORT,
            from: from.into(),
            username: None,
            password: None,
            starttls: true,
        }
    }
}

/// Mails each alert to the template's recipients.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    config: SmtpConfig,
    from: Mailbox,
    template: AlertTemplate,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig, template: AlertTemplate) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(MonitorError::config("SMTP host must not be empty"));
        }
        let from = config.from.parse::<Mailbox>().map_err(|e| {
            MonitorError::config(format!("invalid sender address '{}': {}", config.from, e))
        })?;

        Ok(Self {
            config,
            from,
            template,
        })
    }

    fn build_message(&self, alert: &Alert) -> Result<Message> {
        let rendered = self.template.render(alert);
        if rendered.recipients.is_empty() {
            return Err(MonitorError::notification(
                "no recipients specified for email notification",
            ));
        }

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(rendered.subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in &rendered.recipients {
            let mailbox = recipient.parse::<Mailbox>().map_err(|e| {
                MonitorError::notification(format!("invalid recipient '{}': {}", recipient, e))
            })?;
            builder = builder.to(mailbox);
        }

        builder
            .body(rendered.body)
            .map_err(|e| MonitorError::notification(format!("failed to build email: {}", e)))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if self.config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
        };

        let mut builder = builder
            .port(self.config.port)
            .timeout(Some(SEND_TIMEOUT));

        if let (Some(user), Some(password)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let message = self.build_message(alert)?;
        let mailer = self.transport()?;
        mailer.send(message).await?;

        log::info!(
            "Email alert for {} sent via {}:{}",
            alert.address,
            self.config.host,
            self.config.port
        );
        Ok(())
    }
}
