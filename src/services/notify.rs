//! Outbound e-mail: guest confirmations and admin alerts.
//!
//! Delivery is always best effort. A failed send is logged and never fails the
//! operation that triggered it.

use std::time::Duration;

use chrono::Utc;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{error, info, warn};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::models::config::ServerConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider rejected message: {0}")]
    Rejected(String),
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("cannot build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("{0} not configured")]
    NotConfigured(&'static str),
}

/// Transport picked from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmailProvider {
    Smtp,
    Resend,
    LogOnly,
}

impl EmailProvider {
    /// SMTP when requested or fully configured, then Resend when requested or
    /// keyed, otherwise log only.
    pub fn select(config: &ServerConfig) -> Self {
        let requested = config.email_provider.trim().to_lowercase();
        let smtp_ready = [&config.smtp_server, &config.smtp_user, &config.smtp_password]
            .iter()
            .all(|value| !value.trim().is_empty());

        if requested == "smtp" || smtp_ready {
            EmailProvider::Smtp
        } else if requested == "resend" || !config.resend_api_key.trim().is_empty() {
            EmailProvider::Resend
        } else {
            EmailProvider::LogOnly
        }
    }
}

/// A transport able to deliver one e-mail.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, to: &str, subject: &str, html: &str, text: &str)
    -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct ResendMessage<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Sends through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendNotifier {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl ResendNotifier {
    pub fn new(api_url: &str, api_key: &str, from: &str) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }
}

impl Notifier for ResendNotifier {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), NotifyError> {
        let message = ResendMessage {
            from: &self.from,
            to: [to],
            subject,
            html,
            text,
        };
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{status} {body}")));
        }
        Ok(())
    }
}

/// Sends through an SMTP relay upgraded with STARTTLS.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// `from` falls back to the login when blank.
    pub fn new(
        server: &str,
        port: u16,
        user: &str,
        password: &str,
        from: &str,
    ) -> Result<Self, NotifyError> {
        let (server, user, password) = (server.trim(), user.trim(), password.trim());
        if server.is_empty() || user.is_empty() || password.is_empty() {
            return Err(NotifyError::NotConfigured(
                "SMTP server, user and password",
            ));
        }
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)?
            .port(port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .timeout(Some(Duration::from_secs(15)))
            .build();
        let from: Mailbox = match from.trim() {
            "" => user.parse()?,
            from => from.parse()?,
        };
        Ok(Self { transport, from })
    }
}

impl Notifier for SmtpNotifier {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.trim().parse::<Mailbox>()?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Used when no provider is configured: only logs what would be sent.
#[derive(Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        _html: &str,
        text: &str,
    ) -> Result<(), NotifyError> {
        info!("E-mail to {to} (no provider configured): {subject}\n{text}");
        Ok(())
    }
}

/// Notifier chosen from configuration.
#[derive(Clone)]
pub enum Mailer {
    Smtp(SmtpNotifier),
    Resend(ResendNotifier),
    Log(LogNotifier),
}

impl Mailer {
    /// Build the transport [`EmailProvider::select`] picks. A provider that is
    /// requested but cannot be built degrades to log only.
    pub fn from_config(config: &ServerConfig) -> Self {
        let built = match EmailProvider::select(config) {
            EmailProvider::Smtp => SmtpNotifier::new(
                &config.smtp_server,
                config.smtp_port,
                &config.smtp_user,
                &config.smtp_password,
                &config.email_from,
            )
            .map(Mailer::Smtp),
            EmailProvider::Resend if config.resend_api_key.trim().is_empty() => {
                Err(NotifyError::NotConfigured("Resend API key"))
            }
            EmailProvider::Resend => ResendNotifier::new(
                &config.resend_api_url,
                config.resend_api_key.trim(),
                &config.email_from,
            )
            .map(Mailer::Resend),
            EmailProvider::LogOnly => Ok(Mailer::Log(LogNotifier)),
        };

        built.unwrap_or_else(|e| {
            error!("Failed to set up e-mail, falling back to log only: {e}");
            Mailer::Log(LogNotifier)
        })
    }
}

impl Notifier for Mailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), NotifyError> {
        match self {
            Mailer::Smtp(n) => n.send(to, subject, html, text).await,
            Mailer::Resend(n) => n.send(to, subject, html, text).await,
            Mailer::Log(n) => n.send(to, subject, html, text).await,
        }
    }
}

/// Try to send; returns whether the attempt succeeded.
pub async fn send_best_effort<N>(notifier: &N, to: &str, subject: &str, html: &str, text: &str) -> bool
where
    N: Notifier + ?Sized,
{
    match notifier.send(to, subject, html, text).await {
        Ok(()) => true,
        Err(e) => {
            error!("E-mail to {to} failed: {e}");
            false
        }
    }
}

/// Alert the operator. Skipped when no alert address is configured.
pub async fn send_alert<N>(notifier: &N, alert_to: &str, subject: &str, body: &str)
where
    N: Notifier + ?Sized,
{
    let alert_to = alert_to.trim();
    if alert_to.is_empty() {
        warn!("Alert address not set; skipping alert {subject:?}");
        return;
    }
    let html = format!("<pre>{}</pre>", ammonia::clean_text(body));
    if send_best_effort(notifier, alert_to, subject, &html, body).await {
        info!("Alert {subject:?} sent to {alert_to}");
    }
}

/// Send the sample message used to verify e-mail delivery.
pub async fn send_test_email<N>(notifier: &N, alert_to: &str, brand: &str) -> Result<String, NotifyError>
where
    N: Notifier + ?Sized,
{
    let subject = format!("Test email — {brand} Channel Manager");
    let html = format!(
        "<h3>{brand} Channel Manager — test email</h3>\
<p>This is a test email sent from your deployed app at {}Z</p>\
<p>If you received this, e-mail delivery is working.</p>",
        Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S")
    );
    let text = format!(
        "{brand} Channel Manager — test email\n\nIf you received this, e-mail delivery is working."
    );
    notifier.send(alert_to, &subject, &html, &text).await?;
    Ok(alert_to.to_string())
}
