//! OTP delivery.
//!
//! Login codes go out over SMTP. Environments without SMTP credentials get
//! the logging implementation so the auth flow stays usable in development.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::EmailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to: &str, otp: &str, ttl_minutes: i64) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: format!("{} <{}>", config.from_name, config.smtp_username),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, to: &str, otp: &str, ttl_minutes: i64) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject("Login OTP")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your OTP for login is: {otp}. This OTP will expire in {ttl_minutes} minutes."
            ))?;

        self.transport.send(email).await?;
        Ok(())
    }
}

/// Logs the OTP instead of sending it. Used when no SMTP config is present,
/// and in tests.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, otp: &str, _ttl_minutes: i64) -> anyhow::Result<()> {
        info!(recipient = %to, otp = %otp, "SMTP not configured; OTP logged instead of emailed");
        Ok(())
    }
}
