/// Verification mail delivery.
///
/// [`SmtpMailer`] sends multipart (text + HTML) mail through an SMTP relay with
/// STARTTLS. [`LogMailer`] only logs the link and is used when SMTP is not
/// configured.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

const VERIFICATION_SUBJECT: &str = "Verify your TaskPro email";

/// Errors that can occur when sending mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build the message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Something that can deliver verification mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the verification link to `to`.
    async fn send_verification(&self, to: &str, link: &str) -> Result<(), MailError>;
}

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

/// Builds the link a user follows to verify their address.
#[must_use]
pub fn verification_link(public_base_url: &str, token: &str) -> String {
    format!("{}/verify/{}", public_base_url.trim_end_matches('/'), token)
}

fn verification_bodies(link: &str) -> (String, String) {
    let text = format!(
        "Welcome to TaskPro!\n\nTo verify your account, open the following link:\n{link}\n"
    );
    let html = format!(
        "<p>Welcome to TaskPro!</p>\
         <p>To verify your account click on the following link: \
         <b><a href=\"{link}\" target=\"_blank\">Verify email</a></b></p>"
    );
    (text, html)
}

/// Mailer backed by an SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Creates the transport. No connection is made until the first send.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host cannot be used for TLS.
    pub fn new(settings: &SmtpSettings) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(settings.username.clone(), settings.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: settings.from_address.clone(),
        })
    }

    async fn send_multipart(
        &self,
        to: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), MailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )?;

        self.transport.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, to: &str, link: &str) -> Result<(), MailError> {
        let (text, html) = verification_bodies(link);
        self.send_multipart(to, VERIFICATION_SUBJECT, text, html).await
    }
}

/// Mailer that only logs; for development without SMTP.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, to: &str, link: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, link = %link, "SMTP not configured, verification mail not sent");
        Ok(())
    }
}
