//! SMTP mailer using lettre's async tokio transport.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use notif_core::domain::OutgoingEmail;
use notif_core::ports::{DispatchError, Mailer};

use super::{SmtpEncryption, SmtpSettings};

/// Mailer that relays every message through one configured SMTP server.
///
/// Each send is a single attempt bounded by the transport timeout.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
    port: u16,
    debug: u8,
}

impl SmtpMailer {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(settings: &SmtpSettings) -> Result<Self, DispatchError> {
        let builder = match settings.encryption {
            SmtpEncryption::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host),
            SmtpEncryption::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            }
        }
        .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let mut builder = builder
            .port(settings.port)
            .timeout(Some(settings.timeout));
        if settings.auth {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        }

        let from = Mailbox::new(
            Some(settings.from_name.clone()),
            parse_address(&settings.from_email)?,
        );

        Ok(Self {
            transport: builder.build(),
            from,
            host: settings.host.clone(),
            port: settings.port,
            debug: settings.debug,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DispatchError> {
        let message = build_message(&self.from, email)?;

        if self.debug > 0 {
            tracing::debug!(
                relay = %self.host,
                port = self.port,
                recipient = %email.recipient.rate_limit_key(),
                "Opening SMTP session"
            );
        }

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        if self.debug >= 3 {
            let lines: Vec<&str> = response.message().collect();
            tracing::debug!(code = %response.code(), response = ?lines, "SMTP server accepted message");
        } else if self.debug > 0 {
            tracing::debug!(code = %response.code(), "SMTP server accepted message");
        }

        Ok(())
    }
}

fn parse_address(raw: &str) -> Result<Address, DispatchError> {
    raw.parse::<Address>()
        .map_err(|e| DispatchError::InvalidAddress {
            address: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Assemble a multipart/alternative message with text and HTML bodies.
fn build_message(from: &Mailbox, email: &OutgoingEmail) -> Result<Message, DispatchError> {
    let to = Mailbox::new(None, parse_address(email.recipient.as_str())?);

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))
        .map_err(|e| DispatchError::Build(e.to_string()))
}
