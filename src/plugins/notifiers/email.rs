use crate::config::SmtpConfig;
use crate::plugins::traits::{NotificationEvent, Notifier};
use crate::utils::error::NotifyError;
use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sends alerts as plain-text mail, one message per event with every
/// recipient on the `To` line.
pub struct EmailNotifier {
    sender: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
                .map_err(|e| NotifyError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };

        let mut builder = builder.port(config.port);
        if !config.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            sender: config.sender().to_string(),
            mailer: builder.build(),
        })
    }

    fn build_message(&self, event: &NotificationEvent) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.sender)?)
            .subject(event.subject.clone())
            .header(header::ContentType::TEXT_PLAIN);

        for recipient in &event.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .body(event.body.clone())
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| NotifyError::Address {
        address: address.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let message = self.build_message(event)?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(())
    }
}
