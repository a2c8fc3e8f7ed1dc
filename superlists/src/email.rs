//! Outbound email for login links.
//!
//! Handlers talk to a [`Mailer`]; the concrete implementation is picked from `email.type` in the
//! config: SMTP or `.eml` files via lettre, or the in-memory [`Outbox`] used by tests.

use async_trait::async_trait;
use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::{path::Path, sync::Arc};
use tokio::sync::Mutex;
use url::Url;

use crate::{
    config::{EmailConfig, EmailTransportConfig},
    errors::Error,
};

pub const LOGIN_EMAIL_SUBJECT: &str = "Your login link for Superlists";

/// A message ready to hand to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub subject: String,
    pub body: String,
    pub from_email: String,
    pub to: Vec<String>,
}

impl OutboundEmail {
    /// The email carrying a login link for `to_email`.
    pub fn login_link(from_email: &str, to_email: &str, url: &Url) -> Self {
        Self {
            subject: LOGIN_EMAIL_SUBJECT.to_string(),
            body: format!("Use this link to log in:\n\n{url}"),
            from_email: from_email.to_string(),
            to: vec![to_email.to_string()],
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_mail(&self, email: &OutboundEmail) -> Result<(), Error>;
}

/// Build the mailer selected by `email.type`.
pub fn build_mailer(config: &EmailConfig) -> Result<Arc<dyn Mailer>, Error> {
    Ok(match config.transport {
        EmailTransportConfig::Memory => Arc::new(Outbox::default()),
        _ => Arc::new(EmailService::new(config)?),
    })
}

/// Sends mail through lettre.
pub struct EmailService {
    transport: EmailTransport,
    from_name: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self, Error> {
        let transport = match &config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            EmailTransportConfig::File { path } => {
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
            EmailTransportConfig::Memory => {
                return Err(Error::Internal {
                    operation: "create email service: the memory transport has no lettre backend".to_string(),
                });
            }
        };

        Ok(Self {
            transport,
            from_name: config.from_name.clone(),
        })
    }

    fn build_message(&self, email: &OutboundEmail) -> Result<Message, Error> {
        let from = format!("{} <{}>", self.from_name, email.from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::Internal {
                operation: format!("parse from email: {e}"),
            })?;

        let mut builder = Message::builder().from(from).subject(email.subject.as_str());
        for recipient in &email.to {
            let to = recipient.parse::<Mailbox>().map_err(|e| Error::Internal {
                operation: format!("parse to email: {e}"),
            })?;
            builder = builder.to(to);
        }

        builder
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| Error::Internal {
                operation: format!("build email message: {e}"),
            })
    }
}

#[async_trait]
impl Mailer for EmailService {
    #[tracing::instrument(skip_all, fields(subject = %email.subject, recipients = email.to.len()), err)]
    async fn send_mail(&self, email: &OutboundEmail) -> Result<(), Error> {
        let message = self.build_message(email)?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }
}

/// Records sent mail instead of delivering it.
#[derive(Debug, Default)]
pub struct Outbox {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl Outbox {
    /// Everything sent so far, oldest first.
    pub async fn messages(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send_mail(&self, email: &OutboundEmail) -> Result<(), Error> {
        tracing::debug!(subject = %email.subject, "Recording email in outbox");
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
