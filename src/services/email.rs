use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::{env, time::Duration};

use crate::error::AppError;

const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    send_timeout: Duration,
}

impl EmailService {
    pub fn from_env() -> Result<Self, String> {
        let host = get_env("SMTP_HOST")?;
        let port = env::var("SMTP_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(587);
        let username = get_env("SMTP_USERNAME")?;
        let password = get_env("SMTP_PASSWORD")?;
        let from_email = get_env("SMTP_FROM")?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Taskboard".to_string());
        let send_timeout = env::var("SMTP_SEND_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SEND_TIMEOUT_SECS);

        let from_address = from_email
            .parse()
            .map_err(|_| "SMTP_FROM must be a valid email address".to_string())?;
        let from = Mailbox::new(Some(from_name), from_address);
        let creds = Credentials::new(username, password);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .map_err(|e| format!("SMTP relay error: {}", e))?
            .port(port)
            .credentials(creds)
            .build();

        Ok(Self {
            mailer,
            from,
            send_timeout: Duration::from_secs(send_timeout),
        })
    }

    /// Sends a plain-text notification email. The send is bounded by the
    /// configured timeout so one slow relay cannot stall a whole scan
    /// pass.
    pub async fn send_notification(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AppError> {
        let to_address = recipient
            .parse()
            .map_err(|_| AppError::InvalidInput("Invalid recipient email".to_string()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, to_address))
            .subject(subject)
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(body.to_string()),
            )
            .map_err(|e| AppError::Delivery(format!("Email build failed: {}", e)))?;

        match tokio::time::timeout(self.send_timeout, self.mailer.send(message)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(AppError::Delivery(format!("Email send failed: {}", e))),
            Err(_) => Err(AppError::Delivery(format!(
                "Email send timed out after {}s",
                self.send_timeout.as_secs()
            ))),
        }
    }
}

fn get_env(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("Missing {}", key))
}
