use sendgrid::{Destination, Mail, SGClient};
use std::env;
use tracing::{error, info, warn};

/// SendGrid-backed mail sender. Without an API key it runs in mock mode and
/// only logs, so local setups work without credentials.
#[derive(Clone)]
pub struct Mailer {
    sendgrid_client: Option<SGClient>,
    email_from: String,
}

impl Mailer {
    pub fn new() -> Self {
        let sendgrid_api_key = env::var("TWILIO_SENDGRID_API_KEY").ok();
        let email_from = env::var("NOTIFICATION_EMAIL_FROM")
            .unwrap_or_else(|_| "friends@ecotrack.app".to_string());

        let sendgrid_client = sendgrid_api_key.map(SGClient::new);
        if sendgrid_client.is_none() {
            warn!("⚠️ SendGrid API key not found. Email notifications will be mocked.");
        }

        Self {
            sendgrid_client,
            email_from,
        }
    }

    pub async fn send_email(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), String> {
        if let Some(client) = &self.sendgrid_client {
            // Must own data to move into the blocking task
            let to_email = to_email.to_string();
            let to_name = to_name.to_string();
            let subject = subject.to_string();
            let body = body.to_string();
            let email_from = self.email_from.clone();
            let client = client.clone();
            let to_email_log = to_email.clone();

            match tokio::task::spawn_blocking(move || {
                let mail_info = Mail::new()
                    .add_to(Destination {
                        address: &to_email,
                        name: &to_name,
                    })
                    .add_from(&email_from)
                    .add_subject(&subject)
                    .add_html(&body);

                client.send(mail_info)
            })
            .await
            {
                Ok(result) => match result {
                    Ok(_) => {
                        info!("✅ Email sent successfully to {}", to_email_log);
                        crate::metrics::increment_notifications_sent("email");
                        Ok(())
                    }
                    Err(e) => {
                        error!("❌ Failed to send email: {}", e);
                        crate::metrics::increment_notifications_failed("email");
                        Err(format!("SendGrid Error: {}", e))
                    }
                },
                Err(e) => Err(format!("Task Join Error: {}", e)),
            }
        } else {
            // Mock mode
            info!("(Mock) 📧 Would send email to: {}", to_email);
            info!("(Mock) Subject: {}", subject);
            crate::metrics::increment_notifications_sent("email");
            Ok(())
        }
    }
}
