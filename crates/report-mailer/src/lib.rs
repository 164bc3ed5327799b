use async_trait::async_trait;
use brief_core::{DeliveryError, Report, ReportSink};
use lettre::{
    message::{
        header::ContentType, Attachment as MessageAttachment, Mailbox, MultiPart, SinglePart,
    },
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Delivery settings for the outbound mail session.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

/// Delivers built reports over SMTP with STARTTLS.
pub struct ReportMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl ReportMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| DeliveryError::Config(format!("Invalid sender address: {}", e)))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| DeliveryError::Config(format!("Invalid recipient address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DeliveryError::Smtp(format!("SMTP transport error: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn build_message(&self, report: &Report) -> Result<Message, DeliveryError> {
        let mut body = MultiPart::mixed().singlepart(SinglePart::html(report.html_body.clone()));

        for attachment in &report.attachments {
            let content_type = ContentType::parse("text/csv")
                .map_err(|e| DeliveryError::Message(format!("Invalid content type: {}", e)))?;
            body = body.singlepart(
                MessageAttachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type),
            );
        }

        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(report.subject.clone())
            .multipart(body)
            .map_err(|e| DeliveryError::Message(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl ReportSink for ReportMailer {
    async fn deliver(&self, report: &Report) -> Result<(), DeliveryError> {
        let email = self.build_message(report)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DeliveryError::Smtp(format!("Failed to send email: {}", e)))?;

        tracing::info!("Report submitted to {}", self.to);
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
