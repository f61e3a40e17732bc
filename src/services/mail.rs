use crate::{config::Config, error::Result, models::user::User};
use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message as EmailMessage, Tokio1Executor,
};
use tracing::{debug, info, warn};

/// 邮件发送服务。所有发送都是 fire-and-forget：
/// 在独立任务里执行，失败只记日志，绝不向调用方抛错
#[derive(Clone)]
pub struct MailService {
    config: Config,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl MailService {
    pub async fn new(config: &Config) -> Result<Self> {
        let transport = if config.smtp_host.is_empty() {
            info!("SMTP not configured, outgoing mail will be logged and dropped");
            None
        } else {
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                    .port(config.smtp_port);

            if !config.smtp_username.is_empty() {
                builder = builder.credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ));
            }

            Some(builder.build())
        };

        Ok(Self {
            config: config.clone(),
            transport,
        })
    }

    /// 异步投递一封邮件，不等待结果
    pub fn send_email(&self, to: &str, subject: &str, text_body: String) {
        let from = format!("{} <{}>", self.config.smtp_from_name, self.config.smtp_from_email);
        let from = match from.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("Invalid sender address '{}': {}", from, e);
                return;
            }
        };

        let to_mailbox = match to.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("Invalid recipient address '{}': {}", to, e);
                return;
            }
        };

        let email = match EmailMessage::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .body(text_body)
        {
            Ok(email) => email,
            Err(e) => {
                warn!("Failed to build email '{}': {}", subject, e);
                return;
            }
        };

        let Some(transport) = self.transport.clone() else {
            info!("Mail transport not configured, dropping email '{}' to {}", subject, to);
            return;
        };

        let subject = subject.to_string();
        let to = to.to_string();
        tokio::spawn(async move {
            match transport.send(email).await {
                Ok(_) => debug!("Email '{}' sent to {}", subject, to),
                Err(e) => warn!("Failed to send email '{}' to {}: {}", subject, to, e),
            }
        });
    }

    pub fn send_password_reset_email(&self, user: &User, token: &str) {
        let body = format!(
            "Dear {},\n\n\
             To reset your password visit the following link:\n\n\
             {}/{}\n\n\
             If you have not requested a password reset simply ignore this message.\n\n\
             Sincerely,\n\nThe {} Team",
            user.username, self.config.password_reset_url, token, self.config.smtp_from_name
        );
        self.send_email(&user.email, "[Rainbow Microblog] Reset Your Password", body);
    }

    pub fn send_welcome_email(&self, user: &User) {
        let body = format!("Hi {},\n\nThanks for joining the journey!", user.username);
        self.send_email(&user.email, "Welcome to the Microblog!", body);
    }

    /// 导出任务完成后把归档作为正文发给用户
    pub fn send_export_email(&self, user: &User, archive_json: String) {
        let body = format!(
            "Dear {},\n\nPlease find attached the archive of your posts:\n\n{}\n\n\
             Sincerely,\n\nThe {} Team",
            user.username, archive_json, self.config.smtp_from_name
        );
        self.send_email(&user.email, "[Rainbow Microblog] Your posts", body);
    }
}
