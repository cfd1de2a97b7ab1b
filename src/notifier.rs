use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{debug, info, instrument};

use crate::config::Credentials;
use crate::error::{BotError, BotResult};

/// Delivers text messages to the single configured chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> BotResult<()>;
}

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat: Recipient) -> Self {
        Self { bot, chat }
    }

    pub fn from_credentials(creds: &Credentials) -> Self {
        Self::new(Bot::new(creds.telegram_token.clone()), creds.chat_recipient())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip_all)]
    async fn send_message(&self, text: &str) -> BotResult<()> {
        debug!(chat = ?self.chat, "sending status to telegram");
        self.bot
            .send_message(self.chat.clone(), text)
            .await
            .map_err(|e| BotError::Telegram(Box::new(e)))?;
        info!("status sent to telegram");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::ChatId;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn api_failure_surfaces_as_telegram_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let bot = Bot::new("123:abc").set_api_url(reqwest::Url::parse(&server.uri()).unwrap());
        let notifier = TelegramNotifier::new(bot, Recipient::Id(ChatId(42)));
        let err = notifier.send_message("hello").await.unwrap_err();
        assert!(err.is_telegram());
        assert!(err.to_string().starts_with("Ошибка отправки сообщения в Telegram"));
    }

    #[tokio::test]
    async fn unreachable_api_surfaces_as_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = reqwest::Url::parse(&format!("http://{addr}/")).unwrap();

        let bot = Bot::new("123:abc").set_api_url(url);
        let notifier = TelegramNotifier::new(bot, Recipient::Id(ChatId(42)));
        let err = notifier.send_message("hello").await.unwrap_err();
        let BotError::Telegram(source) = &err else {
            panic!("wrong error kind: {err:?}");
        };
        let request_err = source
            .downcast_ref::<teloxide::RequestError>()
            .expect("wraps the bot request error");
        assert!(
            matches!(request_err, teloxide::RequestError::Network(_)),
            "unexpected: {request_err:?}"
        );
    }
}
