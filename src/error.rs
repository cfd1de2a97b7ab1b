use thiserror::Error;

pub type BotResult<T> = Result<T, BotError>;

/// Everything that can go wrong inside one polling cycle.
///
/// Display texts end up in the chat verbatim, prefixed with the failure
/// banner, so they are written for the chat's audience.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(
        "Ответ API не возвращает 200. Запрос: {request}. Код {}. Причина {reason}. Текст: {body}",
        .status.map_or_else(|| "-".to_string(), |s| s.to_string())
    )]
    InvalidResponse {
        request: String,
        status: Option<u16>,
        reason: String,
        body: String,
    },
    #[error("Ответ API не является словарём")]
    NotAMapping,
    #[error("В ответе отсутствует ключ {0}")]
    EmptyResponse(&'static str),
    #[error("homeworks не является списком")]
    NotAList,
    #[error("Отсутствует ключ {0} в ответе API")]
    MissingKey(&'static str),
    #[error("Поле {0} имеет неверный тип")]
    WrongType(&'static str),
    #[error("Неизвестный статус работы - {0}")]
    UnknownStatus(String),
    #[error("Ошибка отправки сообщения в Telegram: {0}")]
    Telegram(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BotError {
    /// Failures of the bot transport itself, as opposed to failures of the
    /// status API or its payload.
    pub fn is_telegram(&self) -> bool {
        matches!(self, BotError::Telegram(_))
    }
}
