use std::time::Duration;
use tracing::{error, info, instrument};

use crate::error::BotResult;
use crate::model::{failure_message, NO_NEW_STATUSES};
use crate::notifier::Notifier;
use crate::practicum::{check_response, now_timestamp, parse_status, HomeworkApi};

/// The polling loop state: where to resume from and what was last sent.
pub struct Poller {
    api: Box<dyn HomeworkApi>,
    notifier: Box<dyn Notifier>,
    retry_period: Duration,
    cursor: i64,
    prev_msg: String,
}

impl Poller {
    pub fn new(
        api: Box<dyn HomeworkApi>,
        notifier: Box<dyn Notifier>,
        retry_period: Duration,
    ) -> Self {
        Self::with_cursor(api, notifier, retry_period, now_timestamp())
    }

    pub fn with_cursor(
        api: Box<dyn HomeworkApi>,
        notifier: Box<dyn Notifier>,
        retry_period: Duration,
        cursor: i64,
    ) -> Self {
        Self {
            api,
            notifier,
            retry_period,
            cursor,
            prev_msg: String::new(),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_sent(&self) -> &str {
        &self.prev_msg
    }

    /// Fetch, validate and render the candidate message for this cycle.
    /// The cursor moves as soon as a payload arrives, even if it later
    /// fails validation.
    pub async fn poll_once(&mut self) -> BotResult<String> {
        let response = self.api.get_api_answer(self.cursor).await?;
        self.cursor = response
            .get("current_date")
            .and_then(|v| v.as_i64())
            .unwrap_or_else(now_timestamp);
        let homeworks = check_response(&response)?;
        match homeworks.first() {
            Some(latest) => parse_status(latest),
            None => Ok(NO_NEW_STATUSES.to_string()),
        }
    }

    /// Send `message` unless it repeats the last one sent.
    async fn deliver(&mut self, message: String) -> BotResult<()> {
        if message == self.prev_msg {
            info!(%message, "no change since last message");
            return Ok(());
        }
        self.notifier.send_message(&message).await?;
        self.prev_msg = message;
        Ok(())
    }

    /// One full cycle without the trailing sleep.
    ///
    /// Any failure of the cycle is reported to the chat once. An error is
    /// returned only when that report itself cannot be delivered.
    #[instrument(skip_all, fields(cursor = self.cursor))]
    pub async fn tick(&mut self) -> BotResult<()> {
        let outcome = match self.poll_once().await {
            Ok(message) => self.deliver(message).await,
            Err(err) => Err(err),
        };
        let Err(err) = outcome else {
            return Ok(());
        };

        let message = failure_message(&err);
        error!(?err, "{message}");
        if message != self.prev_msg {
            self.notifier.send_message(&message).await?;
            self.prev_msg = message;
        }
        Ok(())
    }

    /// Poll forever. The sleep runs after every cycle, including the one
    /// whose failure report could not be sent; that error then ends the
    /// loop.
    pub async fn run(&mut self) -> BotResult<()> {
        info!(period = ?self.retry_period, "starting homework polling");
        loop {
            let outcome = self.tick().await;
            tokio::time::sleep(self.retry_period).await;
            if let Err(err) = outcome {
                error!(?err, "failed to report cycle failure; stopping");
                return Err(err);
            }
        }
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("retry_period", &self.retry_period)
            .field("cursor", &self.cursor)
            .field("prev_msg", &self.prev_msg)
            .finish_non_exhaustive()
    }
}

