use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::error::TelegramError;
use crate::handlers::intake::{IntakeHandler, Outcome};
use crate::services::telegram::TelegramBot;

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Clears any webhook so polling is allowed and looks up the bot's own
/// username. Neither failure is fatal: a missing username only turns mention
/// detection off.
pub async fn bootstrap(bot: &TelegramBot) -> Option<String> {
    match bot.delete_webhook().await {
        Ok(()) => tracing::info!("Deleted existing Telegram webhook (if any)"),
        Err(e) => tracing::warn!(error = %e, "Could not delete webhook"),
    }

    match bot.get_me().await {
        Ok(me) => {
            tracing::info!(username = ?me.username, "Connected to Telegram");
            me.username
        }
        Err(e) => {
            tracing::warn!(error = %e, "getMe failed, mention detection disabled");
            None
        }
    }
}

/// Long-polls `getUpdates` and hands each update to its own task.
pub struct Poller {
    bot: Arc<TelegramBot>,
    handler: IntakeHandler,
    offset: Option<i64>,
    tasks: JoinSet<Outcome>,
}

impl Poller {
    pub fn new(bot: Arc<TelegramBot>, handler: IntakeHandler) -> Self {
        Self {
            bot,
            handler,
            offset: None,
            tasks: JoinSet::new(),
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting polling loop");
        loop {
            if let Err(e) = self.poll_once().await {
                tracing::warn!(error = %e, "getUpdates failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
            }
            self.reap();
        }
    }

    /// Fetches one batch, advances the offset past it and spawns a handler per
    /// update. Returns how many updates were dispatched.
    pub async fn poll_once(&mut self) -> Result<usize, TelegramError> {
        let updates = self.bot.get_updates(self.offset).await?;
        let count = updates.len();
        for update in updates {
            self.offset = Some(update.update_id + 1);
            let handler = self.handler.clone();
            self.tasks.spawn(async move { handler.handle_update(update, Instant::now()).await });
        }
        Ok(count)
    }

    fn reap(&mut self) {
        while let Some(done) = self.tasks.try_join_next() {
            if let Err(e) = done {
                tracing::error!(error = %e, "Message task failed");
            }
        }
    }

    #[cfg(test)]
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Waits for every spawned handler to finish.
    #[cfg(test)]
    pub async fn drain(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Some(done) = self.tasks.join_next().await {
            match done {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!(error = %e, "Message task failed"),
            }
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThinkDelay;
    use crate::handlers::intake::DropReason;
    use crate::services::reply::tests::ScriptedGenerator;
    use crate::services::reply::ReplyGenerator;
    use crate::state::AppState;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn bootstrap_returns_username() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/deleteWebhook"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bott/getMe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"id": 1, "is_bot": true, "first_name": "Olivia", "username": "olivia_bot"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let bot = TelegramBot::new(&server.uri(), "t").unwrap();
        assert_eq!(bootstrap(&bot).await.as_deref(), Some("olivia_bot"));
    }

    #[tokio::test]
    async fn bootstrap_survives_api_refusals() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/deleteWebhook"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "ok": false, "error_code": 401, "description": "Unauthorized"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bott/getMe"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "ok": false, "error_code": 401, "description": "Unauthorized"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let bot = TelegramBot::new(&server.uri(), "t").unwrap();
        assert_eq!(bootstrap(&bot).await, None);
    }

    #[tokio::test]
    async fn dispatches_batch_and_advances_offset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {"update_id": 100, "message": {"message_id": 1, "chat": {"id": 8, "type": "group"},
                        "from": {"id": 1, "first_name": "Leo"}, "text": "/start"}},
                    {"update_id": 101, "message": {"message_id": 2, "chat": {"id": 8, "type": "group"},
                        "from": {"id": 1, "first_name": "Leo"}, "text": "hi olivia"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bott/sendMessage"))
            .and(body_json(serde_json::json!({"chat_id": 8, "text": "hey Leo!"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "result": {"message_id": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let bot = Arc::new(TelegramBot::new(&server.uri(), "t").unwrap());
        let handler = IntakeHandler::new(
            AppState::new(5, Duration::from_secs(3)),
            ReplyGenerator::new(Arc::new(ScriptedGenerator::replying(&["hey Leo!"])), "persona"),
            bot.clone(),
            ThinkDelay::DISABLED,
            None,
        );
        let mut poller = Poller::new(bot, handler);

        assert_eq!(poller.poll_once().await.unwrap(), 2);
        assert_eq!(poller.offset(), Some(102));

        let mut outcomes = poller.drain().await;
        outcomes.sort_by_key(|o| matches!(o, Outcome::Replied(_)));
        assert_eq!(
            outcomes,
            vec![Outcome::Dropped(DropReason::Command), Outcome::Replied("hey Leo!".into())]
        );
    }

    #[tokio::test]
    async fn failed_poll_keeps_offset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bott/getUpdates"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Conflict: can't use getUpdates method while webhook is active"
            })))
            .mount(&server)
            .await;

        let bot = Arc::new(TelegramBot::new(&server.uri(), "t").unwrap());
        let handler = IntakeHandler::new(
            AppState::new(5, Duration::from_secs(3)),
            ReplyGenerator::new(Arc::new(ScriptedGenerator::default()), "persona"),
            bot.clone(),
            ThinkDelay::DISABLED,
            None,
        );
        let mut poller = Poller::new(bot, handler);

        assert!(poller.poll_once().await.is_err());
        assert_eq!(poller.offset(), None);
    }
}
