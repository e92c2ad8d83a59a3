// src/app.rs
//! Wires the stores and simulated services together from one configuration

use crate::app_log;
use crate::core::{open_or_memory, ConfigManager, SharedStorage};
use crate::locale::LocaleStore;
use crate::notification::{MessageSource, MockMessageSource, NotificationStore};
use crate::ports::{FixedDelayResumeParser, FixedDelaySubmitter};
use crate::session::SessionStore;

pub struct App {
    pub config: ConfigManager,
    pub session: SessionStore,
    pub notifications: NotificationStore,
    pub locale: LocaleStore,
}

impl App {
    /// Open the configured storage (in-memory when it cannot be opened) and
    /// restore the persisted stores from it.
    pub fn new(config: ConfigManager) -> Self {
        let storage = open_or_memory(&config.storage.path);
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: ConfigManager, storage: SharedStorage) -> Self {
        let session = SessionStore::initialize(storage.clone());
        let locale = LocaleStore::initialize(storage);
        let notifications = NotificationStore::new(config.simulation.retry_policy());

        app_log!(
            info,
            "App ready: environment={}, authenticated={}, language={}",
            config.environment,
            session.is_authenticated(),
            locale.language()
        );

        Self {
            config,
            session,
            notifications,
            locale,
        }
    }

    pub fn resume_parser(&self) -> FixedDelayResumeParser {
        FixedDelayResumeParser::new(self.config.simulation.upload_step_delay())
    }

    pub fn submitter(&self) -> FixedDelaySubmitter {
        FixedDelaySubmitter::new(self.config.simulation.submit_delay())
    }

    pub fn demo_source(&self) -> MockMessageSource {
        MockMessageSource::new(self.config.simulation.fetch_delay())
    }

    /// Populate the notification store; a failed fetch leaves it empty.
    pub async fn load_messages(&mut self, source: &dyn MessageSource) -> usize {
        match self.notifications.load(source).await {
            Ok(count) => count,
            Err(e) => {
                app_log!(error, "Could not load messages: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryStorage;
    use crate::locale::Language;
    use std::path::Path;

    fn test_config() -> ConfigManager {
        let mut config = ConfigManager::with_defaults("local", Path::new("/tmp"));
        config.simulation.upload_step_delay_ms = 0;
        config.simulation.submit_delay_ms = 0;
        config.simulation.fetch_delay_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_stores_share_one_storage() {
        let storage = MemoryStorage::shared();
        let mut app = App::with_storage(test_config(), storage.clone());

        app.session.login("bob@example.com", "secret");
        app.locale.change_language("en");
        let source = app.demo_source();
        assert_eq!(app.load_messages(&source).await, 5);
        assert_eq!(app.notifications.unread_count(), 3);

        let reopened = App::with_storage(test_config(), storage);
        assert!(reopened.session.is_authenticated());
        assert_eq!(reopened.locale.language(), Language::En);
        assert!(reopened.notifications.messages().is_empty());
    }

    #[test]
    fn test_file_backed_app_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.storage.path = dir.path().join("storage.json");

        let mut app = App::new(config.clone());
        app.session.login("carol@example.com", "pw");
        drop(app);

        let app = App::new(config);
        assert_eq!(
            app.session.user().map(|u| u.name.as_str()),
            Some("carol")
        );
    }
}
