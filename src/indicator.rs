//! The panel indicator: menu wiring, sync and configuration flows.
//!
//! One `Indicator` is built when the host starts and dropped (via
//! [`Indicator::shutdown`]) when it tears down. It owns the config store,
//! the background task channel and the host shell; nothing is global.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::api::{IssueSearchResult, JiraClient, DEFAULT_TIMEOUT, MAX_RESULTS};
use crate::config::{ConfigStore, Credentials};
use crate::error::{AppError, Result};
use crate::shell::{MenuAction, Shell, INDICATOR_TITLE};
use crate::tasks::{self, SyncMessage, TaskSpawner};

/// Status line shown before the first sync.
pub const STATUS_IDLE: &str = "Status: idle";

/// Owns everything the indicator needs for its lifetime.
pub struct Indicator<S: Shell> {
    store: ConfigStore,
    shell: S,
    spawner: TaskSpawner,
    rx: mpsc::UnboundedReceiver<SyncMessage>,
    timeout: Duration,
    /// Id of the most recent sync; older results are stale.
    latest_request: Option<u64>,
}

impl<S: Shell> Indicator<S> {
    /// Build the indicator and register its menu in `shell`.
    pub fn new(store: ConfigStore, mut shell: S) -> Self {
        for action in MenuAction::ALL {
            shell.add_menu_action(action.label(), action);
        }
        shell.set_status(STATUS_IDLE);

        let (spawner, rx) = tasks::channel();
        info!(config = %store.path().display(), "Indicator started");

        Self {
            store,
            shell,
            spawner,
            rx,
            timeout: DEFAULT_TIMEOUT,
            latest_request: None,
        }
    }

    /// Use `timeout` for every Jira request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.spawner = self.spawner.with_timeout(timeout);
        self.timeout = timeout;
        self
    }

    /// The host shell.
    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Mutable access to the host shell, for the host's own event loop.
    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    /// The config store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Run a menu action to completion.
    ///
    /// Failures are already shown to the user when this returns `Err`.
    pub async fn activate(&mut self, action: MenuAction) -> Result<()> {
        debug!(?action, "Menu action activated");
        match action {
            MenuAction::SyncWithJira => self.sync().await.map(|_| ()),
            MenuAction::ConfigureJira => self.configure().map(|_| ()),
        }
    }

    /// Open the credential form and save the submission.
    ///
    /// Returns `Ok(false)` if the user cancelled. Invalid input is reported
    /// and the existing file is left untouched.
    #[instrument(skip(self))]
    pub fn configure(&mut self) -> Result<bool> {
        let current = self.store.load();
        let Some(submitted) = self.shell.open_config_form(current.as_ref()) else {
            info!("Configuration cancelled");
            self.shell
                .show_notification(INDICATOR_TITLE, "Configuration unchanged.");
            return Ok(false);
        };

        self.save_credentials(&submitted)?;
        Ok(true)
    }

    /// Validate and persist `creds`, notifying the user either way.
    pub fn save_credentials(&mut self, creds: &Credentials) -> Result<()> {
        let creds = Credentials::new(
            creds.base_url.trim().trim_end_matches('/'),
            creds.email.trim(),
            creds.api_token.trim(),
        );

        let result = creds
            .validate()
            .and_then(|()| self.store.save(&creds))
            .map_err(AppError::from);

        match result {
            Ok(()) => {
                self.shell
                    .show_notification(INDICATOR_TITLE, "Jira settings saved.");
                Ok(())
            }
            Err(e) => {
                warn!("Rejected configuration: {}", e);
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Start a background sync and return its request id.
    ///
    /// Reports "not configured" immediately, without spawning, when the
    /// stored credentials are missing or incomplete.
    pub fn start_sync(&mut self) -> Result<u64> {
        let creds = self.sync_credentials()?;
        let request_id = self.spawner.spawn_fetch_issue_count(creds);
        self.latest_request = Some(request_id);
        Ok(request_id)
    }

    /// Run a sync on the current task and apply its result.
    ///
    /// Background syncs still in flight become stale.
    pub async fn sync(&mut self) -> Result<usize> {
        let creds = self.sync_credentials()?;
        self.latest_request = None;
        let result =
            JiraClient::fetch_assigned_issue_count_with_timeout(&creds, self.timeout).await;
        self.apply_result(result)
    }

    fn sync_credentials(&mut self) -> Result<Credentials> {
        match self.store.load() {
            Some(creds) if creds.is_complete() => {
                self.shell.set_status("Status: syncing…");
                Ok(creds)
            }
            _ => {
                let e = AppError::NotConfigured;
                info!("Sync requested without configuration");
                self.shell.set_status("Status: not configured");
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Apply a finished background task to the menu and notify the user.
    ///
    /// Returns `None` for a stale message from a superseded sync.
    pub fn handle_message(&mut self, message: SyncMessage) -> Option<Result<usize>> {
        let SyncMessage::IssueCountFetched { request_id, result } = message;
        if self.latest_request != Some(request_id) {
            debug!(request_id, "Ignoring stale sync result");
            return None;
        }
        self.latest_request = None;
        Some(self.apply_result(result))
    }

    fn apply_result(&mut self, result: IssueSearchResult) -> Result<usize> {
        match result {
            IssueSearchResult::Success { count } => {
                self.shell
                    .set_status(&format!("Status: {}", count_label(count)));
                self.shell
                    .show_notification(INDICATOR_TITLE, &count_message(count));
                Ok(count)
            }
            IssueSearchResult::Unconfigured => {
                let e = AppError::NotConfigured;
                self.shell.set_status("Status: not configured");
                self.notify_error(&e);
                Err(e)
            }
            IssueSearchResult::Failure(api_err) => {
                let e = AppError::Api(api_err);
                self.shell.set_status("Status: sync failed");
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Wait for the next background message.
    pub async fn next_message(&mut self) -> Option<SyncMessage> {
        self.rx.recv().await
    }

    /// Tear down the indicator and hand the shell back to the host.
    pub fn shutdown(self) -> S {
        info!("Indicator stopped");
        self.shell
    }

    fn notify_error(&mut self, e: &AppError) {
        self.shell
            .show_notification(INDICATOR_TITLE, &e.notification_body());
    }
}

fn count_label(count: usize) -> String {
    match count {
        1 => "1 issue".to_string(),
        n if n >= MAX_RESULTS as usize => format!("{}+ issues", n),
        n => format!("{} issues", n),
    }
}

fn count_message(count: usize) -> String {
    match count {
        0 => "No issues assigned to you.".to_string(),
        1 => "You have 1 assigned issue.".to_string(),
        n if n >= MAX_RESULTS as usize => format!("You have at least {} assigned issues.", n),
        n => format!("You have {} assigned issues.", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use tempfile::TempDir;

    /// Shell that records every call.
    #[derive(Default)]
    struct RecordingShell {
        notifications: Vec<String>,
        actions: Vec<MenuAction>,
        status: String,
        form_reply: Option<Credentials>,
        forms_opened: usize,
    }

    impl Shell for RecordingShell {
        fn show_notification(&mut self, _title: &str, body: &str) {
            self.notifications.push(body.to_string());
        }

        fn open_config_form(&mut self, _initial: Option<&Credentials>) -> Option<Credentials> {
            self.forms_opened += 1;
            self.form_reply.take()
        }

        fn add_menu_action(&mut self, _label: &str, action: MenuAction) {
            self.actions.push(action);
        }

        fn set_status(&mut self, status: &str) {
            self.status = status.to_string();
        }
    }

    fn indicator(dir: &TempDir, shell: RecordingShell) -> Indicator<RecordingShell> {
        Indicator::new(ConfigStore::at(dir.path().join("config.json")), shell)
    }

    fn sample() -> Credentials {
        Credentials::new("https://x.atlassian.net", "a@b.c", "tok")
    }

    #[test]
    fn test_new_registers_menu_and_idle_status() {
        let dir = TempDir::new().unwrap();
        let ind = indicator(&dir, RecordingShell::default());

        assert_eq!(ind.shell().actions, MenuAction::ALL.to_vec());
        assert_eq!(ind.shell().status, STATUS_IDLE);
    }

    #[test]
    fn test_configure_saves_trimmed_submission() {
        let dir = TempDir::new().unwrap();
        let shell = RecordingShell {
            form_reply: Some(Credentials::new(" https://x.atlassian.net/ ", "a@b.c ", " tok")),
            ..Default::default()
        };
        let mut ind = indicator(&dir, shell);

        assert!(ind.configure().unwrap());
        assert_eq!(ind.store().load(), Some(sample()));
        assert_eq!(ind.shell().notifications, vec!["Jira settings saved."]);
    }

    #[test]
    fn test_configure_rejects_incomplete_and_keeps_file() {
        let dir = TempDir::new().unwrap();
        let mut ind = indicator(&dir, RecordingShell::default());
        ind.store().save(&sample()).unwrap();

        let err = ind
            .save_credentials(&Credentials::new("https://y.atlassian.net", "", "t"))
            .unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(ind.store().load(), Some(sample()));
        assert!(ind.shell().notifications[0].contains("email is required"));
    }

    #[test]
    fn test_configure_cancelled() {
        let dir = TempDir::new().unwrap();
        let mut ind = indicator(&dir, RecordingShell::default());

        assert!(!ind.configure().unwrap());
        assert_eq!(ind.shell().forms_opened, 1);
        assert!(!ind.store().exists());
    }

    #[tokio::test]
    async fn test_sync_without_config_prompts_to_configure() {
        let dir = TempDir::new().unwrap();
        let mut ind = indicator(&dir, RecordingShell::default());

        let err = ind.sync().await.unwrap_err();

        assert!(matches!(err, AppError::NotConfigured));
        assert_eq!(ind.shell().status, "Status: not configured");
        assert!(ind.shell().notifications[0].contains("zentasks configure"));
    }

    #[tokio::test]
    async fn test_sync_reports_count() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", crate::api::SEARCH_PATH)
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"issues":[{},{},{}]}"#)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let mut ind = indicator(&dir, RecordingShell::default());
        ind.store()
            .save(&Credentials::new(server.url(), "a@b.c", "tok"))
            .unwrap();

        ind.activate(MenuAction::SyncWithJira).await.unwrap();

        assert_eq!(ind.shell().status, "Status: 3 issues");
        assert_eq!(ind.shell().notifications, vec!["You have 3 assigned issues."]);
    }

    #[tokio::test]
    async fn test_sync_supersedes_background_fetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", crate::api::SEARCH_PATH)
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"issues":[{}]}"#)
            .expect(2)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let mut ind = indicator(&dir, RecordingShell::default());
        ind.store()
            .save(&Credentials::new(server.url(), "a@b.c", "tok"))
            .unwrap();

        ind.start_sync().unwrap();
        assert_eq!(ind.sync().await.unwrap(), 1);
        assert_eq!(ind.shell().status, "Status: 1 issue");

        let background = ind.next_message().await.unwrap();
        assert!(ind.handle_message(background).is_none());
        assert_eq!(ind.shell().notifications, vec!["You have 1 assigned issue."]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stale_result_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut ind = indicator(&dir, RecordingShell::default());
        ind.latest_request = Some(2);

        let stale = SyncMessage::IssueCountFetched {
            request_id: 1,
            result: IssueSearchResult::Success { count: 5 },
        };
        assert!(ind.handle_message(stale).is_none());
        assert!(ind.shell().notifications.is_empty());

        let current = SyncMessage::IssueCountFetched {
            request_id: 2,
            result: IssueSearchResult::Failure(ApiError::Unauthorized),
        };
        let outcome = ind.handle_message(current).unwrap();
        assert!(matches!(outcome, Err(AppError::Api(ApiError::Unauthorized))));
        assert_eq!(ind.shell().status, "Status: sync failed");
        assert!(ind.shell().notifications[0].contains("401"));
    }

    #[test]
    fn test_count_messages() {
        assert_eq!(count_message(0), "No issues assigned to you.");
        assert_eq!(count_message(1), "You have 1 assigned issue.");
        assert_eq!(count_message(10), "You have at least 10 assigned issues.");
        assert_eq!(count_label(10), "10+ issues");
        assert_eq!(count_label(4), "4 issues");
    }
}
