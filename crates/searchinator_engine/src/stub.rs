//! Scripted rendering backend and sleeper for exercising the retry executor
//! and the orchestrator without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::pace::Sleeper;
use crate::render::{BackendLauncher, RenderBackend, RenderSession};
use crate::{LaunchMode, RenderError, RenderErrorKind};

/// Everything the scripted backend was asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubJournal {
    pub launches: Vec<LaunchMode>,
    pub identities: Vec<String>,
    pub navigations: Vec<String>,
    pub marker_waits: Vec<String>,
    pub sessions_closed: usize,
    pub shutdowns: usize,
}

impl StubJournal {
    pub fn navigations_to(&self, url: &str) -> usize {
        self.navigations.iter().filter(|n| n.as_str() == url).count()
    }
}

#[derive(Default)]
struct Script {
    journal: StubJournal,
    responses: HashMap<String, VecDeque<Result<Vec<String>, RenderError>>>,
    launch_error: Option<RenderError>,
    marker_missing: bool,
    cancel_on_navigate: Option<CancellationToken>,
}

/// Launcher whose pages are scripted per URL.
///
/// Each navigation to a URL consumes the next scripted response for it; a URL
/// with nothing scripted loads a page without links.
#[derive(Clone, Default)]
pub struct ScriptedLauncher {
    script: Arc<Mutex<Script>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: impl Into<String>, response: Result<Vec<String>, RenderError>) {
        self.lock()
            .responses
            .entry(url.into())
            .or_default()
            .push_back(response);
    }

    pub fn respond_links(&self, url: impl Into<String>, links: &[&str]) {
        self.respond(url, Ok(links.iter().map(|l| l.to_string()).collect()));
    }

    pub fn fail_navigation(&self, url: impl Into<String>, message: &str) {
        self.respond(url, Err(RenderError::new(RenderErrorKind::Network, message)));
    }

    pub fn fail_launch(&self, error: RenderError) {
        self.lock().launch_error = Some(error);
    }

    /// Makes every marker wait time out.
    pub fn marker_missing(&self) {
        self.lock().marker_missing = true;
    }

    /// Cancels `token` on the next navigation, i.e. while a unit is in flight.
    pub fn cancel_on_navigate(&self, token: CancellationToken) {
        self.lock().cancel_on_navigate = Some(token);
    }

    pub fn journal(&self) -> StubJournal {
        self.lock().journal.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl BackendLauncher for ScriptedLauncher {
    async fn launch(&self, mode: LaunchMode) -> Result<Box<dyn RenderBackend>, RenderError> {
        let mut script = self.lock();
        script.journal.launches.push(mode);
        if let Some(err) = script.launch_error.clone() {
            return Err(err);
        }
        Ok(Box::new(ScriptedBackend {
            launcher: self.clone(),
        }))
    }
}

struct ScriptedBackend {
    launcher: ScriptedLauncher,
}

#[async_trait::async_trait]
impl RenderBackend for ScriptedBackend {
    async fn open_session(&self, identity: &str) -> Result<Box<dyn RenderSession>, RenderError> {
        self.launcher
            .lock()
            .journal
            .identities
            .push(identity.to_string());
        Ok(Box::new(ScriptedSession {
            launcher: self.launcher.clone(),
            links: None,
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        self.launcher.lock().journal.shutdowns += 1;
        Ok(())
    }
}

struct ScriptedSession {
    launcher: ScriptedLauncher,
    links: Option<Vec<String>>,
}

#[async_trait::async_trait]
impl RenderSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        let mut script = self.launcher.lock();
        script.journal.navigations.push(url.to_string());
        if let Some(token) = script.cancel_on_navigate.take() {
            token.cancel();
        }
        let response = script
            .responses
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()));
        match response {
            Ok(links) => {
                self.links = Some(links);
                Ok(())
            }
            Err(err) => {
                self.links = None;
                Err(err)
            }
        }
    }

    async fn wait_for_marker(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        let mut script = self.launcher.lock();
        script.journal.marker_waits.push(selector.to_string());
        if script.marker_missing {
            return Err(RenderError::new(
                RenderErrorKind::Timeout,
                format!("{selector:?} not present within {timeout:?}"),
            ));
        }
        Ok(())
    }

    async fn extract_links(&mut self, _selector: &str) -> Result<Vec<String>, RenderError> {
        self.links
            .clone()
            .ok_or_else(|| RenderError::new(RenderErrorKind::Session, "no page loaded"))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.links = None;
        self.launcher.lock().journal.sessions_closed += 1;
        Ok(())
    }
}

/// Sleeper that returns at once and remembers what it was asked for.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

/// Sleeper whose sleeps never finish, for interrupting a run mid-pause.
#[derive(Clone, Default)]
pub struct PendingSleeper {
    started: Arc<Notify>,
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl PendingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once a sleep has begun.
    pub async fn started(&self) {
        self.started.notified().await;
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for PendingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        self.started.notify_one();
        std::future::pending::<()>().await;
    }
}
