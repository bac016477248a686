use std::num::NonZeroU32;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use rand::Rng;
use searchinator_core::{DelayRange, EngineConfig, Outcome, QueryUnit};

use crate::identity::pick_identity;
use crate::pace::Sleeper;
use crate::render::{RenderBackend, RenderSession};
use crate::{RenderError, RenderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    backoff: DelayRange,
}

impl RetryPolicy {
    pub fn new(max_attempts: NonZeroU32, backoff: DelayRange) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    pub fn backoff(&self) -> DelayRange {
        self.backoff
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
            backoff: DelayRange::default(),
        }
    }
}

/// What happened to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub outcome: Outcome,
    /// Attempts made; zero if no session could be opened.
    pub attempts: u32,
}

/// Drives one unit through the backend with bounded retries.
///
/// A fresh session is opened for the unit and closed on every exit path.
/// Extraction that yields no links is a success and is never retried.
pub async fn execute<R: Rng + ?Sized>(
    unit: &QueryUnit,
    engine: &EngineConfig,
    backend: &dyn RenderBackend,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    rng: &mut R,
) -> Execution {
    let identity = pick_identity(rng);
    let mut session = match backend.open_session(identity).await {
        Ok(session) => session,
        Err(err) => {
            engine_error!(
                "[{}] Could not open a session for '{}': {}",
                engine.name,
                unit.query(),
                err
            );
            return Execution {
                outcome: Outcome::Failure(err.to_string()),
                attempts: 0,
            };
        }
    };

    let execution = run_attempts(unit, engine, session.as_mut(), policy, sleeper, rng).await;

    if let Err(err) = session.close().await {
        engine_warn!("[{}] Failed to close session: {}", engine.name, err);
    }
    execution
}

async fn run_attempts<R: Rng + ?Sized>(
    unit: &QueryUnit,
    engine: &EngineConfig,
    session: &mut dyn RenderSession,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    rng: &mut R,
) -> Execution {
    let max_attempts = policy.max_attempts();
    let query = unit.query();
    let mut attempt = 0;
    loop {
        attempt += 1;
        engine_info!(
            "[{}] Attempt {}/{}: {}",
            engine.name,
            attempt,
            max_attempts,
            query
        );
        match attempt_once(session, engine, query).await {
            Ok(links) => {
                engine_info!("[{}] Got {} links for '{}'", engine.name, links.len(), query);
                return Execution {
                    outcome: Outcome::Success(links),
                    attempts: attempt,
                };
            }
            Err(err) => {
                engine_error!("[{}] Error on '{}': {}", engine.name, query, err);
                if attempt >= max_attempts {
                    engine_warn!("[{}] Giving up on '{}'", engine.name, query);
                    return Execution {
                        outcome: Outcome::Failure(err.to_string()),
                        attempts: attempt,
                    };
                }
                let delay = policy.backoff().sample(rng);
                engine_debug!("[{}] Backing off for {:?}", engine.name, delay);
                sleeper.sleep(delay).await;
            }
        }
    }
}

async fn attempt_once(
    session: &mut dyn RenderSession,
    engine: &EngineConfig,
    query: &str,
) -> Result<Vec<String>, RenderError> {
    let url = engine
        .render_url(query)
        .map_err(|err| RenderError::new(RenderErrorKind::InvalidUrl, err.to_string()))?;
    session.navigate(&url).await?;

    if let Some(marker) = engine.wait_for.as_deref() {
        match session.wait_for_marker(marker, engine.wait_timeout()).await {
            Ok(()) => {}
            // Zero-result pages may never show the marker.
            Err(err) if err.is_timeout() => {
                engine_debug!("[{}] No selector match on '{}': {}", engine.name, query, err);
            }
            Err(err) => return Err(err),
        }
    }

    session.extract_links(&engine.link_selector).await
}
