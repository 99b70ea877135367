//! Update cycle controller.
//!
//! One [`UpdateCycle`] owns the session for one set of credentials. Each
//! call to [`UpdateCycle::refresh`] logs in if needed, fetches usage and
//! parses it. Cycles never overlap: a call that arrives while another is
//! running waits for it and returns that cycle's outcome instead of
//! starting its own.
//!
//! ```text
//! Unauthenticated ──login──▶ Authenticating ──ok──▶ Authenticated
//!        ▲                        │                   │      ▲
//!        │                        └──err──────────────┼──┐   │
//!        │                                            ▼  │   │
//!        └───────────── 401/403 ◀──────────────── Fetching ──┘
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bchydro_core::UsageReport;
use bchydro_fetch::{HttpClient, HttpError};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::error::{FetchError, RefreshError};
use crate::login::LoginSequencer;
use crate::parser::parse_usage_report;
use crate::session::{Credentials, SessionState};
use crate::settings::PortalSettings;
use crate::usage::{RawUsage, UsageFetcher};

// ============================================================================
// Published State
// ============================================================================

/// Where the controller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    /// No session.
    #[default]
    Unauthenticated,
    /// Login in progress.
    Authenticating,
    /// Session held, idle.
    Authenticated,
    /// Usage request in progress.
    Fetching,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleState::Unauthenticated => "unauthenticated",
            CycleState::Authenticating => "authenticating",
            CycleState::Authenticated => "authenticated",
            CycleState::Fetching => "fetching",
        };
        f.write_str(s)
    }
}

/// What observers see after each transition or cycle.
#[derive(Debug, Clone, Default)]
pub struct ReportState {
    /// Last successfully parsed report.
    pub report: Option<Arc<UsageReport>>,
    /// True if the last cycle failed and `report` predates it.
    pub stale: bool,
    /// Message of the last failure, cleared on success.
    pub last_error: Option<String>,
    /// Controller state.
    pub state: CycleState,
    /// Service location id of the current session.
    pub subscriber_id: Option<String>,
    /// When the last cycle finished, successful or not.
    pub last_attempt: Option<DateTime<Utc>>,
}

// ============================================================================
// Update Cycle
// ============================================================================

type Outcome = Result<Arc<UsageReport>, RefreshError>;

struct CycleInner {
    session: Option<SessionState>,
    last_outcome: Option<Outcome>,
}

/// Single-flight login, fetch and parse controller.
pub struct UpdateCycle {
    credentials: Credentials,
    settings: PortalSettings,
    http: HttpClient,
    inner: Mutex<CycleInner>,
    completed: AtomicU64,
    published: watch::Sender<ReportState>,
}

impl fmt::Debug for UpdateCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateCycle")
            .field("credentials", &self.credentials)
            .field("state", &self.state())
            .field("completed", &self.completed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl UpdateCycle {
    /// Creates a controller with no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(credentials: Credentials, settings: PortalSettings) -> Result<Self, HttpError> {
        let http = settings.build_client()?;
        let (published, _) = watch::channel(ReportState::default());
        Ok(Self {
            credentials,
            settings,
            http,
            inner: Mutex::new(CycleInner {
                session: None,
                last_outcome: None,
            }),
            completed: AtomicU64::new(0),
            published,
        })
    }

    /// Runs one cycle, or joins the one already running.
    ///
    /// # Errors
    ///
    /// Returns the [`RefreshError`] that ended the cycle. The last good
    /// report stays available through [`UpdateCycle::current_report`].
    pub async fn refresh(&self) -> Result<Arc<UsageReport>, RefreshError> {
        let observed = self.completed.load(Ordering::Acquire);
        let mut inner = self.inner.lock().await;

        if self.completed.load(Ordering::Acquire) != observed {
            if let Some(outcome) = inner.last_outcome.clone() {
                debug!("Joined a cycle that finished while waiting");
                return outcome;
            }
        }

        let mut settle = SettleOnDrop {
            cycle: self,
            fallback: if inner.session.is_some() {
                CycleState::Authenticated
            } else {
                CycleState::Unauthenticated
            },
            armed: true,
        };
        let outcome = self.run_cycle(&mut inner).await;
        settle.armed = false;

        self.publish(&outcome, inner.session.as_ref());
        inner.last_outcome = Some(outcome.clone());
        self.completed.fetch_add(1, Ordering::Release);
        outcome
    }

    /// Last successfully parsed report.
    pub fn current_report(&self) -> Option<Arc<UsageReport>> {
        self.published.borrow().report.clone()
    }

    /// Current controller state.
    pub fn state(&self) -> CycleState {
        self.published.borrow().state
    }

    /// Watches published state. The receiver starts with the current value.
    pub fn subscribe(&self) -> watch::Receiver<ReportState> {
        self.published.subscribe()
    }

    /// Returns true if a session is held.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.session.is_some()
    }

    /// Drops the session so the next cycle logs in again.
    pub async fn invalidate_session(&self) {
        let mut inner = self.inner.lock().await;
        if inner.session.take().is_some() {
            info!("Session invalidated");
        }
        self.transition(CycleState::Unauthenticated);
    }

    #[instrument(skip(self, inner))]
    async fn run_cycle(&self, inner: &mut CycleInner) -> Outcome {
        let fetched = match inner.session.as_ref() {
            Some(session) => self.fetch(session).await,
            None => {
                let session = self.authenticate().await?;
                let fetched = self.fetch(&session).await;
                inner.session = Some(session);
                fetched
            }
        };

        let raw = match fetched {
            Ok(raw) => raw,
            Err(FetchError::ReauthRequired) => {
                inner.session = None;
                self.transition(CycleState::Unauthenticated);
                return Err(FetchError::ReauthRequired.into());
            }
            Err(e) => {
                self.transition(CycleState::Authenticated);
                return Err(e.into());
            }
        };
        self.transition(CycleState::Authenticated);

        let report = parse_usage_report(&raw.body)?.with_interval(raw.interval);
        Ok(Arc::new(report))
    }

    async fn authenticate(&self) -> Result<SessionState, RefreshError> {
        self.transition(CycleState::Authenticating);
        match LoginSequencer::new(&self.http, &self.settings)
            .authenticate(&self.credentials)
            .await
        {
            Ok(session) => {
                self.transition(CycleState::Authenticated);
                Ok(session)
            }
            Err(e) => {
                self.transition(CycleState::Unauthenticated);
                Err(e.into())
            }
        }
    }

    async fn fetch(&self, session: &SessionState) -> Result<RawUsage, FetchError> {
        self.transition(CycleState::Fetching);
        let today = Local::now().date_naive();
        UsageFetcher::new(&self.http, &self.settings)
            .fetch_raw(session, today)
            .await
    }

    fn transition(&self, state: CycleState) {
        self.published.send_if_modified(|s| {
            if s.state == state {
                return false;
            }
            debug!(from = %s.state, to = %state, "Cycle state change");
            s.state = state;
            true
        });
    }

    fn publish(&self, outcome: &Outcome, session: Option<&SessionState>) {
        let subscriber_id = session.map(|s| s.subscriber_id().to_string());
        self.published.send_modify(|s| {
            s.subscriber_id = subscriber_id;
            s.last_attempt = Some(Utc::now());
            match outcome {
                Ok(report) => {
                    info!(has_data = report.has_data(), "Usage refreshed");
                    s.report = Some(Arc::clone(report));
                    s.stale = false;
                    s.last_error = None;
                }
                Err(e) => {
                    warn!(error = %e, disposition = ?e.disposition(), "Refresh failed");
                    s.stale = s.report.is_some();
                    s.last_error = Some(e.to_string());
                }
            }
        });
    }
}

/// Puts the published state back to a resting one if a cycle is dropped
/// before it finishes.
///
/// The session only changes once a cycle completes, so the state it had
/// on entry is still the right one.
struct SettleOnDrop<'a> {
    cycle: &'a UpdateCycle,
    fallback: CycleState,
    armed: bool,
}

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(state = %self.fallback, "Cycle cancelled");
            self.cycle.transition(self.fallback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> UpdateCycle {
        let settings = PortalSettings::new("http://127.0.0.1:9").unwrap();
        UpdateCycle::new(Credentials::new("user@example.com", "pw"), settings).unwrap()
    }

    #[tokio::test]
    async fn test_new_cycle_is_empty() {
        let cycle = cycle();
        assert_eq!(cycle.state(), CycleState::Unauthenticated);
        assert!(cycle.current_report().is_none());
        assert!(!cycle.is_authenticated().await);

        let state = cycle.subscribe().borrow().clone();
        assert!(!state.stale);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let debug = format!("{:?}", cycle());
        assert!(!debug.contains("\"pw\""));
        assert!(debug.contains("user@example.com"));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CycleState::Fetching.to_string(), "fetching");
        assert_eq!(CycleState::default(), CycleState::Unauthenticated);
    }
}
