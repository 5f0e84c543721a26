//! In-memory registry of active drill sessions.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use vocab_core::{
    DifficultyLevel, DrillEvent, DrillSession, SentenceFeedback, SingleFlight, Step, Transition,
    WordRecord,
};

use crate::error::{ApiError, Result};

/// Sessions untouched for this long are dropped on the next insert.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// A drill session plus the guards around its remote calls.
#[derive(Debug)]
pub struct ActiveSession {
    pub id: Uuid,
    pub theme: String,
    pub difficulty: DifficultyLevel,
    pub drill: DrillSession,
    /// Held from a speech request until the client reports playback done.
    pub playback: SingleFlight,
    /// Held while a composed sentence is being graded.
    pub checking: SingleFlight,
    pub generating: SingleFlight,
    pub reviewing: SingleFlight,
    last_touched: Instant,
}

impl ActiveSession {
    pub fn new(
        id: Uuid,
        theme: String,
        difficulty: DifficultyLevel,
        words: Vec<WordRecord>,
    ) -> Result<Self> {
        Ok(Self {
            id,
            theme,
            difficulty,
            drill: DrillSession::new(words)?,
            playback: SingleFlight::new(),
            checking: SingleFlight::new(),
            generating: SingleFlight::new(),
            reviewing: SingleFlight::new(),
            last_touched: Instant::now(),
        })
    }

    /// Apply a reviewer verdict for `sentence` written at word `index`.
    ///
    /// The verdict only counts if the drill is still composing that word with
    /// that sentence; otherwise it belongs to a position the user has left.
    pub fn apply_verdict(
        &mut self,
        index: usize,
        sentence: &str,
        feedback: SentenceFeedback,
    ) -> Result<Transition> {
        let state = self.drill.state();
        let still_there = !self.drill.is_complete()
            && self.drill.current_index() == index
            && state.step == Step::ComposeSentence
            && state.sentence_input == sentence;
        if !still_there {
            return Err(ApiError::Conflict(format!(
                "word {} changed while its sentence was being checked",
                index + 1
            )));
        }
        Ok(self.drill.apply(DrillEvent::CompositionReviewed { feedback })?)
    }

    fn idle_for(&self) -> Duration {
        self.last_touched.elapsed()
    }
}

/// Which guard a remote call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Playback,
    Checking,
    Generating,
    Reviewing,
}

impl Guard {
    fn flag(self, session: &mut ActiveSession) -> &mut SingleFlight {
        match self {
            Guard::Playback => &mut session.playback,
            Guard::Checking => &mut session.checking,
            Guard::Generating => &mut session.generating,
            Guard::Reviewing => &mut session.reviewing,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Guard::Playback => "playback",
            Guard::Checking => "checking",
            Guard::Generating => "generating",
            Guard::Reviewing => "reviewing",
        }
    }
}

/// A held session guard. Dropping the permit releases the guard, so a
/// cancelled request cannot leave it busy.
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct GuardPermit {
    sessions: SessionRegistry,
    id: Uuid,
    guard: Guard,
    armed: bool,
}

impl GuardPermit {
    /// Release the guard now.
    pub async fn release(mut self) {
        self.armed = false;
        self.sessions.finish(self.id, self.guard).await;
    }

    /// Leave the guard held; something else will finish it.
    pub fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for GuardPermit {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut sessions) = self.sessions.sessions.try_lock() {
            if let Some(session) = sessions.get_mut(&self.id) {
                self.guard.flag(session).finish();
            }
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let sessions = self.sessions.clone();
            let (id, guard) = (self.id, self.guard);
            handle.spawn(async move { sessions.finish(id, guard).await });
        }
    }
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, ActiveSession>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Add a session, first dropping any that have sat idle past the TTL.
    pub async fn insert(&self, session: ActiveSession) {
        let mut sessions = self.sessions.lock().await;
        let evicted = evict_idle(&mut sessions, self.idle_ttl);
        if evicted > 0 {
            info!("Evicted {} idle sessions", evicted);
        }
        sessions.insert(session.id, session);
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Run `f` against one session and mark it as used. The lock is released
    /// when `f` returns, so callers must not await inside it.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ActiveSession) -> Result<R>,
    ) -> Result<R> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;
        session.last_touched = Instant::now();
        f(session)
    }

    /// Take `guard` on a session. Returns false if it is already held.
    pub async fn try_begin(&self, id: Uuid, guard: Guard) -> Result<bool> {
        self.with_session(id, |s| Ok(guard.flag(s).try_begin()))
            .await
    }

    /// Take `guard` and wrap it in a permit, or `None` if it is already held.
    pub async fn acquire(&self, id: Uuid, guard: Guard) -> Result<Option<GuardPermit>> {
        if self.try_begin(id, guard).await? {
            Ok(Some(self.permit(id, guard)))
        } else {
            Ok(None)
        }
    }

    /// Permit for a guard the caller has already taken.
    pub fn permit(&self, id: Uuid, guard: Guard) -> GuardPermit {
        GuardPermit {
            sessions: self.clone(),
            id,
            guard,
            armed: true,
        }
    }

    /// Release `guard`. A session removed in the meantime is ignored.
    pub async fn finish(&self, id: Uuid, guard: Guard) {
        if let Some(session) = self.sessions.lock().await.get_mut(&id) {
            guard.flag(session).finish();
        }
    }

    pub async fn is_busy(&self, id: Uuid, guard: Guard) -> Result<bool> {
        self.with_session(id, |s| Ok(guard.flag(s).is_busy())).await
    }

    /// Run a remote call under `guard`. A busy guard rejects the call with
    /// `Conflict`; the guard is released when the call resolves or is dropped.
    pub async fn run_guarded<T, E>(
        &self,
        id: Uuid,
        guard: Guard,
        call: impl Future<Output = std::result::Result<T, E>>,
    ) -> Result<T>
    where
        E: Into<ApiError> + std::fmt::Display,
    {
        let permit = self.acquire(id, guard).await?.ok_or_else(|| {
            ApiError::Conflict(format!("{} already in progress", guard.as_str()))
        })?;

        let result = call.await;
        permit.release().await;

        result.map_err(|e| {
            error!(session = %id, guard = guard.as_str(), "Remote call failed: {}", e);
            e.into()
        })
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, ActiveSession>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| s.idle_for() < ttl);
    before - sessions.len()
}
