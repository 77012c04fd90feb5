//! Chat session orchestrator.
//!
//! Owns the transcript of one (character, persona) pair and moves it through
//! `Bootstrapping -> Loading -> Ready <-> Sending`, with `Error` reachable
//! from the first two. The state mutex is only held for synchronous updates;
//! every await on a collaborator happens with the lock released, and results
//! are applied only if the session generation they were started under is
//! still current.

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::session::{ChatSession, SessionSnapshot};
use crate::record_client::RecordClient;
use crate::service_bootstrapper::ServiceBootstrapper;
use kindred_core::chat::{AskRequest, ChatError, InferenceBackend, ResetRequest, SessionStatus, Turn};
use kindred_core::record::RecordKind;

/// Result of [`ChatOrchestrator::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The backend replied; the reply turn was appended.
    Answered(Turn),
    /// The backend failed; a placeholder turn was appended and the banner set.
    Absorbed { turn: Turn, error: ChatError },
    /// The send was not accepted in the current state.
    Ignored,
}

/// Result of [`ChatOrchestrator::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset,
    Ignored,
}

/// Drives a single chat session against the injected collaborators.
pub struct ChatOrchestrator {
    bootstrapper: Arc<ServiceBootstrapper>,
    records: RecordClient,
    backend: Arc<dyn InferenceBackend>,
    generation: AtomicU64,
    session: Mutex<Option<ChatSession>>,
}

impl ChatOrchestrator {
    pub fn new(
        bootstrapper: Arc<ServiceBootstrapper>,
        records: RecordClient,
        backend: Arc<dyn InferenceBackend>,
    ) -> Self {
        Self {
            bootstrapper,
            records,
            backend,
            generation: AtomicU64::new(0),
            session: Mutex::new(None),
        }
    }

    /// Replaces the current session and brings the new one to `Ready`.
    ///
    /// Returns `ChatError::Superseded` when another session was started (or
    /// this one ended) before loading finished; nothing is applied then.
    pub async fn start_session(&self, character_id: &str, persona_id: &str) -> Result<(), ChatError> {
        let generation = {
            let mut session = self.session.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *session = Some(ChatSession::new(generation, character_id, persona_id));
            generation
        };
        tracing::info!(
            "[Chat] Starting session {} with {} as {}",
            generation,
            character_id,
            persona_id
        );

        if let Err(error) = self.bootstrapper.ensure_services_started().await {
            self.with_session(generation, |session| session.fail(error.clone()))
                .await?;
            return Err(error);
        }

        self.with_session(generation, |session| session.status = SessionStatus::Loading)
            .await?;

        let (character, persona) = tokio::join!(
            self.records.load_character(character_id),
            self.records.load_persona(persona_id)
        );

        let loaded = match (character, persona) {
            (Ok(character), Ok(persona)) => Ok((character, persona)),
            (Err(e), _) => {
                tracing::warn!("[Chat] Failed to load character {}: {}", character_id, e);
                Err(ChatError::record_not_found(RecordKind::Character, character_id))
            }
            (_, Err(e)) => {
                tracing::warn!("[Chat] Failed to load persona {}: {}", persona_id, e);
                Err(ChatError::record_not_found(RecordKind::Persona, persona_id))
            }
        };

        match loaded {
            Ok((character, persona)) => {
                self.with_session(generation, |session| session.become_ready(character, persona))
                    .await?;
                tracing::info!("[Chat] Session {} ready", generation);
                if let Err(e) = self.records.touch_character(character_id).await {
                    tracing::warn!("[Chat] Failed to record last use of {}: {}", character_id, e);
                }
                Ok(())
            }
            Err(error) => {
                self.with_session(generation, |session| session.fail(error.clone()))
                    .await?;
                Err(error)
            }
        }
    }

    /// Re-runs `start_session` for the current pair when it is in `Error`.
    pub async fn retry(&self) -> Result<(), ChatError> {
        let pair = {
            let session = self.session.lock().await;
            session
                .as_ref()
                .filter(|s| s.status == SessionStatus::Error)
                .map(|s| (s.character_id.clone(), s.persona_id.clone()))
        };
        match pair {
            Some((character_id, persona_id)) => self.start_session(&character_id, &persona_id).await,
            None => Ok(()),
        }
    }

    /// Sends one user turn.
    ///
    /// Blank input, a send in flight, a pending reset, and a session still
    /// coming up all yield `Ignored`. In `Error` the blocking error is
    /// returned and put back on the banner. Backend failures are absorbed
    /// into the transcript.
    pub async fn send(&self, input: &str) -> Result<SendOutcome, ChatError> {
        if input.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let (generation, request) = {
            let mut guard = self.session.lock().await;
            let Some(session) = guard.as_mut() else {
                return Ok(SendOutcome::Ignored);
            };

            match session.status {
                SessionStatus::Error => {
                    let error = session
                        .failure
                        .clone()
                        .unwrap_or_else(|| ChatError::Unknown("session failed".to_string()));
                    session.last_error = Some(error.clone());
                    return Err(error);
                }
                SessionStatus::Ready if !session.pending_reset => {}
                _ => return Ok(SendOutcome::Ignored),
            }

            let history = session.transcript.turns().to_vec();
            session.transcript.append_provisional(input, Utc::now());
            session.status = SessionStatus::Sending;

            let request = AskRequest {
                input: input.to_string(),
                character_id: session.character_id.clone(),
                persona_id: session.persona_id.clone(),
                history,
            };
            (session.generation, request)
        };

        let reply = self.backend.ask(&request).await;

        self.with_session(generation, |session| {
            session.status = SessionStatus::Ready;
            match reply {
                Ok(answer) => SendOutcome::Answered(
                    session.transcript.append_confirmed(answer, Utc::now()).clone(),
                ),
                Err(e) => {
                    tracing::warn!("[Chat] Backend failed to answer: {}", e);
                    let error = ChatError::backend_unreachable(e.to_string());
                    session.last_error = Some(error.clone());
                    let turn = session.transcript.append_placeholder(Utc::now()).clone();
                    SendOutcome::Absorbed { turn, error }
                }
            }
        })
        .await
    }

    /// Clears the backend's memory of the pair and restarts the transcript.
    ///
    /// Only accepted in `Ready`. On failure the transcript is left as it was
    /// and the banner is set.
    pub async fn reset(&self) -> Result<ResetOutcome, ChatError> {
        let (generation, request) = {
            let mut guard = self.session.lock().await;
            let Some(session) = guard.as_mut() else {
                return Ok(ResetOutcome::Ignored);
            };
            if session.status != SessionStatus::Ready || session.pending_reset {
                return Ok(ResetOutcome::Ignored);
            }
            session.pending_reset = true;
            let request = ResetRequest {
                user_id: session.persona_id.clone(),
                character_id: session.character_id.clone(),
            };
            (session.generation, request)
        };

        let result = self.backend.reset(&request).await;

        self.with_session(generation, |session| {
            session.pending_reset = false;
            match result {
                Ok(()) => {
                    if let Some(greeting) = session.greeting() {
                        session.transcript.restart(greeting, Utc::now());
                    }
                    session.last_error = None;
                    tracing::info!("[Chat] Conversation reset");
                    Ok(ResetOutcome::Reset)
                }
                Err(e) => {
                    tracing::warn!("[Chat] Reset failed: {}", e);
                    let error = ChatError::backend_unreachable(e.to_string());
                    session.last_error = Some(error.clone());
                    Err(error)
                }
            }
        })
        .await?
    }

    /// Hides the banner. The session status is unchanged.
    pub async fn dismiss_error(&self) {
        if let Some(session) = self.session.lock().await.as_mut() {
            session.last_error = None;
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let services_ready = self.bootstrapper.is_ready();
        match self.session.lock().await.as_ref() {
            Some(session) => session.snapshot(services_ready),
            None => SessionSnapshot {
                services_ready,
                ..Default::default()
            },
        }
    }

    /// Drops the session; in-flight results for it are discarded.
    pub async fn end_session(&self) {
        let mut session = self.session.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if session.take().is_some() {
            tracing::info!("[Chat] Session ended");
        }
    }

    pub fn services_ready(&self) -> bool {
        self.bootstrapper.is_ready()
    }

    /// Applies `f` if `generation` is still the live session.
    async fn with_session<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut ChatSession) -> R,
    ) -> Result<R, ChatError> {
        let mut guard = self.session.lock().await;
        match guard.as_mut() {
            Some(session) if session.generation == generation => Ok(f(session)),
            _ => {
                tracing::debug!("[Chat] Discarding result for superseded session {}", generation);
                Err(ChatError::Superseded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_client::tests::MemoryRecordStore;
    use kindred_core::character::{Character, DEFAULT_IMAGE};
    use kindred_core::chat::{PLACEHOLDER_REPLY, TurnRole};
    use kindred_core::persona::Persona;
    use kindred_core::record::{Record, RecordStore};
    use kindred_core::service::{ServiceLauncher, ServiceState};
    use kindred_core::{KindredError, Result};
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Semaphore;

    #[derive(Default)]
    struct FlakyLauncher {
        fail: AtomicBool,
    }

    #[async_trait::async_trait]
    impl ServiceLauncher for FlakyLauncher {
        async fn start(&self) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                Err(KindredError::network("connection refused"))
            } else {
                Ok(())
            }
        }

        async fn is_healthy(&self) -> bool {
            true
        }
    }

    /// Backend answering from a script; optionally blocks until released.
    #[derive(Default)]
    struct ScriptedBackend {
        replies: StdMutex<VecDeque<Result<String>>>,
        reset_fails: AtomicBool,
        gate: Option<Semaphore>,
        asks: StdMutex<Vec<AskRequest>>,
        resets: StdMutex<Vec<ResetRequest>>,
    }

    impl ScriptedBackend {
        fn gated() -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Default::default()
            }
        }

        fn reply(&self, reply: Result<String>) {
            self.replies.lock().unwrap().push_back(reply);
        }

        fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.add_permits(1);
            }
        }
    }

    #[async_trait::async_trait]
    impl InferenceBackend for ScriptedBackend {
        async fn ask(&self, request: &AskRequest) -> Result<String> {
            self.asks.lock().unwrap().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("...".to_string()))
        }

        async fn reset(&self, request: &ResetRequest) -> Result<()> {
            self.resets.lock().unwrap().push(request.clone());
            if self.reset_fails.load(Ordering::SeqCst) {
                Err(KindredError::network("connection refused"))
            } else {
                Ok(())
            }
        }
    }

    /// Record store whose loads wait for a permit.
    struct GatedStore {
        inner: MemoryRecordStore,
        gate: Semaphore,
    }

    #[async_trait::async_trait]
    impl RecordStore for GatedStore {
        async fn load_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Record>> {
            self.gate.acquire().await.unwrap().forget();
            self.inner.load_by_id(kind, id).await
        }

        async fn list(&self, kind: RecordKind) -> Result<Vec<Record>> {
            self.inner.list(kind).await
        }

        async fn save(&self, record: Record) -> Result<String> {
            self.inner.save(record).await
        }

        async fn update(&self, record: Record) -> Result<()> {
            self.inner.update(record).await
        }

        async fn delete(&self, kind: RecordKind, id: &str) -> Result<()> {
            self.inner.delete(kind, id).await
        }
    }

    fn character(id: &str, greeting: &str) -> Character {
        Character {
            id: id.to_string(),
            name: "Luna".to_string(),
            tagline: String::new(),
            description: String::new(),
            greeting: greeting.to_string(),
            definition: String::new(),
            img: DEFAULT_IMAGE.to_string(),
            tags: BTreeMap::new(),
            last_used: None,
        }
    }

    fn persona(id: &str) -> Persona {
        Persona {
            id: id.to_string(),
            display_name: "Me".to_string(),
            background: String::new(),
            img: DEFAULT_IMAGE.to_string(),
        }
    }

    fn records() -> Vec<Record> {
        vec![
            character("luna", "Good evening.").into(),
            character("quiet", "   ").into(),
            persona("me").into(),
        ]
    }

    struct Harness {
        orchestrator: Arc<ChatOrchestrator>,
        backend: Arc<ScriptedBackend>,
        launcher: Arc<FlakyLauncher>,
        store: Arc<dyn RecordStore>,
    }

    fn harness_with(backend: ScriptedBackend, store: Arc<dyn RecordStore>) -> Harness {
        let backend = Arc::new(backend);
        let launcher = Arc::new(FlakyLauncher::default());
        let bootstrapper = Arc::new(ServiceBootstrapper::new(
            launcher.clone(),
            Arc::new(ServiceState::new()),
        ));
        let orchestrator = Arc::new(ChatOrchestrator::new(
            bootstrapper,
            RecordClient::new(store.clone()),
            backend.clone(),
        ));
        Harness {
            orchestrator,
            backend,
            launcher,
            store,
        }
    }

    fn harness(backend: ScriptedBackend) -> Harness {
        harness_with(backend, Arc::new(MemoryRecordStore::with(records())))
    }

    async fn wait_for_status(orchestrator: &ChatOrchestrator, status: SessionStatus) {
        while orchestrator.snapshot().await.status != status {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_ready_session_starts_with_greeting() {
        let h = harness(ScriptedBackend::default());

        h.orchestrator.start_session("luna", "me").await.unwrap();

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Ready);
        assert!(snapshot.services_ready);
        assert_eq!(snapshot.transcript.len(), 1);
        assert_eq!(snapshot.transcript[0].role, TurnRole::Assistant);
        assert_eq!(snapshot.transcript[0].content, "Good evening.");
        assert_eq!(snapshot.persona.unwrap().display_name, "Me");
    }

    #[tokio::test]
    async fn test_blank_greeting_falls_back() {
        let h = harness(ScriptedBackend::default());
        h.orchestrator.start_session("quiet", "me").await.unwrap();

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.transcript[0].content, "Hi! I'm Luna.");
    }

    #[tokio::test]
    async fn test_ready_touches_character() {
        let h = harness(ScriptedBackend::default());
        h.orchestrator.start_session("luna", "me").await.unwrap();

        let stored = h
            .store
            .load_by_id(RecordKind::Character, "luna")
            .await
            .unwrap()
            .and_then(Record::into_character)
            .unwrap();
        assert!(stored.last_used.is_some());
        let snapshot = h.orchestrator.snapshot().await;
        assert!(snapshot.character.unwrap().last_used.is_none());
    }

    #[tokio::test]
    async fn test_send_appends_user_and_reply() {
        let h = harness(ScriptedBackend::default());
        h.backend.reply(Ok("Hello there".to_string()));
        h.orchestrator.start_session("luna", "me").await.unwrap();

        let outcome = h.orchestrator.send("Hi").await.unwrap();

        match outcome {
            SendOutcome::Answered(turn) => assert_eq!(turn.content, "Hello there"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Ready);
        let roles: Vec<TurnRole> = snapshot.transcript.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![TurnRole::Assistant, TurnRole::User, TurnRole::Assistant]
        );

        let asks = h.backend.asks.lock().unwrap();
        assert_eq!(asks[0].input, "Hi");
        assert_eq!(asks[0].character_id, "luna");
        assert_eq!(asks[0].persona_id, "me");
        assert_eq!(asks[0].history.len(), 1);
        assert_eq!(asks[0].history[0].content, "Good evening.");
    }

    #[tokio::test]
    async fn test_backend_failure_is_absorbed() {
        let h = harness(ScriptedBackend::default());
        h.backend.reply(Err(KindredError::network("timeout")));
        h.orchestrator.start_session("luna", "me").await.unwrap();

        let outcome = h.orchestrator.send("Hi").await.unwrap();

        assert!(matches!(
            outcome,
            SendOutcome::Absorbed { ref turn, error: ChatError::BackendUnreachable(_) }
                if turn.content == PLACEHOLDER_REPLY
        ));
        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Ready);
        assert_eq!(snapshot.transcript.len(), 3);
        assert!(matches!(
            snapshot.last_error,
            Some(ChatError::BackendUnreachable(_))
        ));

        h.orchestrator.dismiss_error().await;
        assert!(h.orchestrator.snapshot().await.last_error.is_none());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let h = harness(ScriptedBackend::default());
        h.orchestrator.start_session("luna", "me").await.unwrap();

        assert_eq!(
            h.orchestrator.send("  \n").await.unwrap(),
            SendOutcome::Ignored
        );
        assert_eq!(h.orchestrator.snapshot().await.transcript.len(), 1);
        assert!(h.backend.asks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_session_is_ignored() {
        let h = harness(ScriptedBackend::default());
        assert_eq!(h.orchestrator.send("hi").await.unwrap(), SendOutcome::Ignored);
        assert_eq!(h.orchestrator.reset().await.unwrap(), ResetOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_second_send_while_sending_is_ignored() {
        let h = harness(ScriptedBackend::gated());
        h.backend.reply(Ok("first".to_string()));
        h.orchestrator.start_session("luna", "me").await.unwrap();

        let orchestrator = h.orchestrator.clone();
        let in_flight = tokio::spawn(async move { orchestrator.send("one").await });
        wait_for_status(&h.orchestrator, SessionStatus::Sending).await;

        assert_eq!(h.orchestrator.send("two").await.unwrap(), SendOutcome::Ignored);
        assert_eq!(h.orchestrator.reset().await.unwrap(), ResetOutcome::Ignored);

        h.backend.release();
        let outcome = in_flight.await.unwrap().unwrap();
        assert!(matches!(outcome, SendOutcome::Answered(_)));

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.transcript.len(), 3);
        assert_eq!(h.backend.asks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_record_blocks_session() {
        let h = harness(ScriptedBackend::default());

        let err = h.orchestrator.start_session("ghost", "me").await.unwrap_err();
        assert_eq!(err, ChatError::record_not_found(RecordKind::Character, "ghost"));

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert!(snapshot.transcript.is_empty());

        h.orchestrator.dismiss_error().await;
        let err = h.orchestrator.send("hello?").await.unwrap_err();
        assert!(err.is_blocking());
        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.last_error, Some(err));
        assert!(snapshot.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_missing_persona_blocks_session() {
        let h = harness(ScriptedBackend::default());
        let err = h.orchestrator.start_session("luna", "nobody").await.unwrap_err();
        assert_eq!(err, ChatError::record_not_found(RecordKind::Persona, "nobody"));
    }

    #[tokio::test]
    async fn test_bootstrap_failure_then_retry() {
        let h = harness(ScriptedBackend::default());
        h.launcher.fail.store(true, Ordering::SeqCst);

        let err = h.orchestrator.start_session("luna", "me").await.unwrap_err();
        assert!(matches!(err, ChatError::ServiceUnavailable(_)));
        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert!(!snapshot.services_ready);

        h.launcher.fail.store(false, Ordering::SeqCst);
        h.orchestrator.retry().await.unwrap();

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Ready);
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.services_ready);
        assert_eq!(snapshot.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_late_reply_for_replaced_session_is_discarded() {
        let h = harness(ScriptedBackend::gated());
        h.backend.reply(Ok("for luna".to_string()));
        h.orchestrator.start_session("luna", "me").await.unwrap();

        let orchestrator = h.orchestrator.clone();
        let in_flight = tokio::spawn(async move { orchestrator.send("hi").await });
        wait_for_status(&h.orchestrator, SessionStatus::Sending).await;

        h.orchestrator.start_session("quiet", "me").await.unwrap();
        h.backend.release();

        assert_eq!(in_flight.await.unwrap(), Err(ChatError::Superseded));
        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.character_id.as_deref(), Some("quiet"));
        assert_eq!(snapshot.transcript.len(), 1);
        assert_eq!(snapshot.status, SessionStatus::Ready);
    }

    #[tokio::test]
    async fn test_late_load_for_ended_session_is_discarded() {
        let store = Arc::new(GatedStore {
            inner: MemoryRecordStore::with(records()),
            gate: Semaphore::new(0),
        });
        let h = harness_with(ScriptedBackend::default(), store.clone());

        let orchestrator = h.orchestrator.clone();
        let starting = tokio::spawn(async move { orchestrator.start_session("luna", "me").await });
        wait_for_status(&h.orchestrator, SessionStatus::Loading).await;

        h.orchestrator.end_session().await;
        store.gate.add_permits(2);

        assert_eq!(starting.await.unwrap(), Err(ChatError::Superseded));
        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Uninitialized);
        assert!(snapshot.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_second_start_during_load_wins() {
        let store = Arc::new(GatedStore {
            inner: MemoryRecordStore::with(records()),
            gate: Semaphore::new(0),
        });
        let h = harness_with(ScriptedBackend::default(), store.clone());

        let orchestrator = h.orchestrator.clone();
        let first = tokio::spawn(async move { orchestrator.start_session("luna", "me").await });
        wait_for_status(&h.orchestrator, SessionStatus::Loading).await;

        let orchestrator = h.orchestrator.clone();
        let second = tokio::spawn(async move { orchestrator.start_session("quiet", "me").await });
        loop {
            let snapshot = h.orchestrator.snapshot().await;
            if snapshot.character_id.as_deref() == Some("quiet")
                && snapshot.status == SessionStatus::Loading
            {
                break;
            }
            tokio::task::yield_now().await;
        }

        // two loads per session plus the touch of the second
        store.gate.add_permits(5);

        assert_eq!(first.await.unwrap(), Err(ChatError::Superseded));
        assert_eq!(second.await.unwrap(), Ok(()));

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.character_id.as_deref(), Some("quiet"));
        assert_eq!(snapshot.status, SessionStatus::Ready);
        let contents: Vec<_> = snapshot
            .transcript
            .iter()
            .map(|turn| turn.content.as_str())
            .collect();
        assert_eq!(contents, vec!["Hi! I'm Luna."]);
    }

    #[tokio::test]
    async fn test_reset_restores_greeting() {
        let h = harness(ScriptedBackend::default());
        h.orchestrator.start_session("luna", "me").await.unwrap();
        h.orchestrator.send("one").await.unwrap();
        h.orchestrator.send("two").await.unwrap();
        assert_eq!(h.orchestrator.snapshot().await.transcript.len(), 5);

        assert_eq!(h.orchestrator.reset().await.unwrap(), ResetOutcome::Reset);

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.transcript.len(), 1);
        assert_eq!(snapshot.transcript[0].content, "Good evening.");
        assert!(!snapshot.resetting);
        let resets = h.backend.resets.lock().unwrap();
        assert_eq!(
            resets[0],
            ResetRequest {
                user_id: "me".to_string(),
                character_id: "luna".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_failed_reset_keeps_transcript() {
        let h = harness(ScriptedBackend::default());
        h.backend.reset_fails.store(true, Ordering::SeqCst);
        h.orchestrator.start_session("luna", "me").await.unwrap();
        h.orchestrator.send("one").await.unwrap();

        let err = h.orchestrator.reset().await.unwrap_err();
        assert!(matches!(err, ChatError::BackendUnreachable(_)));

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.transcript.len(), 3);
        assert_eq!(snapshot.status, SessionStatus::Ready);
        assert_eq!(snapshot.last_error, Some(err));
    }

    #[tokio::test]
    async fn test_reset_outside_ready_is_ignored() {
        let h = harness(ScriptedBackend::default());
        h.orchestrator.start_session("ghost", "me").await.unwrap_err();

        assert_eq!(h.orchestrator.reset().await.unwrap(), ResetOutcome::Ignored);
        assert!(h.backend.resets.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_end_session_clears_state() {
        let h = harness(ScriptedBackend::default());
        h.orchestrator.start_session("luna", "me").await.unwrap();
        h.orchestrator.end_session().await;

        let snapshot = h.orchestrator.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Uninitialized);
        assert!(snapshot.character_id.is_none());
        assert!(snapshot.services_ready);
    }
}
