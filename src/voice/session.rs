/// Voice session lifecycle and transcript processing
///
/// `disconnected → connecting → connected{muted}` and back to `disconnected`
/// on stop, provider disconnect or a failed handshake. No automatic reconnect.
///
/// While connected, transcript events travel through a bounded channel to a
/// single consumer task that handles them one at a time in arrival order:
/// append to the transcript, extract an intent, run the search. Each event is
/// acknowledged with its outcome once handled.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, RwLock};
use uuid::Uuid;

use crate::{
    models::{Message, Movie, Origin, VoiceCredentials},
    services::{conversation::Conversation, providers::{MovieDatabase, SpeechProvider}},
    voice::{
        error::{VoiceError, VoiceFailure},
        intent::{Intent, IntentExtractor},
    },
};

const EVENT_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected { muted: bool },
}

/// Outcome of the browser's microphone prompt
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MicrophonePermission {
    Granted,
    Denied,
}

/// One attributed utterance from the speech session
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TranscriptEvent {
    pub source: Origin,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Transcript(TranscriptEvent),
    /// The provider closed the session
    Disconnected,
}

/// A search fired by a spoken request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VoiceSearch {
    pub query: String,
    pub results: Vec<Movie>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub searched_at: DateTime<Utc>,
}

/// What handling one event produced
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventOutcome {
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<VoiceSearch>,
}

impl EventOutcome {
    fn no_action() -> Self {
        Self {
            intent: Intent::NoAction,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionStatus {
    #[serde(flatten)]
    pub state: SessionState,
    pub session_id: Option<Uuid>,
    pub signed_url: Option<String>,
    pub last_error: Option<VoiceFailure>,
    pub last_search: Option<VoiceSearch>,
}

struct Envelope {
    event: SessionEvent,
    ack: oneshot::Sender<EventOutcome>,
}

struct SessionInner {
    state: SessionState,
    session_id: Option<Uuid>,
    signed_url: Option<String>,
    events: Option<mpsc::Sender<Envelope>>,
    transcript: Conversation,
    last_search: Option<VoiceSearch>,
    last_error: Option<VoiceError>,
}

impl SessionInner {
    fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            session_id: self.session_id,
            signed_url: self.signed_url.clone(),
            last_error: self.last_error.as_ref().map(VoiceError::to_failure),
            last_search: self.last_search.clone(),
        }
    }

    fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
        self.session_id = None;
        self.signed_url = None;
        self.events = None;
    }

    fn is_current(&self, session_id: Uuid) -> bool {
        self.session_id == Some(session_id)
    }
}

#[derive(Clone)]
pub struct VoiceController {
    speech: Arc<dyn SpeechProvider>,
    movies: Arc<dyn MovieDatabase>,
    extractor: Arc<IntentExtractor>,
    inner: Arc<RwLock<SessionInner>>,
}

impl VoiceController {
    pub fn new(
        speech: Arc<dyn SpeechProvider>,
        movies: Arc<dyn MovieDatabase>,
        extractor: IntentExtractor,
    ) -> Self {
        Self {
            speech,
            movies,
            extractor: Arc::new(extractor),
            inner: Arc::new(RwLock::new(SessionInner {
                state: SessionState::Disconnected,
                session_id: None,
                signed_url: None,
                events: None,
                transcript: Conversation::new(),
                last_search: None,
                last_error: None,
            })),
        }
    }

    pub async fn status(&self) -> SessionStatus {
        self.inner.read().await.status()
    }

    pub async fn transcript(&self) -> Vec<Message> {
        self.inner.read().await.transcript.messages().to_vec()
    }

    /// Opens a session; a no-op when one is already connecting or connected
    pub async fn start(
        &self,
        credentials: &VoiceCredentials,
        microphone: MicrophonePermission,
    ) -> Result<SessionStatus, VoiceError> {
        let attempt = Uuid::new_v4();
        {
            let mut inner = self.inner.write().await;
            if inner.state != SessionState::Disconnected {
                return Ok(inner.status());
            }
            inner.state = SessionState::Connecting;
            inner.session_id = Some(attempt);
            inner.last_error = None;
        }

        tracing::info!(session_id = %attempt, "Voice session connecting");
        let handshake = self.handshake(credentials, microphone).await;

        let mut inner = self.inner.write().await;
        if !inner.is_current(attempt) {
            tracing::info!(session_id = %attempt, "Voice session stopped while connecting");
            return Ok(inner.status());
        }

        match handshake {
            Ok(signed_url) => {
                let (tx, rx) = mpsc::channel(EVENT_BUFFER);
                inner.state = SessionState::Connected { muted: false };
                inner.signed_url = Some(signed_url);
                inner.events = Some(tx);
                inner.transcript.clear();

                tokio::spawn(consume_events(
                    attempt,
                    rx,
                    self.inner.clone(),
                    self.movies.clone(),
                    self.extractor.clone(),
                ));

                tracing::info!(session_id = %attempt, "Voice session connected");
                Ok(inner.status())
            }
            Err(e) => {
                tracing::warn!(session_id = %attempt, cause = e.cause(), error = %e, "Voice session failed to start");
                inner.disconnect();
                inner.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    async fn handshake(
        &self,
        credentials: &VoiceCredentials,
        microphone: MicrophonePermission,
    ) -> Result<String, VoiceError> {
        if microphone == MicrophonePermission::Denied {
            return Err(VoiceError::PermissionDenied);
        }
        if !credentials.has_agent_id() {
            return Err(VoiceError::MissingAgent);
        }
        if !credentials.has_api_key() {
            return Err(VoiceError::Unauthorized);
        }

        self.speech
            .signed_url(credentials.api_key.trim(), credentials.agent_id.trim())
            .await
    }

    pub async fn stop(&self) -> SessionStatus {
        let mut inner = self.inner.write().await;
        if inner.state != SessionState::Disconnected {
            tracing::info!(session_id = ?inner.session_id, "Voice session stopped");
            inner.disconnect();
        }
        inner.status()
    }

    /// Returns the volume the client should apply to the speech session
    pub async fn set_muted(&self, muted: bool) -> Result<f32, VoiceError> {
        let mut inner = self.inner.write().await;
        match inner.state {
            SessionState::Connected { .. } => {
                inner.state = SessionState::Connected { muted };
                Ok(if muted { 0.0 } else { 1.0 })
            }
            _ => Err(VoiceError::NotConnected),
        }
    }

    /// Hands an event to the session and waits for it to be handled
    pub async fn push(&self, event: SessionEvent) -> Result<EventOutcome, VoiceError> {
        let sender = {
            let inner = self.inner.read().await;
            match (&inner.state, &inner.events) {
                (SessionState::Connected { .. }, Some(tx)) => tx.clone(),
                _ => return Err(VoiceError::NotConnected),
            }
        };

        let (ack, outcome) = oneshot::channel();
        sender
            .send(Envelope { event, ack })
            .await
            .map_err(|_| VoiceError::NotConnected)?;

        outcome.await.map_err(|_| VoiceError::NotConnected)
    }
}

async fn consume_events(
    session_id: Uuid,
    mut rx: mpsc::Receiver<Envelope>,
    inner: Arc<RwLock<SessionInner>>,
    movies: Arc<dyn MovieDatabase>,
    extractor: Arc<IntentExtractor>,
) {
    while let Some(Envelope { event, ack }) = rx.recv().await {
        let transcript = match event {
            SessionEvent::Transcript(t) => t,
            SessionEvent::Disconnected => {
                let mut guard = inner.write().await;
                if guard.is_current(session_id) {
                    tracing::info!(session_id = %session_id, "Voice session closed by provider");
                    guard.disconnect();
                }
                let _ = ack.send(EventOutcome::no_action());
                break;
            }
        };

        {
            let mut guard = inner.write().await;
            if !guard.is_current(session_id) {
                break;
            }
            guard
                .transcript
                .push(transcript.source, transcript.message.clone());
        }

        let intent = extractor.extract(&transcript.message, transcript.source);
        let Some(query) = intent.query().map(str::to_string) else {
            let _ = ack.send(EventOutcome::no_action());
            continue;
        };

        tracing::info!(session_id = %session_id, query = %query, "Voice search requested");
        let search = match movies.search(&query).await {
            Ok(results) => VoiceSearch {
                query,
                results,
                error: None,
                searched_at: Utc::now(),
            },
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Voice search failed");
                VoiceSearch {
                    query,
                    results: Vec::new(),
                    error: Some(e.to_string()),
                    searched_at: Utc::now(),
                }
            }
        };

        {
            let mut guard = inner.write().await;
            if !guard.is_current(session_id) {
                break;
            }
            guard.last_search = Some(search.clone());
        }

        let _ = ack.send(EventOutcome {
            intent,
            search: Some(search),
        });
    }

    tracing::debug!(session_id = %session_id, "Voice event consumer finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        services::providers::{MockMovieDatabase, MockSpeechProvider},
    };

    fn speech_ok() -> Arc<dyn SpeechProvider> {
        let mut speech = MockSpeechProvider::new();
        speech
            .expect_signed_url()
            .returning(|_, _| Ok("wss://voice.test/session".to_string()));
        Arc::new(speech)
    }

    fn movies_echo() -> Arc<dyn MovieDatabase> {
        let mut db = MockMovieDatabase::new();
        db.expect_search()
            .returning(|q| Ok(vec![Movie::summary("tt1", q, "1999")]));
        Arc::new(db)
    }

    fn creds() -> VoiceCredentials {
        VoiceCredentials::new("sk_test", "agent_1")
    }

    fn user(text: &str) -> SessionEvent {
        SessionEvent::Transcript(TranscriptEvent {
            source: Origin::User,
            message: text.to_string(),
        })
    }

    async fn connected() -> VoiceController {
        let controller = VoiceController::new(speech_ok(), movies_echo(), IntentExtractor::default());
        controller
            .start(&creds(), MicrophonePermission::Granted)
            .await
            .unwrap();
        controller
    }

    #[tokio::test]
    async fn test_start_connects() {
        let controller = connected().await;
        let status = controller.status().await;
        assert_eq!(status.state, SessionState::Connected { muted: false });
        assert_eq!(status.signed_url.as_deref(), Some("wss://voice.test/session"));
        assert!(status.session_id.is_some());
    }

    #[tokio::test]
    async fn test_permission_denied_aborts() {
        let controller = VoiceController::new(speech_ok(), movies_echo(), IntentExtractor::default());
        let err = controller
            .start(&creds(), MicrophonePermission::Denied)
            .await
            .unwrap_err();

        assert_eq!(err, VoiceError::PermissionDenied);
        let status = controller.status().await;
        assert_eq!(status.state, SessionState::Disconnected);
        assert_eq!(status.last_error.unwrap().cause, "permission");
    }

    #[tokio::test]
    async fn test_missing_agent_never_calls_provider() {
        let speech = MockSpeechProvider::new();
        let controller =
            VoiceController::new(Arc::new(speech), movies_echo(), IntentExtractor::default());

        let err = controller
            .start(&VoiceCredentials::new("sk_test", " "), MicrophonePermission::Granted)
            .await
            .unwrap_err();
        assert_eq!(err, VoiceError::MissingAgent);
        assert_eq!(controller.status().await.state, SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_rejected_key_aborts() {
        let mut speech = MockSpeechProvider::new();
        speech
            .expect_signed_url()
            .returning(|_, _| Err(VoiceError::Unauthorized));
        let controller =
            VoiceController::new(Arc::new(speech), movies_echo(), IntentExtractor::default());

        let err = controller
            .start(&creds(), MicrophonePermission::Granted)
            .await
            .unwrap_err();
        assert_eq!(err, VoiceError::Unauthorized);
        assert_eq!(controller.status().await.state, SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_start_twice_keeps_session() {
        let controller = connected().await;
        let first = controller.status().await.session_id;
        let again = controller
            .start(&creds(), MicrophonePermission::Granted)
            .await
            .unwrap();
        assert_eq!(again.session_id, first);
    }

    #[tokio::test]
    async fn test_user_request_runs_search() {
        let controller = connected().await;
        let outcome = controller.push(user("Search for the matrix")).await.unwrap();

        assert_eq!(outcome.intent, Intent::Search("the matrix".to_string()));
        let search = outcome.search.unwrap();
        assert_eq!(search.results[0].title, "the matrix");
        assert_eq!(
            controller.status().await.last_search.unwrap().query,
            "the matrix"
        );
    }

    #[tokio::test]
    async fn test_assistant_line_is_logged_but_ignored() {
        let controller = connected().await;
        let outcome = controller
            .push(SessionEvent::Transcript(TranscriptEvent {
                source: Origin::Assistant,
                message: "Let me search for the matrix".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(outcome.intent, Intent::NoAction);
        assert!(controller.status().await.last_search.is_none());
        assert_eq!(controller.transcript().await.len(), 1);
    }

    #[tokio::test]
    async fn test_events_processed_in_arrival_order() {
        let controller = connected().await;
        for text in ["find alien", "hi", "show me heat"] {
            controller.push(user(text)).await.unwrap();
        }

        let transcript = controller.transcript().await;
        let texts: Vec<_> = transcript.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["find alien", "hi", "show me heat"]);
        assert_eq!(controller.status().await.last_search.unwrap().query, "heat");
    }

    #[tokio::test]
    async fn test_search_failure_is_reported_in_outcome() {
        let mut db = MockMovieDatabase::new();
        db.expect_search()
            .returning(|_| Err(AppError::ExternalApi("offline".to_string())));
        let controller = VoiceController::new(speech_ok(), Arc::new(db), IntentExtractor::default());
        controller
            .start(&creds(), MicrophonePermission::Granted)
            .await
            .unwrap();

        let outcome = controller.push(user("find jaws")).await.unwrap();
        let search = outcome.search.unwrap();
        assert!(search.results.is_empty());
        assert!(search.error.unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn test_provider_disconnect_ends_session() {
        let controller = connected().await;
        controller.push(SessionEvent::Disconnected).await.unwrap();

        assert_eq!(controller.status().await.state, SessionState::Disconnected);
        assert_eq!(
            controller.push(user("find jaws")).await.unwrap_err(),
            VoiceError::NotConnected
        );
    }

    #[tokio::test]
    async fn test_push_while_disconnected_is_rejected() {
        let controller = VoiceController::new(speech_ok(), movies_echo(), IntentExtractor::default());
        assert_eq!(
            controller.push(user("find jaws")).await.unwrap_err(),
            VoiceError::NotConnected
        );
    }

    #[tokio::test]
    async fn test_mute_toggle() {
        let controller = connected().await;
        assert_eq!(controller.set_muted(true).await.unwrap(), 0.0);
        assert_eq!(
            controller.status().await.state,
            SessionState::Connected { muted: true }
        );
        assert_eq!(controller.set_muted(false).await.unwrap(), 1.0);

        controller.stop().await;
        assert_eq!(
            controller.set_muted(true).await.unwrap_err(),
            VoiceError::NotConnected
        );
    }

    #[tokio::test]
    async fn test_stop_keeps_transcript() {
        let controller = connected().await;
        controller.push(user("hello there")).await.unwrap();

        let status = controller.stop().await;
        assert_eq!(status.state, SessionState::Disconnected);
        assert!(status.signed_url.is_none());
        assert_eq!(controller.transcript().await.len(), 1);
    }
}
