//! The planner's backend: authentication, task and event CRUD, and the
//! study-coach chat, all over a [`Storage`] with simulated network latency.
//!
//! A call applies its state transition as soon as it is made: it takes the
//! state lock, checks the session, mutates, persists the whole touched
//! collection and releases the lock. Only the reply waits out the simulated
//! latency. Calls issued back to back therefore mutate in issue order and
//! interleave only while their replies are in flight.

pub mod error;

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::calendar::MonthRef;
use crate::config::{LatencyConfig, PlannerConfig};
use crate::core::chat::{ChatLog, ChatMessage};
use crate::core::dashboard::Dashboard;
use crate::core::event::{Event, EventBook, EventDraft};
use crate::core::id::{IdGenerator, RecordId};
use crate::core::task::{Task, TaskBook, TaskDraft};
use crate::core::user::{self, NewUser, User, UserDirectory};
use crate::responder;
use crate::session::Session;
use crate::store::{
    CHAT_HISTORY_KEY, CURRENT_USER_KEY, EVENTS_KEY, FileStore, Storage, StorageError, TASKS_KEY,
    USERS_KEY,
};

pub use error::{ApiError, ApiResult, ErrorKind};

/// Result of [`MockApi::send_chat_message`].
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Default)]
struct State {
    users: UserDirectory,
    tasks: TaskBook,
    events: EventBook,
    chat: ChatLog,
    session: Option<Session>,
    /// Keys whose last write failed; memory is ahead of storage for these.
    unsaved: BTreeSet<&'static str>,
}

impl State {
    fn user_id(&self) -> ApiResult<RecordId> {
        self.session.as_ref().map(|s| s.user_id).ok_or(ApiError::NoSession)
    }

    fn record_write(&mut self, key: &'static str, saved: bool) {
        if saved {
            if self.unsaved.remove(key) {
                log::info!("'{}' is back in sync with storage", key);
            }
        } else if self.unsaved.insert(key) {
            log::warn!("'{}' could not be persisted, keeping changes in memory only", key);
        }
    }
}

/// Hold `result` back for the simulated round trip.
async fn settle<T>(latency: Duration, result: ApiResult<T>) -> ApiResult<T> {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
    result
}

pub struct MockApi {
    storage: Storage,
    latency: LatencyConfig,
    ids: IdGenerator,
    state: Mutex<State>,
}

impl MockApi {
    /// Load all collections from `storage`, seeding the demo accounts when no
    /// user directory exists yet, and resume a persisted session.
    pub fn open(storage: Storage, latency: LatencyConfig, seed_demo_users: bool) -> Self {
        let mut state = State::default();
        match storage.load::<UserDirectory>(USERS_KEY) {
            Some(users) => state.users = users,
            None if seed_demo_users => {
                state.users = user::demo_users();
                log::info!("Seeding {} demo users", state.users.len());
                let saved = storage.save(USERS_KEY, &state.users);
                state.record_write(USERS_KEY, saved);
            }
            None => {}
        }
        state.tasks = storage.load(TASKS_KEY).unwrap_or_default();
        state.events = storage.load(EVENTS_KEY).unwrap_or_default();
        state.chat = storage.load(CHAT_HISTORY_KEY).unwrap_or_default();

        let ids = IdGenerator::new();
        state.users.values().for_each(|u| ids.observe(u.id));
        state.tasks.values().flatten().for_each(|t| ids.observe(t.id));
        state.events.values().flatten().for_each(|e| ids.observe(e.id));

        state.session = storage.load::<User>(CURRENT_USER_KEY).and_then(|stored| {
            match state.users.values().find(|u| u.id == stored.id && u.email == stored.email) {
                Some(user) => {
                    log::info!("Resuming session for {}", user.email);
                    Some(Session::start(user))
                }
                None => {
                    log::warn!("Discarding stored session for unknown user {}", stored.email);
                    storage.remove(CURRENT_USER_KEY);
                    None
                }
            }
        });

        Self {
            storage,
            latency,
            ids,
            state: Mutex::new(state),
        }
    }

    /// File-backed API rooted at the configured data directory.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, StorageError> {
        let store = FileStore::open(&config.data_directory)?;
        let storage = Storage::new(store, config.key_prefix.clone());
        Ok(Self::open(storage, config.latency.clone(), config.seed_demo_users))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Storage keys whose latest in-memory state failed to persist.
    pub fn unsaved_keys(&self) -> Vec<&'static str> {
        self.state().unsaved.iter().copied().collect()
    }

    // --- Authentication ---

    pub fn login(&self, email: &str, password: &str) -> impl Future<Output = ApiResult<User>> {
        settle(self.latency.login(), self.sign_in(email, password))
    }

    pub fn register(&self, new_user: NewUser) -> impl Future<Output = ApiResult<User>> {
        settle(self.latency.register(), self.add_user(new_user))
    }

    pub fn logout(&self) {
        let mut state = self.state();
        if let Some(session) = state.session.take() {
            log::info!("{} signed out", session.email);
        }
        self.storage.remove(CURRENT_USER_KEY);
        state.unsaved.remove(CURRENT_USER_KEY);
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().session.is_some()
    }

    pub fn session(&self) -> Option<Session> {
        self.state().session.clone()
    }

    /// The signed-in user, read fresh from the directory.
    pub fn current_user(&self) -> Option<User> {
        let state = self.state();
        let session = state.session.as_ref()?;
        state.users.get(&session.email).filter(|u| session.belongs_to(u)).cloned()
    }

    // --- Tasks ---

    pub fn get_tasks(&self) -> impl Future<Output = ApiResult<Vec<Task>>> {
        settle(self.latency.crud(), self.tasks_of_session())
    }

    /// Create a task (no id) or update one in place (id of an existing task).
    /// Resolves to the caller's full task list.
    pub fn save_task(&self, draft: TaskDraft) -> impl Future<Output = ApiResult<Vec<Task>>> {
        settle(self.latency.crud(), self.upsert_task(draft))
    }

    /// Remove a task. A missing id is not an error.
    pub fn delete_task(&self, id: RecordId) -> impl Future<Output = ApiResult<Vec<Task>>> {
        settle(self.latency.crud(), self.remove_task(id))
    }

    // --- Events ---

    /// The caller's events, optionally only those in `month`.
    pub fn get_events(
        &self,
        month: Option<MonthRef>,
    ) -> impl Future<Output = ApiResult<Vec<Event>>> {
        settle(self.latency.crud(), self.events_in(month))
    }

    pub fn save_event(&self, draft: EventDraft) -> impl Future<Output = ApiResult<Vec<Event>>> {
        settle(self.latency.crud(), self.upsert_event(draft))
    }

    /// Remove an event. A missing id is not an error.
    pub fn delete_event(&self, id: RecordId) -> impl Future<Output = ApiResult<Vec<Event>>> {
        settle(self.latency.crud(), self.remove_event(id))
    }

    // --- Chat ---

    pub fn send_chat_message(&self, text: &str) -> impl Future<Output = ApiResult<ChatReply>> {
        settle(self.latency.chat_send(), self.chat_turn(text))
    }

    pub fn get_chat_history(&self) -> impl Future<Output = ApiResult<Vec<ChatMessage>>> {
        settle(self.latency.chat_history(), self.chat_of_session())
    }

    // --- Aggregates ---

    /// Tasks and events fetched concurrently, then summarised.
    pub async fn dashboard(&self, today: NaiveDate) -> ApiResult<Dashboard> {
        let (tasks, events) = tokio::try_join!(self.get_tasks(), self.get_events(None))?;
        Ok(Dashboard::build(&tasks, &events, today))
    }
}

// State transitions. Each runs under the lock and never awaits.
impl MockApi {
    fn sign_in(&self, email: &str, password: &str) -> ApiResult<User> {
        let mut state = self.state();
        let user = state
            .users
            .get(email.trim())
            .filter(|u| u.password == password)
            .cloned();
        let Some(user) = user else {
            log::info!("Rejected sign-in for {}", email.trim());
            return Err(ApiError::InvalidCredentials);
        };
        state.session = Some(Session::start(&user));
        let saved = self.storage.save(CURRENT_USER_KEY, &user);
        state.record_write(CURRENT_USER_KEY, saved);
        log::info!("{} signed in", user.email);
        Ok(user)
    }

    fn add_user(&self, new_user: NewUser) -> ApiResult<User> {
        new_user.validate().map_err(ApiError::Invalid)?;
        let mut state = self.state();
        let email = new_user.email.trim().to_string();
        if state.users.contains_key(&email) {
            log::info!("Registration refused, {} already exists", email);
            return Err(ApiError::EmailTaken);
        }
        let user = new_user.into_user(self.ids.next_id());
        state.users.insert(email, user.clone());
        let saved = self.storage.save(USERS_KEY, &state.users);
        state.record_write(USERS_KEY, saved);
        state.session = Some(Session::start(&user));
        let saved = self.storage.save(CURRENT_USER_KEY, &user);
        state.record_write(CURRENT_USER_KEY, saved);
        log::info!("Registered {} (id {})", user.email, user.id);
        Ok(user)
    }

    fn tasks_of_session(&self) -> ApiResult<Vec<Task>> {
        let state = self.state();
        let user_id = state.user_id()?;
        Ok(state.tasks.get(&user_id).cloned().unwrap_or_default())
    }

    fn upsert_task(&self, draft: TaskDraft) -> ApiResult<Vec<Task>> {
        draft.validate().map_err(ApiError::Invalid)?;
        let mut state = self.state();
        let user_id = state.user_id()?;
        let now = Utc::now();
        let list = state.tasks.entry(user_id).or_default();
        match draft.id {
            Some(id) => {
                let task = list
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or(ApiError::NotFound { kind: "task", id })?;
                task.apply(&draft, now);
            }
            None => {
                let task = draft.into_task(self.ids.next_id(), now);
                log::debug!("New task {} for user {}", task.id, user_id);
                list.push(task);
            }
        }
        let list = list.clone();
        let saved = self.storage.save(TASKS_KEY, &state.tasks);
        state.record_write(TASKS_KEY, saved);
        Ok(list)
    }

    fn remove_task(&self, id: RecordId) -> ApiResult<Vec<Task>> {
        let mut state = self.state();
        let user_id = state.user_id()?;
        let Some(list) = state.tasks.get_mut(&user_id) else {
            return Ok(Vec::new());
        };
        list.retain(|t| t.id != id);
        let list = list.clone();
        let saved = self.storage.save(TASKS_KEY, &state.tasks);
        state.record_write(TASKS_KEY, saved);
        Ok(list)
    }

    fn events_in(&self, month: Option<MonthRef>) -> ApiResult<Vec<Event>> {
        let state = self.state();
        let user_id = state.user_id()?;
        let events = state.events.get(&user_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(match month {
            Some(month) => events.iter().filter(|e| month.contains(e.date)).cloned().collect(),
            None => events.to_vec(),
        })
    }

    fn upsert_event(&self, draft: EventDraft) -> ApiResult<Vec<Event>> {
        draft.validate().map_err(ApiError::Invalid)?;
        let mut state = self.state();
        let user_id = state.user_id()?;
        let list = state.events.entry(user_id).or_default();
        match draft.id {
            Some(id) => {
                let event = list
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or(ApiError::NotFound { kind: "event", id })?;
                event.apply(&draft);
            }
            None => {
                let event = draft.into_event(self.ids.next_id(), Utc::now());
                log::debug!("New event {} on {} for user {}", event.id, event.date, user_id);
                list.push(event);
            }
        }
        let list = list.clone();
        let saved = self.storage.save(EVENTS_KEY, &state.events);
        state.record_write(EVENTS_KEY, saved);
        Ok(list)
    }

    fn remove_event(&self, id: RecordId) -> ApiResult<Vec<Event>> {
        let mut state = self.state();
        let user_id = state.user_id()?;
        let Some(list) = state.events.get_mut(&user_id) else {
            return Ok(Vec::new());
        };
        list.retain(|e| e.id != id);
        let list = list.clone();
        let saved = self.storage.save(EVENTS_KEY, &state.events);
        state.record_write(EVENTS_KEY, saved);
        Ok(list)
    }

    fn chat_of_session(&self) -> ApiResult<Vec<ChatMessage>> {
        let state = self.state();
        let user_id = state.user_id()?;
        Ok(state.chat.get(&user_id).cloned().unwrap_or_default())
    }

    fn chat_turn(&self, text: &str) -> ApiResult<ChatReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiError::Invalid("Message is empty".to_string()));
        }
        let mut state = self.state();
        let user_id = state.user_id()?;
        let response = responder::respond(text);
        let history = state.chat.entry(user_id).or_default();
        history.push(ChatMessage::user(text));
        history.push(ChatMessage::ai(response));
        let history = history.clone();
        let saved = self.storage.save(CHAT_HISTORY_KEY, &state.chat);
        state.record_write(CHAT_HISTORY_KEY, saved);
        Ok(ChatReply {
            response: response.to_string(),
            history,
        })
    }
}
