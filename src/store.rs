//! Canonical user list and the two single-flight operations on it.
//!
//! Each operation kind has an explicit [`OpState`]. Starting an operation
//! that is already in flight is rejected with [`StoreError::Busy`]; nothing
//! is queued. Operations can be driven two ways:
//!
//! - `fetch_all` / `create` await the call inline (headless commands, tests);
//! - `begin_*` / `finish_*` split the same transitions around a spawned task
//!   whose abort handle is kept in the `InFlight` state (interactive loop).

use std::fmt;

use serde_json::Value;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::api::UserApi;
use crate::error::{Result, StoreError, TransportError};
use crate::form::FormState;
use crate::model::{NewUser, UserRecord};
use crate::normalize::normalize;
use crate::notify::Notifier;

pub const FETCH_FAILED: &str = "Failed to load users";
pub const CREATE_FAILED: &str = "Failed to create user";
pub const CREATE_OK: &str = "User created successfully";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Fetch,
    Create,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("loading users"),
            Self::Create => f.write_str("creating user"),
        }
    }
}

#[derive(Debug, Default)]
pub enum OpState {
    #[default]
    Idle,
    /// The handle is present when the call runs on a spawned task.
    InFlight(Option<AbortHandle>),
}

impl OpState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight(_))
    }

    fn cancel(&mut self) {
        if let Self::InFlight(Some(handle)) = std::mem::take(self) {
            handle.abort();
        }
    }
}

/// Returns the state to `Idle` when dropped, including when the owning
/// future is dropped mid-await.
struct IdleOnDrop<'a>(&'a mut OpState);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = OpState::Idle;
    }
}

#[derive(Debug, Default)]
pub struct UserStore {
    users: Vec<UserRecord>,
    fetch: OpState,
    create: OpState,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_in_flight()
    }

    pub fn is_submitting(&self) -> bool {
        self.create.is_in_flight()
    }

    pub fn state(&self, kind: OpKind) -> &OpState {
        match kind {
            OpKind::Fetch => &self.fetch,
            OpKind::Create => &self.create,
        }
    }

    fn state_mut(&mut self, kind: OpKind) -> &mut OpState {
        match kind {
            OpKind::Fetch => &mut self.fetch,
            OpKind::Create => &mut self.create,
        }
    }

    /// Move `kind` from Idle to InFlight.
    pub fn begin(&mut self, kind: OpKind) -> Result<()> {
        let state = self.state_mut(kind);
        if state.is_in_flight() {
            debug!(%kind, "rejected: already in flight");
            return Err(StoreError::Busy(kind));
        }
        *state = OpState::InFlight(None);
        debug!(%kind, "in flight");
        Ok(())
    }

    /// Record the task running `kind`. Ignored if the operation already
    /// finished or was cancelled.
    pub fn attach(&mut self, kind: OpKind, handle: AbortHandle) {
        match self.state_mut(kind) {
            OpState::InFlight(slot) => *slot = Some(handle),
            OpState::Idle => handle.abort(),
        }
    }

    /// Abort the task running `kind`, if any, and return to Idle.
    pub fn cancel(&mut self, kind: OpKind) {
        if self.state(kind).is_in_flight() {
            debug!(%kind, "cancelled");
        }
        self.state_mut(kind).cancel();
    }

    pub fn cancel_all(&mut self) {
        self.cancel(OpKind::Fetch);
        self.cancel(OpKind::Create);
    }

    /// Start the fetch that follows a successful create. A fetch already in
    /// flight started before the create landed, so it is replaced.
    pub fn begin_refetch(&mut self) {
        self.fetch.cancel();
        self.fetch = OpState::InFlight(None);
    }

    /// Apply the outcome of `GET /getUsers` and return to Idle.
    pub fn finish_fetch(&mut self, result: Result<Value, TransportError>, notifier: &mut Notifier) -> Result<usize> {
        self.fetch = OpState::Idle;
        self.apply_fetch(result, notifier)
    }

    fn apply_fetch(&mut self, result: Result<Value, TransportError>, notifier: &mut Notifier) -> Result<usize> {
        match result {
            Ok(body) => {
                let normalized = normalize(&body);
                if let Some(diag) = &normalized.diagnostic {
                    warn!(%diag, "treating response as empty user list");
                }
                self.users = normalized.users;
                info!(count = self.users.len(), "users loaded");
                Ok(self.users.len())
            }
            Err(err) => {
                warn!(%err, "failed to load users");
                self.users = Vec::new();
                notifier.error(message_or(&err, FETCH_FAILED));
                Err(err.into())
            }
        }
    }

    /// Validate the draft and move create to InFlight. A validation failure
    /// raises an error toast and leaves everything else untouched.
    pub fn begin_create(&mut self, form: &FormState, notifier: &mut Notifier) -> Result<NewUser> {
        let body = match form.validate() {
            Ok(body) => body,
            Err(err) => {
                debug!(%err, "draft rejected");
                notifier.error(format!("Please fill in all fields: {err}"));
                return Err(err.into());
            }
        };
        self.begin(OpKind::Create)?;
        Ok(body)
    }

    /// Apply the outcome of `POST /addUser` and return to Idle. On `Ok` the
    /// caller must follow up with exactly one fetch.
    pub fn finish_create(
        &mut self,
        result: Result<(), TransportError>,
        form: &mut FormState,
        notifier: &mut Notifier,
    ) -> Result<()> {
        self.create = OpState::Idle;
        Self::apply_create(result, form, notifier)
    }

    fn apply_create(result: Result<(), TransportError>, form: &mut FormState, notifier: &mut Notifier) -> Result<()> {
        match result {
            Ok(()) => {
                info!("user created");
                form.reset();
                notifier.success(CREATE_OK);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "failed to create user");
                notifier.error(message_or(&err, CREATE_FAILED));
                Err(err.into())
            }
        }
    }

    /// Load the list, replacing whatever was there. Returns the new count.
    pub async fn fetch_all(&mut self, api: &dyn UserApi, notifier: &mut Notifier) -> Result<usize> {
        self.begin(OpKind::Fetch)?;
        let result = {
            let _idle = IdleOnDrop(&mut self.fetch);
            api.get_users().await
        };
        self.apply_fetch(result, notifier)
    }

    /// Validate, create, then refetch. `Ok` means the user was created; a
    /// failed refetch is reported through its own toast.
    pub async fn create(&mut self, api: &dyn UserApi, form: &mut FormState, notifier: &mut Notifier) -> Result<()> {
        let body = self.begin_create(form, notifier)?;
        let result = {
            let _idle = IdleOnDrop(&mut self.create);
            api.add_user(&body).await
        };
        Self::apply_create(result, form, notifier)?;
        if let Err(err) = self.fetch_all(api, notifier).await {
            debug!(%err, "refetch after create failed");
        }
        Ok(())
    }
}

impl Drop for UserStore {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn message_or(err: &TransportError, fallback: &str) -> String {
    let msg = err.user_message();
    if msg.trim().is_empty() {
        fallback.to_string()
    } else {
        format!("{fallback}: {msg}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;
    use crate::notify::ToastKind;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeApi {
        gets: AtomicUsize,
        adds: AtomicUsize,
        get_results: Mutex<VecDeque<std::result::Result<Value, TransportError>>>,
        add_result: Mutex<Option<TransportError>>,
        added: Mutex<Vec<NewUser>>,
    }

    impl FakeApi {
        fn with_gets(results: Vec<std::result::Result<Value, TransportError>>) -> Self {
            Self {
                get_results: Mutex::new(results.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl UserApi for FakeApi {
        async fn get_users(&self) -> std::result::Result<Value, TransportError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.get_results.lock().unwrap().pop_front().unwrap_or_else(|| Ok(json!([])))
        }

        async fn add_user(&self, user: &NewUser) -> std::result::Result<(), TransportError> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.add_result.lock().unwrap().clone() {
                return Err(err);
            }
            self.added.lock().unwrap().push(user.clone());
            Ok(())
        }
    }

    fn refused() -> TransportError {
        TransportError::Request {
            url: "http://test/getUsers".into(),
            message: "could not connect to server".into(),
        }
    }

    fn filled_form() -> FormState {
        let mut form = FormState::new();
        form.update(Field::Name, "Ann");
        form.update(Field::Email, "a@x.com");
        form
    }

    #[tokio::test]
    async fn fetch_replaces_list_and_returns_to_idle() {
        let api = FakeApi::with_gets(vec![Ok(json!({"data": [{"name": "Ann"}, {"name": "Bob"}]}))]);
        let mut store = UserStore::new();
        let mut notes = Notifier::new();

        let count = store.fetch_all(&api, &mut notes).await.expect("fetch");
        assert_eq!(count, 2);
        assert_eq!(store.users()[1].name.as_deref(), Some("Bob"));
        assert!(!store.is_loading());
        assert!(notes.current().is_none());
    }

    #[tokio::test]
    async fn fetch_failure_empties_list_and_toasts() {
        let api = FakeApi::with_gets(vec![Ok(json!([{"name": "Ann"}])), Err(refused())]);
        let mut store = UserStore::new();
        let mut notes = Notifier::new();
        store.fetch_all(&api, &mut notes).await.expect("first fetch");

        let err = store.fetch_all(&api, &mut notes).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
        assert!(store.users().is_empty());
        assert!(!store.is_loading());
        let toast = notes.current().expect("error toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.message.contains("could not connect"));
    }

    #[tokio::test]
    async fn malformed_body_is_silent() {
        let api = FakeApi::with_gets(vec![Ok(json!("oops"))]);
        let mut store = UserStore::new();
        let mut notes = Notifier::new();
        assert_eq!(store.fetch_all(&api, &mut notes).await, Ok(0));
        assert!(notes.current().is_none());
    }

    #[tokio::test]
    async fn create_with_empty_name_makes_no_call() {
        let api = FakeApi::default();
        let mut store = UserStore::new();
        let mut notes = Notifier::new();
        let mut form = FormState::new();
        form.update(Field::Email, "valid@x.com");

        let err = store.create(&api, &mut form, &mut notes).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(api.adds.load(Ordering::SeqCst), 0);
        assert_eq!(api.gets.load(Ordering::SeqCst), 0);
        assert_eq!(notes.current().map(|t| t.kind), Some(ToastKind::Error));
        assert!(!store.is_submitting());
        assert_eq!(form.draft.email, "valid@x.com");
    }

    #[tokio::test]
    async fn successful_create_resets_draft_and_refetches_once() {
        let api = FakeApi::with_gets(vec![Ok(json!([{"name": "Ann", "email": "a@x.com"}]))]);
        let mut store = UserStore::new();
        let mut notes = Notifier::new();
        let mut form = filled_form();
        form.update(Field::Name, "  Ann ");

        store.create(&api, &mut form, &mut notes).await.expect("create");
        assert_eq!(form.draft.name, "");
        assert_eq!(form.draft.email, "");
        assert_eq!(api.adds.load(Ordering::SeqCst), 1);
        assert_eq!(api.gets.load(Ordering::SeqCst), 1);
        assert_eq!(api.added.lock().unwrap()[0].name, "Ann");
        assert_eq!(store.users().len(), 1);
        let toast = notes.current().expect("success toast");
        assert_eq!((toast.kind, toast.message.as_str()), (ToastKind::Success, CREATE_OK));
    }

    #[tokio::test]
    async fn failed_create_keeps_draft_and_list() {
        let api = FakeApi::with_gets(vec![Ok(json!([{"name": "Bob"}]))]);
        *api.add_result.lock().unwrap() = Some(TransportError::Status {
            url: "http://test/addUser".into(),
            status: 409,
            message: Some("email already exists".into()),
        });
        let mut store = UserStore::new();
        let mut notes = Notifier::new();
        store.fetch_all(&api, &mut notes).await.expect("seed");
        let mut form = filled_form();

        assert!(store.create(&api, &mut form, &mut notes).await.is_err());
        assert_eq!(form.draft.name, "Ann");
        assert_eq!(store.users().len(), 1);
        assert_eq!(api.gets.load(Ordering::SeqCst), 1);
        assert!(!store.is_submitting());
        let toast = notes.current().expect("error toast");
        assert_eq!(toast.message, "Failed to create user: email already exists");
    }

    #[tokio::test]
    async fn begin_rejects_second_operation_of_same_kind() {
        let mut store = UserStore::new();
        store.begin(OpKind::Fetch).expect("first");
        assert_eq!(store.begin(OpKind::Fetch), Err(StoreError::Busy(OpKind::Fetch)));
        // other kind is independent
        store.begin(OpKind::Create).expect("create");
        store.cancel_all();
        assert!(!store.is_loading() && !store.is_submitting());
    }

    #[tokio::test]
    async fn cancel_aborts_attached_task() {
        let mut store = UserStore::new();
        store.begin(OpKind::Fetch).expect("begin");
        let task = tokio::spawn(std::future::pending::<()>());
        store.attach(OpKind::Fetch, task.abort_handle());
        store.cancel(OpKind::Fetch);
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn refetch_replaces_stale_fetch() {
        let mut store = UserStore::new();
        let mut notes = Notifier::new();
        store.begin(OpKind::Fetch).expect("begin");
        let stale = tokio::spawn(std::future::pending::<()>());
        store.attach(OpKind::Fetch, stale.abort_handle());

        store.begin_refetch();
        assert!(stale.await.unwrap_err().is_cancelled());
        assert!(store.is_loading());
        store.finish_fetch(Ok(json!([{"name": "Cy"}])), &mut notes).expect("finish");
        assert!(!store.is_loading());
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn dropped_fetch_future_returns_to_idle() {
        struct Hang;
        #[async_trait]
        impl UserApi for Hang {
            async fn get_users(&self) -> std::result::Result<Value, TransportError> {
                std::future::pending().await
            }
            async fn add_user(&self, _: &NewUser) -> std::result::Result<(), TransportError> {
                std::future::pending().await
            }
        }

        let mut store = UserStore::new();
        let mut notes = Notifier::new();
        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            store.fetch_all(&Hang, &mut notes),
        )
        .await;
        assert!(timed_out.is_err());
        assert!(!store.is_loading());
    }
}
