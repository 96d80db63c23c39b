pub(crate) mod note_store;
pub(crate) mod note_sync;

use crate::api::{ApiClient, ApiResult};
use crate::config::EnvConfig;
use crate::session::SessionToken;
use crate::state::note_store::NoteStore;
use crate::storage::{clear_token, load_token, save_token};
use leptos::prelude::*;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<EnvConfig>,

    /// The signed-in session. Only `sign_in` and `sign_out` write it.
    pub session: RwSignal<Option<SessionToken>>,

    /// Notes of the current session.
    pub notes: RwSignal<NoteStore>,
}

impl AppState {
    pub fn new(config: EnvConfig) -> Self {
        Self {
            config: StoredValue::new(config),
            session: RwSignal::new(load_token()),
            notes: RwSignal::new(NoteStore::new()),
        }
    }

    /// Client bound to the current session.
    pub fn api_client(&self) -> ApiClient {
        let base_url = self.config.with_value(|c| c.api_url.clone());
        ApiClient::new(base_url).with_token(self.session.get_untracked())
    }

    pub fn sign_in(&self, token: SessionToken) {
        save_token(&token);
        self.notes.set(NoteStore::new());
        self.session.set(Some(token));
        tracing::info!("signed in");
    }

    pub fn sign_out(&self) {
        clear_token();
        self.session.set(None);
        self.notes.set(NoteStore::new());
        tracing::info!("signed out");
    }

    /// An expired or revoked token ends the session; the route guard takes it from there.
    pub fn check_session(&self, res: ApiResult<()>) {
        if let Err(e) = res {
            if e.is_unauthorized() {
                tracing::warn!("session rejected by backend");
                self.sign_out();
            }
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
