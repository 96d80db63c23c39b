use crate::api::{ApiError, ApiResult, NotesBackend};
use crate::models::NoteKey;
use crate::state::note_store::{NoteStore, RemovePlan, RemoveOutcome, SaveAck, SaveOutcome, SaveTarget};
use leptos::prelude::*;

/// Somewhere the note store lives between awaits.
///
/// The page keeps it in a signal; the store must never be borrowed across a request.
pub(crate) trait StoreCell {
    /// `None` once the owner is gone (page unmounted).
    fn with_store<R>(&self, f: impl FnOnce(&mut NoteStore) -> R) -> Option<R>;
}

impl StoreCell for RwSignal<NoteStore> {
    fn with_store<R>(&self, f: impl FnOnce(&mut NoteStore) -> R) -> Option<R> {
        self.try_update(f)
    }
}

fn err_of<T>(res: &ApiResult<T>) -> Option<ApiError> {
    res.as_ref().err().cloned()
}

/// Fetches the whole list and hands it to the store.
///
/// Failures end up in the store's fetch status; the error is also returned so
/// the caller can react to an expired session.
pub(crate) async fn refresh<S: StoreCell, B: NotesBackend>(store: &S, backend: &B) -> ApiResult<()> {
    let Some(ticket) = store.with_store(NoteStore::begin_fetch) else {
        return Ok(());
    };

    let res = backend.list_notes().await;
    let err = err_of(&res);
    match &res {
        Ok(notes) => tracing::debug!(count = notes.len(), "fetched notes"),
        Err(e) => tracing::warn!(error = %e, "fetching notes failed"),
    }

    if store.with_store(|s| s.finish_fetch(ticket, res)) == Some(false) {
        tracing::debug!("dropping superseded note list");
    }
    err.map_or(Ok(()), Err)
}

/// Saves the selected note if it is savable, then refreshes the list.
pub(crate) async fn save_selected<S: StoreCell, B: NotesBackend>(store: &S, backend: &B) -> ApiResult<()> {
    let Some(Some(req)) = store.with_store(NoteStore::begin_save) else {
        return Ok(());
    };

    let ack = match &req.target {
        SaveTarget::Create => backend.create_note(&req.body).await.map(SaveAck::Created),
        SaveTarget::Update(id) => backend
            .update_note(id, &req.body)
            .await
            .map(|_| SaveAck::Updated),
    };
    let err = err_of(&ack);

    match store.with_store(|s| s.finish_save(&req, ack)) {
        Some(SaveOutcome::Saved(key)) => {
            tracing::info!(note = %key, "note saved");
            refresh(store, backend).await
        }
        Some(SaveOutcome::Failed) => {
            let e = err.unwrap_or_else(|| ApiError::new(crate::api::ApiErrorKind::Http, "save failed"));
            tracing::warn!(note = %req.key, error = %e, "saving note failed");
            Err(e)
        }
        Some(SaveOutcome::Stale) | None => {
            tracing::debug!(note = %req.key, "dropping stale save completion");
            Ok(())
        }
    }
}

/// Removes a note. Drafts never reach the backend; persisted notes are removed
/// locally once the delete completes, whatever its result.
pub(crate) async fn remove<S: StoreCell, B: NotesBackend>(
    store: &S,
    backend: &B,
    key: &NoteKey,
) -> ApiResult<()> {
    let plan = store.with_store(|s| s.begin_remove(key));
    let Some(RemovePlan::Remote { id, token }) = plan else {
        return Ok(());
    };

    let res = backend.delete_note(&id).await;
    if let Err(e) = &res {
        tracing::warn!(note = %id, error = %e, "deleting note failed; removed locally anyway");
    }

    if store.with_store(|s| s.finish_remove(key, token)) == Some(RemoveOutcome::Stale) {
        tracing::debug!(note = %id, "dropping stale delete completion");
    }
    res
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::api::{ApiErrorKind, NoteBody};
    use crate::models::{NoteId, RemoteNote};
    use crate::state::note_store::{FetchStatus, OpKind};
    use std::cell::{Cell, RefCell};

    impl StoreCell for RefCell<NoteStore> {
        fn with_store<R>(&self, f: impl FnOnce(&mut NoteStore) -> R) -> Option<R> {
            Some(f(&mut self.borrow_mut()))
        }
    }

    /// In-memory backend that records every call.
    #[derive(Default)]
    struct FakeBackend {
        notes: RefCell<Vec<RemoteNote>>,
        calls: RefCell<Vec<String>>,
        next_id: Cell<u32>,
        fail_list: Cell<bool>,
        fail_update: Cell<bool>,
        fail_delete: Cell<bool>,
        unauthorized: Cell<bool>,
        /// Answer POST like a backend that only says `{"message": "Note created"}`.
        create_without_body: Cell<bool>,
    }

    impl FakeBackend {
        fn with_notes(notes: &[(&str, &str, &str)]) -> Self {
            let b = Self::default();
            *b.notes.borrow_mut() = notes
                .iter()
                .map(|(id, t, c)| RemoteNote {
                    id: id.to_string(),
                    title: t.to_string(),
                    content: c.to_string(),
                    user: "u1".to_string(),
                    created_at: "2024-03-05T10:00:00Z".to_string(),
                    updated_at: None,
                })
                .collect();
            b
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn check(&self, fail: bool) -> ApiResult<()> {
            if self.unauthorized.get() {
                return Err(ApiError::new(ApiErrorKind::Unauthorized, "Unauthorized"));
            }
            if fail {
                return Err(ApiError::new(ApiErrorKind::Http, "Request failed (500)"));
            }
            Ok(())
        }
    }

    impl NotesBackend for FakeBackend {
        async fn list_notes(&self) -> ApiResult<Vec<RemoteNote>> {
            self.calls.borrow_mut().push("GET".to_string());
            self.check(self.fail_list.get())?;
            Ok(self.notes.borrow().clone())
        }

        async fn create_note(&self, body: &NoteBody) -> ApiResult<Option<RemoteNote>> {
            self.calls.borrow_mut().push("POST".to_string());
            self.check(false)?;
            self.next_id.set(self.next_id.get() + 1);
            let note = RemoteNote {
                id: format!("65f1{:04}", self.next_id.get()),
                title: body.title.clone(),
                content: body.content.clone(),
                user: "u1".to_string(),
                created_at: "2024-03-05T10:00:00Z".to_string(),
                updated_at: None,
            };
            self.notes.borrow_mut().insert(0, note.clone());
            Ok((!self.create_without_body.get()).then_some(note))
        }

        async fn update_note(&self, id: &NoteId, body: &NoteBody) -> ApiResult<()> {
            self.calls.borrow_mut().push(format!("PATCH {id}"));
            self.check(self.fail_update.get())?;
            for n in self.notes.borrow_mut().iter_mut() {
                if n.id == id.as_str() {
                    n.title = body.title.clone();
                    n.content = body.content.clone();
                }
            }
            Ok(())
        }

        async fn delete_note(&self, id: &NoteId) -> ApiResult<()> {
            self.calls.borrow_mut().push(format!("DELETE {id}"));
            self.check(self.fail_delete.get())?;
            self.notes.borrow_mut().retain(|n| n.id != id.as_str());
            Ok(())
        }
    }

    fn pkey(id: &str) -> NoteKey {
        NoteKey::Persisted(NoteId(id.to_string()))
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_initial_load_replaces_list() {
        let backend = FakeBackend::with_notes(&[("n1", "t1", "c1"), ("n2", "t2", "c2")]);
        let store = RefCell::new(NoteStore::new());

        refresh(&store, &backend).await.expect("load should succeed");

        let s = store.borrow();
        assert!(!s.is_loading());
        assert_eq!(s.notes().len(), 2);
        assert_eq!(s.fetch_status(), &FetchStatus::Loaded);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_failed_initial_load_degrades_to_empty_list() {
        let backend = FakeBackend::default();
        backend.fail_list.set(true);
        let store = RefCell::new(NoteStore::new());

        assert!(refresh(&store, &backend).await.is_err());

        let s = store.borrow();
        assert!(!s.is_loading());
        assert!(s.notes().is_empty());
        assert!(matches!(s.fetch_status(), FetchStatus::Failed(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_create_save_round_trip() {
        let backend = FakeBackend::default();
        let store = RefCell::new(NoteStore::new());
        refresh(&store, &backend).await.expect("load");

        let draft = store.borrow_mut().create("2024-03-05T10:00:00Z".to_string());
        store.borrow_mut().set_title("A".to_string());
        store.borrow_mut().set_content("B".to_string());

        save_selected(&store, &backend).await.expect("save should succeed");
        assert_eq!(backend.calls(), vec!["GET", "POST", "GET"]);

        let s = store.borrow();
        assert!(!s.is_editing());
        assert_eq!(s.notes().len(), 1);
        let n = &s.notes()[0];
        assert_eq!((n.title.as_str(), n.content.as_str()), ("A", "B"));
        assert!(!n.key.is_draft());
        assert_ne!(n.key, draft);
        assert_eq!(s.selected_key(), Some(&n.key));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_create_without_echoed_note_is_picked_up_by_refresh() {
        let backend = FakeBackend::with_notes(&[("n1", "A", "B")]);
        backend.create_without_body.set(true);
        let store = RefCell::new(NoteStore::new());
        refresh(&store, &backend).await.expect("load");

        let draft = store.borrow_mut().create("2024-03-05T10:00:00Z".to_string());
        store.borrow_mut().set_title("A".to_string());
        store.borrow_mut().set_content("B".to_string());

        save_selected(&store, &backend).await.expect("save should succeed");
        assert_eq!(backend.calls(), vec!["GET", "POST", "GET"]);

        {
            let s = store.borrow();
            assert!(s.get(&draft).is_none());
            assert!(s.save_error().is_none());
            assert!(!s.is_editing());
            // The older note with the same text stays as it was.
            assert_eq!(s.notes().len(), 2);
            let selected = s.selected().expect("created note stays selected");
            assert_eq!(selected.key, pkey("65f10001"));
            assert_eq!(backend.notes.borrow().len(), 2);
        }

        // Nothing left to save: no second POST.
        save_selected(&store, &backend).await.expect("no-op");
        assert_eq!(backend.calls(), vec!["GET", "POST", "GET"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_create_without_echoed_note_waits_out_failed_refresh() {
        let backend = FakeBackend::default();
        backend.create_without_body.set(true);
        backend.fail_list.set(true);
        let store = RefCell::new(NoteStore::new());

        let draft = store.borrow_mut().create(String::new());
        store.borrow_mut().set_title("A".to_string());
        store.borrow_mut().set_content("B".to_string());

        assert!(save_selected(&store, &backend).await.is_err());
        {
            let mut s = store.borrow_mut();
            assert!(s.get(&draft).is_some());
            assert_eq!(s.pending(&draft), Some(OpKind::Save));
            s.start_editing();
            assert!(!s.is_editing());
            assert!(s.begin_save().is_none());
        }

        backend.fail_list.set(false);
        refresh(&store, &backend).await.expect("load");

        let s = store.borrow();
        assert_eq!(s.notes().len(), 1);
        assert!(!s.notes()[0].key.is_draft());
        assert_eq!(s.selected_key(), Some(&s.notes()[0].key));
        assert_eq!(backend.calls(), vec!["POST", "GET", "GET"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_blank_title_save_issues_no_request() {
        let backend = FakeBackend::default();
        let store = RefCell::new(NoteStore::new());
        store.borrow_mut().create(String::new());
        store.borrow_mut().set_content("nonempty".to_string());

        save_selected(&store, &backend).await.expect("no-op");
        assert!(backend.calls().is_empty());
        assert!(store.borrow().is_editing());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_unsaved_draft_removal_is_local_only() {
        let backend = FakeBackend::default();
        let store = RefCell::new(NoteStore::new());
        let draft = store.borrow_mut().create(String::new());

        remove(&store, &backend, &draft).await.expect("local removal");
        assert!(backend.calls().is_empty());
        assert!(store.borrow().notes().is_empty());

        remove(&store, &backend, &draft).await.expect("second removal is a no-op");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_failed_update_keeps_typed_values() {
        let backend = FakeBackend::with_notes(&[("n1", "old title", "old body")]);
        backend.fail_update.set(true);
        let store = RefCell::new(NoteStore::new());
        refresh(&store, &backend).await.expect("load");

        {
            let mut s = store.borrow_mut();
            s.select(&pkey("n1"));
            s.start_editing();
            s.set_title("new title".to_string());
            s.set_content("new body".to_string());
        }

        assert!(save_selected(&store, &backend).await.is_err());
        assert_eq!(backend.calls(), vec!["GET", "PATCH n1"]);

        let s = store.borrow();
        assert!(s.is_editing());
        let n = s.selected().expect("still selected");
        assert_eq!(n.title, "new title");
        assert_eq!(n.content, "new body");
        assert!(s.save_error().is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_failed_delete_still_removes_locally() {
        let backend = FakeBackend::with_notes(&[("n1", "t", "c"), ("n2", "t", "c")]);
        backend.fail_delete.set(true);
        let store = RefCell::new(NoteStore::new());
        refresh(&store, &backend).await.expect("load");
        store.borrow_mut().select(&pkey("n1"));

        assert!(remove(&store, &backend, &pkey("n1")).await.is_err());

        let s = store.borrow();
        assert!(s.get(&pkey("n1")).is_none());
        assert_eq!(s.notes().len(), 1);
        assert!(s.selected_key().is_none());
        assert!(!s.is_editing());
        // The backend still has it.
        assert_eq!(backend.notes.borrow().len(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_unauthorized_is_reported_to_caller() {
        let backend = FakeBackend::with_notes(&[("n1", "t", "c")]);
        backend.unauthorized.set(true);
        let store = RefCell::new(NoteStore::new());

        let err = refresh(&store, &backend).await.expect_err("should fail");
        assert!(err.is_unauthorized());
    }
}
