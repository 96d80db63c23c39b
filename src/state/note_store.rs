use crate::api::{ApiError, NoteBody};
use crate::models::{DraftId, Note, NoteId, NoteKey, RemoteNote};
use std::collections::{HashMap, HashSet};

/// Identifies one remote operation on one note. Completions carrying a token
/// that is no longer current for that note are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct OpToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OpKind {
    Save,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InFlight {
    token: OpToken,
    kind: OpKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FetchTicket(u64);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum FetchStatus {
    #[default]
    Idle,
    Loaded,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SaveTarget {
    Create,
    Update(NoteId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SaveRequest {
    pub key: NoteKey,
    pub target: SaveTarget,
    pub body: NoteBody,
    pub token: OpToken,
}

/// What the backend answered to a successful save.
#[derive(Clone, Debug)]
pub(crate) enum SaveAck {
    /// `None` when the backend stored the note without telling us its id.
    Created(Option<RemoteNote>),
    Updated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SaveOutcome {
    /// Carries the note's key after the save (a draft comes back persisted).
    Saved(NoteKey),
    Failed,
    Stale,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum RemovePlan {
    /// Unknown key, or a delete is already on its way.
    Nothing,
    /// A draft; it is already gone.
    Local,
    Remote { id: NoteId, token: OpToken },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RemoveOutcome {
    Removed,
    Stale,
}

/// Notes of the signed-in user plus the selection/editing state of the page.
///
/// Every mutation that talks to the backend is split in two: `begin_*` applies
/// the local change and hands out what to send, `finish_*` applies the answer.
#[derive(Clone, Debug)]
pub(crate) struct NoteStore {
    notes: Vec<Note>,
    selected: Option<NoteKey>,
    editing: bool,

    loading: bool,
    fetch_status: FetchStatus,
    fetch_request_id: u64,

    save_error: Option<String>,

    in_flight: HashMap<NoteKey, InFlight>,
    /// Drafts the backend accepted without an id, with what was sent. The next
    /// list that carries a matching new note replaces them.
    awaiting_id: HashMap<NoteKey, NoteBody>,
    next_op: u64,
    next_draft: u64,
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            selected: None,
            editing: false,
            loading: true,
            fetch_status: FetchStatus::Idle,
            fetch_request_id: 0,
            save_error: None,
            in_flight: HashMap::new(),
            awaiting_id: HashMap::new(),
            next_op: 0,
            next_draft: 0,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn filtered(&self, query: &str) -> Vec<Note> {
        self.notes()
            .iter()
            .filter(|n| n.matches_query(query))
            .cloned()
            .collect()
    }

    pub fn get(&self, key: &NoteKey) -> Option<&Note> {
        self.notes.iter().find(|n| &n.key == key)
    }

    fn get_mut(&mut self, key: &NoteKey) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| &n.key == key)
    }

    pub fn selected_key(&self) -> Option<&NoteKey> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_ref().and_then(|k| self.get(k))
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn fetch_status(&self) -> &FetchStatus {
        &self.fetch_status
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn pending(&self, key: &NoteKey) -> Option<OpKind> {
        match self.in_flight.get(key) {
            Some(f) => Some(f.kind),
            None => self.awaiting_id.contains_key(key).then_some(OpKind::Save),
        }
    }

    fn next_token(&mut self) -> OpToken {
        self.next_op += 1;
        OpToken(self.next_op)
    }

    fn is_current(&self, key: &NoteKey, token: OpToken) -> bool {
        self.in_flight.get(key).is_some_and(|f| f.token == token)
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.editing = false;
        self.save_error = None;
    }

    /// Inserts an empty draft at the head of the list, selected and in editing mode.
    pub fn create(&mut self, now_iso: String) -> NoteKey {
        self.next_draft += 1;
        let note = Note::draft(DraftId(self.next_draft), now_iso);
        let key = note.key.clone();
        self.notes.insert(0, note);
        self.selected = Some(key.clone());
        self.editing = true;
        self.save_error = None;
        key
    }

    pub fn select(&mut self, key: &NoteKey) {
        if self.get(key).is_none() {
            return;
        }
        self.selected = Some(key.clone());
        self.editing = false;
        self.save_error = None;
    }

    /// Switches the selected note to editing, unless a request for it is still out.
    pub fn start_editing(&mut self) {
        let Some(key) = self.selected.clone() else {
            return;
        };
        if self.get(&key).is_some() && self.pending(&key).is_none() {
            self.editing = true;
        }
    }

    pub fn set_title(&mut self, title: String) {
        if let Some(n) = self.editable_mut() {
            n.title = title;
        }
    }

    pub fn set_content(&mut self, content: String) {
        if let Some(n) = self.editable_mut() {
            n.content = content;
        }
    }

    fn editable_mut(&mut self) -> Option<&mut Note> {
        if !self.editing {
            return None;
        }
        let key = self.selected.clone()?;
        self.get_mut(&key)
    }

    /// Starts saving the selected note.
    ///
    /// Returns `None` without touching any state unless a note is selected, in
    /// editing mode, has a non-blank title and content, and has no request out.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        if !self.editing {
            return None;
        }
        let key = self.selected.clone()?;
        if self.pending(&key).is_some() {
            return None;
        }
        let note = self.get(&key)?;
        if !note.is_savable() {
            return None;
        }

        let target = match &key {
            NoteKey::Draft(_) => SaveTarget::Create,
            NoteKey::Persisted(id) => SaveTarget::Update(id.clone()),
        };
        let body = NoteBody {
            title: note.title.clone(),
            content: note.content.clone(),
        };

        let token = self.next_token();
        self.in_flight.insert(
            key.clone(),
            InFlight {
                token,
                kind: OpKind::Save,
            },
        );
        self.editing = false;
        self.save_error = None;

        Some(SaveRequest {
            key,
            target,
            body,
            token,
        })
    }

    pub fn finish_save(&mut self, req: &SaveRequest, result: Result<SaveAck, ApiError>) -> SaveOutcome {
        if !self.is_current(&req.key, req.token) {
            return SaveOutcome::Stale;
        }
        self.in_flight.remove(&req.key);

        match result {
            Ok(SaveAck::Created(None)) => {
                self.awaiting_id.insert(req.key.clone(), req.body.clone());
                SaveOutcome::Saved(req.key.clone())
            }
            Ok(SaveAck::Created(Some(remote))) => {
                let new_key = NoteKey::Persisted(NoteId(remote.id.clone()));
                // A list fetched while the POST was out may already hold it.
                if self.get(&req.key).is_some() {
                    self.notes.retain(|n| n.key != new_key);
                }
                if let Some(n) = self.get_mut(&req.key) {
                    n.key = new_key.clone();
                    n.user = remote.user;
                    if !remote.created_at.is_empty() {
                        n.created_at = remote.created_at;
                    }
                    n.updated_at = remote.updated_at;
                }
                if self.selected.as_ref() == Some(&req.key) {
                    self.selected = Some(new_key.clone());
                }
                SaveOutcome::Saved(new_key)
            }
            Ok(SaveAck::Updated) => SaveOutcome::Saved(req.key.clone()),
            Err(e) => {
                // Typed values stay in the note; only the mode goes back.
                if self.selected.as_ref() == Some(&req.key) && self.get(&req.key).is_some() {
                    self.editing = true;
                    self.save_error = Some(e.message);
                }
                SaveOutcome::Failed
            }
        }
    }

    /// Starts removing a note. Selection and editing are cleared whenever something is removed.
    pub fn begin_remove(&mut self, key: &NoteKey) -> RemovePlan {
        if self.get(key).is_none() {
            return RemovePlan::Nothing;
        }

        match key {
            NoteKey::Draft(_) => {
                self.notes.retain(|n| &n.key != key);
                self.in_flight.remove(key);
                self.awaiting_id.remove(key);
                self.clear_selection();
                RemovePlan::Local
            }
            NoteKey::Persisted(id) => {
                if self.pending(key) == Some(OpKind::Delete) {
                    return RemovePlan::Nothing;
                }
                let token = self.next_token();
                self.in_flight.insert(
                    key.clone(),
                    InFlight {
                        token,
                        kind: OpKind::Delete,
                    },
                );
                self.clear_selection();
                RemovePlan::Remote {
                    id: id.clone(),
                    token,
                }
            }
        }
    }

    /// The note leaves the list whatever the backend said.
    pub fn finish_remove(&mut self, key: &NoteKey, token: OpToken) -> RemoveOutcome {
        if !self.is_current(key, token) {
            return RemoveOutcome::Stale;
        }
        self.in_flight.remove(key);
        self.notes.retain(|n| &n.key != key);
        if self.selected.as_ref() == Some(key) {
            self.clear_selection();
        }
        RemoveOutcome::Removed
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_request_id += 1;
        FetchTicket(self.fetch_request_id)
    }

    /// Applies a list response. Returns `false` when a newer fetch has started since.
    ///
    /// The server list replaces the local one, except for notes that only exist
    /// locally (drafts) or still hold local state the server has not seen (a
    /// request in flight, or the note being edited). A draft awaiting its id
    /// gives way to the first new server note with the same title and content.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<RemoteNote>, ApiError>) -> bool {
        if ticket.0 != self.fetch_request_id {
            return false;
        }
        self.loading = false;

        let remote = match result {
            Ok(remote) => remote,
            Err(e) => {
                self.fetch_status = FetchStatus::Failed(e.message);
                return true;
            }
        };

        let remote: Vec<Note> = remote.into_iter().map(Note::from).collect();
        let adopted = self.adopt_created(&remote);

        let mut local: HashMap<NoteKey, Note> = HashMap::new();
        let mut next: Vec<Note> = Vec::with_capacity(remote.len());
        for n in std::mem::take(&mut self.notes) {
            if n.key.is_draft() {
                if !adopted.contains_key(&n.key) {
                    next.push(n);
                }
            } else if self.has_local_state(&n.key) {
                local.insert(n.key.clone(), n);
            }
        }

        for fresh in remote {
            match local.remove(&fresh.key) {
                Some(kept) => next.push(kept),
                None => next.push(fresh),
            }
        }
        self.notes = next;

        if let Some(new_key) = self.selected.as_ref().and_then(|k| adopted.get(k)).cloned() {
            self.selected = Some(new_key);
        }
        if let Some(key) = self.selected.clone() {
            if self.get(&key).is_none() {
                self.clear_selection();
            }
        }
        self.fetch_status = FetchStatus::Loaded;
        true
    }

    /// Pairs drafts awaiting an id with notes of `remote` that the list did not
    /// hold before. Returns draft key -> server key.
    fn adopt_created(&mut self, remote: &[Note]) -> HashMap<NoteKey, NoteKey> {
        let mut adopted: HashMap<NoteKey, NoteKey> = HashMap::new();
        if self.awaiting_id.is_empty() {
            return adopted;
        }

        let mut taken: HashSet<&NoteKey> = self
            .notes
            .iter()
            .filter(|n| !n.key.is_draft())
            .map(|n| &n.key)
            .collect();
        let mut drafts: Vec<(&NoteKey, &NoteBody)> = self.awaiting_id.iter().collect();
        drafts.sort_by(|a, b| a.0.cmp(b.0));

        for (draft, body) in drafts {
            let found = remote.iter().find(|r| {
                !taken.contains(&r.key) && r.title == body.title && r.content == body.content
            });
            if let Some(r) = found {
                taken.insert(&r.key);
                adopted.insert(draft.clone(), r.key.clone());
            }
        }

        for draft in adopted.keys() {
            self.awaiting_id.remove(draft);
        }
        adopted
    }

    fn has_local_state(&self, key: &NoteKey) -> bool {
        self.in_flight.contains_key(key) || (self.editing && self.selected.as_ref() == Some(key))
    }
}
