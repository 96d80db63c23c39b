use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-generated identifier of a note that the backend has not seen yet.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct DraftId(pub u64);

/// Durable identifier issued by the backend (`_id`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub(crate) struct NoteId(pub String);

impl NoteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a note in the local list.
///
/// The tag decides whether a save is a create or an update and whether a delete
/// has to reach the backend at all.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum NoteKey {
    Draft(DraftId),
    Persisted(NoteId),
}

impl NoteKey {
    pub fn is_draft(&self) -> bool {
        matches!(self, NoteKey::Draft(_))
    }
}

/// Used as the keyed-list key in the sidebar. The two namespaces never collide.
impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteKey::Draft(id) => write!(f, "draft:{}", id.0),
            NoteKey::Persisted(id) => write!(f, "note:{}", id.0),
        }
    }
}

/// Note object as returned by `GET /api/notes/notes`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RemoteNote {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,

    /// Owning user id. Some backends populate it as an object; we only keep strings.
    #[serde(default, deserialize_with = "user_ref")]
    pub user: String,

    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn user_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Object(map) => map
            .get("_id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    })
}

/// A note as held by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Note {
    pub key: NoteKey,
    pub title: String,
    pub content: String,
    pub user: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl Note {
    pub fn draft(id: DraftId, created_at: String) -> Self {
        Self {
            key: NoteKey::Draft(id),
            title: String::new(),
            content: String::new(),
            user: String::new(),
            created_at,
            updated_at: None,
        }
    }

    /// Both fields must carry something other than whitespace before a save is sent.
    pub fn is_savable(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&q) || self.content.to_lowercase().contains(&q)
    }
}

impl From<RemoteNote> for Note {
    fn from(r: RemoteNote) -> Self {
        Self {
            key: NoteKey::Persisted(NoteId(r.id)),
            title: r.title,
            content: r.content,
            user: r.user,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
