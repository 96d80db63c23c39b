use crate::models::{NoteId, RemoteNote};
use crate::session::SessionToken;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    /// The body was not JSON at all.
    Unreadable,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn network(e: reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Network, e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::new(ApiErrorKind::Parse, e.to_string())
    }

    fn unreadable(e: impl std::fmt::Display) -> Self {
        Self::new(ApiErrorKind::Unreadable, e.to_string())
    }

    /// Non-2xx response. Uses the backend's `{message}` when the body carries one.
    fn http(status: reqwest::StatusCode, body: &str, ctx: &str) -> Self {
        let kind = if status == reqwest::StatusCode::UNAUTHORIZED {
            ApiErrorKind::Unauthorized
        } else if serde_json::from_str::<serde_json::Value>(body).is_err() {
            // Proxy error pages and empty bodies.
            ApiErrorKind::Unreadable
        } else {
            ApiErrorKind::Http
        };
        let message = server_message(body).unwrap_or_else(|| format!("{ctx} ({status})"));
        Self::new(kind, message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

/// Extracts `message` (or `error`) from a JSON error body.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    v.get("message")
        .or_else(|| v.get("error"))
        .and_then(|m| m.as_str())
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub token: String,
}

/// Body of both create and update. Nothing else about a note is ever sent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NoteBody {
    pub title: String,
    pub content: String,
}

/// The remote note store, as seen by the note controller.
///
/// `ApiClient` is the real implementation; tests substitute an in-memory one.
pub(crate) trait NotesBackend {
    async fn list_notes(&self) -> ApiResult<Vec<RemoteNote>>;
    /// `None` when the backend accepted the note but did not echo it back.
    async fn create_note(&self, body: &NoteBody) -> ApiResult<Option<RemoteNote>>;
    async fn update_note(&self, id: &NoteId, body: &NoteBody) -> ApiResult<()>;
    async fn delete_note(&self, id: &NoteId) -> ApiResult<()>;
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<SessionToken>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
            http: reqwest::Client::new(),
        }
    }

    /// Client bound to the given session. The token is passed in; it is never read from storage here.
    pub fn with_token(mut self, token: Option<SessionToken>) -> Self {
        self.token = token;
        self
    }

    pub(crate) fn get_auth_header(&self) -> Option<String> {
        self.token.as_ref().map(SessionToken::bearer)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn note_url(&self, id: &NoteId) -> String {
        self.url(&format!("/api/notes/notes/{}", urlencoding::encode(id.as_str())))
    }

    fn with_auth_headers(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(h) = self.get_auth_header() {
            req = req.header("Authorization", h);
        }
        req
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        ctx: &str,
    ) -> ApiResult<reqwest::Response> {
        let res = req
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if status.is_success() {
            Ok(res)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, &body, ctx))
        }
    }

    async fn send_json(
        &self,
        req: reqwest::RequestBuilder,
        ctx: &str,
    ) -> ApiResult<serde_json::Value> {
        self.send(req, ctx).await?.json().await.map_err(ApiError::unreadable)
    }

    async fn authenticate(&self, path: &str, body: &impl Serialize, ctx: &str) -> ApiResult<SessionToken> {
        let req = self.http.post(self.url(path)).json(body);
        let data = self.send_json(req, ctx).await?;
        let parsed: AuthResponse = serde_json::from_value(data).map_err(ApiError::parse)?;
        SessionToken::new(parsed.token)
            .ok_or_else(|| ApiError::new(ApiErrorKind::Parse, "response is missing token"))
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<SessionToken> {
        self.authenticate(
            "/api/users/login",
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
            "Login failed",
        )
        .await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<SessionToken> {
        self.authenticate(
            "/api/users/register",
            &RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            },
            "Registration failed",
        )
        .await
    }

    pub(crate) fn parse_note_list_response(data: serde_json::Value) -> ApiResult<Vec<RemoteNote>> {
        let list = match data {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut map) => match map.remove("notes") {
                Some(serde_json::Value::Array(items)) => items,
                _ => return Err(ApiError::new(ApiErrorKind::Parse, "note list is not an array")),
            },
            _ => return Err(ApiError::new(ApiErrorKind::Parse, "note list is not an array")),
        };

        let mut out: Vec<RemoteNote> = Vec::with_capacity(list.len());
        for item in list {
            match serde_json::from_value::<RemoteNote>(item) {
                Ok(n) if !n.id.trim().is_empty() => out.push(n),
                Ok(_) => tracing::warn!("skipping note without id"),
                Err(e) => tracing::warn!(error = %e, "skipping malformed note"),
            }
        }
        Ok(out)
    }

    /// The created note comes back bare, wrapped under `note`, or not at all
    /// (`{"message": "Note created"}`, empty body).
    pub(crate) fn parse_created_note_response(body: &str) -> Option<RemoteNote> {
        let data: serde_json::Value = serde_json::from_str(body).ok()?;
        let item = data.get("note").cloned().unwrap_or(data);
        serde_json::from_value::<RemoteNote>(item)
            .ok()
            .filter(|n| !n.id.trim().is_empty())
    }
}

impl NotesBackend for ApiClient {
    async fn list_notes(&self) -> ApiResult<Vec<RemoteNote>> {
        let req = self.with_auth_headers(self.http.get(self.url("/api/notes/notes")));
        let data = self.send_json(req, "Fetching notes failed").await?;
        Self::parse_note_list_response(data)
    }

    async fn create_note(&self, body: &NoteBody) -> ApiResult<Option<RemoteNote>> {
        let req = self.with_auth_headers(self.http.post(self.url("/api/notes/note")).json(body));
        let res = self.send(req, "Creating note failed").await?;
        // The note is stored at this point; an unreadable body only costs us the id.
        let text = res.text().await.unwrap_or_default();
        let note = Self::parse_created_note_response(&text);
        if note.is_none() {
            tracing::debug!("create response carried no note; waiting for the next list");
        }
        Ok(note)
    }

    async fn update_note(&self, id: &NoteId, body: &NoteBody) -> ApiResult<()> {
        let req = self.with_auth_headers(self.http.patch(self.note_url(id)).json(body));
        self.send(req, "Updating note failed").await?;
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> ApiResult<()> {
        let req = self.with_auth_headers(self.http.delete(self.note_url(id)));
        self.send(req, "Deleting note failed").await?;
        Ok(())
    }
}
