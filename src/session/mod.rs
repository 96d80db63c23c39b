use std::fmt;

pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const REGISTER_PATH: &str = "/register";
pub(crate) const NOTES_PATH: &str = "/notes";

/// Opaque bearer token issued by the backend on login or registration.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct SessionToken(String);

impl SessionToken {
    /// Blank tokens are treated as absent.
    pub fn new(raw: String) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Keep tokens out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Whether a protected view may render for the given session.
///
/// Evaluated during render, so an absent token never shows protected content,
/// not even for one frame. Token validity is the backend's call: an expired
/// token comes back as `Unauthorized`, which clears the session and lands here
/// again with `None`.
pub(crate) fn evaluate(token: Option<&SessionToken>) -> GuardDecision {
    match token {
        Some(_) => GuardDecision::Allow,
        None => GuardDecision::Redirect(LOGIN_PATH),
    }
}
