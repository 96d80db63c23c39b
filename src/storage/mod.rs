use crate::session::SessionToken;

/// localStorage key holding the bearer token.
pub(crate) const TOKEN_KEY: &str = "token";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_token() -> Option<SessionToken> {
    let raw = local_storage()?.get_item(TOKEN_KEY).ok().flatten()?;
    SessionToken::new(raw)
}

pub(crate) fn save_token(token: &SessionToken) {
    if let Some(storage) = local_storage() {
        if storage.set_item(TOKEN_KEY, token.as_str()).is_err() {
            tracing::warn!("could not persist session token");
        }
    }
}

pub(crate) fn clear_token() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(TOKEN_KEY);
    }
}
