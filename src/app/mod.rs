use crate::config::EnvConfig;
use crate::pages::{LoginPage, NotesPage, RegisterPage, RequireSession};
use crate::session::{LOGIN_PATH, NOTES_PATH};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::path;

#[component]
pub(crate) fn App(config: EnvConfig) -> impl IntoView {
    provide_context(AppContext(AppState::new(config)));

    // `/` goes to the notes, which bounce to login without a session;
    // anything unknown goes straight to login.
    view! {
        <Router>
            <Routes fallback=|| view! { <Redirect path=LOGIN_PATH /> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("register") view=RegisterPage />
                <Route path=path!("notes") view=move || view! {
                    <RequireSession>
                        <NotesPage />
                    </RequireSession>
                } />
                <Route path=path!("") view=|| view! { <Redirect path=NOTES_PATH /> } />
            </Routes>
        </Router>
    }
}
