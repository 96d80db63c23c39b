use crate::api::{ApiError, ApiErrorKind};
use crate::components::notes::{NoSelection, NoteEditor, NoteListItem};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription,
    CardHeader, CardTitle, Input, Label, LoadingDots, Spinner,
};
use crate::models::NoteKey;
use crate::session::{evaluate, GuardDecision, LOGIN_PATH, REGISTER_PATH};
use crate::state::note_store::FetchStatus;
use crate::state::{note_sync, AppContext};
use crate::util::now_iso;
use icons::{Lock, Mail, RefreshCw, Search, User};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_navigate;

/// Message for a failed login or registration.
fn auth_error_message(e: &ApiError, fallback: &str) -> String {
    match e.kind {
        ApiErrorKind::Network | ApiErrorKind::Unreadable => {
            "Failed to connect to the server".to_string()
        }
        ApiErrorKind::Http | ApiErrorKind::Unauthorized if !e.message.trim().is_empty() => {
            e.message.clone()
        }
        _ => fallback.to_string(),
    }
}

/// Renders `children` only while a session exists; otherwise redirects to the
/// login page in the same render pass.
#[component]
pub fn RequireSession(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    // Store children so the view closure stays `Fn`.
    let children = StoredValue::new(children);

    move || match app_state.0.session.with(|t| evaluate(t.as_ref())) {
        GuardDecision::Allow => children.with_value(|c| c()).into_any(),
        GuardDecision::Redirect(path) => view! { <Redirect path=path /> }.into_any(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        let api_client = app_state.0.api_client();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.login(&email_val, &password_val).await {
                Ok(token) => {
                    app_state.0.sign_in(token);
                    navigate.with_value(|nav| nav("/", Default::default()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "login failed");
                    error.set(Some(auth_error_message(&e, "Invalid credentials")));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <AuthLayout heading="Welcome back" blurb="Enter your credentials to access your notes">
            <form class="flex flex-col gap-6" on:submit=on_submit>
                <div>
                    <Label html_for="email">"Email address"</Label>
                    <IconField icon=FieldIcon::Mail>
                        <Input
                            id="email"
                            r#type="email"
                            class="pl-10"
                            placeholder="name@example.com"
                            required=true
                            bind_value=email
                            on_change=move |v: String| email.set(v)
                        />
                    </IconField>
                </div>

                <div>
                    <Label html_for="password">"Password"</Label>
                    <IconField icon=FieldIcon::Lock>
                        <Input
                            id="password"
                            r#type="password"
                            class="pl-10"
                            placeholder="••••••••"
                            required=true
                            bind_value=password
                            on_change=move |v: String| password.set(v)
                        />
                    </IconField>
                </div>

                <FormError error=error />

                <Button attr:disabled=move || loading.get()>
                    <Show when=move || loading.get() fallback=|| ()>
                        <Spinner />
                    </Show>
                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                </Button>
            </form>

            <SwitchAuth prompt="New to Notes?" label="Create an account" href=REGISTER_PATH />
        </AuthLayout>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let name: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let name_val = name.get_untracked();
        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        let api_client = app_state.0.api_client();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.register(&name_val, &email_val, &password_val).await {
                Ok(token) => {
                    app_state.0.sign_in(token);
                    navigate.with_value(|nav| nav("/", Default::default()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "registration failed");
                    error.set(Some(auth_error_message(&e, "Registration failed")));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <AuthLayout heading="Create your account" blurb="Start capturing your notes in seconds">
            <form class="flex flex-col gap-6" on:submit=on_submit>
                <div>
                    <Label html_for="name">"Name"</Label>
                    <IconField icon=FieldIcon::User>
                        <Input
                            id="name"
                            class="pl-10"
                            placeholder="Your name"
                            required=true
                            bind_value=name
                            on_change=move |v: String| name.set(v)
                        />
                    </IconField>
                </div>

                <div>
                    <Label html_for="email">"Email address"</Label>
                    <IconField icon=FieldIcon::Mail>
                        <Input
                            id="email"
                            r#type="email"
                            class="pl-10"
                            placeholder="name@example.com"
                            required=true
                            bind_value=email
                            on_change=move |v: String| email.set(v)
                        />
                    </IconField>
                </div>

                <div>
                    <Label html_for="password">"Password"</Label>
                    <IconField icon=FieldIcon::Lock>
                        <Input
                            id="password"
                            r#type="password"
                            class="pl-10"
                            placeholder="••••••••"
                            required=true
                            bind_value=password
                            on_change=move |v: String| password.set(v)
                        />
                    </IconField>
                </div>

                <FormError error=error />

                <Button attr:disabled=move || loading.get()>
                    <Show when=move || loading.get() fallback=|| ()>
                        <Spinner />
                    </Show>
                    {move || if loading.get() { "Creating account..." } else { "Create account" }}
                </Button>
            </form>

            <SwitchAuth prompt="Already have an account?" label="Sign in" href=LOGIN_PATH />
        </AuthLayout>
    }
}

#[component]
fn AuthLayout(heading: &'static str, blurb: &'static str, children: Children) -> impl IntoView {
    view! {
        <div class="flex h-screen">
            <div class="hidden lg:flex lg:w-1/2 bg-gradient-to-br from-blue-600 to-purple-600 p-12 text-white flex-col justify-between">
                <div>
                    <h1 class="text-4xl font-bold mb-6">"Notes"</h1>
                    <p class="text-lg text-blue-100">
                        "Your personal space for capturing thoughts, ideas, and everything in between."
                    </p>
                </div>
            </div>
            <div class="w-full lg:w-1/2 flex items-center justify-center p-8 bg-gray-50">
                <Card>
                    <CardHeader>
                        <CardTitle>{heading}</CardTitle>
                        <CardDescription>{blurb}</CardDescription>
                    </CardHeader>
                    <CardContent>{children()}</CardContent>
                </Card>
            </div>
        </div>
    }
}

#[derive(Clone, Copy)]
enum FieldIcon {
    User,
    Mail,
    Lock,
}

#[component]
fn IconField(icon: FieldIcon, children: Children) -> impl IntoView {
    let icon = match icon {
        FieldIcon::User => view! { <User class="h-5 w-5 text-gray-400" /> }.into_any(),
        FieldIcon::Mail => view! { <Mail class="h-5 w-5 text-gray-400" /> }.into_any(),
        FieldIcon::Lock => view! { <Lock class="h-5 w-5 text-gray-400" /> }.into_any(),
    };
    view! {
        <div class="relative">
            <div class="absolute inset-y-0 left-0 pl-3 flex items-center pointer-events-none">
                {icon}
            </div>
            {children()}
        </div>
    }
}

#[component]
fn FormError(error: RwSignal<Option<String>>) -> impl IntoView {
    move || {
        error.get().map(|e| {
            view! {
                <Alert>
                    <AlertDescription>{e}</AlertDescription>
                </Alert>
            }
        })
    }
}

#[component]
fn SwitchAuth(prompt: &'static str, label: &'static str, href: &'static str) -> impl IntoView {
    view! {
        <div class="mt-8 flex flex-col gap-4">
            <p class="text-center text-sm text-gray-500">{prompt}</p>
            <a
                class="w-full rounded-lg border border-blue-600 bg-white py-3 text-center font-medium text-blue-600 transition-all duration-200 hover:bg-blue-50"
                href=href
            >
                {label}
            </a>
        </div>
    }
}

#[component]
pub fn NotesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let notes = app_state.0.notes;
    let search = RwSignal::new(String::new());

    // Mount: fetch the authoritative list.
    let reload = move || {
        spawn_local(async move {
            let res = note_sync::refresh(&notes, &app_state.0.api_client()).await;
            app_state.0.check_session(res);
        });
    };
    reload();

    let on_new = Callback::new(move |_: ()| {
        notes.update(|s| {
            s.create(now_iso());
        });
    });

    let on_save = Callback::new(move |_: ()| {
        spawn_local(async move {
            let res = note_sync::save_selected(&notes, &app_state.0.api_client()).await;
            app_state.0.check_session(res);
        });
    });

    let on_delete = Callback::new(move |key: NoteKey| {
        spawn_local(async move {
            let res = note_sync::remove(&notes, &app_state.0.api_client(), &key).await;
            app_state.0.check_session(res);
        });
    });

    let on_select = Callback::new(move |key: NoteKey| notes.update(|s| s.select(&key)));

    // The guard around this page does the redirect.
    let on_sign_out = move |_| app_state.0.sign_out();

    let fetch_failed = Memo::new(move |_| {
        notes.with(|s| matches!(s.fetch_status(), FetchStatus::Failed(_)))
    });
    let has_selection = Memo::new(move |_| notes.with(|s| s.selected().is_some()));

    let note_list = move || {
        let q = search.get();
        notes.with(|s| {
            let selected = s.selected_key().cloned();
            s.filtered(&q)
                .into_iter()
                .map(|n| {
                    let is_selected = selected.as_ref() == Some(&n.key);
                    let pending = s.pending(&n.key);
                    view! {
                        <NoteListItem note=n selected=is_selected pending=pending on_select=on_select />
                    }
                })
                .collect_view()
        })
    };

    view! {
        <Show
            when=move || !notes.with(|s| s.is_loading())
            fallback=|| view! {
                <div class="flex h-screen items-center justify-center bg-gradient-to-br from-indigo-50 to-white">
                    <LoadingDots />
                </div>
            }
        >
            <div class="flex h-screen bg-gradient-to-br from-indigo-50 to-white">
                <div class="w-80 bg-white border-r border-indigo-100 flex flex-col">
                    <div class="p-6 flex flex-col gap-4">
                        <div class="flex justify-between items-center">
                            <h1 class="text-2xl font-bold bg-gradient-to-r from-indigo-600 to-violet-600 bg-clip-text text-transparent">
                                "Notes"
                            </h1>
                            <Button variant=ButtonVariant::Link size=ButtonSize::Inline on:click=on_sign_out>
                                "Sign out"
                            </Button>
                        </div>

                        <Button on:click=move |_| on_new.run(())>
                            <icons::Plus />
                            "New Note"
                        </Button>

                        <div class="relative">
                            <div class="absolute inset-y-0 left-0 pl-3 flex items-center pointer-events-none">
                                <Search class="h-4 w-4 text-gray-400" />
                            </div>
                            <Input
                                class="pl-9 py-2 text-sm"
                                placeholder="Search notes"
                                bind_value=search
                                on_change=move |v: String| search.set(v)
                            />
                        </div>
                    </div>

                    <Show when=move || fetch_failed.get() fallback=|| ()>
                        <div class="mx-6 mb-4 flex items-center justify-between rounded-lg bg-red-50 px-3 py-2 text-sm text-red-700">
                            <span>"Couldn't load your notes."</span>
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Icon
                                attr:title="Retry"
                                on:click=move |_| reload()
                            >
                                <RefreshCw class="h-4 w-4" />
                            </Button>
                        </div>
                    </Show>

                    <div class="flex-1 overflow-y-auto">{note_list}</div>
                </div>

                <div class="flex-1 flex flex-col bg-white rounded-l-2xl shadow-xl">
                    <Show
                        when=move || has_selection.get()
                        fallback=move || view! { <NoSelection on_new=on_new /> }
                    >
                        <NoteEditor on_save=on_save on_delete=on_delete />
                    </Show>
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_message_for_network_failure() {
        let e = ApiError::new(ApiErrorKind::Network, "error sending request");
        assert_eq!(auth_error_message(&e, "Invalid credentials"), "Failed to connect to the server");
    }

    #[test]
    fn test_auth_error_message_for_non_json_reply() {
        let e = ApiError::new(ApiErrorKind::Unreadable, "Login failed (502 Bad Gateway)");
        assert_eq!(auth_error_message(&e, "Invalid credentials"), "Failed to connect to the server");
    }

    #[test]
    fn test_auth_error_message_prefers_server_message() {
        let e = ApiError::new(ApiErrorKind::Unauthorized, "Wrong password");
        assert_eq!(auth_error_message(&e, "Invalid credentials"), "Wrong password");
    }

    #[test]
    fn test_auth_error_message_fallback() {
        let e = ApiError::new(ApiErrorKind::Parse, "response is missing token");
        assert_eq!(auth_error_message(&e, "Invalid credentials"), "Invalid credentials");
    }
}
