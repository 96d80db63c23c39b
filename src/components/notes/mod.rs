use crate::components::ui::{Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Input, Spinner, TextArea};
use crate::models::{Note, NoteKey};
use crate::state::note_store::OpKind;
use crate::state::AppContext;
use crate::util::format_short_date;
use icons::{Check, Pencil, Plus, Trash2};
use leptos::prelude::*;

fn or_placeholder(s: &str, placeholder: &'static str) -> String {
    if s.trim().is_empty() {
        placeholder.to_string()
    } else {
        s.to_string()
    }
}

#[component]
pub(crate) fn NoteListItem(
    note: Note,
    selected: bool,
    pending: Option<OpKind>,
    on_select: Callback<NoteKey>,
) -> impl IntoView {
    let class = if selected {
        "p-4 cursor-pointer transition-all duration-200 border-l-4 bg-indigo-50 border-l-indigo-600"
    } else {
        "p-4 cursor-pointer transition-all duration-200 border-l-4 hover:bg-gray-50 border-l-transparent"
    };
    let dimmed = if pending == Some(OpKind::Delete) { "opacity-50" } else { "" };

    let key = note.key.clone();
    let title = or_placeholder(&note.title, "Untitled");
    let content = or_placeholder(&note.content, "No content");
    let date = format_short_date(&note.created_at);

    view! {
        <div class=format!("{class} {dimmed}") on:click=move |_| on_select.run(key.clone())>
            <h3 class="font-medium text-gray-900 truncate">{title}</h3>
            <p class="text-sm text-gray-500 mt-1 truncate">{content}</p>
            <p class="text-xs text-gray-400 mt-2 flex items-center gap-2">
                {date}
                {(pending == Some(OpKind::Save)).then(|| view! { <Spinner class="size-3" /> })}
            </p>
        </div>
    }
}

/// Shown in the content pane when nothing is selected.
#[component]
pub(crate) fn NoSelection(on_new: Callback<()>) -> impl IntoView {
    view! {
        <div class="flex-1 flex flex-col items-center justify-center text-gray-400 p-6 text-center">
            <div class="bg-gray-50 p-8 rounded-2xl">
                <h3 class="text-xl font-medium text-gray-900 mb-2">"No Note Selected"</h3>
                <p class="text-gray-500 mb-6">
                    "Select a note from the sidebar or create a new one to get started"
                </p>
                <Button size=ButtonSize::Sm on:click=move |_| on_new.run(())>
                    <Plus />
                    "Create New Note"
                </Button>
            </div>
        </div>
    }
}

/// Title bar, body and actions of the selected note.
#[component]
pub(crate) fn NoteEditor(on_save: Callback<()>, on_delete: Callback<NoteKey>) -> impl IntoView {
    let notes = expect_context::<AppContext>().0.notes;

    let editing = Memo::new(move |_| notes.with(|s| s.is_editing()));
    let title = Signal::derive(move || {
        notes.with(|s| s.selected().map(|n| n.title.clone()).unwrap_or_default())
    });
    let content = Signal::derive(move || {
        notes.with(|s| s.selected().map(|n| n.content.clone()).unwrap_or_default())
    });
    let saving = Signal::derive(move || {
        notes.with(|s| s.selected_key().and_then(|k| s.pending(k)) == Some(OpKind::Save))
    });
    let save_error = Signal::derive(move || notes.with(|s| s.save_error().map(str::to_string)));

    let delete_selected = move |_| {
        if let Some(key) = notes.with_untracked(|s| s.selected_key().cloned()) {
            on_delete.run(key);
        }
    };

    view! {
        <div class="border-b border-gray-100 p-6 flex justify-between items-center gap-4">
            <Show
                when=move || editing.get()
                fallback=move || view! {
                    <h2 class="text-2xl font-medium text-gray-900">
                        {move || or_placeholder(&title.get(), "Untitled")}
                    </h2>
                }
            >
                <Input
                    class="text-2xl font-medium border-0 shadow-none px-0 focus:ring-0 focus:border-b-2 focus:border-indigo-600 rounded-none"
                    placeholder="Note title"
                    autofocus=true
                    bind_value=title
                    on_change=move |v: String| notes.update(|s| s.set_title(v))
                />
            </Show>
            <div class="flex gap-3">
                <Show
                    when=move || editing.get()
                    fallback=move || view! {
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            attr:title="Edit"
                            attr:disabled=move || saving.get()
                            on:click=move |_| notes.update(|s| s.start_editing())
                        >
                            {move || if saving.get() {
                                view! { <Spinner /> }.into_any()
                            } else {
                                view! { <Pencil /> }.into_any()
                            }}
                        </Button>
                    }
                >
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Icon
                        class="text-indigo-600 hover:bg-indigo-50"
                        attr:title="Save"
                        on:click=move |_| on_save.run(())
                    >
                        <Check />
                    </Button>
                </Show>
                <Button
                    variant=ButtonVariant::Destructive
                    size=ButtonSize::Icon
                    attr:title="Delete"
                    on:click=delete_selected
                >
                    <Trash2 />
                </Button>
            </div>
        </div>

        {move || save_error.get().map(|e| view! {
            <Alert class="mx-6 mt-4">
                <AlertDescription>{format!("Couldn't save this note: {e}")}</AlertDescription>
            </Alert>
        })}

        <div class="flex-1 p-6">
            <Show
                when=move || editing.get()
                fallback=move || view! {
                    <div class="prose max-w-none whitespace-pre-wrap">
                        {move || {
                            let c = content.get();
                            if c.trim().is_empty() {
                                view! { <p class="text-gray-400">"No content"</p> }.into_any()
                            } else {
                                view! { <p>{c}</p> }.into_any()
                            }
                        }}
                    </div>
                }
            >
                <TextArea
                    placeholder="Write your note here..."
                    bind_value=content
                    on_change=move |v: String| notes.update(|s| s.set_content(v))
                />
            </Show>
        </div>
    }
}
