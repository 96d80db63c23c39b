use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-5 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Three bouncing dots, shown while the first note list is on its way.
#[component]
pub fn LoadingDots() -> impl IntoView {
    let dot = "w-2 h-2 bg-indigo-600 rounded-full animate-bounce";
    view! {
        <div class="flex items-center gap-2" role="status" aria-label="Loading notes">
            <div class=tw_merge!(dot, "[animation-delay:-0.3s]")></div>
            <div class=tw_merge!(dot, "[animation-delay:-0.15s]")></div>
            <div class=dot></div>
        </div>
    }
}
