use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "w-full max-w-md rounded-xl bg-white p-8 shadow-sm"}
    clx! {CardHeader, div, "mb-8 text-center"}
    clx! {CardTitle, h2, "mb-2 text-3xl font-bold text-gray-900"}
    clx! {CardDescription, p, "text-gray-600"}
    clx! {CardContent, div, "flex flex-col gap-6"}

    clx! {Alert, div, "rounded-r-md border-l-4 border-red-500 bg-red-50 p-4"}
    clx! {AlertDescription, p, "text-sm text-red-700"}
}

pub use components::*;
