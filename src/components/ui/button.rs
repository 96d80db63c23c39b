use leptos::prelude::*;
use leptos_ui::variants;

variants! {
    Button {
        base: "inline-flex items-center justify-center gap-2 whitespace-nowrap rounded-lg text-sm font-medium transition-all duration-200 disabled:pointer-events-none disabled:opacity-50 [&_svg]:pointer-events-none [&_svg:not([class*='size-'])]:size-5 shrink-0 outline-none focus-visible:ring-2 focus-visible:ring-indigo-500 focus-visible:ring-offset-2 hover:cursor-pointer select-none",
        variants: {
            variant: {
                Default: "bg-gradient-to-r from-indigo-600 to-violet-600 text-white shadow-md hover:from-indigo-700 hover:to-violet-700 hover:shadow-lg",
                Outline: "border border-indigo-600 bg-white text-indigo-600 hover:bg-indigo-50",
                Ghost: "text-gray-600 hover:bg-gray-50 hover:text-gray-900",
                Destructive: "text-red-600 hover:bg-red-50",
                Link: "text-sm text-gray-600 hover:text-gray-900",
            },
            size: {
                Default: "w-full px-4 py-3",
                Sm: "px-3 py-2",
                Icon: "p-2",
                Inline: "p-0",
            }
        },
        component: {
            element: button,
            support_href: true,
            support_aria_current: true
        }
    }
}
