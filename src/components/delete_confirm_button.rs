//! Delete Confirm Button Component
//!
//! Inline two-step delete: the first click asks, the second confirms.

use leptos::prelude::*;

/// Inline delete confirmation button
///
/// * `button_class` - CSS class for the initial × button
/// * `prompt` - question shown while confirming
/// * `on_confirm` - runs once the user confirms
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    #[prop(into, default = "Delete?".to_string())] prompt: String,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (confirming, set_confirming) = signal(false);

    view! {
        <Show
            when=move || confirming.get()
            fallback=move || {
                view! {
                    <button
                        class=button_class.clone()
                        title="Delete"
                        on:click=move |ev| {
                            ev.stop_propagation();
                            set_confirming.set(true);
                        }
                    >
                        "×"
                    </button>
                }
            }
        >
            <span class="delete-confirm">
                <span class="delete-confirm-text">{prompt.clone()}</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirming.set(false);
                        on_confirm.run(());
                    }
                >
                    "Yes"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirming.set(false);
                    }
                >
                    "No"
                </button>
            </span>
        </Show>
    }
}
