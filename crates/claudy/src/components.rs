//! Leptos rendering of the Claudy toggle and its intent mount region.

use std::cell::Cell;

use leptos::*;
use stack_client::use_stack;

use crate::{
    controller::{ClaudyController, ClaudyHooks},
    model::ClaudyState,
};

thread_local! {
    static NEXT_MOUNT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Returns a DOM id unique to one widget instance on this page.
fn next_mount_id() -> String {
    NEXT_MOUNT_ID.with(|next| {
        let id = next.get() + 1;
        next.set(id);
        format!("coz-claudy-intent-{id}")
    })
}

fn root_class(opened: bool) -> &'static str {
    if opened {
        "coz-claudy coz-claudy--opened"
    } else {
        "coz-claudy"
    }
}

/// Toggle button for the Claudy assistant panel.
///
/// The intent is loaded on the first toggle while `opened` is false. Later toggles only flip
/// the panel. Each rising edge of `claudy_fired` acts like a click.
///
/// # Panics
///
/// Panics if rendered outside a tree where [`stack_client::provide_stack`] ran.
#[component]
pub fn Claudy(
    /// Host-owned open state of the bar's assistant area.
    #[prop(into)]
    opened: MaybeSignal<bool>,
    /// External trigger; every false-to-true change toggles the panel.
    #[prop(optional, into)]
    claudy_fired: MaybeSignal<bool>,
    /// Called every time the panel is shown or hidden.
    #[prop(into)]
    on_toggle: Callback<()>,
    /// Called when the intent cannot be started.
    #[prop(optional)]
    on_error: Option<Callback<String>>,
) -> impl IntoView {
    let stack = use_stack();
    let services = stack.services();
    let mount_id = next_mount_id();
    let state = create_rw_signal(ClaudyState::default());

    let mut hooks = ClaudyHooks::default()
        .on_toggle(move || on_toggle.call(()))
        .on_change(move |next: &ClaudyState| state.set(next.clone()));
    if let Some(on_error) = on_error {
        hooks = hooks.on_error(move |error| on_error.call(error));
    }
    let controller = ClaudyController::new(
        services.intents.clone(),
        services.spawner.clone(),
        mount_id.clone(),
        hooks,
    );

    on_cleanup({
        let controller = controller.clone();
        move || controller.unmount()
    });

    create_effect({
        let controller = controller.clone();
        move |previous: Option<bool>| {
            let fired = claudy_fired.get();
            if fired && !previous.unwrap_or(false) {
                controller.toggle(opened.get_untracked());
            }
            fired
        }
    });

    let on_click = {
        let controller = controller.clone();
        move |_: web_sys::MouseEvent| controller.toggle(opened.get_untracked())
    };
    let on_transition_end = move |ev: web_sys::TransitionEvent| {
        controller.transition_ended(&ev.property_name());
    };

    view! {
        <div class=move || root_class(opened.get())>
            <button
                type="button"
                class="coz-claudy-icon coz-bar-hide-sm"
                data-claudy-opened=move || state.with(|state| state.is_active.to_string())
                data-claudy-loading=move || state.with(|state| state.is_loading.to_string())
                on:click=on_click
            />
            <div
                id=mount_id
                class="coz-claudy-intent-wrapper"
                on:transitionend=on_transition_end
            ></div>
        </div>
    }
}
