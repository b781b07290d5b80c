mod bar_app;

pub use bar_app::{bar_config, BarApp};

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
pub fn mount() {
    console_error_panic_hook::set_once();
    leptos::mount_to_body(|| leptos::view! { <BarApp /> })
}
