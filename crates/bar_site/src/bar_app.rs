use bar_host_web::{build_host_services, page_is_secure, read_bar_dataset, BarDataset};
use claudy::Claudy;
use leptos::*;
use leptos_meta::*;
use stack_client::{provide_stack, AppEventHandlers, Stack, StackConfig};

/// Stack configuration published by the hosting page.
pub fn bar_config(dataset: &BarDataset, secure: bool) -> StackConfig {
    StackConfig::new(dataset.cozy_domain.clone(), dataset.cozy_token.clone()).with_ssl(secure)
}

fn app_event_logging() -> AppEventHandlers {
    AppEventHandlers::default()
        .on_create_app(|app| logging::log!("app installed: {}", app.slug))
        .on_delete_app(|doc| {
            let slug = doc.get("slug").and_then(|slug| slug.as_str()).unwrap_or("?");
            logging::log!("app removed: {slug}");
        })
}

#[component]
pub fn BarApp() -> impl IntoView {
    provide_meta_context();

    let stack = Stack::new(build_host_services());
    provide_stack(stack.clone());

    match read_bar_dataset() {
        Some(dataset) => {
            let config = bar_config(&dataset, page_is_secure());
            spawn_local(async move {
                stack.init(&config, app_event_logging()).await;
            });
        }
        None => logging::warn!("bar configuration missing on the [role=application] element"),
    }

    let claudy_opened = create_rw_signal(false);
    let claudy_error = create_rw_signal(None::<String>);
    let on_claudy_error = Callback::new(move |error: String| {
        logging::warn!("claudy unavailable: {error}");
        claudy_error.set(Some(error));
    });

    view! {
        <Title text="Cozy bar" />
        <div class="coz-bar-wrapper" data-claudy-error=move || claudy_error.get()>
            <Claudy
                opened=claudy_opened
                on_toggle=move |_| claudy_opened.update(|opened| *opened = !*opened)
                on_error=on_claudy_error
            />
        </div>
    }
}
