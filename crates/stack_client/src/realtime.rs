//! Bridge from the stack's `io.cozy.apps` realtime events to host callbacks.

use std::{fmt, rc::Rc};

use bar_host::{RealtimeConfig, RealtimeEvent, RealtimeEventKind, RealtimeEventStream};
use futures::{task::LocalSpawnExt, StreamExt};
use leptos::logging;
use serde_json::Value;

use crate::{apps::AppRecord, error::StackError, session::Session, stack::Stack};

/// Doctype of installed-app documents.
pub const APPS_DOCTYPE: &str = "io.cozy.apps";

type CreateAppHandler = Rc<dyn Fn(AppRecord)>;
type DeleteAppHandler = Rc<dyn Fn(Value)>;

#[derive(Clone, Default)]
/// Callbacks invoked for app install and uninstall events.
pub struct AppEventHandlers {
    on_create_app: Option<CreateAppHandler>,
    on_delete_app: Option<DeleteAppHandler>,
}

impl AppEventHandlers {
    /// Called once per install with the full app record.
    pub fn on_create_app(mut self, handler: impl Fn(AppRecord) + 'static) -> Self {
        self.on_create_app = Some(Rc::new(handler));
        self
    }

    /// Called once per uninstall with the event document.
    pub fn on_delete_app(mut self, handler: impl Fn(Value) + 'static) -> Self {
        self.on_delete_app = Some(Rc::new(handler));
        self
    }
}

impl fmt::Debug for AppEventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppEventHandlers")
            .field("on_create_app", &self.on_create_app.is_some())
            .field("on_delete_app", &self.on_delete_app.is_some())
            .finish()
    }
}

/// Subscribes to app events and spawns the pump delivering them.
///
/// Failures are logged and never reach the caller: the bar keeps working without realtime.
pub(crate) async fn initialize_realtime(
    stack: &Stack,
    session: &Session,
    handlers: AppEventHandlers,
) {
    let config = RealtimeConfig {
        token: session.token.clone(),
        url: session.base_url.clone(),
    };
    let services = stack.services().clone();
    let events = match services.realtime.subscribe(&config, APPS_DOCTYPE).await {
        Ok(events) => events,
        Err(err) => {
            logging::warn!("Cannot initialize realtime in Cozy-bar: {err}");
            return;
        }
    };

    let pump = pump_app_events(stack.clone(), events, handlers);
    if let Err(err) = services.spawner.spawn_local(pump) {
        logging::warn!("Cannot initialize realtime in Cozy-bar: {err}");
    }
}

async fn pump_app_events(
    stack: Stack,
    mut events: RealtimeEventStream,
    handlers: AppEventHandlers,
) {
    while let Some(event) = events.next().await {
        match event.kind {
            RealtimeEventKind::Created => handle_created(&stack, &handlers, event).await,
            RealtimeEventKind::Deleted => {
                if let Some(on_delete_app) = &handlers.on_delete_app {
                    on_delete_app(event.doc);
                }
            }
            RealtimeEventKind::Updated => {}
        }
    }
}

async fn handle_created(stack: &Stack, handlers: &AppEventHandlers, event: RealtimeEvent) {
    let Some(slug) = event.doc.get("slug").and_then(Value::as_str) else {
        logging::warn!("Dropping app creation event {} without a slug", event.id);
        return;
    };

    let app = match stack.get().app(slug).await {
        Ok(app) => app,
        Err(err) => {
            let err = StackError::AppHydration {
                slug: slug.to_string(),
                reason: err.to_string(),
            };
            logging::warn!("{err}");
            return;
        }
    };

    if let Some(on_create_app) = &handlers.on_create_app {
        on_create_app(app);
    }
}
