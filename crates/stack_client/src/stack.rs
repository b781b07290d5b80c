//! The [`Stack`] façade: session ownership, typed getters and logout.

use std::{cell::RefCell, rc::Rc};

use bar_host::{BarHostServices, BarTarget, HttpMethod, HttpTransport};
use leptos::logging;
use serde_json::{Map, Value};

use crate::{
    apps::{AppIcon, AppRecord, IconProps, StorageUsage},
    context_memo::ContextMemo,
    error::StackError,
    realtime::{initialize_realtime, AppEventHandlers},
    request::{self, fetch_json, fetch_options, unwrap_data, RequestBody},
    session::{Session, StackConfig},
};

struct StackInner {
    services: BarHostServices,
    session: RefCell<Option<Rc<Session>>>,
    context: ContextMemo,
}

#[derive(Clone)]
/// Client for one bar instance.
///
/// Clones share the session and the context memo. Each request reads the session snapshot
/// current when it starts, so a token refresh never affects requests already in flight.
pub struct Stack {
    inner: Rc<StackInner>,
}

impl std::fmt::Debug for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stack")
            .field("session", &self.inner.session.borrow())
            .field("target", &self.inner.services.target)
            .field("context", &self.inner.context.state())
            .finish()
    }
}

impl Stack {
    /// Creates an uninitialized client over `services`.
    pub fn new(services: BarHostServices) -> Self {
        Self {
            inner: Rc::new(StackInner {
                services,
                session: RefCell::new(None),
                context: ContextMemo::default(),
            }),
        }
    }

    /// Host services this client was built with.
    pub fn services(&self) -> &BarHostServices {
        &self.inner.services
    }

    /// Current session snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotInitialized`] before [`Self::init`].
    pub fn session(&self) -> Result<Rc<Session>, StackError> {
        self.inner
            .session
            .borrow()
            .clone()
            .ok_or(StackError::NotInitialized)
    }

    /// Stores the session described by `config` and subscribes to app events.
    ///
    /// Only the subscription attempt is awaited; realtime failures are logged, never returned.
    pub async fn init(&self, config: &StackConfig, handlers: AppEventHandlers) {
        let session = Rc::new(Session::from_config(config));
        self.inner.session.replace(Some(session.clone()));
        initialize_realtime(self, &session, handlers).await;
    }

    /// Replaces the session token for every later request.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotInitialized`] before [`Self::init`].
    pub fn update_access_token(&self, token: impl Into<String>) -> Result<(), StackError> {
        let refreshed = Rc::new(self.session()?.with_token(token));
        self.inner.session.replace(Some(refreshed));
        Ok(())
    }

    /// Typed read accessors.
    pub fn get(&self) -> StackGetters<'_> {
        StackGetters { stack: self }
    }

    /// Ends the stack session.
    ///
    /// A 204 answer reloads the hosting page.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Unauthorized`] on 401 and [`StackError::StackUnavailable`] when the
    /// stack cannot be reached.
    pub async fn logout(&self) -> Result<(), StackError> {
        let session = self.session()?;
        let request = fetch_options(&session, HttpMethod::Delete, session.url("/auth/login"));
        let response = self
            .http()
            .send(request)
            .await
            .map_err(|_| StackError::StackUnavailable)?;
        match response.status {
            401 => Err(StackError::Unauthorized),
            204 => {
                if let Err(err) = self.inner.services.page.reload() {
                    logging::warn!("page reload after logout failed: {err}");
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Issues an authenticated JSON request and returns the response's `data` object.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotInitialized`] before [`Self::init`] and otherwise propagates
    /// request-layer errors.
    pub async fn cozy_fetch_json(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Map<String, Value>, StackError> {
        let session = self.session()?;
        request::cozy_fetch_json(self.http(), &session, method, path, body).await
    }

    fn http(&self) -> &dyn HttpTransport {
        self.inner.services.http.as_ref()
    }

    async fn get_json(&self, path: &str) -> Result<Value, StackError> {
        let session = self.session()?;
        let request = fetch_options(&session, HttpMethod::Get, session.url(path));
        fetch_json(self.http(), request).await
    }
}

#[derive(Debug, Clone, Copy)]
/// Read accessors returned by [`Stack::get`].
pub struct StackGetters<'a> {
    stack: &'a Stack,
}

impl StackGetters<'_> {
    /// Lists installed apps.
    ///
    /// # Errors
    ///
    /// Propagates request-layer errors; an `error` member in the answer becomes
    /// [`StackError::Server`].
    pub async fn apps(&self) -> Result<Vec<AppRecord>, StackError> {
        let json = self.stack.get_json("/apps/").await?;
        AppRecord::list_from_json(&unwrap_data(json)?)
    }

    /// Fetches one app by slug.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::MissingSlug`] for an empty slug without issuing a request, and
    /// otherwise behaves like [`Self::apps`].
    pub async fn app(&self, slug: &str) -> Result<AppRecord, StackError> {
        if slug.is_empty() {
            return Err(StackError::MissingSlug);
        }
        let json = self.stack.get_json(&format!("/apps/{slug}")).await?;
        AppRecord::from_json(&unwrap_data(json)?)
    }

    /// Deployment context, fetched once per stack instance.
    ///
    /// Instances without a context document resolve with an empty object.
    ///
    /// # Errors
    ///
    /// Propagates every request-layer error except [`StackError::NotFound`]; the next call
    /// retries.
    pub async fn context(&self) -> Result<Value, StackError> {
        let stack = self.stack;
        stack
            .inner
            .context
            .get_or_fetch(|| stack.get_json("/settings/context"))
            .await
    }

    /// Current disk usage.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotInitialized`] before init and [`StackError::StackUnavailable`]
    /// for any other failure.
    pub async fn storage_data(&self) -> Result<StorageUsage, StackError> {
        self.stack.session()?;
        let json = self
            .stack
            .get_json("/settings/disk-usage")
            .await
            .map_err(|_| StackError::StackUnavailable)?;
        StorageUsage::from_disk_usage(&json).map_err(|_| StackError::StackUnavailable)
    }

    /// How app icons should be rendered on this target.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotInitialized`] before init on the browser target.
    pub fn icon_props(&self) -> Result<IconProps, StackError> {
        match self.stack.inner.services.target {
            BarTarget::Mobile => Ok(IconProps::Mobile),
            BarTarget::Browser => {
                let session = self.stack.session()?;
                Ok(IconProps::Web {
                    domain: session.host.clone(),
                    secure: session.use_ssl,
                })
            }
        }
    }

    /// Downloads an app icon with the session credentials.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotFound`] when the app publishes no icon link and otherwise
    /// propagates request-layer errors.
    pub async fn fetch_icon(&self, app: &AppRecord) -> Result<AppIcon, StackError> {
        let session = self.stack.session()?;
        let icon_path = app.links.icon.as_deref().ok_or(StackError::NotFound)?;
        let request = fetch_options(&session, HttpMethod::Get, session.url(icon_path));
        let response = self
            .stack
            .http()
            .send(request)
            .await
            .map_err(StackError::Transport)?;
        if let Some(err) = StackError::from_status(response.status) {
            return Err(err);
        }
        let mime_type = response.header("content-type").map(str::to_string);
        Ok(AppIcon::new(mime_type.as_deref(), response.body))
    }

    /// Canonical stack base URL.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::NotInitialized`] before init.
    pub fn cozy_url(&self) -> Result<String, StackError> {
        Ok(self.stack.session()?.base_url.clone())
    }

    /// Public URL of the settings app.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::SettingsUnavailable`] when the settings app is not installed or
    /// publishes no URL; other request-layer errors propagate.
    pub async fn settings_app_url(&self) -> Result<String, StackError> {
        let settings = match self.app("settings").await {
            Ok(settings) => settings,
            Err(StackError::NotFound) => return Err(StackError::SettingsUnavailable),
            Err(err) => return Err(err),
        };
        settings
            .links
            .related
            .filter(|url| !url.is_empty())
            .ok_or(StackError::SettingsUnavailable)
    }
}
