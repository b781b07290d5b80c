use std::{cell::RefCell, rc::Rc};

use bar_host::{
    auth_frame, subscribe_frame, HttpRequest, HttpResponse, IntentHandle, IntentReadyCallback,
    IntentRequest, RealtimeEvent, RealtimeEventStream,
};
use futures::{
    channel::{mpsc, oneshot},
    StreamExt,
};
use js_sys::{Function, Promise, Reflect, Uint8Array};
use serde_json::Value;
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Headers, HtmlElement, MessageEvent, Request, RequestCredentials, RequestInit, Response,
    WebSocket,
};

use crate::{page::BarDataset, realtime::REALTIME_SUBPROTOCOL};

#[wasm_bindgen(inline_js = r#"
export function start_intent_js(action, doctype, exposeFrameRemoval, mountId, onReady) {
  const client = globalThis.cozy && globalThis.cozy.client;
  const intents = client && client.intents;
  if (!intents || typeof intents.create !== 'function') {
    return Promise.reject(new Error('cozy intents library is not loaded'));
  }
  const mount = document.getElementById(mountId);
  if (!mount) {
    return Promise.reject(new Error(`intent mount #${mountId} not found`));
  }
  return intents
    .create(action, doctype, { exposeIntentFrameRemoval: exposeFrameRemoval })
    .start(mount, onReady);
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn start_intent_js(
        action: &str,
        doctype: &str,
        expose_frame_removal: bool,
        mount_id: &str,
        on_ready: &JsValue,
    ) -> Result<Promise, JsValue>;
}

fn js_err(err: JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "window unavailable".to_string())
}

pub async fn fetch(request: HttpRequest) -> Result<HttpResponse, String> {
    let window = window()?;
    let init = RequestInit::new();
    init.set_method(request.method.as_str());
    if request.include_credentials {
        init.set_credentials(RequestCredentials::Include);
    }
    let headers = Headers::new().map_err(js_err)?;
    for (name, value) in &request.headers {
        headers.set(name, value).map_err(js_err)?;
    }
    init.set_headers(&headers);
    if let Some(body) = &request.body {
        init.set_body(&JsValue::from_str(body));
    }

    let js_request = Request::new_with_str_and_init(&request.url, &init).map_err(js_err)?;
    let value = JsFuture::from(window.fetch_with_request(&js_request))
        .await
        .map_err(js_err)?;
    let response: Response = value
        .dyn_into()
        .map_err(|_| "fetch resolved with a non-Response value".to_string())?;

    let mut out = HttpResponse::empty(response.status());
    if let Ok(Some(content_type)) = response.headers().get("content-type") {
        out.headers.push(("content-type".to_string(), content_type));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    out.body = Uint8Array::new(&buffer).to_vec();
    Ok(out)
}

fn send_frame(socket: &WebSocket, frame: &Value) -> Result<(), String> {
    socket.send_with_str(&frame.to_string()).map_err(js_err)
}

pub async fn open_realtime(
    socket_url: &str,
    token: &str,
    doctype: &str,
) -> Result<RealtimeEventStream, String> {
    let socket = WebSocket::new_with_str(socket_url, REALTIME_SUBPROTOCOL).map_err(js_err)?;

    let (open_tx, open_rx) = oneshot::channel::<Result<(), String>>();
    let open_sender = Rc::new(RefCell::new(Some(open_tx)));
    let (event_tx, event_rx) = mpsc::unbounded::<RealtimeEvent>();
    let event_sender = Rc::new(RefCell::new(Some(event_tx)));

    let socket_for_open = socket.clone();
    let auth = auth_frame(token);
    let subscribe = subscribe_frame(doctype);
    let sender = open_sender.clone();
    let on_open = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_| {
        let result = send_frame(&socket_for_open, &auth)
            .and_then(|_| send_frame(&socket_for_open, &subscribe));
        if let Some(tx) = sender.borrow_mut().take() {
            let _ = tx.send(result);
        }
    }));
    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));

    let sender = open_sender.clone();
    let on_error = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_| {
        if let Some(tx) = sender.borrow_mut().take() {
            let _ = tx.send(Err("realtime socket failed to open".to_string()));
        }
    }));
    socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    let events = event_sender.clone();
    let handle_message = move |message: MessageEvent| {
        let Some(text) = message.data().as_string() else {
            return;
        };
        let Ok(frame) = serde_json::from_str::<Value>(&text) else {
            return;
        };
        let Some(event) = RealtimeEvent::from_wire(&frame) else {
            return;
        };
        if let Some(tx) = events.borrow().as_ref() {
            let _ = tx.unbounded_send(event);
        }
    };
    let on_message = Closure::<dyn FnMut(MessageEvent)>::wrap(Box::new(handle_message));
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    let events = event_sender;
    let open_on_close = open_sender;
    let on_close = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_| {
        events.borrow_mut().take();
        if let Some(tx) = open_on_close.borrow_mut().take() {
            let _ = tx.send(Err("realtime socket closed before opening".to_string()));
        }
    }));
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    let opened = open_rx
        .await
        .map_err(|_| "realtime socket was dropped before opening".to_string())
        .and_then(|result| result);
    if let Err(err) = opened {
        socket.set_onopen(None);
        socket.set_onerror(None);
        socket.set_onmessage(None);
        socket.set_onclose(None);
        let _ = socket.close();
        return Err(err);
    }

    // The socket keeps calling these for the lifetime of the page.
    on_open.forget();
    on_error.forget();
    on_message.forget();
    on_close.forget();
    Ok(event_rx.boxed_local())
}

pub async fn start_intent(
    request: &IntentRequest,
    mount_id: &str,
    on_ready: IntentReadyCallback,
) -> Result<IntentHandle, String> {
    let ready = Closure::once_into_js(move || on_ready());
    let promise = start_intent_js(
        &request.action,
        &request.doctype,
        request.expose_frame_removal,
        mount_id,
        &ready,
    )
    .map_err(js_err)?;
    let started = JsFuture::from(promise).await.map_err(js_err)?;

    let remove = Reflect::get(&started, &JsValue::from_str("removeIntentFrame")).map_err(js_err)?;
    let remove: Function = remove
        .dyn_into()
        .map_err(|_| "intent did not expose frame removal".to_string())?;
    Ok(IntentHandle::new(move || {
        remove.call0(&JsValue::NULL).map(|_| ()).map_err(js_err)
    }))
}

pub fn reload_page() -> Result<(), String> {
    window()?.location().reload().map_err(js_err)
}

pub fn read_bar_dataset() -> Option<BarDataset> {
    let document = web_sys::window()?.document()?;
    let root = document
        .query_selector("[role=application]")
        .ok()??
        .dyn_into::<HtmlElement>()
        .ok()?;
    let dataset = root.dataset();
    Some(BarDataset {
        cozy_domain: dataset.get("cozyDomain")?,
        cozy_token: dataset.get("cozyToken")?,
    })
}

pub fn page_is_secure() -> bool {
    web_sys::window()
        .and_then(|window| window.location().protocol().ok())
        .is_some_and(|protocol| protocol == "https:")
}
