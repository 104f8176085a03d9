//! Browser implementations of the checkout and drawer collaborators.

use async_trait::async_trait;
use cart_core::{
    CartError, CartLineItem, CartResult, CheckoutSession, ImageResolver, Navigator, Notice,
    NoticeKind, Notifier, Redirector, SessionCreator,
};
use js_sys::{Function, Promise};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

pub(crate) fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

fn window() -> CartResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| CartError::Configuration("no global window".to_string()))
}

pub fn notice_kind_label(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Loading => "loading",
        NoticeKind::Error => "error",
    }
}

/// Posts the cart with `window.fetch`
pub struct FetchSessionCreator {
    endpoint_url: String,
}

impl FetchSessionCreator {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
        }
    }

    fn request(&self, body: &str) -> Result<Request, JsValue> {
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(body));

        Request::new_with_str_and_init(&self.endpoint_url, &init)
    }
}

#[async_trait(?Send)]
impl SessionCreator for FetchSessionCreator {
    async fn create_session(&self, items: &[CartLineItem]) -> CartResult<CheckoutSession> {
        let body = serde_json::to_string(items)?;
        let request = self
            .request(&body)
            .map_err(|e| CartError::InvalidRequest(describe(&e)))?;

        let response: Response = JsFuture::from(window()?.fetch_with_request(&request))
            .await
            .and_then(|v| v.dyn_into())
            .map_err(|e| CartError::NetworkError(describe(&e)))?;

        let text = JsFuture::from(
            response
                .text()
                .map_err(|e| CartError::NetworkError(describe(&e)))?,
        )
        .await
        .map_err(|e| CartError::NetworkError(describe(&e)))?
        .as_string()
        .unwrap_or_default();

        if !response.ok() {
            return Err(CartError::ServerError {
                status: response.status(),
                message: text,
            });
        }

        let session: CheckoutSession = serde_json::from_str(&text)
            .map_err(|e| CartError::MalformedResponse(e.to_string()))?;
        Ok(session)
    }
}

/// Hands the session id to a JS function `(sessionId) => void`
///
/// The page wires this to Stripe.js, which knows where the hosted page lives:
/// `(id) => stripe.redirectToCheckout({ sessionId: id })`. A throwing callback
/// fails the redirect; a rejected promise is only logged.
pub struct JsCheckoutRedirect {
    callback: Function,
}

impl JsCheckoutRedirect {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl Redirector for JsCheckoutRedirect {
    fn redirect_to_checkout(&self, session_id: &str) -> CartResult<()> {
        let returned = self
            .callback
            .call1(&JsValue::NULL, &JsValue::from_str(session_id))
            .map_err(|e| CartError::RedirectFailed(describe(&e)))?;

        if let Ok(promise) = returned.dyn_into::<Promise>() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log(&format!("redirectToCheckout rejected: {}", describe(&e)));
                }
            });
        }
        Ok(())
    }
}

/// Forwards notices to a JS toast function `(kind, message, durationMs)`
pub struct JsToast {
    callback: Function,
}

impl JsToast {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl Notifier for JsToast {
    fn notify(&self, notice: Notice) {
        let result = self.callback.call3(
            &JsValue::NULL,
            &JsValue::from_str(notice_kind_label(notice.kind)),
            &JsValue::from_str(&notice.message),
            &JsValue::from_f64(notice.duration.as_millis() as f64),
        );
        if let Err(e) = result {
            log(&format!("toast callback failed: {}", describe(&e)));
        }
    }
}

/// Resolves image references with a JS function `(ref) => url`
pub struct JsImageResolver {
    callback: Function,
}

impl JsImageResolver {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl ImageResolver for JsImageResolver {
    fn resolve(&self, image_ref: &str) -> String {
        self.callback
            .call1(&JsValue::NULL, &JsValue::from_str(image_ref))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }
}

/// Client-side navigation through a JS function `(path) => void`
pub struct JsNavigator {
    callback: Function,
}

impl JsNavigator {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl Navigator for JsNavigator {
    fn navigate(&self, path: &str) {
        if let Err(e) = self.callback.call1(&JsValue::NULL, &JsValue::from_str(path)) {
            log(&format!("navigation to {} failed: {}", path, describe(&e)));
        }
    }
}
