//! # Checkout Initiator
//!
//! Hands the cart off to a hosted checkout page.
//!
//! ```text
//!            pay                 session id
//!   Idle ───────────▶ Requesting ───────────▶ Redirecting (terminal)
//!    ▲                    │
//!    │      failure       ▼
//!    └──────────────── Failed
//! ```
//!
//! The three collaborators are traits so the browser build and tests can
//! plug in their own transport, redirect and toast implementations:
//! - [`SessionCreator`] posts the cart snapshot and returns a session id
//! - [`Redirector`] navigates to the hosted page
//! - [`Notifier`] shows transient notifications

use crate::error::{CartError, CartResult};
use crate::item::CartLineItem;
use crate::store::CartHandle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How long the "Redirecting..." notice stays up
pub const REDIRECT_NOTICE_DURATION: Duration = Duration::from_secs(4);

/// Session returned by the session-creation endpoint
///
/// Only the id is needed: the redirect primitive resolves the hosted page
/// from it. Other fields in the response body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider session id
    pub id: String,
}

/// Posts a cart snapshot to the session-creation endpoint.
///
/// Not `Send`: the browser transport holds JS values across the await.
#[async_trait(?Send)]
pub trait SessionCreator {
    /// Create a hosted checkout session for these items.
    ///
    /// Implementations map a failure status to [`CartError::ServerError`]
    /// and a body without an id to [`CartError::MalformedResponse`].
    async fn create_session(&self, items: &[CartLineItem]) -> CartResult<CheckoutSession>;
}

/// Navigates the user to the hosted checkout page for a session id
///
/// In the browser this is Stripe.js `redirectToCheckout({ sessionId })`.
pub trait Redirector {
    fn redirect_to_checkout(&self, session_id: &str) -> CartResult<()>;
}

/// Kind of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Loading,
    Error,
}

/// Transient, non-blocking user notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    /// The notice shown while the browser leaves for the hosted page
    pub fn redirecting() -> Self {
        Self {
            kind: NoticeKind::Loading,
            message: "Redirecting...".to_string(),
            duration: REDIRECT_NOTICE_DURATION,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            duration: REDIRECT_NOTICE_DURATION,
        }
    }
}

/// Shows notices to the user (toasts in the browser)
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Where the checkout flow currently is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Requesting,
    Redirecting { session_id: String },
    Failed { reason: String },
}

/// Result of one checkout attempt
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Session created and redirect primitive invoked with this id
    Success(String),
    /// Flow is back at Idle
    Failure(CartError),
}

impl CheckoutOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckoutOutcome::Success(_))
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            CheckoutOutcome::Success(id) => Some(id),
            CheckoutOutcome::Failure(_) => None,
        }
    }
}

/// Failure reporting policy
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutPolicy {
    /// Surface server and network failures as error notices.
    /// Off by default: a failing endpoint returns to Idle silently.
    pub notify_on_failure: bool,
}

/// Drives one cart through the checkout state machine
pub struct CheckoutInitiator<S, R, N> {
    creator: S,
    redirector: R,
    notifier: N,
    policy: CheckoutPolicy,
    phase: watch::Sender<CheckoutPhase>,
}

impl<S, R, N> CheckoutInitiator<S, R, N>
where
    S: SessionCreator,
    R: Redirector,
    N: Notifier,
{
    pub fn new(creator: S, redirector: R, notifier: N) -> Self {
        let (phase, _rx) = watch::channel(CheckoutPhase::Idle);
        Self {
            creator,
            redirector,
            notifier,
            policy: CheckoutPolicy::default(),
            phase,
        }
    }

    /// Builder: override the failure policy
    pub fn with_policy(mut self, policy: CheckoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase.borrow().clone()
    }

    /// Observe phase transitions (e.g. to disable the pay button)
    pub fn subscribe(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase.subscribe()
    }

    /// Run one checkout attempt against the current cart contents.
    ///
    /// A second call while a request is in flight is rejected with
    /// [`CartError::CheckoutInFlight`] without issuing a request.
    pub async fn checkout(&self, cart: &CartHandle) -> CheckoutOutcome {
        let items = cart.items();
        if items.is_empty() {
            debug!("checkout requested with an empty cart");
            return CheckoutOutcome::Failure(CartError::EmptyCart);
        }

        let entered = self.phase.send_if_modified(|phase| {
            if matches!(phase, CheckoutPhase::Idle) {
                *phase = CheckoutPhase::Requesting;
                true
            } else {
                false
            }
        });
        if !entered {
            warn!(phase = ?self.phase(), "checkout already in progress");
            return CheckoutOutcome::Failure(CartError::CheckoutInFlight);
        }

        info!(items = items.len(), "requesting checkout session");

        let session = match self.creator.create_session(&items).await {
            Ok(session) if session.id.trim().is_empty() => {
                Err(CartError::MalformedResponse("session id is empty".to_string()))
            }
            other => other,
        };

        match session {
            Ok(session) => self.redirect(session.id),
            Err(err) => self.fail(err),
        }
    }

    fn redirect(&self, session_id: String) -> CheckoutOutcome {
        self.phase.send_replace(CheckoutPhase::Redirecting {
            session_id: session_id.clone(),
        });
        self.notifier.notify(Notice::redirecting());

        if let Err(err) = self.redirector.redirect_to_checkout(&session_id) {
            return self.fail(err);
        }

        info!(%session_id, "redirecting to hosted checkout");
        CheckoutOutcome::Success(session_id)
    }

    fn fail(&self, err: CartError) -> CheckoutOutcome {
        warn!(error = %err, "checkout failed");
        self.phase.send_replace(CheckoutPhase::Failed {
            reason: err.to_string(),
        });

        if !err.is_transient() || self.policy.notify_on_failure {
            self.notifier.notify(Notice::error(format!("Checkout failed: {}", err)));
        }

        self.phase.send_replace(CheckoutPhase::Idle);
        CheckoutOutcome::Failure(err)
    }
}
