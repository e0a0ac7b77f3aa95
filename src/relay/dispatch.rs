//! Outbound fetch orchestration.
//!
//! # Responsibilities
//! - Issue the outbound GET for the normalized target
//! - Follow at most one redirect manually, rewriting response headers
//! - Stream the upstream body through without buffering
//! - Translate transport failures and deadline expiry into relay errors
//!
//! # Design Decisions
//! - The client never auto-follows redirects; the single manual hop is the
//!   complete redirect behavior and stays observable
//! - Each attempt carries its own deadline; expiry drops the in-flight
//!   future, which closes the outbound connection
//! - Every terminal branch claims the completion token before producing
//!   the response

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::relay::complete::CompletionToken;
use crate::relay::error::RelayError;
use crate::relay::normalize::normalize_target;

/// Which outbound attempt a failure belongs to.
#[derive(Debug, Clone, Copy)]
enum Hop {
    Initial,
    Redirect,
}

/// Why an outbound attempt produced no usable response.
enum AttemptFailure {
    Timeout,
    Transport(reqwest::Error),
}

/// Orchestrates outbound fetches for relay requests.
///
/// Stateless across invocations; each call to [`relay`](Self::relay) owns
/// its target descriptor and completion token exclusively.
pub struct RelayDispatcher {
    client: reqwest::Client,
    attempt_timeout: Duration,
    cache_control: HeaderValue,
}

impl RelayDispatcher {
    /// Build a dispatcher from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let cache_control =
            HeaderValue::from_str(&format!("public, max-age={}", config.cache_max_age_secs))
                .unwrap();

        Ok(Self {
            client,
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
            cache_control,
        })
    }

    /// Fetch the target and produce the terminal response for one inbound
    /// request.
    ///
    /// At most two outbound attempts are made: the initial GET, then one
    /// manual follow if the first answer is a redirect. The second hop is
    /// streamed through with PDF headers regardless of its own status and
    /// never follows further redirects.
    pub async fn relay(&self, raw_url: &str, token: &CompletionToken) -> Response {
        let start = Instant::now();

        let target = normalize_target(raw_url);
        if target != raw_url {
            tracing::debug!(original = %raw_url, rewritten = %target, "Rewrote preview URL");
        }

        let target_url = match Url::parse(&target) {
            Ok(url) => url,
            Err(error) => {
                tracing::warn!(url = %target, %error, "Target URL failed to parse");
                return self.finalize_error(token, start, RelayError::Internal);
            }
        };

        let response = match self.attempt(target_url.clone()).await {
            Ok(response) => response,
            Err(failure) => return self.fail(token, start, &target_url, Hop::Initial, failure),
        };

        let status = response.status();
        if is_manual_redirect(status) {
            let location = match redirect_target(&target_url, response.headers()) {
                Some(location) => location,
                None => {
                    tracing::warn!(url = %target_url, status = %status, "Redirect without usable Location header");
                    return self.finalize_error(token, start, RelayError::RedirectFetch(None));
                }
            };

            tracing::debug!(from = %target_url, to = %location, status = %status, "Following redirect");

            return match self.attempt(location.clone()).await {
                Ok(redirected) => self.stream_through(token, start, "redirect_success", redirected),
                Err(failure) => self.fail(token, start, &location, Hop::Redirect, failure),
            };
        }

        if status != StatusCode::OK {
            tracing::warn!(url = %target_url, status = %status, "Upstream returned non-success status");
            return self.finalize_error(token, start, RelayError::UpstreamStatus(status.as_u16()));
        }

        self.stream_through(token, start, "success", response)
    }

    /// Issue one outbound GET under the per-attempt deadline.
    async fn attempt(&self, url: Url) -> Result<reqwest::Response, AttemptFailure> {
        match tokio::time::timeout(self.attempt_timeout, self.client.get(url).send()).await {
            // Expiry drops the in-flight future, closing the outbound
            // connection.
            Err(_) => Err(AttemptFailure::Timeout),
            Ok(Err(error)) => Err(AttemptFailure::Transport(error)),
            Ok(Ok(response)) => Ok(response),
        }
    }

    /// Forward the upstream body as the inbound response.
    ///
    /// Bytes are piped chunk by chunk; backpressure from the inbound socket
    /// propagates to the outbound one. The whole payload is never held in
    /// memory.
    fn stream_through(
        &self,
        token: &CompletionToken,
        start: Instant,
        outcome: &'static str,
        upstream: reqwest::Response,
    ) -> Response {
        let url = upstream.url().clone();
        let stream = upstream.bytes_stream().inspect_err(move |error| {
            // Headers are already finalized at this point; a mid-stream
            // failure can only terminate the connection.
            tracing::warn!(url = %url, %error, "Upstream body stream failed mid-transfer");
        });

        let mut response = Response::new(Body::from_stream(stream));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/pdf"),
        );
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, self.cache_control.clone());

        self.finalize(token, start, outcome, response)
    }

    /// Translate an attempt failure into the terminal error response.
    fn fail(
        &self,
        token: &CompletionToken,
        start: Instant,
        url: &Url,
        hop: Hop,
        failure: AttemptFailure,
    ) -> Response {
        let error = match failure {
            AttemptFailure::Timeout => {
                tracing::warn!(url = %url, hop = ?hop, "Outbound attempt deadline expired");
                RelayError::Timeout
            }
            AttemptFailure::Transport(error) => {
                tracing::error!(url = %url, hop = ?hop, %error, "Outbound attempt failed");
                match hop {
                    Hop::Initial => RelayError::Fetch(error),
                    Hop::Redirect => RelayError::RedirectFetch(Some(error)),
                }
            }
        };

        self.finalize_error(token, start, error)
    }

    fn finalize_error(
        &self,
        token: &CompletionToken,
        start: Instant,
        error: RelayError,
    ) -> Response {
        let outcome = error.outcome();
        self.finalize(token, start, outcome, error.into_response())
    }

    /// Claim the completion token and hand back the terminal response.
    ///
    /// A caller that loses the claim produces nothing; its response is
    /// dropped. Unreachable while `relay` has a single terminal return
    /// path, but it is the audit point for the pending → finalized
    /// invariant.
    fn finalize(
        &self,
        token: &CompletionToken,
        start: Instant,
        outcome: &'static str,
        response: Response,
    ) -> Response {
        if !token.try_claim() {
            tracing::error!(outcome, "Discarded a finalization attempt on an already-finalized response");
            return Response::new(Body::empty());
        }

        metrics::record_relay(outcome, response.status().as_u16(), start);
        response
    }
}

/// Whether a status triggers the one manual redirect follow.
fn is_manual_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Resolve the `Location` header against the attempted URL.
///
/// Handles both absolute and relative `Location` values.
fn redirect_target(base: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(header::LOCATION)?.to_str().ok()?;
    base.join(location).ok()
}
