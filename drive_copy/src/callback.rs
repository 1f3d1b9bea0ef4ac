//! Loopback listener receiving the OAuth2 authorization redirect.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::{DriveError, Result};

const SUCCESS_PAGE: &str = "<html><body><h3>Authorization complete.</h3>\
<p>You may close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h3>Authorization failed.</h3>\
<p>Check the terminal for details.</p></body></html>";

/// How long open browser connections may linger once the code is in.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Query parameters Google appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
struct RedirectState {
    expected_state: String,
    outcome: mpsc::Sender<std::result::Result<String, String>>,
}

/// HTTP listener on `127.0.0.1` with an OS-assigned port, serving a
/// single authorization redirect.
pub struct CallbackListener {
    listener: TcpListener,
    redirect_uri: String,
}

impl CallbackListener {
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        Ok(Self {
            listener,
            redirect_uri: format!("http://127.0.0.1:{}/", port),
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Serve the redirect URI until the browser delivers a code or an error.
    ///
    /// Connections are handled concurrently, so idle or malformed ones do
    /// not hold up the real redirect. Requests carrying neither `code` nor
    /// `error` get a 404 and the listener keeps waiting.
    pub async fn wait_for_code(self, expected_state: &str) -> Result<String> {
        let (outcome_tx, mut outcome_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route("/", get(receive_redirect))
            .with_state(RedirectState {
                expected_state: expected_state.to_string(),
                outcome: outcome_tx,
            });

        let listener = self.listener;
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = outcome_rx.recv().await;

        let _ = shutdown_tx.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            debug!("Closing lingering callback connections");
            server.abort();
        }

        match outcome {
            Some(Ok(code)) => Ok(code),
            Some(Err(message)) => Err(DriveError::CallbackError(message)),
            None => Err(DriveError::CallbackError(
                "callback server stopped before a redirect arrived".to_string(),
            )),
        }
    }
}

async fn receive_redirect(
    State(state): State<RedirectState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if params.code.is_none() && params.error.is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }

    let (status, page, outcome) = if let Some(error) = params.error {
        (
            StatusCode::OK,
            FAILURE_PAGE,
            Err(format!("authorization denied: {}", error)),
        )
    } else if params.state.as_deref() != Some(state.expected_state.as_str()) {
        (
            StatusCode::BAD_REQUEST,
            FAILURE_PAGE,
            Err("state mismatch in authorization response".to_string()),
        )
    } else {
        let code = params
            .code
            .ok_or_else(|| "missing authorization code".to_string());
        (StatusCode::OK, SUCCESS_PAGE, code)
    };

    debug!(status = status.as_u16(), "OAuth redirect received");
    // Only the first outcome counts; later redirects are answered but ignored.
    let _ = state.outcome.try_send(outcome);
    (status, Html(page)).into_response()
}
