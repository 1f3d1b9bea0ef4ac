//! OAuth2 installed-app authentication for Google APIs.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::url::Url;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, RefreshToken, RequestTokenError, Scope, TokenUrl,
};
use reqwest::{redirect, Client};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::callback::CallbackListener;
use crate::config::{DEFAULT_AUTH_URI, DEFAULT_TOKEN_URI, DRIVE_SCOPE};
use crate::error::{DriveError, Result};
use crate::models::ClientSecrets;
use crate::token_store::{Credential, TokenStore};

/// OAuth client with both the consent and the token endpoint configured.
type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Authenticator holding the operator's credential for the Drive API.
///
/// The credential is persisted through a [`TokenStore`] whenever it is
/// obtained or refreshed.
#[derive(Clone)]
pub struct Authenticator {
    oauth: GoogleClient,
    store: TokenStore,
    http: Client,
    credential: Arc<RwLock<Credential>>,
}

impl Authenticator {
    /// Load client secrets from `client_secrets` and obtain a credential.
    ///
    /// Uses the stored token when still valid, refreshes it when it has
    /// expired and carries a refresh token, and otherwise runs the
    /// interactive browser flow. The result is written back to `store`.
    pub async fn authenticate<P: AsRef<Path>>(
        client_secrets: P,
        store: TokenStore,
    ) -> Result<Self> {
        let secrets = ClientSecrets::from_file(client_secrets)?;
        Self::authenticate_with(secrets, store).await
    }

    /// Same as [`Authenticator::authenticate`] with already-parsed secrets.
    pub async fn authenticate_with(secrets: ClientSecrets, store: TokenStore) -> Result<Self> {
        let oauth = oauth_client(&secrets)?;
        let http = token_http_client()?;

        let credential = match store.load()? {
            Some(cred) if !cred.is_expired() => {
                debug!("Using stored access token");
                cred
            }
            Some(cred) if cred.can_refresh() => {
                info!("Stored access token expired, refreshing");
                refresh(&oauth, &http, &cred).await?
            }
            _ => {
                info!("No usable stored token, starting browser authorization");
                authorize_interactively(&oauth, &http).await?
            }
        };

        store.save(&credential)?;
        Ok(Self {
            oauth,
            store,
            http,
            credential: Arc::new(RwLock::new(credential)),
        })
    }

    /// Create an authenticator around an existing credential.
    pub fn with_credential(
        secrets: ClientSecrets,
        store: TokenStore,
        credential: Credential,
    ) -> Result<Self> {
        Ok(Self {
            oauth: oauth_client(&secrets)?,
            store,
            http: token_http_client()?,
            credential: Arc::new(RwLock::new(credential)),
        })
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        {
            let cached = self.credential.read().await;
            if !cached.is_expired() {
                return Ok(cached.access_token.clone());
            }
        }

        let mut cached = self.credential.write().await;
        if !cached.is_expired() {
            return Ok(cached.access_token.clone());
        }
        if !cached.can_refresh() {
            return Err(DriveError::TokenRefreshError(
                "access token expired and no refresh token is available".to_string(),
            ));
        }

        info!("Access token expired mid-run, refreshing");
        let renewed = refresh(&self.oauth, &self.http, &cached).await?;
        if let Err(e) = self.store.save(&renewed) {
            warn!(error = %e, "Failed to persist refreshed token");
        }
        *cached = renewed;

        Ok(cached.access_token.clone())
    }
}

fn oauth_client(secrets: &ClientSecrets) -> Result<GoogleClient> {
    let auth_uri = secrets.auth_uri.as_deref().unwrap_or(DEFAULT_AUTH_URI);
    let token_uri = secrets.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);

    let auth_url = AuthUrl::new(auth_uri.to_string())
        .map_err(|e| DriveError::ClientSecretsError(format!("invalid auth_uri: {}", e)))?;
    let token_url = TokenUrl::new(token_uri.to_string())
        .map_err(|e| DriveError::ClientSecretsError(format!("invalid token_uri: {}", e)))?;

    Ok(BasicClient::new(ClientId::new(secrets.client_id.clone()))
        .set_client_secret(ClientSecret::new(secrets.client_secret.clone()))
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_auth_type(AuthType::RequestBody))
}

/// HTTP client for the token endpoint; redirects are not followed.
fn token_http_client() -> Result<Client> {
    Ok(Client::builder().redirect(redirect::Policy::none()).build()?)
}

/// Consent URL for an offline-access grant of the Drive scope, with a
/// fresh CSRF `state`.
fn consent_url(oauth: &GoogleClient, redirect_url: &RedirectUrl) -> (Url, CsrfToken) {
    oauth
        .authorize_url(CsrfToken::new_random)
        .set_redirect_uri(Cow::Borrowed(redirect_url))
        .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
        .add_extra_param("access_type", "offline")
        .add_extra_param("prompt", "consent")
        .url()
}

async fn authorize_interactively(oauth: &GoogleClient, http: &Client) -> Result<Credential> {
    let listener = CallbackListener::bind().await?;
    let redirect_url = RedirectUrl::new(listener.redirect_uri().to_string())
        .map_err(|e| DriveError::CallbackError(format!("invalid redirect URI: {}", e)))?;
    let (url, csrf_state) = consent_url(oauth, &redirect_url);

    println!(
        "Please visit this URL to authorize this application:\n{}\n",
        url
    );
    if let Err(e) = open::that(url.as_str()) {
        debug!(error = %e, "Could not open a browser");
    }

    let code = listener.wait_for_code(csrf_state.secret()).await?;
    debug!("Received authorization code");

    let response = oauth
        .exchange_code(AuthorizationCode::new(code))
        .set_redirect_uri(Cow::Borrowed(&redirect_url))
        .request_async(http)
        .await
        .map_err(|e| {
            DriveError::AuthenticationError(format!(
                "code exchange failed: {}",
                describe_token_error(e)
            ))
        })?;

    Ok(Credential::from_response(&response, None))
}

async fn refresh(oauth: &GoogleClient, http: &Client, current: &Credential) -> Result<Credential> {
    let refresh_token = current
        .refresh_token
        .clone()
        .ok_or_else(|| DriveError::TokenRefreshError("no refresh token".to_string()))?;
    let token = RefreshToken::new(refresh_token.clone());

    let response = oauth
        .exchange_refresh_token(&token)
        .request_async(http)
        .await
        .map_err(|e| DriveError::TokenRefreshError(describe_token_error(e)))?;

    Ok(Credential::from_response(&response, Some(refresh_token)))
}

/// Render a token endpoint failure, preferring Google's `error` and
/// `error_description` over the generic message.
fn describe_token_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(resp) => match resp.error_description() {
            Some(description) => format!("{}: {}", resp.error(), description),
            None => resp.error().to_string(),
        },
        other => match std::error::Error::source(&other) {
            Some(source) => format!("{}: {}", other, source),
            None => other.to_string(),
        },
    }
}
