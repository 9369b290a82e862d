//! Authentication exchanges: login, signup, logout and profile.

use reqwest::header;
use tracing::{debug, info, warn};

use super::client::{rejection_or, ApiClient, LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH, SIGNUP_PATH};
use super::in_flight::Operation;
use super::{ApiError, ApiResult};
use crate::models::{
    LoginRequest, LoginResponse, Profile, Session, SignupConfirmation, SignupRequest,
};
use crate::store::CredentialStore;

#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
    store: CredentialStore,
}

impl AuthClient {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Exchange credentials for a session.
    ///
    /// On success the token is written to the credential store; persisting
    /// the returned session blob is left to the caller. A rejected login
    /// leaves the store untouched.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let _guard = self.api.begin(Operation::Login)?;
        let url = self.api.url(LOGIN_PATH);

        let response = self
            .api
            .http()
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let response =
            ApiClient::check_response(response, |_, _| ApiError::InvalidCredentials).await?;

        let payload: LoginResponse = ApiClient::read_json(response).await?;
        let session = payload.into_session().ok_or_else(|| {
            ApiError::MalformedResponse("token is missing in login response".to_string())
        })?;

        self.store.set(&session.access_token)?;
        info!(user_id = ?session.user_id(), "Logged in");
        Ok(session)
    }

    /// Register a new account. Does not log in.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ApiResult<SignupConfirmation> {
        let _guard = self.api.begin(Operation::Signup)?;
        let url = self.api.url(SIGNUP_PATH);

        let response = self
            .api
            .http()
            .post(&url)
            .json(&SignupRequest {
                email,
                password,
                first_name,
                last_name,
            })
            .send()
            .await?;

        let response = ApiClient::check_response(response, |status, body| {
            ApiError::SignupFailed(format!(
                "status {}: {}",
                status.as_u16(),
                ApiError::truncate_body(body)
            ))
        })
        .await?;

        // Some deployments answer 201 with an empty body
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(SignupConfirmation {
                message: String::new(),
            });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// End the session.
    ///
    /// The credential store is cleared whatever the server says. A transport
    /// failure or a non-success status is still returned, after the local
    /// session is gone.
    pub async fn logout(&self) -> ApiResult<()> {
        let _guard = self.api.begin(Operation::Logout)?;

        let token = match self.store.get() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read token before logout");
                None
            }
        };

        let Some(token) = token else {
            debug!("No stored token, skipping server logout");
            self.store.clear()?;
            return Ok(());
        };

        let url = self.api.url(LOGOUT_PATH);
        let sent = self.api.http().post(&url).bearer_auth(&token).send().await;

        self.store.clear()?;

        let response = sent?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Server rejected logout");
            return Err(ApiError::LogoutRejected {
                status: status.as_u16(),
            });
        }
        info!("Logged out");
        Ok(())
    }

    /// Fetch the profile of the stored session's user
    pub async fn fetch_profile(&self) -> ApiResult<Profile> {
        let _guard = self.api.begin(Operation::FetchProfile)?;
        let token = self.store.get()?.ok_or(ApiError::MissingToken)?;
        let url = self.api.url(PROFILE_PATH);

        let response = self
            .api
            .http()
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        let response =
            ApiClient::check_response(response, rejection_or(ApiError::Unauthenticated)).await?;
        ApiClient::read_json(response).await
    }
}
