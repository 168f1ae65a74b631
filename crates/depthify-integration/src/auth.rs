use std::sync::{Arc, RwLock};

use reqwest::Client;
use tracing::info;

use crate::error::{IntegrationError, Operation};
use crate::projects::handle_response;
use crate::types::{AuthResponse, LoginRequest, SignupRequest, UserId, UserInfo};

/// Holds the signed-in user. The backend issues no token; the user record is
/// all the session there is.
pub struct AuthManager {
    client: Client,
    base_url: String,
    user: Arc<RwLock<Option<UserInfo>>>,
}

impl AuthManager {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            user: Arc::new(RwLock::new(None)),
        }
    }

    /// Log in with email and password
    pub async fn login(&self, email: String, password: String) -> Result<UserInfo, IntegrationError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(IntegrationError::Validation("Email and password are required".into()));
        }

        let url = format!("{}/api/auth/login", self.base_url);
        let body = LoginRequest { email, password };
        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Operation::Login.transport(e))?;

        let auth: AuthResponse = handle_response(Operation::Login, response).await?;
        self.store(auth.user.clone());
        info!("Logged in as {}", auth.user.email);
        Ok(auth.user)
    }

    /// Create an account. The new user is signed in on success.
    pub async fn signup(&self, request: SignupRequest) -> Result<UserInfo, IntegrationError> {
        let url = format!("{}/api/auth/signup", self.base_url);
        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Operation::Signup.transport(e))?;

        let auth: AuthResponse = handle_response(Operation::Signup, response).await?;
        self.store(auth.user.clone());
        info!("Signed up as {}", auth.user.email);
        Ok(auth.user)
    }

    fn store(&self, user: UserInfo) {
        if let Ok(mut u) = self.user.write() {
            *u = Some(user);
        }
    }

    /// Get the current user ID, if signed in
    pub fn user_id(&self) -> Option<UserId> {
        self.user.read().ok()?.as_ref().map(|u| u.id.clone())
    }
}
