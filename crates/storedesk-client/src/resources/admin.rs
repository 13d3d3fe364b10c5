//! Admin login, session check and logout

use crate::client::{ApiClient, expect_success, read_json};
use crate::error::ClientResult;
use reqwest::Method;
use serde::Deserialize;
use storedesk_core::AdminProfile;
use storedesk_core::forms::LoginRequest;

/// Profile as returned by login or the session check
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileBody {
    Admin { admin: AdminProfile },
    User { user: AdminProfile },
    Bare(AdminProfile),
}

impl From<ProfileBody> for AdminProfile {
    fn from(body: ProfileBody) -> Self {
        match body {
            ProfileBody::Admin { admin } | ProfileBody::User { user: admin } | ProfileBody::Bare(admin) => admin,
        }
    }
}

impl ApiClient {
    /// Log in with email and password
    ///
    /// The backend sets the session cookie, which the client's cookie jar keeps
    /// for later calls. The session context is marked authenticated.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank credentials (nothing is sent), or the
    /// backend's rejection.
    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<AdminProfile> {
        credentials.validate()?;

        let response = self
            .send(self.request(Method::POST, "/api/admin/login").json(credentials))
            .await?;
        let mut profile: AdminProfile = read_json::<ProfileBody>(response).await?.into();
        if profile.email.is_empty() {
            profile.email.clone_from(&credentials.email);
        }

        tracing::info!(email = %profile.email, "logged in");
        self.session().authenticate(profile.clone());
        Ok(profile)
    }

    /// Session check: who is logged in
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Unauthorized`] when there is no valid session.
    pub async fn me(&self) -> ClientResult<AdminProfile> {
        let response = self.send(self.request(Method::GET, "/api/admin/me")).await?;
        let profile: AdminProfile = read_json::<ProfileBody>(response).await?.into();
        self.session().authenticate(profile.clone());
        Ok(profile)
    }

    /// Log out; the local session is cleared whatever the backend says
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error, after the session is cleared.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = match self.send(self.request(Method::POST, "/api/admin/logout")).await {
            Ok(response) => expect_success(response).await,
            Err(err) => Err(err),
        };
        self.session().invalidate();
        if let Err(err) = &result {
            tracing::warn!(error = %err, "logout call failed");
        }
        result
    }
}
