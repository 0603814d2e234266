// src/auth/sgid.rs
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::SgidConfig;
use crate::errors::ServerError;

/// The OpenID Connect provider the app signs users in with.
/// Only the stable subject identifier is consumed.
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start a sign-in.
    fn authorization_url(
        &self,
        state: &str,
        nonce: &str,
        code_challenge: &str,
    ) -> Result<String, ServerError>;

    /// Swap an authorization code for the user's subject (`sub`).
    /// The ID token must echo the `nonce` sent with the authorization request.
    fn exchange(&self, code: &str, code_verifier: &str, nonce: &str)
        -> Result<String, ServerError>;
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
    code_verifier: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: String,
}

#[derive(Deserialize)]
struct IdTokenClaims {
    sub: String,
    aud: Audience,
    nonce: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, client_id: &str) -> bool {
        match self {
            Audience::One(aud) => aud == client_id,
            Audience::Many(auds) => auds.iter().any(|a| a == client_id),
        }
    }
}

/// Check the ID token's audience and nonce and return its subject.
///
/// The token comes straight from the token endpoint over TLS, so its
/// signature is not checked (OpenID Connect Core 3.1.3.7).
fn verify_id_token(
    id_token: &str,
    expected_nonce: &str,
    client_id: &str,
) -> Result<String, ServerError> {
    let malformed = || ServerError::IdentityError("ID token malformed".into());

    let payload = id_token.split('.').nth(1).ok_or_else(malformed)?;
    let json = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| malformed())?;
    let claims: IdTokenClaims = serde_json::from_slice(&json).map_err(|_| malformed())?;

    if !claims.aud.contains(client_id) {
        return Err(ServerError::Unauthorized("ID token audience mismatch".into()));
    }
    if claims.nonce.as_deref() != Some(expected_nonce) {
        return Err(ServerError::Unauthorized("ID token nonce mismatch".into()));
    }
    Ok(claims.sub)
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
}

pub struct SgidClient {
    cfg: SgidConfig,
    client: Client,
}

impl SgidClient {
    pub fn new(cfg: SgidConfig) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServerError::IdentityError(format!("build http client failed: {e}")))?;
        Ok(Self { cfg, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v2/oauth/{path}", self.cfg.hostname.trim_end_matches('/'))
    }
}

impl IdentityProvider for SgidClient {
    fn authorization_url(
        &self,
        state: &str,
        nonce: &str,
        code_challenge: &str,
    ) -> Result<String, ServerError> {
        let url = Url::parse_with_params(
            &self.endpoint("authorize"),
            &[
                ("response_type", "code"),
                ("client_id", self.cfg.client_id.as_str()),
                ("scope", "openid"),
                ("redirect_uri", self.cfg.redirect_uri.as_str()),
                ("nonce", nonce),
                ("state", state),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
            ],
        )
        .map_err(|e| ServerError::IdentityError(format!("invalid sgID hostname: {e}")))?;
        Ok(url.into())
    }

    fn exchange(
        &self,
        code: &str,
        code_verifier: &str,
        nonce: &str,
    ) -> Result<String, ServerError> {
        let resp = self
            .client
            .post(self.endpoint("token"))
            .json(&TokenRequest {
                client_id: &self.cfg.client_id,
                client_secret: &self.cfg.client_secret,
                code,
                redirect_uri: &self.cfg.redirect_uri,
                grant_type: "authorization_code",
                code_verifier,
            })
            .send()
            .map_err(|e| ServerError::IdentityError(format!("token request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            warn!(%status, body = %body, "sgID token endpoint rejected the code");
            return Err(ServerError::Unauthorized("sign-in was rejected".into()));
        }

        let token: TokenResponse = resp
            .json()
            .map_err(|e| ServerError::IdentityError(format!("token response malformed: {e}")))?;

        let subject = verify_id_token(&token.id_token, nonce, &self.cfg.client_id)?;

        let info: UserInfo = self
            .client
            .get(self.endpoint("userinfo"))
            .bearer_auth(&token.access_token)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ServerError::IdentityError(format!("userinfo request failed: {e}")))?
            .json()
            .map_err(|e| ServerError::IdentityError(format!("userinfo response malformed: {e}")))?;

        if info.sub != subject {
            warn!("sgID userinfo subject differs from ID token");
            return Err(ServerError::Unauthorized("sign-in subject mismatch".into()));
        }

        debug!("sgID sign-in exchanged for subject");
        Ok(subject)
    }
}
