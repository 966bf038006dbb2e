//! Session bootstrap: login and subscription replay.
//!
//! Subscriptions do not survive a transport reset, so after every successful
//! (re)connect the client logs in (when credentials are configured), waits for
//! the login to resolve, and then re-sends every subscription intent.

use std::fmt;
use std::future::Future;

use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;

use crate::constants::LOGIN_METHOD;
use crate::error::{HitbtcError, Result};
use crate::types::enums::AuthAlgo;
use crate::types::rpc::Params;
use crate::types::subscription::Subscription;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API credentials used to log in.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Sign a nonce with HMAC-SHA256 (`algo = HS256`); the secret never leaves
    /// the process.
    Signature {
        public_key: String,
        secret_key: String,
        /// Fixed nonce. Defaults to the current Unix time in milliseconds.
        nonce: Option<String>,
    },
    /// Send the secret key as-is (`algo = BASIC`).
    Basic {
        public_key: String,
        secret_key: String,
    },
}

impl Credentials {
    /// HMAC-signed credentials.
    pub fn signature(public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::Signature {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            nonce: None,
        }
    }

    /// Basic (pre-shared key) credentials.
    pub fn basic(public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::Basic {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Use a fixed nonce instead of the current time. No effect on basic
    /// credentials.
    pub fn with_nonce(self, nonce: impl Into<String>) -> Self {
        match self {
            Self::Signature {
                public_key,
                secret_key,
                ..
            } => Self::Signature {
                public_key,
                secret_key,
                nonce: Some(nonce.into()),
            },
            basic => basic,
        }
    }

    /// Read signature credentials from two environment variables.
    ///
    /// Returns `None` if either is unset or empty.
    pub fn from_env(key_var: &str, secret_var: &str) -> Option<Self> {
        let key = std::env::var(key_var).ok().filter(|k| !k.is_empty())?;
        let secret = std::env::var(secret_var).ok().filter(|s| !s.is_empty())?;
        Some(Self::signature(key, secret))
    }

    /// Login algorithm.
    pub fn algo(&self) -> AuthAlgo {
        match self {
            Self::Signature { .. } => AuthAlgo::HS256,
            Self::Basic { .. } => AuthAlgo::BASIC,
        }
    }

    /// Public API key.
    pub fn public_key(&self) -> &str {
        match self {
            Self::Signature { public_key, .. } | Self::Basic { public_key, .. } => public_key,
        }
    }

    /// Build the `login` params.
    ///
    /// Fails with [`HitbtcError::CredentialsMissing`] if either key is empty.
    pub fn login_params(&self) -> Result<Params> {
        let (public_key, secret_key) = match self {
            Self::Signature {
                public_key,
                secret_key,
                ..
            }
            | Self::Basic {
                public_key,
                secret_key,
            } => (public_key, secret_key),
        };
        if public_key.is_empty() {
            return Err(HitbtcError::CredentialsMissing("public API key is empty"));
        }
        if secret_key.is_empty() {
            return Err(HitbtcError::CredentialsMissing("secret API key is empty"));
        }

        let mut params = Params::new();
        params.insert("algo".into(), json!(self.algo()));
        params.insert("pKey".into(), json!(public_key));

        match self {
            Self::Signature { nonce, .. } => {
                let nonce = nonce
                    .clone()
                    .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string());
                params.insert("signature".into(), json!(sign(secret_key, &nonce)?));
                params.insert("nonce".into(), json!(nonce));
            }
            Self::Basic { .. } => {
                params.insert("sKey".into(), json!(secret_key));
            }
        }
        Ok(params)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("algo", &self.algo())
            .field("public_key", &self.public_key())
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Hex-encoded HMAC-SHA256 of `nonce` keyed with `secret`.
pub fn sign(secret: &str, nonce: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| HitbtcError::CredentialsMissing("secret API key rejected by HMAC"))?;
    mac.update(nonce.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// The request surface the bootstrap drives.
pub trait SessionLink: Send + Sync {
    /// Send a request without waiting for its response.
    fn send(&self, method: &str, params: Params) -> Result<u64>;

    /// Send a request and wait for its outcome.
    fn request(&self, method: &str, params: Params) -> impl Future<Output = Result<Value>> + Send;
}

/// What happened during a bootstrap run.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    /// `Some(true)` if login succeeded, `Some(false)` if it failed, `None`
    /// without credentials.
    pub authenticated: Option<bool>,
    /// Number of subscription requests sent.
    pub replayed: usize,
    /// Login and replay failures, in order.
    pub errors: Vec<HitbtcError>,
}

/// Log in with `credentials` and wait for the server to accept it.
pub async fn login<L: SessionLink>(link: &L, credentials: &Credentials) -> Result<()> {
    let params = credentials.login_params()?;
    link.request(LOGIN_METHOD, params).await?;
    tracing::info!(
        algo = ?credentials.algo(),
        public_key = credentials.public_key(),
        "Logged in"
    );
    Ok(())
}

/// Run the per-connection bootstrap.
///
/// A failed login is reported but does not stop the replay: public feeds work
/// without authentication.
pub async fn bootstrap<L: SessionLink>(
    link: &L,
    credentials: Option<&Credentials>,
    subscriptions: &[Subscription],
) -> BootstrapReport {
    let mut report = BootstrapReport::default();

    if let Some(credentials) = credentials {
        match login(link, credentials).await {
            Ok(()) => report.authenticated = Some(true),
            Err(e) => {
                tracing::warn!(error = %e, "Login failed, continuing unauthenticated");
                report.authenticated = Some(false);
                report.errors.push(e);
            }
        }
    }

    for sub in subscriptions {
        match link.send(sub.subscribe_method(), sub.params.clone()) {
            Ok(id) => {
                report.replayed += 1;
                tracing::debug!(id, method = sub.subscribe_method(), symbol = ?sub.symbol(), "Replayed subscription");
            }
            Err(e) => {
                tracing::warn!(
                    method = sub.subscribe_method(),
                    error = %e,
                    "Failed to replay subscription"
                );
                report.errors.push(e);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::RpcError;

    /// Records calls; `login` answers with `login_result`.
    struct FakeLink {
        calls: Mutex<Vec<(String, Params)>>,
        login_result: std::result::Result<Value, RpcError>,
    }

    impl FakeLink {
        fn new(login_result: std::result::Result<Value, RpcError>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                login_result,
            }
        }

        fn methods(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    impl SessionLink for FakeLink {
        fn send(&self, method: &str, params: Params) -> Result<u64> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((method.to_owned(), params));
            Ok(calls.len() as u64)
        }

        fn request(
            &self,
            method: &str,
            params: Params,
        ) -> impl Future<Output = Result<Value>> + Send {
            self.calls.lock().unwrap().push((method.to_owned(), params));
            let result = self.login_result.clone().map_err(HitbtcError::Server);
            async move { result }
        }
    }

    #[test]
    fn hmac_signature_matches_known_vector() {
        let sig = sign("key", "The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(
            sig,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn signature_login_params() {
        let creds = Credentials::signature("pub", "key")
            .with_nonce("The quick brown fox jumps over the lazy dog");
        let params = creds.login_params().unwrap();
        assert_eq!(params["algo"], json!("HS256"));
        assert_eq!(params["pKey"], json!("pub"));
        assert_eq!(
            params["nonce"],
            json!("The quick brown fox jumps over the lazy dog")
        );
        assert_eq!(
            params["signature"],
            json!("f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8")
        );
        assert!(!params.contains_key("sKey"));
    }

    #[test]
    fn default_nonce_is_current_millis() {
        let before = chrono::Utc::now().timestamp_millis();
        let params = Credentials::signature("pub", "secret").login_params().unwrap();
        let after = chrono::Utc::now().timestamp_millis();
        let nonce: i64 = params["nonce"].as_str().unwrap().parse().unwrap();
        assert!((before..=after).contains(&nonce));
        assert_eq!(
            params["signature"],
            json!(sign("secret", &nonce.to_string()).unwrap())
        );
    }

    #[test]
    fn basic_login_params() {
        let params = Credentials::basic("pub", "secret").login_params().unwrap();
        assert_eq!(params["algo"], json!("BASIC"));
        assert_eq!(params["pKey"], json!("pub"));
        assert_eq!(params["sKey"], json!("secret"));
        assert!(!params.contains_key("signature"));
    }

    #[test]
    fn empty_keys_are_rejected() {
        assert!(matches!(
            Credentials::signature("", "secret").login_params(),
            Err(HitbtcError::CredentialsMissing(_))
        ));
        assert!(matches!(
            Credentials::basic("pub", "").login_params(),
            Err(HitbtcError::CredentialsMissing(_))
        ));
    }

    #[test]
    fn debug_redacts_secret() {
        let shown = format!("{:?}", Credentials::basic("pub", "hunter2"));
        assert!(shown.contains("pub"));
        assert!(!shown.contains("hunter2"));
    }

    #[tokio::test]
    async fn bootstrap_logs_in_before_replaying() {
        let link = FakeLink::new(Ok(json!(true)));
        let creds = Credentials::signature("pub", "secret");
        let subs = [Subscription::ticker("ETHBTC"), Subscription::reports()];

        let report = bootstrap(&link, Some(&creds), &subs).await;
        assert_eq!(report.authenticated, Some(true));
        assert_eq!(report.replayed, 2);
        assert!(report.errors.is_empty());
        assert_eq!(
            link.methods(),
            vec!["login", "subscribeTicker", "subscribeReports"]
        );
    }

    #[tokio::test]
    async fn bootstrap_without_credentials_replays_directly() {
        let link = FakeLink::new(Ok(json!(true)));
        let report = bootstrap(&link, None, &[Subscription::orderbook("ETHBTC")]).await;
        assert_eq!(report.authenticated, None);
        assert_eq!(link.methods(), vec!["subscribeOrderbook"]);
    }

    #[tokio::test]
    async fn failed_login_still_replays() {
        let link = FakeLink::new(Err(RpcError {
            code: 1002,
            message: "Authorization failed".into(),
            description: String::new(),
        }));
        let creds = Credentials::basic("pub", "secret");

        let report = bootstrap(&link, Some(&creds), &[Subscription::ticker("ETHBTC")]).await;
        assert_eq!(report.authenticated, Some(false));
        assert_eq!(report.replayed, 1);
        assert!(matches!(report.errors[..], [HitbtcError::Server(ref e)] if e.code == 1002));
    }
}
