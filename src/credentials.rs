//! API credentials and short-lived token signing.
//!
//! App Store Connect authenticates every request with an ES256-signed JWT
//! built from the team's issuer id, the API key id and the `.p8` private key.
//! Tokens are minted on demand and never cached.

use std::env;
use std::fmt;
use std::fs;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Audience claim required by App Store Connect.
pub const TOKEN_AUDIENCE: &str = "appstoreconnect-v1";

/// Longest token lifetime App Store Connect accepts.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(20 * 60);

/// Signing credentials for the App Store Connect API.
///
/// The private key is parsed when the credentials are built, so a malformed
/// key is reported immediately rather than on the first request.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use asc_analytics::Credentials;
///
/// # fn example() -> asc_analytics::Result<()> {
/// let pem = std::fs::read_to_string("AuthKey_ABC123DEFG.p8")?;
/// let credentials = Credentials::new(
///     "69a6de80-fd44-47e3-e053-5b8c7c11a4d1",
///     "ABC123DEFG",
///     pem,
/// )?;
/// let token = credentials.issue_token(Duration::from_secs(600))?;
/// println!("expires at {}", token.expires_at());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Credentials {
    issuer_id: String,
    key_id: String,
    encoding_key: EncodingKey,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("issuer_id", &self.issuer_id)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Build credentials from the issuer id, key id and PEM private key.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidCredentials`] if any field is empty
    /// or the private key is not an EC key in PEM form.
    pub fn new(
        issuer_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key: impl AsRef<str>,
    ) -> Result<Self> {
        let issuer_id = issuer_id.into();
        let key_id = key_id.into();
        let private_key = private_key.as_ref();

        if issuer_id.trim().is_empty() || key_id.trim().is_empty() || private_key.trim().is_empty()
        {
            return Err(AnalyticsError::InvalidCredentials(
                "issuer_id, key_id, and private_key are all required".to_string(),
            ));
        }

        let encoding_key = EncodingKey::from_ec_pem(private_key.as_bytes()).map_err(|e| {
            AnalyticsError::InvalidCredentials(format!("private key is not a valid EC PEM: {e}"))
        })?;

        Ok(Self {
            issuer_id,
            key_id,
            encoding_key,
        })
    }

    /// Build credentials from environment variables.
    ///
    /// Reads `ASC_ISSUER_ID`, `ASC_KEY_ID` and either `ASC_PRIVATE_KEY`
    /// (the PEM text) or `ASC_PRIVATE_KEY_PATH` (a path to the `.p8` file).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing or the key file can't be read.
    pub fn from_env() -> Result<Self> {
        let issuer_id = required_var("ASC_ISSUER_ID")?;
        let key_id = required_var("ASC_KEY_ID")?;

        let private_key = match env::var("ASC_PRIVATE_KEY") {
            Ok(pem) => pem,
            Err(_) => {
                let path = required_var("ASC_PRIVATE_KEY_PATH").map_err(|_| {
                    AnalyticsError::ConfigMissing(
                        "ASC_PRIVATE_KEY or ASC_PRIVATE_KEY_PATH must be set".to_string(),
                    )
                })?;
                fs::read_to_string(path)?
            }
        };

        Self::new(issuer_id, key_id, private_key)
    }

    /// The issuer id (`iss` claim).
    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    /// The API key id (`kid` header).
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign a token valid for `lifetime`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidLifetime`] unless
    /// `0 < lifetime <= MAX_TOKEN_LIFETIME` (whole seconds), or
    /// [`AnalyticsError::Signing`] if the key can't sign.
    pub fn issue_token(&self, lifetime: Duration) -> Result<Token> {
        issue_token(self, lifetime)
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| AnalyticsError::ConfigMissing(format!("{name} environment variable not set")))
}

/// Claims carried in every App Store Connect token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer id.
    pub iss: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Always [`TOKEN_AUDIENCE`].
    pub aud: String,
}

/// A signed bearer token.
#[derive(Clone)]
pub struct Token {
    compact: String,
    claims: TokenClaims,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("issued_at", &self.claims.iat)
            .field("expires_at", &self.claims.exp)
            .finish_non_exhaustive()
    }
}

impl Token {
    /// The compact `header.payload.signature` form.
    pub fn as_str(&self) -> &str {
        &self.compact
    }

    /// Issued-at, seconds since the epoch.
    pub fn issued_at(&self) -> i64 {
        self.claims.iat
    }

    /// Expiry, seconds since the epoch.
    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }

    /// The signed claims.
    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }
}

/// Sign a token for `credentials`, valid for `lifetime`.
///
/// # Errors
///
/// See [`Credentials::issue_token`].
pub fn issue_token(credentials: &Credentials, lifetime: Duration) -> Result<Token> {
    let lifetime_secs = lifetime.as_secs();
    if lifetime_secs == 0 || lifetime > MAX_TOKEN_LIFETIME {
        return Err(AnalyticsError::InvalidLifetime {
            lifetime_secs,
            max_secs: MAX_TOKEN_LIFETIME.as_secs(),
        });
    }

    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        iss: credentials.issuer_id.clone(),
        iat: now,
        exp: now + lifetime_secs as i64,
        aud: TOKEN_AUDIENCE.to_string(),
    };

    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(credentials.key_id.clone());
    header.typ = Some("JWT".to_string());

    let compact = jsonwebtoken::encode(&header, &claims, &credentials.encoding_key)?;

    Ok(Token { compact, claims })
}
