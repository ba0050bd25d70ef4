use serde::Deserialize;
use std::num::NonZeroU64;

#[derive(Deserialize)]
pub struct Auth {
    /// Symmetric signing secret for access tokens.
    ///
    /// **Environment variables**:
    /// - `ROSTER_AUTH_SECRET` or `JWT_SECRET`
    pub secret: String,
    /// Lifetime of an issued access token.
    ///
    /// **Environment variables**:
    /// - `ROSTER_AUTH_TOKEN_EXPIRY_SECS`
    #[serde(default = "Auth::default_token_expiry_secs")]
    pub token_expiry_secs: NonZeroU64,
}

impl Auth {
    const DEFAULT_TOKEN_EXPIRY_SECS: u64 = 60 * 60 * 24;

    // Required by serde
    const fn default_token_expiry_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_TOKEN_EXPIRY_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_TOKEN_EXPIRY_SECS is accidentally set to 0"),
        }
    }
}

// The signing secret must never land in logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("secret", &"<redacted>")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .finish()
    }
}
