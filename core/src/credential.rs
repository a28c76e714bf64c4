//! Credentials passed explicitly into every remote call.

use std::fmt;

/// Authorization material for one call against a remote tabular source.
///
/// There is no process-wide session: callers hold a credential and hand it
/// to each operation. `Debug` output never includes the secret.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::Credential;
///
/// let credential = Credential::from_authorization_header("Bearer ya29.abc").unwrap();
/// assert_eq!(credential, Credential::BearerToken("ya29.abc".into()));
/// assert_eq!(format!("{credential:?}"), "BearerToken(<redacted>)");
///
/// assert!(Credential::from_authorization_header("Basic dXNlcg==").is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// API key sent as a query parameter. Read-only for most providers.
    ApiKey(String),
    /// OAuth access token sent as an `Authorization: Bearer` header.
    BearerToken(String),
}

impl Credential {
    /// Parses an HTTP `Authorization` header value of the form
    /// `Bearer <token>` (scheme is case-insensitive).
    pub fn from_authorization_header(value: &str) -> Option<Self> {
        let (scheme, token) = value.trim().split_once(' ')?;
        let token = token.trim();
        if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
            Some(Self::BearerToken(token.to_string()))
        } else {
            None
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
        }
    }
}
