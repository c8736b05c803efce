// Bearer-token claim decoding
//
// The backend issues a three-part signed token; we decode the middle
// payload segment to read the embedded claims (role, assigned devices)
// but never verify the signature -- the server re-validates the token on
// every request. A token that fails to decode is treated as "no session"
// and the caller clears any stored copy.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Deserialize;

/// Claims embedded in the token payload.
///
/// The backend is inconsistent about claim names across versions, so
/// several fields carry aliases. Precedence is resolved by the accessor
/// methods, not scattered through consumers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub assigned_devices: Option<Vec<String>>,
    #[serde(default, rename = "assignedATMs")]
    pub assigned_atms: Option<Vec<String>>,
}

impl TokenClaims {
    /// Decode the payload segment of a bearer token.
    ///
    /// Returns `None` on any structural or decode failure -- the caller
    /// must treat that as an absent session rather than an error.
    pub fn decode(token: &str) -> Option<Self> {
        let payload = token.split('.').nth(1)?;
        let bytes = decode_segment(payload)?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Stable user identifier: `sub`, falling back to `user_id`.
    pub fn user_id(&self) -> &str {
        self.sub
            .as_deref()
            .or(self.user_id.as_deref())
            .unwrap_or("unknown")
    }

    /// Login name: `username`, falling back to `email`.
    pub fn username(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("user")
    }

    /// Display name: `name`, falling back to `email`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("User")
    }

    /// Device scope: `assigned_devices`, falling back to `assignedATMs`.
    /// Empty means "all devices visible".
    pub fn assigned_devices(&self) -> &[String] {
        self.assigned_devices
            .as_deref()
            .or(self.assigned_atms.as_deref())
            .unwrap_or(&[])
    }
}

/// Tokens in the wild use both base64url and standard alphabets, with and
/// without padding.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn make_token(payload: serde_json::Value) -> String {
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("hdr.{body}.sig")
    }

    #[test]
    fn decodes_role_and_scope() {
        let token = make_token(serde_json::json!({
            "sub": "u1",
            "username": "operator1",
            "role": "operator",
            "assigned_devices": ["ATM_001"],
        }));

        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.user_id(), "u1");
        assert_eq!(claims.username(), "operator1");
        assert_eq!(claims.role.as_deref(), Some("operator"));
        assert_eq!(claims.assigned_devices(), ["ATM_001".to_string()]);
    }

    #[test]
    fn alias_fallbacks_apply() {
        let token = make_token(serde_json::json!({
            "user_id": "u9",
            "email": "ops@example.com",
            "assignedATMs": ["ATM_003"],
        }));

        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.user_id(), "u9");
        assert_eq!(claims.username(), "ops@example.com");
        assert_eq!(claims.display_name(), "ops@example.com");
        assert_eq!(claims.assigned_devices(), ["ATM_003".to_string()]);
    }

    #[test]
    fn garbage_token_is_no_session() {
        assert!(TokenClaims::decode("not-a-token").is_none());
        assert!(TokenClaims::decode("a.%%%.c").is_none());
        assert!(TokenClaims::decode("").is_none());
    }
}
