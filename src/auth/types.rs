use serde::{Deserialize, Serialize};

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims carried by both access and refresh tokens. `token_type`
/// keeps the two from being used interchangeably; `jti` is what the
/// denylist records for revoked refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String, // user id
    pub username: String,
    pub jti: String,
    pub token_type: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

impl TokenClaims {
    pub fn is_access(&self) -> bool {
        self.token_type == TOKEN_TYPE_ACCESS
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type == TOKEN_TYPE_REFRESH
    }
}

/// The pair handed out at signin
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

/// Request payload for POST /token/refresh and POST /sign_out
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: Option<String>,
}

/// Response for POST /token/refresh
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialization_round_trip() {
        let claims = TokenClaims {
            sub: "user-id".to_string(),
            username: "jane@doe1".to_string(),
            jti: "jti-id".to_string(),
            token_type: TOKEN_TYPE_REFRESH.to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        let deserialized: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
        assert!(deserialized.is_refresh());
        assert!(!deserialized.is_access());
    }
}
