use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::AuthzError;

/// Username and password carried by an `Authorization: Basic` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    pub fn parse(header: &str) -> Result<Self, AuthzError> {
        let (scheme, encoded) = header
            .trim()
            .split_once(' ')
            .ok_or(AuthzError::MalformedCredentials)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthzError::MalformedCredentials);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthzError::MalformedCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthzError::MalformedCredentials)?;

        // Passwords may contain ':'; usernames may not.
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthzError::MalformedCredentials)?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn encode(&self) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", self.username, self.password))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_header() {
        // admin@bookapi.com:pass:word
        let creds = BasicCredentials::parse("Basic YWRtaW5AYm9va2FwaS5jb206cGFzczp3b3Jk").unwrap();
        assert_eq!(creds.username, "admin@bookapi.com");
        assert_eq!(creds.password, "pass:word");
    }

    #[test]
    fn encode_is_accepted_by_parse() {
        let creds = BasicCredentials {
            username: "user@bookapi.com".to_string(),
            password: "password".to_string(),
        };
        assert_eq!(BasicCredentials::parse(&creds.encode()).unwrap(), creds);
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(matches!(
            BasicCredentials::parse("Bearer abc"),
            Err(AuthzError::MalformedCredentials)
        ));
        assert!(matches!(
            BasicCredentials::parse("Basic !!!"),
            Err(AuthzError::MalformedCredentials)
        ));
        assert!(matches!(
            BasicCredentials::parse("Basic"),
            Err(AuthzError::MalformedCredentials)
        ));
    }
}
