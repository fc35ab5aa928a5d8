//! Access-token lookup.
//!
//! The web client keeps its session in a key-value store as JSON blobs.
//! The token sits either at the top level of a blob or inside one of the
//! entries of its `Servers` list.

use serde_json::Value;

use crate::error::FetchError;

/// Anything that can produce an access token for the metadata endpoint.
pub trait CredentialSource: Send + Sync {
    fn access_token(&self) -> Result<String, FetchError>;
}

/// A token known up front.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialSource for StaticToken {
    fn access_token(&self) -> Result<String, FetchError> {
        if self.0.is_empty() {
            return Err(FetchError::Auth("empty access token".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// Snapshot of the client's key-value store.
#[derive(Debug, Clone, Default)]
pub struct StoredCredentials {
    entries: Vec<(String, String)>,
}

impl StoredCredentials {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.push((key.to_string(), value.to_string()));
    }
}

impl CredentialSource for StoredCredentials {
    fn access_token(&self) -> Result<String, FetchError> {
        self.entries
            .iter()
            .find_map(|(_, raw)| {
                // Non-JSON values are other app state
                let blob: Value = serde_json::from_str(raw).ok()?;
                token_in_blob(&blob)
            })
            .ok_or_else(|| FetchError::Auth("No AccessToken found in local storage".to_string()))
    }
}

fn token_in_blob(blob: &Value) -> Option<String> {
    if let Some(token) = non_empty_token(blob) {
        return Some(token);
    }
    blob.get("Servers")
        .and_then(Value::as_array)?
        .iter()
        .find_map(non_empty_token)
}

fn non_empty_token(value: &Value) -> Option<String> {
    value
        .get("AccessToken")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_token() {
        let store = StoredCredentials::new(vec![
            ("theme".into(), "dark".into()),
            ("session".into(), r#"{"AccessToken": "tok-1"}"#.into()),
        ]);
        assert_eq!(store.access_token().unwrap(), "tok-1");
    }

    #[test]
    fn test_token_under_servers() {
        let mut store = StoredCredentials::default();
        store.insert(
            "jellyfin_credentials",
            r#"{"Servers": [{"Name": "home"}, {"AccessToken": "tok-2"}]}"#,
        );
        assert_eq!(store.access_token().unwrap(), "tok-2");
    }

    #[test]
    fn test_empty_token_is_skipped() {
        let store = StoredCredentials::new(vec![
            ("a".into(), r#"{"AccessToken": ""}"#.into()),
            ("b".into(), r#"{"AccessToken": "tok-3"}"#.into()),
        ]);
        assert_eq!(store.access_token().unwrap(), "tok-3");
    }

    #[test]
    fn test_missing_token_is_auth_error() {
        let store = StoredCredentials::new(vec![("a".into(), "not json".into())]);
        assert!(matches!(store.access_token(), Err(FetchError::Auth(_))));
        assert!(matches!(
            StaticToken(String::new()).access_token(),
            Err(FetchError::Auth(_))
        ));
    }
}
