use crate::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Xero login credentials, serialized with the env-var key names so the
/// encoded blob doubles as a JSON form of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "XERO_EMAIL")]
    pub email: String,
    #[serde(rename = "XERO_PASSWORD")]
    pub password: String,
}

/// Encode credentials as base64(JSON), suitable for the `XERO_CREDENTIALS`
/// configuration key.
pub fn encode(credentials: &Credentials) -> String {
    let json = serde_json::json!({
        "XERO_EMAIL": credentials.email,
        "XERO_PASSWORD": credentials.password,
    });
    STANDARD.encode(json.to_string())
}

/// Decode a blob produced by [`encode`]. Exact inverse of it; also accepts
/// blobs with surrounding whitespace and JSON with extra spacing.
pub fn decode(blob: &str) -> Result<Credentials> {
    let raw = STANDARD
        .decode(blob.trim())
        .map_err(|e| Error::Credentials(format!("not valid base64: {e}")))?;

    serde_json::from_slice(&raw)
        .map_err(|e| Error::Credentials(format!("not a valid credentials object: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let credentials = Credentials {
            email: "me@example.com".to_string(),
            password: "hunter2 with spaces".to_string(),
        };

        let blob = encode(&credentials);
        let decoded = decode(&blob).unwrap();

        assert_eq!(decoded, credentials);
    }

    #[test]
    fn test_decode_blob_with_spaced_json() {
        // base64 of {"XERO_EMAIL": "me@example.com", "XERO_PASSWORD": "s3cret!"}
        // (spacing as emitted by other tooling)
        let blob =
            "eyJYRVJPX0VNQUlMIjogIm1lQGV4YW1wbGUuY29tIiwgIlhFUk9fUEFTU1dPUkQiOiAiczNjcmV0ISJ9";

        let decoded = decode(blob).unwrap();

        assert_eq!(decoded.email, "me@example.com");
        assert_eq!(decoded.password, "s3cret!");
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        let credentials = Credentials {
            email: "a@b.c".to_string(),
            password: "p".to_string(),
        };

        let blob = format!("  {}\n", encode(&credentials));

        assert_eq!(decode(&blob).unwrap(), credentials);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let result = decode("not base64 at all!!!");

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("base64"));
    }

    #[test]
    fn test_decode_rejects_non_credentials_json() {
        let blob = STANDARD.encode(r#"{"something":"else"}"#);

        let result = decode(&blob);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("credentials object")
        );
    }
}
