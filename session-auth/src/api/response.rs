//! Status checking and schema-validated decoding of backend responses.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{http_error, Error, ErrorKind, HttpErrorKind};

/// Payloads may arrive bare or wrapped as `{"data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// Turn a non-success response into a typed error carrying the response body.
pub async fn ensure_success(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        format!("{} {}", status, response_reason(status))
    } else {
        format!("{}: {}", status, body)
    };

    let kind = if status == StatusCode::UNAUTHORIZED {
        HttpErrorKind::Unauthorized
    } else {
        HttpErrorKind::Rejected(status.as_u16())
    };
    Err(http_error(kind, &message))
}

/// Check the status, then decode the body into `T`.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    parse_json(&bytes)
}

/// Decode a JSON payload, accepting the `{"data": ...}` wrapper.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    serde_json::from_slice::<Envelope<T>>(bytes)
        .map(Envelope::into_inner)
        .map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Http(HttpErrorKind::InvalidResponse),
        })
}

fn response_reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oidc::OidcProvider;

    #[test]
    fn test_parse_bare_array() {
        let providers: Vec<OidcProvider> = parse_json(
            br#"[{"providerId": "google", "displayName": "Google", "enabled": true}]"#,
        )
        .unwrap();
        assert_eq!(providers.len(), 1);
    }

    #[test]
    fn test_parse_wrapped_array() {
        let providers: Vec<OidcProvider> = parse_json(
            br#"{"data": [{"providerId": "google", "displayName": "Google", "enabled": true}]}"#,
        )
        .unwrap();
        assert_eq!(providers[0].provider_id, "google");
    }

    #[test]
    fn test_parse_malformed_payload() {
        let err = parse_json::<Vec<OidcProvider>>(br#"{"providers": "nope"}"#).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Http(HttpErrorKind::InvalidResponse));
    }
}
