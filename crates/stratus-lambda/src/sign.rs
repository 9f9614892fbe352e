//! AWS Signature Version 4 request signing.
//!
//! Only the subset the function API needs: no query-string parameters and a
//! fixed set of signed headers (`host`, `x-amz-date`, plus
//! `x-amz-security-token` for temporary credentials).

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Inputs for signing one request.
#[derive(Debug)]
pub struct SigningParams<'a> {
    pub credentials: &'a Credentials,
    pub region: &'a str,
    pub service: &'a str,
    /// Timestamp in `YYYYMMDDTHHMMSSZ` form.
    pub amz_date: &'a str,
}

/// Headers to attach to the outgoing request.
#[derive(Debug)]
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub security_token: Option<String>,
}

/// Sign a request and produce its authentication headers.
///
/// `path` must be the already-encoded request path; the canonical query
/// string is always empty because the function API operations used here
/// take no query parameters.
#[must_use]
pub fn sign_request(
    method: &str,
    host: &str,
    path: &str,
    payload: &[u8],
    params: &SigningParams<'_>,
) -> SignedHeaders {
    let date = &params.amz_date[..8];
    let scope = format!("{date}/{}/{}/aws4_request", params.region, params.service);

    let token = params.credentials.session_token.as_deref();
    let (canonical_headers, signed_headers) = match token {
        Some(token) => (
            format!(
                "host:{host}\nx-amz-date:{}\nx-amz-security-token:{token}\n",
                params.amz_date
            ),
            "host;x-amz-date;x-amz-security-token",
        ),
        None => (
            format!("host:{host}\nx-amz-date:{}\n", params.amz_date),
            "host;x-amz-date",
        ),
    };

    let payload_hash = hex_sha256(payload);
    let canonical_request = format!(
        "{method}\n{path}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}"
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{}\n{scope}\n{}",
        params.amz_date,
        hex_sha256(canonical_request.as_bytes())
    );

    let key = derive_signing_key(
        &params.credentials.secret_key,
        date,
        params.region,
        params.service,
    );
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        params.credentials.access_key
    );

    SignedHeaders {
        authorization,
        amz_date: params.amz_date.to_owned(),
        security_token: token.map(str::to_owned),
    }
}

/// Derive the per-day signing key from the secret key.
fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length, so this cannot fail.
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params(credentials: &Credentials) -> SigningParams<'_> {
        SigningParams {
            credentials,
            region: "us-east-1",
            service: "lambda",
            amz_date: "20250301T120000Z",
        }
    }

    fn static_credentials(token: Option<&str>) -> Credentials {
        Credentials {
            access_key: "AKIDEXAMPLE".to_owned(),
            secret_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_owned(),
            session_token: token.map(str::to_owned),
        }
    }

    #[test]
    fn empty_payload_hash_is_the_sha256_of_nothing() {
        assert_eq!(
            hex_sha256(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn authorization_header_shape() {
        let credentials = static_credentials(None);
        let signed = sign_request(
            "GET",
            "lambda.us-east-1.amazonaws.com",
            "/2015-03-31/functions/billing/configuration",
            b"",
            &test_params(&credentials),
        );

        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20250301/us-east-1/lambda/aws4_request, "
        ));
        assert!(signed
            .authorization
            .contains("SignedHeaders=host;x-amz-date, "));

        let signature = signed
            .authorization
            .rsplit("Signature=")
            .next()
            .unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(signed.security_token.is_none());
    }

    #[test]
    fn session_token_joins_the_signed_headers() {
        let credentials = static_credentials(Some("FQoGZXIvYXdzEXAMPLE"));
        let signed = sign_request(
            "PUT",
            "lambda.us-east-1.amazonaws.com",
            "/2015-03-31/functions/billing/code",
            b"{}",
            &test_params(&credentials),
        );

        assert!(signed
            .authorization
            .contains("SignedHeaders=host;x-amz-date;x-amz-security-token, "));
        assert_eq!(signed.security_token.as_deref(), Some("FQoGZXIvYXdzEXAMPLE"));
    }

    #[test]
    fn signing_is_deterministic() {
        let credentials = static_credentials(None);
        let params = test_params(&credentials);
        let first = sign_request("GET", "h", "/", b"", &params);
        let second = sign_request("GET", "h", "/", b"", &params);
        assert_eq!(first.authorization, second.authorization);
    }

    #[test]
    fn payload_changes_the_signature() {
        let credentials = static_credentials(None);
        let params = test_params(&credentials);
        let empty = sign_request("PUT", "h", "/", b"", &params);
        let body = sign_request("PUT", "h", "/", b"{\"MemorySize\":256}", &params);
        assert_ne!(empty.authorization, body.authorization);
    }
}
