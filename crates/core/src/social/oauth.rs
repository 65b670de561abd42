use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

// RFC 3986 unreserved characters stay literal; everything else is escaped.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct OauthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

/// OAuth 1.0a HMAC-SHA1 signer for user-context requests.
///
/// The signature base string covers every request parameter (query and form
/// body alike), so callers must pass the full parameter list.
#[derive(Clone)]
pub struct Oauth1Signer {
    creds: OauthCredentials,
}

impl Oauth1Signer {
    pub fn new(creds: OauthCredentials) -> Self {
        Self { creds }
    }

    /// Wall-clock nanoseconds; unique per request within a run.
    pub fn generate_nonce() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX epoch")
            .as_nanos()
            .to_string()
    }

    pub fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX epoch")
            .as_secs()
    }

    /// Build the `Authorization: OAuth ...` header value for one request.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: u64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let oauth_params: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", self.creds.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.creds.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let signature = self.signature(method, url, params, &oauth_params);

        let mut header_params: Vec<(String, String)> = oauth_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        header_params.push(("oauth_signature".to_string(), signature));
        header_params.sort();

        let joined = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {joined}")
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        oauth_params: &[(&str, &str)],
    ) -> String {
        let base = signature_base_string(method, url, params, oauth_params);
        let key = format!(
            "{}&{}",
            percent_encode(&self.creds.consumer_secret),
            percent_encode(&self.creds.access_token_secret)
        );

        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
        mac.update(base.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

/// `METHOD&enc(url)&enc(sorted-params)` per RFC 5849. Keys and values are
/// encoded before sorting, then the joined string is encoded again.
fn signature_base_string(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    oauth_params: &[(&str, &str)],
) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .chain(oauth_params.iter())
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from the X developer documentation ("Creating a
    // signature"), keys long since revoked.
    fn docs_signer() -> Oauth1Signer {
        Oauth1Signer::new(OauthCredentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        })
    }

    const DOCS_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const DOCS_NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const DOCS_TIMESTAMP: u64 = 1318622958;

    fn docs_params() -> Vec<(&'static str, &'static str)> {
        vec![
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("include_entities", "true"),
        ]
    }

    #[test]
    fn matches_documented_signature() {
        let signer = docs_signer();
        let header = signer.authorization_header(
            "POST",
            DOCS_URL,
            &docs_params(),
            DOCS_NONCE,
            DOCS_TIMESTAMP,
        );

        // Documented result: tnnArxj06cWHq44gCs1OSKk/jLY=
        assert!(
            header.contains("oauth_signature=\"tnnArxj06cWHq44gCs1OSKk%2FjLY%3D\""),
            "unexpected header: {header}"
        );
        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_version=\"1.0\""));
    }

    #[test]
    fn signature_is_deterministic() {
        let signer = docs_signer();
        let h1 = signer.authorization_header(
            "POST",
            DOCS_URL,
            &docs_params(),
            DOCS_NONCE,
            DOCS_TIMESTAMP,
        );
        let h2 = signer.authorization_header(
            "POST",
            DOCS_URL,
            &docs_params(),
            DOCS_NONCE,
            DOCS_TIMESTAMP,
        );
        assert_eq!(h1, h2);
    }

    #[test]
    fn signature_changes_with_params() {
        let signer = docs_signer();
        let h1 = signer.authorization_header(
            "POST",
            DOCS_URL,
            &[("status", "one")],
            DOCS_NONCE,
            DOCS_TIMESTAMP,
        );
        let h2 = signer.authorization_header(
            "POST",
            DOCS_URL,
            &[("status", "two")],
            DOCS_NONCE,
            DOCS_TIMESTAMP,
        );
        assert_ne!(h1, h2);
    }

    #[test]
    fn base_string_sorts_and_double_encodes() {
        let base = signature_base_string(
            "post",
            DOCS_URL,
            &docs_params(),
            &[("oauth_nonce", DOCS_NONCE)],
        );

        assert!(base.starts_with("POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&"));
        // include_entities sorts before oauth_nonce and status.
        assert!(base.contains("include_entities%3Dtrue%26oauth_nonce"));
        // Spaces in the status value end up double-encoded as %2520.
        assert!(base.contains("status%3DHello%2520Ladies"));
    }

    #[test]
    fn nonces_are_unique() {
        let n1 = Oauth1Signer::generate_nonce();
        std::thread::sleep(std::time::Duration::from_micros(1));
        let n2 = Oauth1Signer::generate_nonce();
        assert_ne!(n1, n2);
    }

    #[test]
    fn encodes_rfc3986_reserved_characters() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("safe-._~"), "safe-._~");
        assert_eq!(percent_encode("日経"), "%E6%97%A5%E7%B5%8C");
    }
}
