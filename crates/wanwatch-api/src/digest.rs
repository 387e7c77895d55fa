// HTTP Digest authentication codec
//
// Parses `WWW-Authenticate: Digest ...` challenges and computes the
// matching `Authorization` header (RFC 7616, with the RFC 2069 form
// when the challenge carries no `qop`). The codec is stateless: the
// caller supplies the nonce count for every request it signs.

use std::collections::HashMap;

use md5::{Digest as _, Md5};
use sha2::Sha256;

use crate::error::Error;

/// Hash function named by a challenge's `algorithm` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// 128-bit MD5, the default when no `algorithm` directive is present.
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    /// Map a directive value to an algorithm. Session variants (`-sess`)
    /// and anything else unrecognised yield `None`.
    pub fn from_directive(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("MD5") {
            Some(Self::Md5)
        } else if raw.eq_ignore_ascii_case("SHA-256") {
            Some(Self::Sha256)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha256 => "SHA-256",
        }
    }

    /// Lowercase hex digest of `input`.
    pub fn hash_hex(self, input: &str) -> String {
        match self {
            Self::Md5 => hex::encode(Md5::digest(input.as_bytes())),
            Self::Sha256 => hex::encode(Sha256::digest(input.as_bytes())),
        }
    }
}

/// Directives of one parsed `Digest` challenge.
///
/// Directive names are stored lowercased; values are kept verbatim.
/// Unknown directives are retained so callers can inspect them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestChallenge {
    directives: HashMap<String, String>,
}

impl DigestChallenge {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.directives
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn realm(&self) -> Option<&str> {
        self.get("realm")
    }

    pub fn nonce(&self) -> Option<&str> {
        self.get("nonce")
    }

    pub fn opaque(&self) -> Option<&str> {
        self.get("opaque")
    }

    pub fn qop(&self) -> Option<&str> {
        self.get("qop")
    }

    /// The algorithm this challenge asks for. A missing directive means MD5;
    /// an unsupported one yields `None`.
    pub fn algorithm(&self) -> Option<DigestAlgorithm> {
        match self.get("algorithm") {
            None => Some(DigestAlgorithm::Md5),
            Some(raw) => DigestAlgorithm::from_directive(raw),
        }
    }

    /// Check the directives every response computation needs.
    pub fn validate(&self) -> Result<(), Error> {
        for required in ["realm", "nonce"] {
            if self.get(required).is_none() {
                return Err(Error::Challenge {
                    message: format!("challenge is missing the '{required}' directive"),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// Returns `true` when a `WWW-Authenticate` value names the `Digest` scheme.
pub fn is_digest_challenge(header: &str) -> bool {
    header
        .split_whitespace()
        .next()
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("digest"))
}

/// Parse the directives of a challenge header.
///
/// Accepts both `key=token` and `key="quoted, value"` forms. Malformed
/// input yields whatever directives could be read before the damage;
/// required keys are checked later by [`DigestChallenge::validate`].
pub fn parse_challenge(header: &str) -> DigestChallenge {
    let trimmed = header.trim_start();
    let rest = match trimmed.split_once(char::is_whitespace) {
        Some((scheme, rest)) if !scheme.contains('=') => rest,
        _ => trimmed,
    };

    let mut directives = HashMap::new();
    let mut chars = rest.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ',').is_some() {}

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && *c != ',' && !c.is_whitespace()) {
            key.push(c);
        }
        if key.is_empty() {
            break;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next_if_eq(&'=').is_none() {
            // Bare token without a value.
            continue;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let value = if chars.next_if_eq(&'"').is_some() {
            let mut value = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    _ => value.push(c),
                }
            }
            value
        } else {
            let mut value = String::new();
            while let Some(c) = chars.next_if(|c| *c != ',') {
                value.push(c);
            }
            value.trim_end().to_owned()
        };

        directives.insert(key.to_ascii_lowercase(), value);
    }

    DigestChallenge { directives }
}

/// The request-side inputs of a digest computation.
#[derive(Debug, Clone, Copy)]
pub struct DigestRequest<'a> {
    pub method: &'a str,
    /// Request target as sent on the wire (path plus query).
    pub uri: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

impl DigestRequest<'_> {
    /// Compute the `response` directive for a given nonce count and
    /// client nonce. Deterministic; used directly by known-vector tests.
    pub fn response(
        &self,
        challenge: &DigestChallenge,
        nonce_count: u32,
        cnonce: &str,
    ) -> Result<String, Error> {
        let parts = ResponseParts::new(challenge)?;
        Ok(self.compute(&parts, nonce_count, cnonce))
    }

    /// Build the full `Authorization` header value with a fresh random
    /// client nonce.
    pub fn authorization(
        &self,
        challenge: &DigestChallenge,
        nonce_count: u32,
    ) -> Result<String, Error> {
        self.authorization_with_cnonce(challenge, nonce_count, &generate_cnonce())
    }

    /// Build the `Authorization` header value with a caller-chosen client nonce.
    pub fn authorization_with_cnonce(
        &self,
        challenge: &DigestChallenge,
        nonce_count: u32,
        cnonce: &str,
    ) -> Result<String, Error> {
        let parts = ResponseParts::new(challenge)?;
        let response = self.compute(&parts, nonce_count, cnonce);

        let mut fields = vec![
            format!("username=\"{}\"", quote(self.username)),
            format!("realm=\"{}\"", quote(parts.realm)),
            format!("nonce=\"{}\"", quote(parts.nonce)),
            format!("uri=\"{}\"", quote(self.uri)),
            format!("algorithm={}", parts.algorithm.as_str()),
        ];
        if let Some(qop) = parts.qop {
            fields.push(format!("qop={qop}"));
            fields.push(format!("nc={}", format_nonce_count(nonce_count)));
            fields.push(format!("cnonce=\"{}\"", quote(cnonce)));
        }
        fields.push(format!("response=\"{response}\""));
        if let Some(opaque) = challenge.opaque() {
            fields.push(format!("opaque=\"{}\"", quote(opaque)));
        }

        Ok(format!("Digest {}", fields.join(", ")))
    }

    fn compute(&self, parts: &ResponseParts<'_>, nonce_count: u32, cnonce: &str) -> String {
        let hash = |input: String| parts.algorithm.hash_hex(&input);

        let ha1 = hash(format!("{}:{}:{}", self.username, parts.realm, self.password));
        let ha2 = hash(format!("{}:{}", self.method, self.uri));

        match parts.qop {
            Some(qop) => hash(format!(
                "{ha1}:{}:{}:{cnonce}:{qop}:{ha2}",
                parts.nonce,
                format_nonce_count(nonce_count),
            )),
            None => hash(format!("{ha1}:{}:{ha2}", parts.nonce)),
        }
    }
}

/// Convenience wrapper over [`DigestRequest::authorization`].
pub fn build_authorization_header(
    method: &str,
    uri: &str,
    username: &str,
    password: &str,
    challenge: &DigestChallenge,
    nonce_count: u32,
) -> Result<String, Error> {
    DigestRequest {
        method,
        uri,
        username,
        password,
    }
    .authorization(challenge, nonce_count)
}

/// Eight lowercase hex digits, zero padded.
pub fn format_nonce_count(nonce_count: u32) -> String {
    format!("{nonce_count:08x}")
}

/// 16 random bytes as lowercase hex.
pub fn generate_cnonce() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

/// Validated challenge fields needed to compute a response.
struct ResponseParts<'c> {
    realm: &'c str,
    nonce: &'c str,
    algorithm: DigestAlgorithm,
    qop: Option<&'static str>,
}

impl<'c> ResponseParts<'c> {
    fn new(challenge: &'c DigestChallenge) -> Result<Self, Error> {
        challenge.validate()?;
        let (Some(realm), Some(nonce)) = (challenge.realm(), challenge.nonce()) else {
            return Err(Error::Challenge {
                message: "challenge is missing realm or nonce".into(),
            });
        };

        let algorithm = challenge.algorithm().ok_or_else(|| Error::Challenge {
            message: format!(
                "unsupported digest algorithm '{}'",
                challenge.get("algorithm").unwrap_or_default()
            ),
        })?;

        let qop = match challenge.qop() {
            None => None,
            Some(offered) if offered.split(',').any(|q| q.trim() == "auth") => Some("auth"),
            Some(offered) => {
                return Err(Error::Challenge {
                    message: format!("unsupported qop '{offered}'"),
                });
            }
        };

        Ok(Self {
            realm,
            nonce,
            algorithm,
            qop,
        })
    }
}

fn quote(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RFC2617_CHALLENGE: &str = r#"Digest realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;

    fn mufasa() -> DigestRequest<'static> {
        DigestRequest {
            method: "GET",
            uri: "/dir/index.html",
            username: "Mufasa",
            password: "Circle Of Life",
        }
    }

    #[test]
    fn parse_reads_quoted_and_token_values() {
        let challenge = parse_challenge(RFC2617_CHALLENGE);
        assert_eq!(challenge.realm(), Some("testrealm@host.com"));
        assert_eq!(challenge.nonce(), Some("dcd98b7102dd2f0e8b11d0f600bfb0c093"));
        assert_eq!(challenge.qop(), Some("auth,auth-int"));
        assert_eq!(challenge.opaque(), Some("5ccc069c403ebaf9f0171e9517f40e41"));
        assert_eq!(challenge.algorithm(), Some(DigestAlgorithm::Md5));
    }

    #[test]
    fn parse_keeps_commas_inside_quotes() {
        let challenge =
            parse_challenge(r#"Digest realm="a, b, c", nonce=abc123, algorithm=MD5, stale=FALSE"#);
        assert_eq!(challenge.realm(), Some("a, b, c"));
        assert_eq!(challenge.nonce(), Some("abc123"));
        assert_eq!(challenge.get("stale"), Some("FALSE"));
        assert_eq!(challenge.len(), 4);
    }

    #[test]
    fn parse_retains_unknown_directives_and_escapes() {
        let challenge = parse_challenge(r#"Digest Realm="x", nonce="n", charset=UTF-8, userhash=true, domain="say \"hi\"""#);
        assert_eq!(challenge.realm(), Some("x"));
        assert_eq!(challenge.get("charset"), Some("UTF-8"));
        assert_eq!(challenge.get("USERHASH"), Some("true"));
        assert_eq!(challenge.get("domain"), Some(r#"say "hi""#));
    }

    #[test]
    fn parse_malformed_input_yields_partial_map() {
        let challenge = parse_challenge(r#"Digest realm="open, nonce"#);
        assert_eq!(challenge.realm(), Some("open, nonce"));
        assert!(challenge.nonce().is_none());
        assert!(challenge.validate().is_err());

        assert!(parse_challenge("").is_empty());
        assert!(parse_challenge("Digest =oops").is_empty());
    }

    #[test]
    fn digest_scheme_detection() {
        assert!(is_digest_challenge(RFC2617_CHALLENGE));
        assert!(is_digest_challenge("digest realm=x"));
        assert!(!is_digest_challenge("Basic realm=\"x\""));
        assert!(!is_digest_challenge(""));
    }

    #[test]
    fn md5_response_matches_rfc2617_vector() {
        let challenge = parse_challenge(RFC2617_CHALLENGE);
        let response = mufasa().response(&challenge, 1, "0a4f113b").unwrap();
        assert_eq!(response, "6629fae49393a05397450978507c4ef1");
    }

    #[test]
    fn sha256_response_matches_rfc7616_vector() {
        let challenge = parse_challenge(
            r#"Digest realm="http-auth@example.org", qop="auth, auth-int", algorithm=SHA-256, nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v", opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS""#,
        );
        let request = DigestRequest {
            method: "GET",
            uri: "/dir/index.html",
            username: "Mufasa",
            password: "Circle of Life",
        };
        let response = request
            .response(&challenge, 1, "f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ")
            .unwrap();
        assert_eq!(
            response,
            "753927fa0e85d155564e2e272a28d1802ca10daf4496794697cf8db5856cb6c1"
        );
    }

    #[test]
    fn response_depends_on_nonce_count() {
        let challenge = parse_challenge(RFC2617_CHALLENGE);
        let first = mufasa().response(&challenge, 1, "0a4f113b").unwrap();
        let second = mufasa().response(&challenge, 2, "0a4f113b").unwrap();
        assert_ne!(first, second);
        assert_eq!(first, mufasa().response(&challenge, 1, "0a4f113b").unwrap());
    }

    #[test]
    fn header_carries_every_field_in_order() {
        let challenge = parse_challenge(RFC2617_CHALLENGE);
        let header = mufasa()
            .authorization_with_cnonce(&challenge, 1, "0a4f113b")
            .unwrap();
        assert_eq!(
            header,
            "Digest username=\"Mufasa\", realm=\"testrealm@host.com\", \
             nonce=\"dcd98b7102dd2f0e8b11d0f600bfb0c093\", uri=\"/dir/index.html\", \
             algorithm=MD5, qop=auth, nc=00000001, cnonce=\"0a4f113b\", \
             response=\"6629fae49393a05397450978507c4ef1\", \
             opaque=\"5ccc069c403ebaf9f0171e9517f40e41\""
        );
    }

    #[test]
    fn header_omits_opaque_when_challenge_has_none() {
        let challenge = parse_challenge(r#"Digest realm="r", nonce="n", qop="auth""#);
        let header = mufasa().authorization(&challenge, 2).unwrap();
        assert!(header.contains("nc=00000002"));
        assert!(!header.contains("opaque"));
    }

    #[test]
    fn random_cnonce_is_32_lowercase_hex_chars() {
        let cnonce = generate_cnonce();
        assert_eq!(cnonce.len(), 32);
        assert!(cnonce.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(cnonce, generate_cnonce());
    }

    #[test]
    fn challenge_without_qop_uses_rfc2069_form() {
        let challenge = parse_challenge(r#"Digest realm="r", nonce="n""#);
        let header = mufasa().authorization_with_cnonce(&challenge, 1, "c").unwrap();
        assert!(!header.contains("qop="));
        assert!(!header.contains("cnonce="));

        let ha1 = DigestAlgorithm::Md5.hash_hex("Mufasa:r:Circle Of Life");
        let ha2 = DigestAlgorithm::Md5.hash_hex("GET:/dir/index.html");
        let expected = DigestAlgorithm::Md5.hash_hex(&format!("{ha1}:n:{ha2}"));
        assert!(header.contains(&format!("response=\"{expected}\"")));
    }

    #[test]
    fn missing_nonce_is_challenge_error() {
        let challenge = parse_challenge(r#"Digest realm="r", qop="auth""#);
        let err = mufasa().authorization(&challenge, 1).unwrap_err();
        assert!(matches!(err, Error::Challenge { .. }), "got {err:?}");
    }

    #[test]
    fn unsupported_algorithm_is_rejected() {
        let challenge = parse_challenge(r#"Digest realm="r", nonce="n", algorithm=MD5-sess"#);
        assert_eq!(challenge.algorithm(), None);
        assert!(mufasa().response(&challenge, 1, "c").is_err());
    }

    #[test]
    fn convenience_header_uses_fresh_cnonce_and_first_nonce_count() {
        let challenge = parse_challenge(r#"Digest realm="SonicWall", nonce="abc123", qop="auth""#);
        let header = build_authorization_header(
            "POST",
            "/api/sonicos/auth",
            "admin",
            "password",
            &challenge,
            1,
        )
        .unwrap();

        assert!(header.starts_with("Digest username=\"admin\""));
        assert!(header.contains("uri=\"/api/sonicos/auth\""));
        assert!(header.contains("algorithm=MD5"));
        assert!(header.contains("qop=auth, nc=00000001, "));
        assert!(!header.contains("opaque"));

        let cnonce = header
            .split("cnonce=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(cnonce.len(), 32);
        assert!(cnonce.chars().all(|c| c.is_ascii_hexdigit()));

        let expected = DigestRequest {
            method: "POST",
            uri: "/api/sonicos/auth",
            username: "admin",
            password: "password",
        }
        .response(&challenge, 1, cnonce)
        .unwrap();
        assert!(header.ends_with(&format!("response=\"{expected}\"")));
    }

    #[test]
    fn nonce_count_is_zero_padded_hex() {
        assert_eq!(format_nonce_count(1), "00000001");
        assert_eq!(format_nonce_count(255), "000000ff");
    }
}
