// REST acquisition client
//
// Each poll runs the full digest handshake from scratch: an anonymous
// POST to the auth endpoint to obtain a challenge, a signed POST to
// authenticate (nonce count 1), then a signed GET of the status report
// (nonce count 2). No session outlives the poll, so an administrator
// logged into the same appliance is never kicked out.

use std::collections::HashSet;

use reqwest::header::{ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::digest::{self, DigestAlgorithm, DigestChallenge};
use crate::error::Error;
use crate::rest::models::{RestInterface, extract_records};
use crate::transport::TransportConfig;
use crate::wanted::WantedInterfaces;

/// Authentication endpoint, relative to the API base.
pub const AUTH_PATH: &str = "auth";

/// IPv4 interface status report, relative to the API base.
pub const INTERFACE_STATUS_PATH: &str = "reporting/interfaces/ipv4/status";

/// HTTP client for the appliance's REST API.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl RestClient {
    /// Create a new REST client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (e.g. `https://192.168.168.168/api/sonicos`).
    pub fn new(
        base_url: Url,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Create a REST client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: String,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username,
            password,
        }
    }

    /// Build a full URL for an API path: `{base}/{path}`.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Run one complete handshake and return the wanted interfaces from
    /// the status report, in report order. A repeated name keeps its
    /// first record.
    pub async fn fetch_interfaces(
        &self,
        wanted: &WantedInterfaces,
    ) -> Result<Vec<RestInterface>, Error> {
        let auth_url = self.endpoint_url(AUTH_PATH)?;
        let challenge = self.request_challenge(&auth_url).await?;
        self.authenticate(&auth_url, &challenge).await?;

        let payload = self.get_interface_status(&challenge).await?;
        let mut seen = HashSet::new();
        let interfaces: Vec<RestInterface> = extract_records(&payload)
            .iter()
            .filter_map(RestInterface::from_value)
            .filter(|iface| wanted.contains(&iface.name))
            .filter(|iface| seen.insert(iface.name.clone()))
            .collect();

        debug!(count = interfaces.len(), "interface status parsed");
        Ok(interfaces)
    }

    // ── Handshake steps ──────────────────────────────────────────────

    /// Send the anonymous request and pick the MD5 challenge out of the
    /// `WWW-Authenticate` headers.
    async fn request_challenge(&self, url: &Url) -> Result<DigestChallenge, Error> {
        debug!("POST {} (challenge)", url);

        let resp = self.http.post(url.clone()).send().await?;
        trace!(status = %resp.status(), "challenge response");

        select_challenge(
            resp.headers()
                .get_all(WWW_AUTHENTICATE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        )
    }

    async fn authenticate(&self, url: &Url, challenge: &DigestChallenge) -> Result<(), Error> {
        debug!("POST {} (digest, nc=1)", url);

        let authorization = self.authorization("POST", url, challenge, 1)?;
        let resp = self
            .http
            .post(url.clone())
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }

        debug!("digest authentication accepted");
        Ok(())
    }

    async fn get_interface_status(&self, challenge: &DigestChallenge) -> Result<Value, Error> {
        let url = self.endpoint_url(INTERFACE_STATUS_PATH)?;
        debug!("GET {} (digest, nc=2)", url);

        let authorization = self.authorization("GET", &url, challenge, 2)?;
        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "status report rejected the digest credentials".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }

    fn authorization(
        &self,
        method: &str,
        url: &Url,
        challenge: &DigestChallenge,
        nonce_count: u32,
    ) -> Result<String, Error> {
        digest::build_authorization_header(
            method,
            &request_uri(url),
            &self.username,
            self.password.expose_secret(),
            challenge,
            nonce_count,
        )
    }
}

/// Choose the MD5 Digest challenge among possibly several
/// `WWW-Authenticate` values, ignoring other schemes and algorithms.
pub fn select_challenge<'a>(
    headers: impl IntoIterator<Item = &'a str>,
) -> Result<DigestChallenge, Error> {
    let mut offered = Vec::new();

    for header in headers {
        if !digest::is_digest_challenge(header) {
            trace!(header, "skipping non-digest challenge");
            continue;
        }
        let challenge = digest::parse_challenge(header);
        if challenge.algorithm() == Some(DigestAlgorithm::Md5) {
            challenge.validate()?;
            debug!(realm = challenge.realm(), "selected MD5 digest challenge");
            return Ok(challenge);
        }
        offered.push(challenge.get("algorithm").unwrap_or("?").to_owned());
    }

    let message = if offered.is_empty() {
        "no Digest challenge in WWW-Authenticate".to_owned()
    } else {
        format!("no MD5 Digest challenge offered (got: {})", offered.join(", "))
    };
    Err(Error::Challenge { message })
}

/// The request target used in the digest: path plus query.
fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
