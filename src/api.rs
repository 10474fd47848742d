// API client module: a small blocking HTTP client that talks to the
// provider gateway. It backs the profile fetcher, the purchase executor and
// the read-only menu handlers. Every failure is classified into a
// `CollaboratorError` here so callers never see raw transport errors.

use crate::config::Config;
use crate::error::CollaboratorError;
use crate::profile::{Balance, ProfileFetcher, Tiering};
use crate::purchase::{AttemptOutcome, AttemptResult, PurchaseExecutor};
use crate::session::Session;
use anyhow::Context;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const API_KEY_HEADER: &str = "x-api-key";

/// Holds a reqwest blocking client, the gateway base URL and the optional
/// API key sent with every call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Response of both purchase endpoints.
#[derive(Deserialize, Debug)]
struct PurchaseResponse {
    status: AttemptOutcome,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize, Debug)]
struct FamilyPurchaseRequest<'a> {
    family_code: &'a str,
}

#[derive(Serialize, Debug)]
pub struct IdentityRequest<'a> {
    pub msisdn: &'a str,
    pub kk: &'a str,
    pub nik: &'a str,
}

#[derive(Serialize, Debug)]
struct MsisdnRequest<'a> {
    msisdn: &'a str,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Headers for a call: the API key when configured, and the session's
    /// id token as a bearer credential when the call is on behalf of a line.
    fn headers(&self, session: Option<&Session>) -> Result<HeaderMap, CollaboratorError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let val = HeaderValue::from_str(key)
                .map_err(|_| CollaboratorError::fatal("API key contains invalid characters"))?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), val);
        }
        if let Some(s) = session {
            let val = HeaderValue::from_str(&format!("Bearer {}", s.tokens.id_token)).map_err(
                |_| CollaboratorError::fatal("session token contains invalid characters"),
            )?;
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        what: &str,
    ) -> Result<T, CollaboratorError> {
        let res = req.send().map_err(|e| {
            tracing::warn!(request = what, error = %e, "gateway request failed");
            CollaboratorError::from(e)
        })?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_default();
            tracing::warn!(request = what, %status, "gateway returned error");
            return Err(CollaboratorError::from_status(status, txt.trim()));
        }
        res.json::<T>().map_err(|e| {
            CollaboratorError::transient(format!("Parsing {} response json: {}", what, e))
        })
    }

    /// GET `path` and return the body as loose JSON.
    pub fn get_json(
        &self,
        path: &str,
        session: Option<&Session>,
        query: &[(&str, String)],
    ) -> Result<Value, CollaboratorError> {
        let req = self
            .client
            .get(self.url(path))
            .headers(self.headers(session)?)
            .query(query);
        self.send(req, path)
    }

    pub fn register_identity(&self, req: &IdentityRequest<'_>) -> Result<Value, CollaboratorError> {
        let path = "/registration/dukcapil";
        let req = self.client.post(self.url(path)).headers(self.headers(None)?).json(req);
        self.send(req, path)
    }

    pub fn validate_msisdn(
        &self,
        session: &Session,
        msisdn: &str,
    ) -> Result<Value, CollaboratorError> {
        let path = "/msisdn/validate";
        let req = self
            .client
            .post(self.url(path))
            .headers(self.headers(Some(session))?)
            .json(&MsisdnRequest { msisdn });
        self.send(req, path)
    }
}

impl ProfileFetcher for ApiClient {
    fn balance(&self, session: &Session) -> Result<Balance, CollaboratorError> {
        let req = self.client.get(self.url("/balance")).headers(self.headers(Some(session))?);
        self.send(req, "/balance")
    }

    fn tiering(&self, session: &Session) -> Result<Tiering, CollaboratorError> {
        let req = self.client.get(self.url("/tiering")).headers(self.headers(Some(session))?);
        self.send(req, "/tiering")
    }
}

impl PurchaseExecutor for ApiClient {
    fn decoy(&self, session: &Session) -> Result<AttemptResult, CollaboratorError> {
        let req = self
            .client
            .post(self.url("/purchase/decoy"))
            .headers(self.headers(Some(session))?);
        let res: PurchaseResponse = self.send(req, "/purchase/decoy")?;
        Ok(AttemptResult::new(res.status, res.message))
    }

    fn purchase(
        &self,
        session: &Session,
        family_code: &str,
    ) -> Result<AttemptResult, CollaboratorError> {
        let req = self
            .client
            .post(self.url("/purchase/family"))
            .headers(self.headers(Some(session))?)
            .json(&FamilyPurchaseRequest { family_code });
        let res: PurchaseResponse = self.send(req, "/purchase/family")?;
        Ok(AttemptResult::new(res.status, res.message))
    }
}
