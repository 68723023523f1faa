//! CMS read client.
//!
//! Everything that reads content goes through [`ContentSource`], so stages
//! and tests can swap the HTTP client for an in-memory source. The HTTP
//! implementation talks to the Sanity query API:
//!
//! ```text
//! GET https://<project>.api.sanity.io/v<version>/data/query/<dataset>?query=...&$slug="about"
//! → {"result": ..., "ms": 12}
//! ```
//!
//! The client is read-only and never retries; the request timeout comes from
//! `[cms] timeout_secs`.

use crate::config::CmsConfig;
use crate::query::Query;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum CmsError {
    #[error("cms.project_id is not set")]
    MissingProjectId,
    #[error("invalid CMS endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("query '{query}' failed with status {status}: {body}")]
    Status {
        query: String,
        status: u16,
        body: String,
    },
    #[error("query '{query}' returned unexpected data: {source}")]
    Decode {
        query: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can answer a [`Query`] with its JSON result.
///
/// A query that matches nothing returns `Value::Null`, not an error.
pub trait ContentSource: Sync {
    fn fetch(&self, query: &Query) -> Result<Value, CmsError>;
}

/// Run a query and deserialize its result.
pub fn fetch_as<T: DeserializeOwned>(
    source: &dyn ContentSource,
    query: &Query,
) -> Result<T, CmsError> {
    let value = source.fetch(query)?;
    serde_json::from_value(value).map_err(|source| CmsError::Decode {
        query: query.name.to_string(),
        source,
    })
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

/// Blocking HTTP client for the hosted query API.
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: reqwest::blocking::Client,
    endpoint: Url,
    perspective: String,
    token: Option<String>,
}

impl SanityClient {
    pub fn new(cms: &CmsConfig, token: Option<String>) -> Result<Self, CmsError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cms.timeout_secs))
            .user_agent(concat!("pagecraft/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint(cms)?,
            perspective: cms.perspective.clone(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL of a query, parameters included.
    pub fn request_url(&self, query: &Query) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.groq);
            for (name, value) in query.encoded_params() {
                pairs.append_pair(&name, &value);
            }
            if !self.perspective.is_empty() {
                pairs.append_pair("perspective", &self.perspective);
            }
        }
        url
    }
}

/// `https://<project>.<api|apicdn>.sanity.io/v<version>/data/query/<dataset>`
pub fn endpoint(cms: &CmsConfig) -> Result<Url, CmsError> {
    if cms.project_id.is_empty() {
        return Err(CmsError::MissingProjectId);
    }
    let host = if cms.use_cdn { "apicdn" } else { "api" };
    Ok(Url::parse(&format!(
        "https://{}.{host}.sanity.io/v{}/data/query/{}",
        cms.project_id, cms.api_version, cms.dataset
    ))?)
}

impl ContentSource for SanityClient {
    fn fetch(&self, query: &Query) -> Result<Value, CmsError> {
        let url = self.request_url(query);
        debug!(query = query.name, params = ?query.params, "querying CMS");
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(CmsError::Status {
                query: query.name.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        let parsed: QueryResponse =
            serde_json::from_str(&body).map_err(|source| CmsError::Decode {
                query: query.name.to_string(),
                source,
            })?;
        Ok(parsed.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::StubSource;
    use serde_json::json;

    fn cms() -> CmsConfig {
        CmsConfig {
            project_id: "abc123".into(),
            ..CmsConfig::default()
        }
    }

    #[test]
    fn endpoint_picks_cdn_host() {
        assert_eq!(
            endpoint(&cms()).unwrap().as_str(),
            "https://abc123.apicdn.sanity.io/v2025-03-26/data/query/production"
        );
        let live = CmsConfig {
            use_cdn: false,
            ..cms()
        };
        assert_eq!(endpoint(&live).unwrap().host_str(), Some("abc123.api.sanity.io"));
    }

    #[test]
    fn endpoint_requires_project() {
        assert!(matches!(
            endpoint(&CmsConfig::default()),
            Err(CmsError::MissingProjectId)
        ));
    }

    #[test]
    fn request_url_encodes_params_as_json() {
        let client = SanityClient::new(&cms(), Some(String::new())).unwrap();
        let query = Query::new("page", "*[slug.current == $slug][0]").param("slug", "about");
        let url = client.request_url(&query);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "*[slug.current == $slug][0]".to_string()),
                ("$slug".to_string(), "\"about\"".to_string()),
                ("perspective".to_string(), "published".to_string()),
            ]
        );
        assert!(client.token.is_none());
    }

    #[test]
    fn fetch_as_reports_shape_errors() {
        let source = StubSource::new().with("slugs", json!({"not": "a list"}));
        let query = Query::new("slugs", "*");
        let err = fetch_as::<Vec<String>>(&source, &query).unwrap_err();
        assert!(matches!(err, CmsError::Decode { ref query, .. } if query == "slugs"));
    }

    #[test]
    fn fetch_as_maps_null_to_none() {
        let source = StubSource::new();
        let found: Option<Vec<String>> = fetch_as(&source, &Query::new("slugs", "*")).unwrap();
        assert_eq!(found, None);
    }
}
