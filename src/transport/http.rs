use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use super::Transport;
use crate::config::RemoteConfig;
use crate::error::TransportError;
use crate::reconcile::RemoteRecord;

/// A document as the docs API returns it
#[derive(Debug, Deserialize)]
struct DocRecord {
    uuid: String,
    file_name: String,
    #[serde(default)]
    content: Option<String>,
}

impl From<DocRecord> for RemoteRecord {
    fn from(doc: DocRecord) -> Self {
        RemoteRecord {
            path: doc.file_name,
            id: doc.uuid,
            contents: doc.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewDoc<'a> {
    file_name: &'a str,
    content: &'a str,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError {
            status_code: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Blocking client for `{base_url}/api/organizations/{org}/projects/{project}/docs`
pub struct HttpTransport {
    client: Client,
    docs_url: String,
}

impl HttpTransport {
    /// Build a client from the remote section of the config
    ///
    /// Every configured header is attached to every request. Header names or
    /// values that are not valid HTTP are rejected here, before any request.
    pub fn new(config: &RemoteConfig) -> Result<Self, TransportError> {
        if config.organization.is_empty() || config.project.is_empty() {
            return Err(TransportError::new(
                "remote organization and project must be configured (see `docsync config`)",
            ));
        }

        let client = Client::builder()
            .default_headers(build_headers(config)?)
            .build()?;

        Ok(HttpTransport {
            client,
            docs_url: docs_url(config),
        })
    }

    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}", self.docs_url, id)
    }
}

fn docs_url(config: &RemoteConfig) -> String {
    format!(
        "{}/api/organizations/{}/projects/{}/docs",
        config.base_url.trim_end_matches('/'),
        config.organization,
        config.project
    )
}

fn build_headers(config: &RemoteConfig) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::new(format!("invalid header name {name}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::new(format!("invalid value for header {name}: {e}")))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Turn a non-2xx answer into an error carrying the status and body
fn check(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(TransportError::with_status(status.as_u16(), body.trim()))
}

impl Transport for HttpTransport {
    fn fetch_all(&self) -> Result<Vec<RemoteRecord>, TransportError> {
        log::debug!("GET {}", self.docs_url);
        let response = check(self.client.get(&self.docs_url).send()?)?;
        let docs: Vec<DocRecord> = response.json()?;
        Ok(docs.into_iter().map(RemoteRecord::from).collect())
    }

    fn fetch_one(&self, id: &str) -> Result<RemoteRecord, TransportError> {
        let url = self.doc_url(id);
        log::debug!("GET {url}");
        let doc: DocRecord = check(self.client.get(&url).send()?)?.json()?;
        Ok(doc.into())
    }

    fn create_or_update(&self, path: &str, contents: &str) -> Result<String, TransportError> {
        log::debug!("POST {} ({})", self.docs_url, path);
        let response = check(
            self.client
                .post(&self.docs_url)
                .json(&NewDoc {
                    file_name: path,
                    content: contents,
                })
                .send()?,
        )?;
        let doc: DocRecord = response.json()?;
        Ok(doc.uuid)
    }

    fn delete(&self, id: &str) -> Result<(), TransportError> {
        let url = self.doc_url(id);
        log::debug!("DELETE {url}");
        check(self.client.delete(&url).send()?)?;
        Ok(())
    }
}
