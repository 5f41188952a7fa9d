//! Orígenes de listados.
//!
//! `HttpListingsSource` hace un GET por run contra la API de listados con
//! query y headers configurables; `FileListingsSource` lee un archivo local
//! (útil para pruebas y ejecuciones sin red).

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use listing_core::adapter::{ListingsSource, SourceError};
use log::{debug, warn};

/// Cuerpo de respuesta incluido en errores de status (recortado).
const ERROR_BODY_LIMIT: usize = 512;

pub struct HttpListingsSource {
    client: reqwest::blocking::Client,
    url: String,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
}

impl HttpListingsSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout)
                                                         .build()
                                                         .map_err(|e| SourceError::Request(e.to_string()))?;
        Ok(Self { client,
                  url: url.into(),
                  query: Vec::new(),
                  headers: BTreeMap::new() })
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ListingsSource for HttpListingsSource {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let mut request = self.client.get(&self.url).query(&self.query);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().map_err(|e| SourceError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = clip_body(response.text().unwrap_or_default(), ERROR_BODY_LIMIT);
            warn!("listings source {} answered {status}", self.url);
            return Err(SourceError::Status { status: status.as_u16(),
                                             body });
        }
        let bytes = response.bytes().map_err(|e| SourceError::Request(e.to_string()))?;
        debug!("listings source {}: {} bytes", self.url, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Recorta a lo sumo `limit` bytes sin partir un carácter UTF-8.
fn clip_body(mut body: String, limit: usize) -> String {
    let cut = (0..=limit.min(body.len())).rev()
                                         .find(|i| body.is_char_boundary(*i))
                                         .unwrap_or(0);
    body.truncate(cut);
    body
}

/// Lee siempre el mismo archivo.
#[derive(Debug, Clone)]
pub struct FileListingsSource {
    path: PathBuf,
}

impl FileListingsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ListingsSource for FileListingsSource {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Ok(fs::read(&self.path)?)
    }
}
