// API client module: a small blocking HTTP client for the MobSF REST API.
// Every call is one request/response exchange and returns its own Result;
// deciding what to do on failure is left to the pipeline.

use crate::config::ScanConfig;
use crate::error::ScanError;
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Content type sent with every uploaded package.
pub const PACKAGE_MIME: &str = "application/vnd.android.package-archive";

pub const UPLOAD_PATH: &str = "/upload";
pub const SCAN_PATH: &str = "/scan";
pub const REPORT_JSON_PATH: &str = "/report_json";
pub const DOWNLOAD_PDF_PATH: &str = "/download_pdf";
pub const GET_APPS_PATH: &str = "/dynamic/get_apps";
pub const START_ANALYSIS_PATH: &str = "/dynamic/start_analysis";
pub const STOP_ANALYSIS_PATH: &str = "/dynamic/stop_analysis";

/// Identifier the service assigns to an uploaded file. Only produced from a
/// successful upload, so it is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHash(String);

impl FileHash {
    /// Wraps a hash returned by the service; `None` for an empty string.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(FileHash(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields of the upload response we care about; the rest is ignored.
#[derive(Deserialize, Debug)]
struct UploadResponse {
    #[serde(default)]
    hash: Value,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    scan_type: Option<String>,
}

/// The operations the pipeline needs from the scanning service.
pub trait ScanService {
    fn upload(&self, file_path: &Path) -> Result<FileHash, ScanError>;
    /// Succeeds only on HTTP 200.
    fn trigger_scan(&self, hash: &FileHash) -> Result<(), ScanError>;
    fn fetch_report(&self, hash: &FileHash) -> Result<Value, ScanError>;
    fn download_pdf(&self, hash: &FileHash) -> Result<Vec<u8>, ScanError>;
    fn list_apps(&self) -> Result<Value, ScanError>;
    fn start_dynamic_analysis(&self, hash: &FileHash) -> Result<Value, ScanError>;
    fn stop_dynamic_analysis(&self, hash: &FileHash) -> Result<Value, ScanError>;
}

/// Blocking client bound to one MobSF instance. The API key is installed as
/// a default `Authorization` header, verbatim.
#[derive(Clone)]
pub struct MobsfClient {
    client: Client,
    base_url: String,
}

impl MobsfClient {
    /// Build a client from the run configuration. Requests never time out:
    /// `/scan` only answers once the static analysis has finished.
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        Self::with_timeout(config, None)
    }

    /// Like [`MobsfClient::new`] with a per-request timeout.
    pub fn with_timeout(config: &ScanConfig, timeout: Option<Duration>) -> Result<Self, ScanError> {
        let client = Client::builder()
            .default_headers(auth_headers(&config.api_key)?)
            .timeout(timeout)
            .build()
            .map_err(ScanError::Client)?;
        Ok(MobsfClient {
            client,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `hash=<hash>` as a url-encoded form and check the status.
    fn post_hash(&self, path: &str, hash: &FileHash) -> Result<Response, ScanError> {
        let url = self.endpoint(path);
        debug!(%url, hash = %hash, "POST");
        let res = self
            .client
            .post(&url)
            .form(&[("hash", hash.as_str())])
            .send()
            .map_err(|source| ScanError::Transport {
                endpoint: url.clone(),
                source,
            })?;
        ensure_success(url, res)
    }

    fn post_hash_json(&self, path: &str, hash: &FileHash) -> Result<Value, ScanError> {
        let url = self.endpoint(path);
        let res = self.post_hash(path, hash)?;
        decode_json(url, res)
    }
}

impl ScanService for MobsfClient {
    fn upload(&self, file_path: &Path) -> Result<FileHash, ScanError> {
        let url = self.endpoint(UPLOAD_PATH);

        let file = File::open(file_path).map_err(|e| ScanError::io(file_path, e))?;
        let len = file
            .metadata()
            .map_err(|e| ScanError::io(file_path, e))?
            .len();
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("app.apk")
            .to_string();

        let part = multipart::Part::reader_with_length(file, len)
            .file_name(file_name)
            .mime_str(PACKAGE_MIME)
            .map_err(ScanError::Client)?;
        let form = multipart::Form::new().part("file", part);

        debug!(%url, bytes = len, "uploading package");
        let res = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|source| ScanError::Transport {
                endpoint: url.clone(),
                source,
            })?;
        let res = ensure_success(url.clone(), res)?;
        let body: UploadResponse = res
            .json()
            .map_err(|source| ScanError::Decode {
                endpoint: url,
                source,
            })?;
        debug!(file_name = ?body.file_name, scan_type = ?body.scan_type, "upload accepted");

        match body.hash {
            Value::String(hash) => FileHash::new(hash).ok_or(ScanError::MissingHash),
            _ => Err(ScanError::MissingHash),
        }
    }

    fn trigger_scan(&self, hash: &FileHash) -> Result<(), ScanError> {
        let url = self.endpoint(SCAN_PATH);
        let res = self.post_hash(SCAN_PATH, hash)?;
        if res.status() != StatusCode::OK {
            return Err(status_error(url, res));
        }
        Ok(())
    }

    fn fetch_report(&self, hash: &FileHash) -> Result<Value, ScanError> {
        self.post_hash_json(REPORT_JSON_PATH, hash)
    }

    fn download_pdf(&self, hash: &FileHash) -> Result<Vec<u8>, ScanError> {
        let url = self.endpoint(DOWNLOAD_PDF_PATH);
        let res = self.post_hash(DOWNLOAD_PDF_PATH, hash)?;
        let bytes = res.bytes().map_err(|source| ScanError::Decode {
            endpoint: url,
            source,
        })?;
        Ok(bytes.to_vec())
    }

    fn list_apps(&self) -> Result<Value, ScanError> {
        let url = self.endpoint(GET_APPS_PATH);
        debug!(%url, "GET");
        let res = self
            .client
            .get(&url)
            .send()
            .map_err(|source| ScanError::Transport {
                endpoint: url.clone(),
                source,
            })?;
        let res = ensure_success(url.clone(), res)?;
        decode_json(url, res)
    }

    fn start_dynamic_analysis(&self, hash: &FileHash) -> Result<Value, ScanError> {
        self.post_hash_json(START_ANALYSIS_PATH, hash)
    }

    fn stop_dynamic_analysis(&self, hash: &FileHash) -> Result<Value, ScanError> {
        self.post_hash_json(STOP_ANALYSIS_PATH, hash)
    }
}

fn auth_headers(api_key: &str) -> Result<HeaderMap, ScanError> {
    let mut value = HeaderValue::from_str(api_key).map_err(|_| ScanError::InvalidApiKey)?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

fn ensure_success(endpoint: String, res: Response) -> Result<Response, ScanError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(status_error(endpoint, res))
    }
}

fn status_error(endpoint: String, res: Response) -> ScanError {
    let status = res.status();
    let body = res.text().unwrap_or_default();
    warn!(%endpoint, %status, "unexpected status");
    ScanError::Status {
        endpoint,
        status,
        body,
    }
}

fn decode_json(endpoint: String, res: Response) -> Result<Value, ScanError> {
    res.json()
        .map_err(|source| ScanError::Decode { endpoint, source })
}

/// Truthiness of a JSON response: `null`, `false`, `0`, `""`, `[]` and `{}`
/// count as "nothing returned".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
