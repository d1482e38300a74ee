use crate::config::{Credentials, MobvoiConfig, Region};
use crate::endpoints::EndpointCatalog;
use crate::error::{MobvoiError, Result};
use crate::operation::OperationKey;
use crate::signer::{self, Signature};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub use reqwest::Method;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Outgoing payload, before the signature is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Map<String, Value>),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    /// An empty JSON object; the signature alone goes on the wire.
    pub fn empty() -> Self {
        Self::Json(Map::new())
    }

    /// Serialize `value` into a JSON object body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self::Json(map)),
            Value::Null => Ok(Self::empty()),
            other => Err(MobvoiError::Config(format!(
                "request body must be a JSON object, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        path: PathBuf,
        content_type: String,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
            content_type: content_type.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// How the response body should be handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    #[default]
    Json,
    Binary,
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Content type for JSON bodies; multipart bodies always carry their own.
    pub content_type: Option<String>,
    pub response: ResponseMode,
    /// Per-request timeout overriding the client default.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Raw bytes back, with the longer timeout media downloads need.
    pub fn binary() -> Self {
        Self {
            response: ResponseMode::Binary,
            timeout: Some(Duration::from_secs(120)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VendorResponse {
    Json(Value),
    Binary {
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl VendorResponse {
    pub fn into_json(self) -> Result<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Binary { bytes, .. } if bytes.is_empty() => Ok(Value::Null),
            Self::Binary { bytes, .. } => Ok(serde_json::from_slice(&bytes)?),
        }
    }
}

/// Merge the signature into `body`.
///
/// JSON bodies get the three fields inserted last, so they replace any caller
/// field of the same name. Multipart bodies get three text parts appended after
/// the existing ones.
pub fn attach_signature(body: RequestBody, signature: &Signature) -> RequestBody {
    match body {
        RequestBody::Json(mut map) => {
            for (name, value) in signature.fields() {
                map.insert(name.to_string(), Value::String(value.to_string()));
            }
            RequestBody::Json(map)
        }
        RequestBody::Multipart(mut parts) => {
            parts.extend(
                signature
                    .fields()
                    .iter()
                    .map(|(name, value)| FormPart::text(*name, *value)),
            );
            RequestBody::Multipart(parts)
        }
    }
}

pub struct MobvoiApi {
    client: Client,
    credentials: Credentials,
    catalog: EndpointCatalog,
}

impl MobvoiApi {
    /// Create a new Mobvoi API client with configuration
    pub fn new(config: MobvoiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let catalog = EndpointCatalog::for_config(&config);

        debug!(
            "Mobvoi client for {} in region {}",
            config.credentials.api_key_masked(),
            config.credentials.region
        );

        Ok(Self {
            client,
            credentials: config.credentials,
            catalog,
        })
    }

    /// Create API client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = MobvoiConfig::from_env()?;
        Self::new(config)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn region(&self) -> Region {
        self.credentials.region
    }

    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    /// Absolute URL of `operation` for this client's region.
    pub fn endpoint(&self, operation: OperationKey) -> Result<&str> {
        self.catalog.resolve(operation)
    }

    /// Resolve `operation`, sign, and issue a single request.
    pub async fn invoke(
        &self,
        operation: OperationKey,
        method: Method,
        body: RequestBody,
        query: &[(&str, &str)],
        options: RequestOptions,
    ) -> Result<VendorResponse> {
        let url = self.endpoint(operation)?.to_string();
        self.send(operation, &url, method, body, query, options).await
    }

    /// Sign and issue a single request against an already resolved `url`.
    pub async fn send(
        &self,
        operation: OperationKey,
        url: &str,
        method: Method,
        body: RequestBody,
        query: &[(&str, &str)],
        options: RequestOptions,
    ) -> Result<VendorResponse> {
        info!("Calling {} ({} {})", operation, method, url);

        let signature = signer::sign(&self.credentials.api_key, &self.credentials.api_secret);
        let body = attach_signature(body, &signature);

        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        if options.response == ResponseMode::Json {
            request = request.header(ACCEPT, JSON_CONTENT_TYPE);
        }

        request = match body {
            RequestBody::Json(map) => request
                .header(
                    CONTENT_TYPE,
                    options.content_type.as_deref().unwrap_or(JSON_CONTENT_TYPE),
                )
                .body(serde_json::to_vec(&map)?),
            RequestBody::Multipart(parts) => request.multipart(build_form(parts).await?),
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MobvoiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        match options.response {
            ResponseMode::Json => {
                let bytes = response.bytes().await?;
                debug!("{} returned {} bytes of JSON", operation, bytes.len());
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(VendorResponse::Json(Value::Null));
                }
                Ok(VendorResponse::Json(serde_json::from_slice(&bytes)?))
            }
            ResponseMode::Binary => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let bytes = response.bytes().await?;
                debug!(
                    "{} returned {} bytes ({})",
                    operation,
                    bytes.len(),
                    content_type.as_deref().unwrap_or("no content type")
                );
                Ok(VendorResponse::Binary {
                    content_type,
                    bytes: bytes.to_vec(),
                })
            }
        }
    }
}

async fn build_form(parts: Vec<FormPart>) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                path,
                content_type,
            } => {
                let data = tokio::fs::read(&path).await?;
                debug!("Uploading {:?} ({} bytes)", path, data.len());
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| name.clone());
                let part = Part::bytes(data)
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}
