// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Remote function catalog client
//!
//! `FunctionApi` is the seam the orchestrator works against; the HTTP
//! implementation speaks the Lambda REST surface (`/2015-03-31/...`) with
//! SigV4-signed requests. List pagination is followed to exhaustion before
//! anything is returned, so callers always see the complete catalog.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use reqwest::blocking::Response;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::models::{FunctionDescriptor, InvokeOutcome, UploadOutcome};
use crate::session::Session;
use crate::sign::RequestSigner;

const API_VERSION: &str = "2015-03-31";

/// Remote control-API surface used by the sync flows.
pub trait FunctionApi {
    /// List every deployable function, following pagination to exhaustion.
    /// `quiet` suppresses progress messaging, never errors.
    fn list_functions(&self, quiet: bool) -> Result<Vec<FunctionDescriptor>>;

    /// Signed URL of the function's current packaged code.
    fn get_code_location(&self, arn: &str) -> Result<String>;

    /// Replace the function's code wholesale with `zip_bytes`.
    fn update_function_code(&self, arn: &str, zip_bytes: &[u8]) -> Result<UploadOutcome>;

    /// Synchronously invoke the function and return its response plus the
    /// base64-decoded tail of the execution log.
    fn invoke(&self, name: &str, payload: &str) -> Result<InvokeOutcome>;
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("lamsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build a configured HTTP client.
pub fn build_http_client(config: &HttpClientConfig) -> Result<reqwest::blocking::Client> {
    use std::time::Duration;

    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| SyncError::RemoteClient {
            status: 0,
            message: format!("Failed to build HTTP client: {}", e),
        })
}

/// Lambda control-API client bound to one session.
pub struct LambdaCatalogClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    signer: RequestSigner,
}

impl LambdaCatalogClient {
    /// Endpoint defaults to the regional service endpoint; an override points
    /// at an emulator or gateway.
    pub fn new(session: &Session, endpoint_override: Option<&str>) -> Result<Self> {
        let endpoint = endpoint_override
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://lambda.{}.amazonaws.com", session.region));

        Ok(Self {
            http: build_http_client(&HttpClientConfig::default())?,
            endpoint,
            signer: RequestSigner::new(session.credentials.clone(), &session.region, "lambda"),
        })
    }

    fn url(&self, path_and_query: &str) -> Result<Url> {
        let raw = format!("{}{}", self.endpoint, path_and_query);
        Url::parse(&raw).map_err(|e| SyncError::RemoteClient {
            status: 0,
            message: format!("Invalid endpoint URL {}: {}", raw, e),
        })
    }

    fn send(&self, method: &str, url: Url, body: Vec<u8>, extra: &[(&str, &str)]) -> Result<Response> {
        let headers = self.signer.sign(method, &url, &body, Utc::now());

        let mut request = match method {
            "GET" => self.http.get(url.clone()),
            "PUT" => self.http.put(url.clone()),
            "POST" => self.http.post(url.clone()),
            other => unreachable!("unsupported method {}", other),
        };
        for (name, value) in headers {
            request = request.header(name, value);
        }
        for (name, value) in extra {
            request = request.header(*name, *value);
        }
        if !body.is_empty() {
            request = request.header("content-type", "application/json").body(body);
        }

        request.send().map_err(|source| SyncError::Network {
            url: url.to_string(),
            source,
        })
    }

    /// Pull the service's own error message out of a failed response.
    fn error_message(response: Response) -> String {
        response
            .text()
            .ok()
            .and_then(|text| {
                serde_json::from_str::<ServiceError>(&text)
                    .ok()
                    .map(|e| e.message)
                    .or(Some(text))
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "(no error body)".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(alias = "Message")]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListFunctionsPage {
    #[serde(default)]
    functions: Vec<FunctionDescriptor>,
    next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetFunctionResponse {
    code: CodeLocation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeLocation {
    location: String,
}

impl FunctionApi for LambdaCatalogClient {
    fn list_functions(&self, quiet: bool) -> Result<Vec<FunctionDescriptor>> {
        if !quiet {
            eprintln!("Fetching functions...");
        }

        let mut functions = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let path = match &marker {
                Some(m) => format!(
                    "/{}/functions?Marker={}",
                    API_VERSION,
                    urlencoding::encode(m)
                ),
                None => format!("/{}/functions", API_VERSION),
            };
            let url = self.url(&path)?;
            let response = self.send("GET", url, Vec::new(), &[])?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                return Err(SyncError::RemoteClient {
                    status,
                    message: Self::error_message(response),
                });
            }

            let page: ListFunctionsPage = response.json().map_err(|e| SyncError::RemoteClient {
                status: 0,
                message: format!("Malformed list response: {}", e),
            })?;
            functions.extend(page.functions);

            match page.next_marker {
                Some(next) if !next.is_empty() => marker = Some(next),
                _ => break,
            }
        }

        if !quiet {
            eprintln!("Fetched {} functions.", functions.len());
        }
        Ok(functions)
    }

    fn get_code_location(&self, arn: &str) -> Result<String> {
        let url = self.url(&format!(
            "/{}/functions/{}",
            API_VERSION,
            urlencoding::encode(arn)
        ))?;
        let response = self.send("GET", url, Vec::new(), &[])?;

        match response.status().as_u16() {
            404 => Err(SyncError::RemoteNotFound(arn.to_string())),
            status if !(200..300).contains(&status) => Err(SyncError::RemoteClient {
                status,
                message: Self::error_message(response),
            }),
            _ => {
                let parsed: GetFunctionResponse =
                    response.json().map_err(|e| SyncError::RemoteClient {
                        status: 0,
                        message: format!("Malformed get-function response: {}", e),
                    })?;
                Ok(parsed.code.location)
            }
        }
    }

    fn update_function_code(&self, arn: &str, zip_bytes: &[u8]) -> Result<UploadOutcome> {
        let url = self.url(&format!(
            "/{}/functions/{}/code",
            API_VERSION,
            urlencoding::encode(arn)
        ))?;
        let body = serde_json::to_vec(&serde_json::json!({
            "ZipFile": BASE64.encode(zip_bytes),
        }))?;

        let response = self.send("PUT", url, body, &[])?;

        if !response.status().is_success() {
            return Err(SyncError::Upload {
                arn: arn.to_string(),
                message: Self::error_message(response),
            });
        }

        response.json().map_err(|e| SyncError::Upload {
            arn: arn.to_string(),
            message: format!("Malformed update response: {}", e),
        })
    }

    fn invoke(&self, name: &str, payload: &str) -> Result<InvokeOutcome> {
        let url = self.url(&format!(
            "/{}/functions/{}/invocations",
            API_VERSION,
            urlencoding::encode(name)
        ))?;
        let response = self.send(
            "POST",
            url,
            payload.as_bytes().to_vec(),
            &[("X-Amz-Log-Type", "Tail"), ("X-Amz-Invocation-Type", "RequestResponse")],
        )?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(SyncError::RemoteClient {
                status,
                message: Self::error_message(response),
            });
        }

        let function_error = response
            .headers()
            .get("X-Amz-Function-Error")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let log_tail = response
            .headers()
            .get("X-Amz-Log-Result")
            .and_then(|v| v.to_str().ok())
            .and_then(|b64| BASE64.decode(b64).ok())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

        let payload = response.text().map_err(|e| SyncError::RemoteClient {
            status: 0,
            message: format!("Failed to read invoke response: {}", e),
        })?;

        Ok(InvokeOutcome {
            payload,
            log_tail,
            function_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_page_parses_wire_format() {
        let json = r#"{
            "Functions": [
                {"FunctionName": "a", "FunctionArn": "arn:a", "Runtime": "python3.12"},
                {"FunctionName": "b", "FunctionArn": "arn:b"}
            ],
            "NextMarker": "token-1"
        }"#;
        let page: ListFunctionsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.functions.len(), 2);
        assert_eq!(page.next_marker.as_deref(), Some("token-1"));
    }

    #[test]
    fn get_function_response_exposes_signed_url() {
        let json = r#"{
            "Configuration": {"FunctionName": "a"},
            "Code": {"RepositoryType": "S3", "Location": "https://example.com/signed"}
        }"#;
        let parsed: GetFunctionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.code.location, "https://example.com/signed");
    }

    #[test]
    fn service_error_message_accepts_both_casings() {
        let lower: ServiceError = serde_json::from_str(r#"{"message": "nope"}"#).unwrap();
        assert_eq!(lower.message, "nope");
        let upper: ServiceError = serde_json::from_str(r#"{"Message": "denied"}"#).unwrap();
        assert_eq!(upper.message, "denied");
    }
}
