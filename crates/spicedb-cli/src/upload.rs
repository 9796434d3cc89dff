//! Upload of the exported CSV to an S3-compatible bucket (AWS S3, MinIO).
//!
//! Requests use path-style URLs (`{endpoint}/{bucket}/{object}`) and are
//! signed with AWS Signature Version 4 over `host`, `x-amz-content-sha256`
//! and `x-amz-date`.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Method, StatusCode};
use sha2::{Digest, Sha256};
use spicedb_core::UploadConfig;

type HmacSha256 = Hmac<Sha256>;

const SERVICE: &str = "s3";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Everything but RFC 3986 unreserved characters is escaped.
const URI_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) struct S3Uploader {
    client: reqwest::Client,
    config: UploadConfig,
}

impl S3Uploader {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub(crate) fn new(config: UploadConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build upload client: {e}"))?;
        Ok(Self { client, config })
    }

    /// `s3://bucket/object` for log and console output.
    pub(crate) fn object_location(&self) -> String {
        format!("s3://{}/{}", self.config.bucket, self.config.object_name)
    }

    /// Creates the bucket if it does not exist, then uploads `path` as
    /// `text/csv`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any request fails or
    /// comes back with a non-2xx status.
    pub(crate) async fn upload_file(&self, path: &Path) -> anyhow::Result<()> {
        let body = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        self.ensure_bucket().await?;
        self.put_object(body).await
    }

    async fn ensure_bucket(&self) -> anyhow::Result<()> {
        let bucket_path = format!("/{}", uri_encode(&self.config.bucket));
        let response = self
            .send(Method::HEAD, &bucket_path, Vec::new(), None)
            .await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                let body = create_bucket_body(&self.config.region);
                let response = self
                    .send(Method::PUT, &bucket_path, body.into_bytes(), None)
                    .await?;
                check_status(response, "create bucket").await?;
                tracing::info!(bucket = %self.config.bucket, "created bucket");
                Ok(())
            }
            s => anyhow::bail!(
                "checking bucket '{}' failed with HTTP {s}",
                self.config.bucket
            ),
        }
    }

    async fn put_object(&self, body: Vec<u8>) -> anyhow::Result<()> {
        let object_path = format!(
            "/{}/{}",
            uri_encode(&self.config.bucket),
            encode_key(&self.config.object_name)
        );
        let bytes = body.len();
        let response = self
            .send(Method::PUT, &object_path, body, Some("text/csv"))
            .await?;
        check_status(response, "upload object").await?;
        tracing::info!(location = %self.object_location(), bytes, "uploaded export");
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> anyhow::Result<reqwest::Response> {
        let base_url = self.config.base_url();
        let host = host_header(&base_url)?;
        let payload_hash = hex_sha256(&body);
        let signed = sign(&SigningRequest {
            method: method.as_str(),
            path,
            host: &host,
            payload_hash: &payload_hash,
            region: &self.config.region,
            access_key: &self.config.access_key,
            secret_key: &self.config.secret_key,
            now: Utc::now(),
        });

        let mut request = self
            .client
            .request(method, format!("{base_url}{path}"))
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .header(reqwest::header::AUTHORIZATION, signed.authorization);
        if let Some(ct) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, ct);
        }
        Ok(request.body(body).send().await?)
    }
}

async fn check_status(response: reqwest::Response, action: &str) -> anyhow::Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{action} failed with HTTP {status}: {body}")
}

/// `CreateBucket` payload; `us-east-1` takes an empty body.
fn create_bucket_body(region: &str) -> String {
    if region == "us-east-1" {
        return String::new();
    }
    format!(
        "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <LocationConstraint>{region}</LocationConstraint></CreateBucketConfiguration>"
    )
}

/// The `Host` value the HTTP client will send for `base_url`: host plus port,
/// with the scheme's default port omitted.
fn host_header(base_url: &str) -> anyhow::Result<String> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| anyhow::anyhow!("invalid S3 endpoint {base_url}: {e}"))?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("S3 endpoint {base_url} has no host"))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

fn uri_encode(segment: &str) -> String {
    utf8_percent_encode(segment, URI_ENCODE).to_string()
}

/// Encodes an object key segment by segment, keeping `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

fn hex_sha256(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Derives the SigV4 signing key for one day, region, and service.
fn signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

struct SigningRequest<'a> {
    method: &'a str,
    /// Already URI-encoded absolute path, no query string.
    path: &'a str,
    host: &'a str,
    payload_hash: &'a str,
    region: &'a str,
    access_key: &'a str,
    secret_key: &'a str,
    now: DateTime<Utc>,
}

struct Signature {
    amz_date: String,
    authorization: String,
}

fn sign(req: &SigningRequest<'_>) -> Signature {
    let amz_date = req.now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = req.now.format("%Y%m%d").to_string();

    let canonical_request = format!(
        "{method}\n{path}\n\nhost:{host}\nx-amz-content-sha256:{payload}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{payload}",
        method = req.method,
        path = req.path,
        host = req.host,
        payload = req.payload_hash,
    );
    let scope = format!("{date}/{}/{SERVICE}/aws4_request", req.region);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
        hex_sha256(canonical_request.as_bytes())
    );

    let key = signing_key(req.secret_key, &date, req.region, SERVICE);
    let signature: String = hmac_sha256(&key, string_to_sign.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();

    Signature {
        authorization: format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            req.access_key
        ),
        amz_date,
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
