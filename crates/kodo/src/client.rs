//! Kodo client implementation
//!
//! Wraps reqwest and implements the StorageGateway trait from qn-core.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qn_core::{
    BatchOutcome, Config, Error, FetchResult, HostsConfig, ListOptions, ListingPage,
    ObjectMetadata, RemoteError, RemoteResult, Result, StorageClass, StorageGateway,
    UploadCredential, UploadResult,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::auth::{Auth, UPLOAD_TOKEN_EXPIRES, deadline_after, encode_entry, urlsafe_b64};
use crate::model::{
    BatchEntry, ErrorBody, FetchResponse, ListResponse, RegionHosts, RegionResponse,
    StatResponse, UploadResponse,
};

/// Tracing target for Kodo client operations
pub const TRACING_TARGET: &str = "qn_kodo::client";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const USER_AGENT: &str = concat!("qncli/", env!("CARGO_PKG_VERSION"));

/// Kodo HTTP client
#[derive(Clone, Debug)]
pub struct KodoClient {
    http: Client,
    /// Uploads may take arbitrarily long, so this client has no overall timeout
    upload_http: Client,
    auth: Auth,
    hosts: HostsConfig,
    /// Region hosts already looked up, by bucket
    regions: Arc<RwLock<HashMap<String, RegionHosts>>>,
}

impl KodoClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = config.credentials()?;
        let hosts = &config.hosts;
        for host in [&hosts.rs, &hosts.rsf, &hosts.uc]
            .into_iter()
            .chain(hosts.io.as_ref())
            .chain(hosts.up.as_ref())
        {
            Url::parse(host)?;
        }

        tracing::debug!(
            target: TRACING_TARGET,
            connect_ms = config.timeout.connect_ms,
            read_ms = config.timeout.read_ms,
            "Creating Kodo client"
        );

        let connect_timeout = Duration::from_millis(config.timeout.connect_ms);
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(Duration::from_millis(config.timeout.read_ms))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::General(format!("Failed to create HTTP client: {e}")))?;
        let upload_http = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::General(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            upload_http,
            auth: Auth::new(&credentials),
            hosts: config.hosts.clone(),
            regions: Arc::default(),
        })
    }

    /// io and up hosts serving `bucket`
    ///
    /// Configured hosts win. Otherwise the region is queried once per bucket
    /// and cached for the life of the client.
    async fn region(&self, bucket: &str) -> RemoteResult<RegionHosts> {
        if let (Some(io), Some(up)) = (&self.hosts.io, &self.hosts.up) {
            return Ok(RegionHosts {
                io: io.clone(),
                up: up.clone(),
            });
        }
        if let Some(hosts) = self.regions.read().await.get(bucket) {
            return Ok(hosts.clone());
        }

        let mut url = endpoint(&self.hosts.uc, "/v2/query")?;
        url.query_pairs_mut()
            .append_pair("ak", self.auth.access_key())
            .append_pair("bucket", bucket);
        let scheme = url.scheme().to_string();
        let body = execute(self.http.get(url)).await?;
        let queried = decode::<RegionResponse>(&body)?
            .into_hosts(&scheme)
            .ok_or_else(|| invalid_response(&body, format!("no hosts for bucket {bucket}")))?;

        let hosts = RegionHosts {
            io: self.hosts.io.clone().unwrap_or(queried.io),
            up: self.hosts.up.clone().unwrap_or(queried.up),
        };
        tracing::debug!(
            target: TRACING_TARGET,
            bucket,
            io = %hosts.io,
            up = %hosts.up,
            "Resolved region hosts"
        );
        self.regions
            .write()
            .await
            .insert(bucket.to_string(), hosts.clone());
        Ok(hosts)
    }

    /// POST a management request with an optional form body
    async fn management_post(&self, url: Url, form_body: Option<String>) -> RemoteResult<String> {
        let token = self
            .auth
            .management_token(&url, form_body.as_deref().map(str::as_bytes));
        let request = self
            .http
            .post(url)
            .header(AUTHORIZATION, token)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(form_body.unwrap_or_default());
        execute(request).await
    }

    async fn management_get(&self, url: Url) -> RemoteResult<String> {
        let token = self.auth.management_token(&url, None);
        execute(self.http.get(url).header(AUTHORIZATION, token)).await
    }
}

/// Build an endpoint URL from a configured host and a path
fn endpoint(host: &str, path: &str) -> RemoteResult<Url> {
    Url::parse(&format!("{}{}", host.trim_end_matches('/'), path))
        .map_err(|e| RemoteError::transport(format!("invalid endpoint {host}: {e}")))
}

/// Send a request and return the body of a 2xx response
async fn execute(request: RequestBuilder) -> RemoteResult<String> {
    let response = request.send().await.map_err(|e| {
        tracing::debug!(target: TRACING_TARGET, error = %e, "Request failed");
        RemoteError::transport(transport_message(&e))
    })?;

    let status = response.status();
    let url = response.url().clone();
    let body = response
        .text()
        .await
        .map_err(|e| RemoteError::transport(transport_message(&e)))?;
    tracing::debug!(
        target: TRACING_TARGET,
        status = status.as_u16(),
        url = %url,
        body = %body,
        "Received response"
    );

    if status.is_success() {
        Ok(body)
    } else {
        Err(status_error(status, body))
    }
}

fn transport_message(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

/// Error from a non-2xx response, preferring the service's `error` field
fn status_error(status: StatusCode, body: String) -> RemoteError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
    RemoteError::new(status.as_u16(), message).with_raw(body)
}

fn decode<T: DeserializeOwned>(body: &str) -> RemoteResult<T> {
    serde_json::from_str(body).map_err(|e| invalid_response(body, e))
}

fn invalid_response(body: &str, reason: impl std::fmt::Display) -> RemoteError {
    RemoteError::new(200, format!("invalid response: {reason}")).with_raw(body)
}

#[async_trait]
impl StorageGateway for KodoClient {
    async fn stat(&self, bucket: &str, key: &str) -> RemoteResult<ObjectMetadata> {
        let url = endpoint(&self.hosts.rs, &format!("/stat/{}", encode_entry(bucket, key)))?;
        let body = self.management_get(url).await?;
        decode::<StatResponse>(&body)?
            .into_metadata()
            .ok_or_else(|| invalid_response(&body, "putTime out of range"))
    }

    async fn list(&self, bucket: &str, options: ListOptions) -> RemoteResult<ListingPage> {
        let mut url = endpoint(&self.hosts.rsf, "/list")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("bucket", bucket);
            if let Some(marker) = options.marker.as_deref().filter(|m| !m.is_empty()) {
                query.append_pair("marker", marker);
            }
            if options.limit > 0 {
                query.append_pair("limit", &options.limit.to_string());
            }
            if let Some(prefix) = options.prefix.as_deref().filter(|p| !p.is_empty()) {
                query.append_pair("prefix", prefix);
            }
            if let Some(delimiter) = options.delimiter.as_deref().filter(|d| !d.is_empty()) {
                query.append_pair("delimiter", delimiter);
            }
        }

        let body = self.management_get(url).await?;
        decode::<ListResponse>(&body)?
            .into_page()
            .ok_or_else(|| invalid_response(&body, "putTime out of range"))
    }

    async fn move_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> RemoteResult<()> {
        let path = format!(
            "/move/{}/{}",
            encode_entry(src_bucket, src_key),
            encode_entry(dst_bucket, dst_key)
        );
        self.management_post(endpoint(&self.hosts.rs, &path)?, None)
            .await
            .map(drop)
    }

    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> RemoteResult<()> {
        let path = format!(
            "/copy/{}/{}",
            encode_entry(src_bucket, src_key),
            encode_entry(dst_bucket, dst_key)
        );
        self.management_post(endpoint(&self.hosts.rs, &path)?, None)
            .await
            .map(drop)
    }

    async fn delete(&self, bucket: &str, key: &str) -> RemoteResult<()> {
        let path = format!("/delete/{}", encode_entry(bucket, key));
        self.management_post(endpoint(&self.hosts.rs, &path)?, None)
            .await
            .map(drop)
    }

    async fn batch_delete(&self, bucket: &str, keys: &[String]) -> RemoteResult<BatchOutcome> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(
                keys.iter()
                    .map(|key| ("op", format!("/delete/{}", encode_entry(bucket, key)))),
            )
            .finish();

        let body = self
            .management_post(endpoint(&self.hosts.rs, "/batch")?, Some(form))
            .await?;
        let entries: Vec<BatchEntry> = decode(&body)?;
        if entries.len() != keys.len() {
            return Err(invalid_response(
                &body,
                format!("expected {} batch results, got {}", keys.len(), entries.len()),
            ));
        }

        Ok(BatchOutcome {
            items: entries
                .into_iter()
                .zip(keys)
                .map(|(entry, key)| entry.into_item(key))
                .collect(),
        })
    }

    async fn upload(
        &self,
        credential: &UploadCredential,
        key: &str,
        local_path: &Path,
    ) -> RemoteResult<UploadResult> {
        let open_error = |e: std::io::Error| {
            RemoteError::transport(format!("cannot read {}: {e}", local_path.display()))
        };
        let file = tokio::fs::File::open(local_path).await.map_err(open_error)?;
        let size = file.metadata().await.map_err(open_error)?.len();

        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.to_string());
        let mime = mime_guess::from_path(local_path).first_or_octet_stream();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, size)
            .file_name(file_name)
            .mime_str(mime.as_ref())
            .map_err(|e| RemoteError::transport(e.to_string()))?;

        let form = Form::new()
            .text("token", credential.token.clone())
            .text("key", key.to_string())
            .part("file", part);

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %credential.bucket,
            key,
            size,
            "Uploading file"
        );
        let up = self.region(&credential.bucket).await?.up;
        let url = endpoint(&up, "/")?;
        let body = execute(self.upload_http.post(url).multipart(form)).await?;
        decode::<UploadResponse>(&body).map(Into::into)
    }

    async fn fetch(
        &self,
        url: &str,
        bucket: &str,
        key: Option<String>,
    ) -> RemoteResult<FetchResult> {
        let target = match key {
            Some(key) => encode_entry(bucket, &key),
            None => urlsafe_b64(bucket),
        };
        let path = format!("/fetch/{}/to/{}", urlsafe_b64(url), target);
        let io = self.region(bucket).await?.io;
        let body = self.management_post(endpoint(&io, &path)?, None).await?;
        decode::<FetchResponse>(&body).map(Into::into)
    }

    async fn set_mime(&self, bucket: &str, key: &str, mime: &str) -> RemoteResult<()> {
        let path = format!(
            "/chgm/{}/mime/{}",
            encode_entry(bucket, key),
            urlsafe_b64(mime)
        );
        self.management_post(endpoint(&self.hosts.rs, &path)?, None)
            .await
            .map(drop)
    }

    async fn set_storage_class(
        &self,
        bucket: &str,
        key: &str,
        class: StorageClass,
    ) -> RemoteResult<()> {
        let path = format!(
            "/chtype/{}/type/{}",
            encode_entry(bucket, key),
            class.code()
        );
        self.management_post(endpoint(&self.hosts.rs, &path)?, None)
            .await
            .map(drop)
    }

    fn sign_upload(&self, bucket: &str, key: &str) -> UploadCredential {
        let deadline = deadline_after(UPLOAD_TOKEN_EXPIRES);
        UploadCredential {
            bucket: bucket.to_string(),
            key: key.to_string(),
            token: self.auth.upload_token(bucket, key, deadline),
        }
    }

    fn sign_url(&self, base_url: &str, expires_secs: u64) -> String {
        let expires = i64::try_from(expires_secs).unwrap_or(i64::MAX);
        self.auth
            .private_download_url(base_url, deadline_after(expires))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use qn_core::{BucketConfig, Protocol};
    use serde_json::json;

    fn client(server: &Server) -> KodoClient {
        let mut config = Config::new(
            "ak",
            "sk",
            vec![BucketConfig::new("a", "a.example.com", Protocol::Https)],
        );
        config.hosts = HostsConfig::single(format!("http://{}", server.addr()));
        KodoClient::new(&config).unwrap()
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        let config = Config::new("", "", vec![]);
        assert!(matches!(
            KodoClient::new(&config),
            Err(Error::MissingCredentials)
        ));
    }

    #[test]
    fn test_new_rejects_bad_host() {
        let mut config = Config::new("ak", "sk", vec![]);
        config.hosts.rs = "not a url".to_string();
        assert!(matches!(KodoClient::new(&config), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_stat() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/stat/YTpwaWMuanBn"),
                request::headers(contains(key("authorization"))),
            ])
            .respond_with(json_encoded(json!({
                "fsize": 2048,
                "hash": "FhAsh",
                "mimeType": "image/jpeg",
                "putTime": 16_000_000_000_000_i64,
                "type": 0,
            }))),
        );

        let meta = client(&server).stat("a", "pic.jpg").await.unwrap();
        assert_eq!(meta.size, 2048);
        assert_eq!(meta.storage_class, StorageClass::Standard);
        assert_eq!(meta.upload_time.as_second(), 1_600_000);
        assert_eq!(meta.content_hash, "FhAsh");
    }

    #[tokio::test]
    async fn test_stat_not_found() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/stat/YTpwaWMuanBn")).respond_with(
                status_code(612).body(r#"{"error":"no such file or directory"}"#),
            ),
        );

        let err = client(&server).stat("a", "pic.jpg").await.unwrap_err();
        assert_eq!(err.status_code, 612);
        assert_eq!(err.message, "no such file or directory");
        assert!(err.raw.is_some());
    }

    #[tokio::test]
    async fn test_error_without_body_uses_reason_phrase() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/delete/YTp4"))
                .respond_with(status_code(401)),
        );

        let err = client(&server).delete("a", "x").await.unwrap_err();
        assert_eq!(err.status_code, 401);
        assert_eq!(err.message, "Unauthorized");
    }

    #[tokio::test]
    async fn test_transport_error_has_status_zero() {
        let mut config = Config::new("ak", "sk", vec![]);
        config.hosts = HostsConfig::single("http://127.0.0.1:1");
        let client = KodoClient::new(&config).unwrap();

        let err = client.delete("a", "x").await.unwrap_err();
        assert_eq!(err.status_code, 0);
    }

    #[tokio::test]
    async fn test_list_query_and_page() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/list"),
                request::query(url_decoded(contains(("bucket", "a")))),
                request::query(url_decoded(contains(("prefix", "img/")))),
                request::query(url_decoded(contains(("limit", "2")))),
                request::query(url_decoded(contains(("marker", "m0")))),
                request::query(url_decoded(not(contains(key("delimiter"))))),
            ])
            .respond_with(json_encoded(json!({
                "marker": "m1",
                "items": [
                    {"key": "img/a", "fsize": 1, "mimeType": "text/plain", "putTime": 0, "hash": "h1", "type": 1},
                    {"key": "img/b", "putTime": 0},
                ],
            }))),
        );

        let options = ListOptions {
            prefix: Some("img/".to_string()),
            marker: Some("m0".to_string()),
            limit: 2,
            delimiter: None,
        };
        let page = client(&server).list("a", options).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_marker, "m1");
        assert!(!page.end_of_listing);
        assert_eq!(page.items[0].storage_class, Some(StorageClass::LowFrequency));
        assert_eq!(page.items[1].size, -1);
    }

    #[tokio::test]
    async fn test_move_and_copy_paths() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "POST",
                "/move/YTpvbGQudHh0/YTpuZXcudHh0",
            ))
            .respond_with(status_code(200)),
        );
        server.expect(
            Expectation::matching(request::method_path(
                "POST",
                "/copy/YTpvbGQudHh0/YTpuZXcudHh0",
            ))
            .respond_with(status_code(200)),
        );

        let client = client(&server);
        client
            .move_object("a", "old.txt", "a", "new.txt")
            .await
            .unwrap();
        client
            .copy_object("a", "old.txt", "a", "new.txt")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_copy_conflict() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "POST",
                "/copy/YTpvbGQudHh0/YTpuZXcudHh0",
            ))
            .respond_with(status_code(614).body(r#"{"error":"file exists"}"#)),
        );

        let err = client(&server)
            .copy_object("a", "old.txt", "a", "new.txt")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "(614)file exists");
    }

    #[tokio::test]
    async fn test_batch_delete_partial() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/batch"),
                request::body(url_decoded(contains(("op", "/delete/YTp4")))),
                request::body(url_decoded(contains(("op", "/delete/YTpnb25lLnR4dA==")))),
            ])
            .respond_with(
                status_code(298).body(
                    json!([
                        {"code": 200},
                        {"code": 612, "data": {"error": "no such file or directory"}},
                    ])
                    .to_string(),
                ),
            ),
        );

        let keys = vec!["x".to_string(), "gone.txt".to_string()];
        let outcome = client(&server).batch_delete("a", &keys).await.unwrap();
        assert!(!outcome.all_ok());
        assert!(outcome.items[0].is_ok());
        assert_eq!(outcome.items[1].key, "gone.txt");
        assert_eq!(outcome.items[1].status_code, 612);
    }

    #[tokio::test]
    async fn test_fetch_without_key_targets_bucket() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "POST",
                "/fetch/aHR0cHM6Ly9leGFtcGxlLm9yZy9hLnBuZw==/to/YQ==",
            ))
            .respond_with(json_encoded(json!({
                "key": "FhAsh",
                "hash": "FhAsh",
                "mimeType": "image/png",
                "fsize": 10,
            }))),
        );

        let result = client(&server)
            .fetch("https://example.org/a.png", "a", None)
            .await
            .unwrap();
        assert_eq!(result.key, "FhAsh");
        assert_eq!(result.mime_type, "image/png");
        assert_eq!(result.size, 10);
    }

    #[tokio::test]
    async fn test_change_mime_and_type_paths() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/chgm/YTp4/mime/aW1hZ2UvcG5n"))
                .respond_with(status_code(200)),
        );
        server.expect(
            Expectation::matching(request::method_path("POST", "/chtype/YTp4/type/1"))
                .respond_with(status_code(200)),
        );

        let client = client(&server);
        client.set_mime("a", "x", "image/png").await.unwrap();
        client
            .set_storage_class("a", "x", StorageClass::LowFrequency)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_multipart() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let local = temp_dir.path().join("x.txt");
        std::fs::write(&local, b"hello world").unwrap();

        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method("POST"),
                request::path("/"),
                request::body(matches("hello world")),
                request::body(matches("name=\"token\"")),
            ])
            .respond_with(json_encoded(json!({"key": "x.txt", "hash": "FhAsh"}))),
        );

        let client = client(&server);
        let credential = client.sign_upload("a", "x.txt");
        assert!(credential.token.starts_with("ak:"));

        let result = client.upload(&credential, "x.txt", &local).await.unwrap();
        assert_eq!(result.key, "x.txt");
        assert_eq!(result.hash, "FhAsh");
    }

    /// Client whose io and up hosts come from a region lookup on `uc`
    fn lookup_client(uc: &Server) -> KodoClient {
        let mut config = Config::new("ak", "sk", vec![]);
        config.hosts = HostsConfig {
            uc: format!("http://{}", uc.addr()),
            io: None,
            up: None,
            ..HostsConfig::single("http://127.0.0.1:1")
        };
        KodoClient::new(&config).unwrap()
    }

    fn expect_region(uc: &Server, bucket: &'static str, io: &Server, up: &Server) {
        uc.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/v2/query"),
                request::query(url_decoded(contains(("ak", "ak")))),
                request::query(url_decoded(contains(("bucket", bucket)))),
            ])
            .times(1)
            .respond_with(json_encoded(json!({
                "io": {"src": {"main": [io.addr().to_string()]}},
                "up": {"src": {"main": [up.addr().to_string()]}},
            }))),
        );
    }

    #[tokio::test]
    async fn test_upload_uses_each_buckets_region() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let local = temp_dir.path().join("x.txt");
        std::fs::write(&local, b"hello world").unwrap();

        let uc = Server::run();
        let (up_a, up_b) = (Server::run(), Server::run());
        expect_region(&uc, "a", &up_a, &up_a);
        expect_region(&uc, "b", &up_b, &up_b);
        up_a.expect(
            Expectation::matching(request::method_path("POST", "/"))
                .times(2)
                .respond_with(json_encoded(json!({"key": "x.txt", "hash": "FhA"}))),
        );
        up_b.expect(
            Expectation::matching(request::method_path("POST", "/"))
                .times(1)
                .respond_with(json_encoded(json!({"key": "x.txt", "hash": "FhB"}))),
        );

        let client = lookup_client(&uc);
        for bucket in ["a", "a", "b"] {
            let credential = client.sign_upload(bucket, "x.txt");
            let result = client.upload(&credential, "x.txt", &local).await.unwrap();
            let expected = if bucket == "a" { "FhA" } else { "FhB" };
            assert_eq!(result.hash, expected);
        }
    }

    #[tokio::test]
    async fn test_fetch_uses_region_io_host() {
        let uc = Server::run();
        let io = Server::run();
        expect_region(&uc, "a", &io, &io);
        io.expect(
            Expectation::matching(request::method_path(
                "POST",
                "/fetch/aHR0cHM6Ly9leGFtcGxlLm9yZy9hLnBuZw==/to/YQ==",
            ))
            .respond_with(json_encoded(json!({"key": "k", "hash": "h"}))),
        );

        let result = lookup_client(&uc)
            .fetch("https://example.org/a.png", "a", None)
            .await
            .unwrap();
        assert_eq!(result.key, "k");
    }

    #[tokio::test]
    async fn test_region_lookup_failure_is_reported() {
        let uc = Server::run();
        uc.expect(
            Expectation::matching(request::method_path("GET", "/v2/query"))
                .respond_with(status_code(631).body(r#"{"error":"no such bucket"}"#)),
        );

        let err = lookup_client(&uc)
            .fetch("https://example.org/a.png", "gone", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 631);
        assert_eq!(err.message, "no such bucket");
    }

    #[test]
    fn test_sign_url_appends_deadline_and_token() {
        let config = Config::new("ak", "sk", vec![]);
        let client = KodoClient::new(&config).unwrap();
        let url = client.sign_url("http://p.example.com/a.pdf", 3600);
        assert!(url.starts_with("http://p.example.com/a.pdf?e="));
        assert!(url.contains("&token=ak:"));
    }
}
