//! Wire formats of the Kodo endpoints

use qn_core::traits::ticks_to_timestamp;
use qn_core::{
    BatchItem, FetchResult, ListedObject, ListingPage, ObjectMetadata, StorageClass, UploadResult,
};
use serde::Deserialize;

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatResponse {
    pub fsize: u64,
    pub hash: String,
    pub mime_type: String,
    pub put_time: i64,
    #[serde(default, rename = "type")]
    pub kind: i64,
}

impl StatResponse {
    /// `None` if `putTime` is out of range
    pub fn into_metadata(self) -> Option<ObjectMetadata> {
        Some(ObjectMetadata {
            size: self.fsize,
            storage_class: StorageClass::from_code(self.kind),
            upload_time: ticks_to_timestamp(self.put_time)?,
            mime_type: self.mime_type,
            content_hash: self.hash,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub items: Vec<ListItem>,
    #[serde(default)]
    pub common_prefixes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListItem {
    pub key: String,
    #[serde(default)]
    pub fsize: Option<i64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub put_time: i64,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<i64>,
}

impl ListResponse {
    /// The listing ends when the service returns no marker
    pub fn into_page(self) -> Option<ListingPage> {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                Some(ListedObject {
                    mime_type: item.mime_type.filter(|m| !m.is_empty()),
                    hash: item.hash,
                    storage_class: item.kind.map(StorageClass::from_code),
                    ..ListedObject::new(
                        item.key,
                        item.fsize.unwrap_or(-1),
                        ticks_to_timestamp(item.put_time)?,
                    )
                })
            })
            .collect::<Option<Vec<_>>>()?;

        let next_marker = self.marker.unwrap_or_default();
        Some(ListingPage {
            items,
            common_prefixes: self.common_prefixes,
            end_of_listing: next_marker.is_empty(),
            next_marker,
        })
    }
}

/// One element of the batch response array
#[derive(Debug, Deserialize)]
pub(crate) struct BatchEntry {
    pub code: u16,
    #[serde(default)]
    pub data: Option<ErrorData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorData {
    #[serde(default)]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn into_item(self, key: &str) -> BatchItem {
        if self.code == 200 {
            return BatchItem::ok(key);
        }
        let error = self
            .data
            .and_then(|data| data.error)
            .unwrap_or_else(|| "unknown error".to_string());
        BatchItem::failed(key, self.code, error)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FetchResponse {
    pub key: String,
    pub hash: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub fsize: u64,
}

impl From<FetchResponse> for FetchResult {
    fn from(resp: FetchResponse) -> Self {
        Self {
            key: resp.key,
            hash: resp.hash,
            mime_type: resp.mime_type,
            size: resp.fsize,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub key: String,
    pub hash: String,
}

impl From<UploadResponse> for UploadResult {
    fn from(resp: UploadResponse) -> Self {
        Self {
            key: resp.key,
            hash: resp.hash,
        }
    }
}

/// Response of the uc `/v2/query` region lookup
#[derive(Debug, Deserialize)]
pub(crate) struct RegionResponse {
    #[serde(default)]
    pub io: ServiceDomains,
    #[serde(default)]
    pub up: ServiceDomains,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServiceDomains {
    /// Accelerated domains
    #[serde(default)]
    pub acc: Option<DomainList>,
    /// Source domains
    #[serde(default)]
    pub src: Option<DomainList>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainList {
    #[serde(default)]
    pub main: Vec<String>,
}

impl ServiceDomains {
    /// First accelerated domain, else first source domain
    fn preferred(&self) -> Option<&str> {
        [&self.acc, &self.src]
            .into_iter()
            .flatten()
            .find_map(|list| list.main.first())
            .map(String::as_str)
    }
}

/// Region-specific hosts of one bucket, as base URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegionHosts {
    pub io: String,
    pub up: String,
}

impl RegionResponse {
    /// Base URLs for the bucket's region; bare domains get `scheme`
    pub fn into_hosts(self, scheme: &str) -> Option<RegionHosts> {
        let base_url = |domain: &str| {
            if domain.contains("://") {
                domain.to_string()
            } else {
                format!("{scheme}://{domain}")
            }
        };
        Some(RegionHosts {
            io: base_url(self.io.preferred()?),
            up: base_url(self.up.preferred()?),
        })
    }
}
