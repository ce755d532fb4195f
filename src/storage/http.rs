use reqwest::{
    StatusCode,
    blocking::{Client, Response},
    header::CONTENT_LENGTH,
};
use url::Url;
use zarrs::storage::{
    MaybeBytes, MaybeBytesIterator, ReadableStorageTraits, StorageError, StoreKey,
    byte_range::{ByteRange, ByteRangeIterator},
};

use super::{Document, MetadataSource};

/// Base URL and client shared by the document source and the array store.
#[derive(Debug, Clone)]
struct Remote {
    root: Url,
    client: Client,
}

impl Remote {
    /// `root` must end with `/` for relative keys to resolve beneath it.
    fn new(root: &str) -> crate::Result<Self> {
        Ok(Self {
            root: Url::parse(root)?,
            client: Client::new(),
        })
    }

    fn url(&self, relative: &str) -> Result<Url, url::ParseError> {
        self.root.join(relative.trim_start_matches('/'))
    }

    /// Send a request, reporting absent keys as `None`.
    ///
    /// S3-compatible endpoints answer 403 for keys which do not exist.
    fn send(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::Result<Option<Response>> {
        let response = request.send()?;
        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            _ => Ok(Some(response)),
        }
    }
}

fn storage_error(err: impl std::fmt::Display) -> StorageError {
    StorageError::Other(err.to_string())
}

/// JSON documents served over plain, unauthenticated HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    remote: Remote,
}

impl HttpSource {
    pub fn new(root: &str) -> crate::Result<Self> {
        Ok(Self {
            remote: Remote::new(root)?,
        })
    }
}

impl MetadataSource for HttpSource {
    fn fetch(&self, relative: &str) -> crate::Result<Document> {
        let url = self.remote.url(relative)?;
        let Some(response) = self.remote.send(self.remote.client.get(url.clone()))? else {
            return Ok(Document::Missing);
        };
        let status = response.status();
        let bytes = response.bytes()?;
        Ok(match Document::from_slice(&bytes) {
            Document::Malformed(reason) if !status.is_success() => {
                Document::Malformed(format!("HTTP {status} from {url}: {reason}"))
            }
            doc => doc,
        })
    }
}

/// Array storage over HTTP with the same notion of absent keys as [`HttpSource`].
///
/// Absent chunks therefore read as the fill value instead of failing.
#[derive(Debug, Clone)]
pub struct HttpStore {
    remote: Remote,
}

impl HttpStore {
    pub fn new(root: &str) -> crate::Result<Self> {
        Ok(Self {
            remote: Remote::new(root)?,
        })
    }

    fn response(&self, key: &StoreKey, head: bool) -> Result<Option<Response>, StorageError> {
        let url = self.remote.url(key.as_str()).map_err(storage_error)?;
        let request = if head {
            self.remote.client.head(url)
        } else {
            self.remote.client.get(url)
        };
        let Some(response) = self.remote.send(request).map_err(storage_error)? else {
            return Ok(None);
        };
        if response.status().is_success() {
            Ok(Some(response))
        } else {
            Err(StorageError::Other(format!(
                "http unexpected status code {} for {}",
                response.status(),
                key.as_str()
            )))
        }
    }
}

impl ReadableStorageTraits for HttpStore {
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let Some(response) = self.response(key, true)? else {
            return Ok(None);
        };
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .map(Some)
            .ok_or_else(|| StorageError::Other(format!("no content length for {}", key.as_str())))
    }

    fn supports_get_partial(&self) -> bool {
        false
    }

    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        match self.response(key, false)? {
            Some(response) => Ok(Some(response.bytes().map_err(storage_error)?)),
            None => Ok(None),
        }
    }

    fn get_partial_many<'a>(
        &'a self,
        _key: &StoreKey,
        _byte_ranges: ByteRangeIterator<'a>,
    ) -> Result<MaybeBytesIterator<'a>, StorageError> {
        Err(StorageError::Unsupported(
            "get_partial_many not supported".into(),
        ))
    }

    fn get_partial(&self, key: &StoreKey, byte_range: ByteRange) -> Result<MaybeBytes, StorageError> {
        let Some(bytes) = self.get(key)? else {
            return Ok(None);
        };
        let size = bytes.len() as u64;
        let (start, end) = (byte_range.start(size), byte_range.end(size));
        if start > end || end > size {
            return Err(StorageError::Other(format!(
                "byte range {start}..{end} out of bounds for {} of {size} bytes",
                key.as_str()
            )));
        }
        Ok(Some(bytes.slice(start as usize..end as usize)))
    }
}
