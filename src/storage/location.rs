//! Storage locations backed by object stores (S3, GCS, Azure, local, memory)

use crate::config::StorageCredentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use datafusion::execution::runtime_env::RuntimeEnv;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore};
use std::sync::Arc;
use url::Url;

/// Scheme of the URLs under which stores are registered with a query runtime
const SESSION_SCHEME: &str = "lake";

/// An object store plus the base prefix every relative path is resolved against
#[derive(Debug, Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// URL scheme for logging (s3, gs, az, file, memory)
    scheme: String,
    /// Location as given, used to build display paths
    url: String,
}

impl StorageLocation {
    /// Open an existing location for reading
    ///
    /// A local directory that does not exist is an error.
    pub fn open(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        Self::parse(url, credentials, false)
    }

    /// Open a location for writing, creating a missing local directory
    pub fn open_or_create(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        Self::parse(url, credentials, true)
    }

    /// Wrap an already configured object store
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
        scheme: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        let scheme = scheme.into();
        let url = format!("{scheme}://{prefix}");
        Self {
            store,
            prefix,
            scheme,
            url,
        }
    }

    /// A fresh, empty in-memory location
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemory::new()), "", "memory")
    }

    fn parse(url: &str, credentials: &StorageCredentials, create: bool) -> Result<Self> {
        let Some((scheme, _)) = url.split_once("://") else {
            return Self::parse_local(std::path::Path::new(url), url, create);
        };

        match scheme.to_ascii_lowercase().as_str() {
            "s3" | "s3a" | "s3n" => Self::parse_s3(url, credentials),
            "gs" | "gcs" => Self::parse_gcs(url, credentials),
            "az" | "azure" => Self::parse_azure(url, credentials),
            "file" => {
                let parsed =
                    Url::parse(url).map_err(|e| Error::location(url, format!("{e}")))?;
                let dir = parsed
                    .to_file_path()
                    .map_err(|()| Error::location(url, "not a local file URL"))?;
                Self::parse_local(&dir, url, create)
            }
            "memory" => {
                let parsed =
                    Url::parse(url).map_err(|e| Error::location(url, format!("{e}")))?;
                let mut location = Self::in_memory();
                location.prefix = bucket_and_prefix(url, &parsed)
                    .map(|(bucket, prefix)| join(&bucket, &prefix))
                    .unwrap_or_default();
                location.url = url.to_string();
                Ok(location)
            }
            other => Err(Error::location(
                url,
                format!("unsupported scheme '{other}'"),
            )),
        }
    }

    /// Parse an S3 URL (`s3://`, `s3a://`, `s3n://`)
    fn parse_s3(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::location(url, format!("{e}")))?;
        let (bucket, prefix) = bucket_and_prefix(url, &parsed)?;

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&bucket)
            .with_allow_http(credentials.allow_http);

        if let Some(key_id) = &credentials.aws_access_key_id {
            builder = builder.with_access_key_id(key_id);
        }
        if let Some(secret) = &credentials.aws_secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(token) = &credentials.aws_session_token {
            builder = builder.with_token(token);
        }
        if let Some(region) = &credentials.aws_region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &credentials.aws_endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| Error::location(url, format!("failed to create S3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "s3".to_string(),
            url: url.to_string(),
        })
    }

    /// Parse a GCS URL
    fn parse_gcs(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::location(url, format!("{e}")))?;
        let (bucket, prefix) = bucket_and_prefix(url, &parsed)?;

        let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(&bucket);
        if let Some(path) = &credentials.gcs_service_account_path {
            builder = builder.with_service_account_path(path);
        }

        let store = builder
            .build()
            .map_err(|e| Error::location(url, format!("failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            url: url.to_string(),
        })
    }

    /// Parse an Azure Blob URL
    fn parse_azure(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::location(url, format!("{e}")))?;
        let (container, prefix) = bucket_and_prefix(url, &parsed)?;

        let mut builder = MicrosoftAzureBuilder::new().with_container_name(&container);
        if let Some(account) = &credentials.azure_account {
            builder = builder.with_account(account);
        }
        if let Some(key) = &credentials.azure_access_key {
            builder = builder.with_access_key(key);
        }

        let store = builder
            .build()
            .map_err(|e| Error::location(url, format!("failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            url: url.to_string(),
        })
    }

    /// Parse a local filesystem path
    fn parse_local(dir: &std::path::Path, url: &str, create: bool) -> Result<Self> {
        if create {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::location(url, format!("failed to create directory: {e}"))
            })?;
        } else if !dir.is_dir() {
            return Err(Error::location(url, "directory does not exist"));
        }

        let store = LocalFileSystem::new_with_prefix(dir)
            .map_err(|e| Error::location(url, format!("failed to open local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
            url: url.to_string(),
        })
    }

    /// Get the scheme (s3, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the base prefix inside the store
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Make this location's store reachable from a query runtime as
    /// `lake://<name>/`
    pub fn register_with(&self, runtime: &RuntimeEnv, name: &str) -> Result<()> {
        let url = Url::parse(&format!("{SESSION_SCHEME}://{name}/"))
            .map_err(|e| Error::location(self.url.clone(), format!("{e}")))?;
        runtime.register_object_store(&url, Arc::clone(&self.store));
        Ok(())
    }

    /// Directory URL of `relative` as seen by a runtime this location was
    /// registered with under `name`
    pub fn session_url(&self, name: &str, relative: &str) -> String {
        format!("{SESSION_SCHEME}://{name}/{}/", join(&self.prefix, relative))
    }

    /// Human-readable path of `relative` under this location
    pub fn display(&self, relative: &str) -> String {
        let relative = relative.trim_matches('/');
        if relative.is_empty() {
            self.url.clone()
        } else if self.url.ends_with('/') {
            format!("{}{relative}", self.url)
        } else {
            format!("{}/{relative}", self.url)
        }
    }

    /// Store path of `relative` under this location
    pub fn path(&self, relative: &str) -> Result<ObjectPath> {
        let joined = join(&self.prefix, relative);
        ObjectPath::parse(&joined)
            .map_err(|e| Error::location(self.display(relative), e.to_string()))
    }

    /// Strip this location's prefix from a store path
    pub fn relative<'a>(&self, path: &'a ObjectPath) -> &'a str {
        let full: &str = path.as_ref();
        if self.prefix.is_empty() {
            return full;
        }
        full.strip_prefix(self.prefix.as_str())
            .map_or(full, |rest| rest.trim_start_matches('/'))
    }

    /// List every object under `relative`, sorted by path
    pub async fn list(&self, relative: &str) -> Result<Vec<ObjectMeta>> {
        let prefix = self.path(relative)?;
        let mut objects: Vec<ObjectMeta> = self.store.list(Some(&prefix)).try_collect().await?;
        objects.sort_by(|a, b| a.location.as_ref().cmp(b.location.as_ref()));
        Ok(objects)
    }

    /// Whether any object exists under `relative`
    pub async fn exists(&self, relative: &str) -> Result<bool> {
        Ok(!self.list(relative).await?.is_empty())
    }

    /// Read a whole object
    pub async fn read(&self, path: &ObjectPath) -> Result<Bytes> {
        let bytes = self.store.get(path).await?.bytes().await?;
        Ok(bytes)
    }

    /// Write bytes to `relative`, returning the display path
    pub async fn write(&self, relative: &str, data: Bytes) -> Result<String> {
        let path = self.path(relative)?;
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| {
                Error::output(format!("Failed to write {}: {e}", self.display(relative)))
            })?;
        Ok(self.display(relative))
    }

    /// Delete every object under `relative`, returning how many were removed
    pub async fn delete_prefix(&self, relative: &str) -> Result<usize> {
        let objects = self.list(relative).await?;
        for object in &objects {
            self.store.delete(&object.location).await?;
        }
        Ok(objects.len())
    }
}

/// Join a prefix and a relative path with a single separator
fn join(prefix: &str, relative: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let relative = relative.trim_matches('/');
    match (prefix.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{relative}"),
    }
}

/// Split `scheme://bucket/some/prefix/` into bucket and prefix
fn bucket_and_prefix(url: &str, parsed: &Url) -> Result<(String, String)> {
    let bucket = parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| Error::location(url, "missing bucket name"))?;
    let prefix = parsed.path().trim_matches('/').to_string();
    Ok((bucket.to_string(), prefix))
}
