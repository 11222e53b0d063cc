use std::{fs, path::Path};

use async_trait::async_trait;
use reqwest::{
    Client,
    header::CONTENT_TYPE,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{config::Settings, error::UploadError};

pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

const IMGBB_ENDPOINT: &str = "https://api.imgbb.com/1/upload";
const NFT_STORAGE_ENDPOINT: &str = "https://api.nft.storage/upload";
const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs";

#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HostedFile {
    pub url: String,
    pub display_url: Option<String>,
    pub cid: Option<String>,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upload(&self, file: &UploadFile) -> Result<HostedFile, UploadError>;
}

pub struct ImgBb {
    client: Client,
    api_key: String,
}

impl ImgBb {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

#[derive(Deserialize)]
struct ImgBbResponse {
    data: Option<ImgBbData>,
}

#[derive(Deserialize)]
struct ImgBbData {
    url: String,
    display_url: Option<String>,
}

#[async_trait]
impl ImageHost for ImgBb {
    fn name(&self) -> &'static str {
        "ImgBB"
    }

    async fn upload(&self, file: &UploadFile) -> Result<HostedFile, UploadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("image", part);

        let response: ImgBbResponse = self
            .client
            .post(IMGBB_ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let data = response.data.ok_or(UploadError::BadResponse {
            provider: "ImgBB",
            detail: "missing data".into(),
        })?;
        Ok(HostedFile {
            url: data.url,
            display_url: data.display_url,
            cid: None,
        })
    }
}

pub struct NftStorage {
    client: Client,
    api_key: String,
}

impl NftStorage {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

#[derive(Deserialize)]
struct NftStorageResponse {
    #[serde(default)]
    ok: bool,
    value: Option<NftStorageValue>,
}

#[derive(Deserialize)]
struct NftStorageValue {
    cid: String,
}

#[async_trait]
impl ImageHost for NftStorage {
    fn name(&self) -> &'static str {
        "NFT.Storage"
    }

    async fn upload(&self, file: &UploadFile) -> Result<HostedFile, UploadError> {
        let response: NftStorageResponse = self
            .client
            .post(NFT_STORAGE_ENDPOINT)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, file.mime.as_str())
            .body(file.bytes.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.value {
            Some(NftStorageValue { cid }) if response.ok => Ok(HostedFile {
                url: format!("{IPFS_GATEWAY}/{cid}"),
                display_url: Some(format!("ipfs://{cid}")),
                cid: Some(cid),
            }),
            _ => Err(UploadError::BadResponse {
                provider: "NFT.Storage",
                detail: "missing cid".into(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct UploadOutcome {
    pub url: String,
    pub primary: Option<HostedFile>,
    pub secondary: Option<HostedFile>,
}

pub struct Uploader {
    primary: Option<Box<dyn ImageHost>>,
    secondary: Option<Box<dyn ImageHost>>,
}

impl Uploader {
    pub fn new(primary: Option<Box<dyn ImageHost>>, secondary: Option<Box<dyn ImageHost>>) -> Self {
        Self { primary, secondary }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let client = Client::new();
        let primary = settings
            .imgbb_api_key
            .clone()
            .map(|key| Box::new(ImgBb::new(client.clone(), key)) as Box<dyn ImageHost>);
        let secondary = settings
            .nft_storage_api_key
            .clone()
            .map(|key| Box::new(NftStorage::new(client, key)) as Box<dyn ImageHost>);
        Self::new(primary, secondary)
    }

    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    pub async fn upload_image(&self, path: &Path) -> Result<UploadOutcome, UploadError> {
        let file = load_image(path)?;
        info!(mime = %file.mime, bytes = file.bytes.len(), "validated image");
        self.upload(&file).await
    }

    pub async fn upload(&self, file: &UploadFile) -> Result<UploadOutcome, UploadError> {
        if !self.is_configured() {
            return Err(UploadError::NoProviders);
        }

        let mut failures = Vec::new();
        let primary = try_host(self.primary.as_deref(), file, &mut failures).await;
        let secondary = try_host(self.secondary.as_deref(), file, &mut failures).await;

        let url = secondary
            .as_ref()
            .or(primary.as_ref())
            .map(|hosted| hosted.url.clone())
            .ok_or_else(|| UploadError::AllFailed(failures.join("; ")))?;

        Ok(UploadOutcome {
            url,
            primary,
            secondary,
        })
    }
}

async fn try_host(
    host: Option<&dyn ImageHost>,
    file: &UploadFile,
    failures: &mut Vec<String>,
) -> Option<HostedFile> {
    let host = host?;
    info!(provider = host.name(), file = %file.file_name, "uploading");
    match host.upload(file).await {
        Ok(hosted) => {
            info!(provider = host.name(), url = %hosted.url, "upload succeeded");
            Some(hosted)
        }
        Err(e) => {
            warn!(provider = host.name(), error = %e, "upload failed");
            failures.push(format!("{}: {e}", host.name()));
            None
        }
    }
}

pub fn image_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .iter()
        .find(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
}

pub fn load_image(path: &Path) -> Result<UploadFile, UploadError> {
    if !path.is_file() {
        return Err(UploadError::NotFound(path.to_path_buf()));
    }
    let mime = image_mime(path).ok_or_else(|| UploadError::NotAnImage(path.to_path_buf()))?;
    let size = fs::metadata(path)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(UploadFile {
        file_name,
        mime,
        bytes: fs::read(path)?,
    })
}
