use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub mint: String,
    #[serde(default)]
    pub transaction: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata_address: Option<String>,
    #[serde(default)]
    pub metadata_uri: Option<String>,
    #[serde(default)]
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub simulated: bool,
}

impl TokenRecord {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.symbol.to_lowercase().contains(needle)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub original_file: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, record: &TokenRecord) -> Result<PathBuf> {
        let stem = format!(
            "{}-{}",
            slug(&record.symbol),
            record.created_at.timestamp_millis()
        );
        write_json(&self.dir, &stem, record)
    }

    // Newest first. Files that fail to parse are skipped.
    pub fn list(&self, filter: Option<&str>) -> Result<Vec<TokenRecord>> {
        Ok(self.numbered(filter)?.into_iter().map(|(_, r)| r).collect())
    }

    // Positions count against the unfiltered listing so `resolve` agrees with them.
    pub fn numbered(&self, filter: Option<&str>) -> Result<Vec<(usize, TokenRecord)>> {
        let needle = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());

        let mut records = self.read_all()?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.mint.cmp(&b.mint)));
        Ok(records
            .into_iter()
            .enumerate()
            .map(|(i, r)| (i + 1, r))
            .filter(|(_, r)| needle.as_deref().is_none_or(|n| r.matches(n)))
            .collect())
    }

    pub fn find_by_mint(&self, mint: &str) -> Result<Option<TokenRecord>> {
        Ok(self.read_all()?.into_iter().find(|r| r.mint == mint))
    }

    pub fn resolve(&self, identifier: &str) -> Result<String> {
        let identifier = identifier.trim();
        if identifier.is_empty() || !identifier.chars().all(|c| c.is_ascii_digit()) {
            return Ok(identifier.to_string());
        }
        let records = self.list(None)?;
        let index: usize = identifier.parse().unwrap_or(0);
        match index.checked_sub(1).and_then(|i| records.get(i)) {
            Some(record) => Ok(record.mint.clone()),
            None => Err(StoreError::BadIndex {
                index,
                len: records.len(),
            }
            .into()),
        }
    }

    fn read_all(&self) -> Result<Vec<TokenRecord>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|text| serde_json::from_str::<TokenRecord>(&text).map_err(Into::into));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => debug!(path = %path.display(), error = %e, "skipping token file"),
            }
        }
        Ok(records)
    }
}

pub fn save_image_record(dir: &Path, record: &ImageRecord) -> Result<PathBuf> {
    let stem = Path::new(&record.original_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let stem = format!("{}-{}", slug(stem), record.timestamp.timestamp_millis());
    write_json(dir, &stem, record)
}

fn write_json<T: Serialize>(dir: &Path, stem: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut path = dir.join(format!("{stem}.json"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}-{n}.json"));
        n += 1;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches('-');
    if out.is_empty() {
        "token".into()
    } else {
        out.into()
    }
}
