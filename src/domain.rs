// GitHub Gists API Documentation: https://docs.github.com/en/rest/gists/gists
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::Deserialize;

use crate::id::GistId;

#[derive(Clone, Debug, PartialEq)]
pub struct Gist {
    pub id: GistId,
    pub description: CompactString,
    pub files: HashMap<CompactString, GistFile>,
    pub owner: Option<CompactString>,
    pub public: bool,
    pub comments: u32,
    pub url: CompactString,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GistFile {
    pub filename: CompactString,
    pub language: Option<CompactString>,
    pub mime_type: Option<CompactString>,
    pub size: u64,
    pub raw_url: Option<CompactString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GistDto {
    pub id: GistId,
    pub description: Option<CompactString>,
    #[serde(default)]
    pub files: HashMap<CompactString, GistFileDto>,
    pub owner: Option<OwnerDto>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub html_url: CompactString,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GistFileDto {
    pub filename: Option<CompactString>,
    pub language: Option<CompactString>,
    #[serde(rename = "type")]
    pub mime_type: Option<CompactString>,
    #[serde(default)]
    pub size: u64,
    pub raw_url: Option<CompactString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerDto {
    pub login: CompactString,
}

impl Gist {
    /// Filenames in lexical order; the API makes no ordering promise.
    pub fn filenames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.keys().map(CompactString::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn owner_or_anonymous(&self) -> &str {
        self.owner.as_deref().unwrap_or("anonymous")
    }
}

impl From<GistDto> for Gist {
    fn from(g: GistDto) -> Self {
        let files = g
            .files
            .into_iter()
            .map(|(name, file)| {
                let file = GistFile::from_dto(name.clone(), file);
                (name, file)
            })
            .collect();

        Self {
            id: g.id,
            description: g.description.unwrap_or_default(),
            files,
            owner: g.owner.map(|o| o.login),
            public: g.public,
            comments: g.comments,
            url: g.html_url,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

impl GistFile {
    fn from_dto(key: CompactString, f: GistFileDto) -> Self {
        Self {
            filename: f.filename.unwrap_or(key),
            language: f.language,
            mime_type: f.mime_type,
            size: f.size,
            raw_url: f.raw_url,
        }
    }
}
