//! Asset files known to the workspace.
//!
//! Files are registered by the host; their contents are never read here.
//! The extension decides which struct type a file populates: `hero.png`
//! becomes `image.hero`, `Lora-Bold.ttf` becomes `font.Lora-Bold`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Struct type populated by files with this extension.
pub fn asset_type(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "bmp" => Some("image"),
        "mp3" | "ogg" | "wav" | "flac" | "m4a" | "aac" => Some("audio"),
        "ttf" | "otf" | "woff" | "woff2" => Some("font"),
        _ => None,
    }
}

/// One registered file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub uri: String,
    /// Struct type, `None` for files that are not assets.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// File stem, the struct name.
    pub name: String,
    pub ext: String,
    /// Path the runtime loads the asset from.
    pub src: String,
    /// Text content, for text files the host chose to register.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl FileInfo {
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let file_name = uri.rsplit(['/', '\\']).next().unwrap_or(&uri);
        let (name, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            _ => (file_name.to_string(), String::new()),
        };
        FileInfo {
            type_name: asset_type(&ext).map(str::to_string),
            src: uri.clone(),
            uri,
            name,
            ext,
            text: None,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Struct properties the file itself provides.
    pub fn metadata(&self) -> Value {
        let mut object = Map::new();
        object.insert("src".to_string(), Value::from(self.src.clone()));
        Value::Object(object)
    }
}

/// Registered files by uri.
#[derive(Clone, Debug, Default)]
pub struct FileRegistry {
    files: BTreeMap<String, FileInfo>,
    /// Bumped on every successful change.
    generation: u64,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new file. Returns `false` if the uri is already known.
    pub fn add(&mut self, file: FileInfo) -> bool {
        if self.files.contains_key(&file.uri) {
            return false;
        }
        self.files.insert(file.uri.clone(), file);
        self.generation += 1;
        true
    }

    /// Replace a known file. Returns `false` if the uri is unknown.
    pub fn update(&mut self, file: FileInfo) -> bool {
        match self.files.get_mut(&file.uri) {
            Some(existing) => {
                *existing = file;
                self.generation += 1;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, uri: &str) -> bool {
        let removed = self.files.remove(uri).is_some();
        if removed {
            self.generation += 1;
        }
        removed
    }

    pub fn get(&self, uri: &str) -> Option<&FileInfo> {
        self.files.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.files.contains_key(uri)
    }

    /// Files in uri order.
    pub fn iter(&self) -> impl Iterator<Item = &FileInfo> {
        self.files.values()
    }

    /// Asset files only.
    pub fn assets(&self) -> impl Iterator<Item = &FileInfo> {
        self.files.values().filter(|file| file.type_name.is_some())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
