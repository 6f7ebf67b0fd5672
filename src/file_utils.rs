use anyhow::{Result, Context};
use std::fs;
use std::fmt;
use std::path::Path;

// @module: File inspection for uploaded media and subtitle files

// @const: Audio extensions and their MIME types
const AUDIO_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("weba", "audio/webm"),
    ("aif", "audio/aiff"),
    ("aiff", "audio/aiff"),
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read a file into memory
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    // @returns: MIME type guessed from the extension, if known
    pub fn mime_type<P: AsRef<Path>>(path: P) -> Option<&'static str> {
        let ext = path.as_ref().extension()?.to_string_lossy().to_lowercase();
        if ext == "srt" {
            return Some("application/x-subrip");
        }
        AUDIO_TYPES
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, mime)| *mime)
    }

    /// Describe a file the way the upload form shows it
    pub fn describe<P: AsRef<Path>>(path: P) -> Result<FileInfo> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("Unknown file"));

        Ok(FileInfo {
            name,
            size_bytes: metadata.len(),
            mime_type: Self::mime_type(path).map(str::to_string),
        })
    }
}

/// Name, size and type of a selected file
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: Option<String>,
}

impl FileInfo {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }

    /// Whether the type marks this file as audio
    pub fn is_audio(&self) -> bool {
        self.mime_type.as_deref().is_some_and(|mime| mime.starts_with("audio"))
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({:.2} KB, {})",
            self.name,
            self.size_kb(),
            self.mime_type.as_deref().unwrap_or("Unknown")
        )
    }
}
