//! Loading input documents and writing the bundle

use std::path::Path;

use lopdf::Document;

use crate::raster::image_to_document;
use crate::types::{AppendixError, Result};

/// What an input file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
}

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp"];

/// Detect the format from magic bytes, then from the file extension
pub fn detect_kind(name: &str, bytes: &[u8]) -> Option<SourceKind> {
    let head = &bytes[..bytes.len().min(1024)];
    if head.windows(5).any(|w| w == b"%PDF-") {
        return Some(SourceKind::Pdf);
    }
    let is_image = head.starts_with(b"\x89PNG\r\n\x1a\n")
        || head.starts_with(&[0xFF, 0xD8, 0xFF])
        || head.starts_with(b"II*\0")
        || head.starts_with(b"MM\0*")
        || head.starts_with(b"BM");
    if is_image {
        return Some(SourceKind::Image);
    }

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())?;
    if extension == "pdf" {
        Some(SourceKind::Pdf)
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Some(SourceKind::Image)
    } else {
        None
    }
}

/// An input normalised to PDF
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub document: Document,
    pub page_count: usize,
    /// Serialised form of `document`, kept for project files
    pub pdf_bytes: Vec<u8>,
}

impl SourceDocument {
    /// Parse `bytes` as a PDF or a raster image
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let unreadable = |reason: String| AppendixError::UnreadableDocument {
            name: name.clone(),
            reason,
        };

        let kind = detect_kind(&name, &bytes)
            .ok_or_else(|| unreadable("unsupported file format".to_string()))?;

        let (document, pdf_bytes) = match kind {
            SourceKind::Pdf => {
                let document = Document::load_mem(&bytes).map_err(|e| unreadable(e.to_string()))?;
                if document.is_encrypted() {
                    return Err(unreadable("document is encrypted".to_string()));
                }
                if document.get_pages().is_empty() {
                    return Err(unreadable("document has no pages".to_string()));
                }
                (document, bytes)
            }
            SourceKind::Image => {
                let mut document =
                    image_to_document(&bytes).map_err(|e| unreadable(e.to_string()))?;
                let pdf_bytes = document_to_bytes(&mut document)?;
                (document, pdf_bytes)
            }
        };

        let page_count = document.get_pages().len();
        log::debug!("Loaded '{}' ({:?}, {} pages)", name, kind, page_count);
        Ok(Self {
            name,
            document,
            page_count,
            pdf_bytes,
        })
    }
}

/// Serialise a document
pub fn document_to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Load one input file, named after its file name
pub async fn load_source(path: impl AsRef<Path>) -> Result<SourceDocument> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let source = tokio::task::spawn_blocking(move || SourceDocument::from_bytes(name, bytes)).await??;
    Ok(source)
}

/// Load several input files, in order
pub async fn load_sources(paths: &[impl AsRef<Path>]) -> Result<Vec<SourceDocument>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(load_source(path).await?);
    }
    Ok(sources)
}

/// Write finished bundle bytes
pub async fn save_pdf(bytes: Vec<u8>, path: impl AsRef<Path>) -> Result<()> {
    tokio::fs::write(path.as_ref(), bytes).await?;
    Ok(())
}
