//! Saved bundle projects
//!
//! A project file is JSON holding the layout settings and every input
//! document as base64 PDF bytes, so a bundle can be regenerated later
//! without the original files.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::generate::{Appendix, GenerationJob};
use crate::io::SourceDocument;
use crate::types::{AppendixError, LayoutSettings, NumberingSystem, Result, Template};

pub const PROJECT_VERSION: &str = "2.2";

fn default_true() -> bool {
    true
}

/// One stored input document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub pages: usize,
    pub pdf_base64: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub numbering: NumberingSystem,
    #[serde(default)]
    pub template: Template,
    #[serde(default = "default_true")]
    pub add_marking: bool,
    #[serde(default)]
    pub main_index: usize,
    #[serde(default)]
    pub files: Vec<ProjectEntry>,
}

impl ProjectFile {
    /// Snapshot a job. The main document is stored first.
    pub fn from_job(job: &GenerationJob) -> Self {
        let entry = |title: &str, source: &SourceDocument| ProjectEntry {
            name: source.name.clone(),
            title: title.to_string(),
            pages: source.page_count,
            pdf_base64: STANDARD.encode(&source.pdf_bytes),
        };

        let mut files = Vec::with_capacity(job.appendices.len() + 1);
        files.push(entry("", &job.main));
        files.extend(job.appendices.iter().map(|a| entry(&a.title, &a.source)));

        Self {
            version: PROJECT_VERSION.to_string(),
            created: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            numbering: job.settings.numbering,
            template: job.settings.template,
            add_marking: job.settings.stamp_appendices,
            main_index: 0,
            files,
        }
    }

    pub fn settings(&self) -> LayoutSettings {
        LayoutSettings {
            numbering: self.numbering,
            template: self.template,
            stamp_appendices: self.add_marking,
        }
    }

    /// Decode every stored document. `main_index` picks the main document;
    /// the rest become appendices in stored order.
    pub fn into_job(self) -> Result<GenerationJob> {
        let settings = self.settings();
        if self.files.is_empty() {
            return Err(AppendixError::NoMainDocument);
        }
        let main_index = if self.main_index < self.files.len() {
            self.main_index
        } else {
            log::warn!(
                "Project main index {} out of range, using the first file",
                self.main_index
            );
            0
        };

        let mut main = None;
        let mut appendices = Vec::with_capacity(self.files.len() - 1);
        for (index, file) in self.files.into_iter().enumerate() {
            let bytes = STANDARD.decode(file.pdf_base64.as_bytes()).map_err(|e| {
                AppendixError::Project(format!("'{}' has invalid base64 data: {}", file.name, e))
            })?;
            let source = SourceDocument::from_bytes(file.name, bytes)?;
            if source.page_count != file.pages {
                log::warn!(
                    "'{}' was saved with {} pages but has {}",
                    source.name,
                    file.pages,
                    source.page_count
                );
            }
            if index == main_index {
                main = Some(source);
            } else {
                appendices.push(Appendix::new(file.title, source));
            }
        }

        let main = main.ok_or(AppendixError::NoMainDocument)?;
        Ok(GenerationJob {
            main,
            appendices,
            settings,
        })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| AppendixError::Project(format!("Failed to parse project: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppendixError::Project(format!("Failed to serialize project: {}", e)))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_json(&bytes)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, self.to_json()?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_legacy_labels() {
        let json = r#"{
            "version": "2.2",
            "created": "2024-01-01T10:00:00.000000",
            "numbering": "I II III (Roman)",
            "template": "מודרני (Modern)",
            "add_marking": false,
            "main_index": 1,
            "files": []
        }"#;
        let project = ProjectFile::from_json(json.as_bytes()).unwrap();
        assert_eq!(project.numbering, NumberingSystem::Roman);
        assert_eq!(project.template, Template::Modern);
        assert!(!project.settings().stamp_appendices);
        assert_eq!(project.main_index, 1);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let project = ProjectFile::from_json(br#"{"version": "2.2"}"#).unwrap();
        assert_eq!(project.settings(), LayoutSettings::default());
        assert!(project.files.is_empty());
    }

    #[test]
    fn test_writes_lowercase_enums() {
        let project = ProjectFile::from_json(br#"{"version": "2.2", "numbering": "arabic"}"#).unwrap();
        let json = project.to_json().unwrap();
        assert!(json.contains(r#""numbering": "arabic""#));
        assert!(json.contains(r#""template": "classic""#));
    }

    #[test]
    fn test_empty_project_has_no_main_document() {
        let project = ProjectFile::from_json(br#"{"version": "2.2"}"#).unwrap();
        assert!(matches!(project.into_job(), Err(AppendixError::NoMainDocument)));
    }

    #[test]
    fn test_bad_base64_is_reported() {
        let json = r#"{"version": "2.2", "files": [
            {"name": "a.pdf", "title": "", "pages": 1, "pdf_base64": "***"}
        ]}"#;
        let err = ProjectFile::from_json(json.as_bytes()).unwrap().into_job().unwrap_err();
        assert!(matches!(err, AppendixError::Project(_)));
    }
}
