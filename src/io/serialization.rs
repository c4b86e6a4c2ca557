// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Review data serialization and deserialization.
//!
//! This module handles exporting and importing review data in YAML
//! and JSON formats, picking the format from the file extension.

use crate::models::review::ReviewData;
use anyhow::{bail, Result};
use std::path::Path;

/// File formats a review can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFormat {
    Yaml,
    Json,
}

impl ReviewFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|s| s.to_str());
        match extension {
            Some("yaml") | Some("yml") => Ok(ReviewFormat::Yaml),
            Some("json") => Ok(ReviewFormat::Json),
            _ => bail!("Unsupported file extension: {:?}", extension),
        }
    }
}

/// Serialize review data to a string.
pub fn to_string(data: &ReviewData, format: ReviewFormat) -> Result<String> {
    Ok(match format {
        ReviewFormat::Yaml => serde_yaml::to_string(data)?,
        ReviewFormat::Json => serde_json::to_string_pretty(data)?,
    })
}

/// Parse review data from a string.
pub fn from_str(text: &str, format: ReviewFormat) -> Result<ReviewData> {
    Ok(match format {
        ReviewFormat::Yaml => serde_yaml::from_str(text)?,
        ReviewFormat::Json => serde_json::from_str(text)?,
    })
}

/// Export review data, choosing the format from the extension.
pub fn export_review(data: &ReviewData, path: &Path) -> Result<()> {
    let text = to_string(data, ReviewFormat::from_path(path)?)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Import review data, choosing the format from the extension.
pub fn import_review(path: &Path) -> Result<ReviewData> {
    let format = ReviewFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    from_str(&text, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{AnnotationSet, Point, Stroke, StrokeColor, Thickness};
    use std::path::PathBuf;

    fn sample() -> ReviewData {
        let mut annotations = AnnotationSet::new();
        let frame = annotations.entry(2);
        let mut stroke = Stroke::new(Point::new(10.0, 20.0), StrokeColor::Yellow, Thickness::ALL[2]);
        stroke.add_point(Point::new(12.5, 22.0));
        frame.drawings.push(stroke);
        frame.comment = "front foot".to_string();
        ReviewData {
            video_id: "nets/2025-03-01 drive".to_string(),
            total_seconds: 5,
            annotations,
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ReviewFormat::from_path(&PathBuf::from("a.yml")).unwrap(), ReviewFormat::Yaml);
        assert_eq!(ReviewFormat::from_path(&PathBuf::from("a.json")).unwrap(), ReviewFormat::Json);
        assert!(ReviewFormat::from_path(&PathBuf::from("a.txt")).is_err());
    }

    #[test]
    fn test_yaml_keeps_palette_names() {
        let yaml = to_string(&sample(), ReviewFormat::Yaml).unwrap();
        assert!(yaml.contains("color: yellow"));
        assert!(yaml.contains("thickness: 6"));
        assert_eq!(from_str(&yaml, ReviewFormat::Yaml).unwrap(), sample());
    }

    #[test]
    fn test_export_import_file() {
        let path = std::env::temp_dir().join(format!("crease-review-{}.json", std::process::id()));
        export_review(&sample(), &path).unwrap();
        let imported = import_review(&path).unwrap();
        assert_eq!(imported, sample());
        let _ = std::fs::remove_file(path);
    }
}
