use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageRef(PathBuf);

impl PageRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn extension(&self) -> &str {
        self.0
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .unwrap_or("png")
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    pub reference_text: String,
    pub threshold: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub page: PageRef,
    pub is_form_start: bool,
    pub min_distance: Option<usize>,
    pub matched_template: Option<usize>,
    pub extraction_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentCoordinate {
    pub form_index: usize,
    pub page_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedPage {
    pub page: PageRef,
    pub coordinate: SegmentCoordinate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedPage {
    pub page: PageRef,
    pub coordinate: SegmentCoordinate,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEntry {
    pub filename: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub page_count: usize,
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitCounts {
    pub page_count: usize,
    pub form_count: usize,
    pub boundary_page_count: usize,
    pub leading_page_count: usize,
    pub extraction_failure_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitPageRecord {
    pub source: String,
    pub destination: String,
    pub form_index: usize,
    pub page_index: usize,
    pub is_form_start: bool,
    pub min_distance: Option<usize>,
    pub matched_template: Option<usize>,
    pub extraction_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub dry_run: bool,
    pub input_dir: String,
    pub output_dir: String,
    pub worker_count: usize,
    pub template_count: usize,
    pub counts: SplitCounts,
    pub pages: Vec<SplitPageRecord>,
    pub warnings: Vec<String>,
}
