use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail, ensure};
use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::cli::SplitArgs;
use crate::commands::inventory;
use crate::model::{
    ClassificationResult, MaterializedPage, PageRef, SegmentCoordinate, SegmentedPage,
    SplitCounts, SplitPageRecord, SplitRunManifest,
};
use crate::templates::{TemplateSet, load_templates};
use crate::util::{
    copy_file, ensure_directory, now_utc_string, utc_compact_string, write_json_pretty,
};

mod classifier;
mod extract;
mod materialize;
mod pool;
mod run;
mod segment;

pub use classifier::PageClassifier;
pub use extract::{TesseractExtractor, TextExtractor};
pub use run::run;

use materialize::*;
use pool::*;
use segment::*;
