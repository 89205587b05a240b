use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::InventoryArgs;
use crate::model::{PageEntry, PageInventoryManifest, PageRef};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.input_dir, &args.extensions)?;

    if args.dry_run {
        info!(
            page_count = manifest.page_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.input_dir.join("page_inventory.json"));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(page_count = manifest.page_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(input_dir: &Path, extensions: &[String]) -> Result<PageInventoryManifest> {
    let pages = list_inputs(input_dir, extensions)?;

    let mut entries = Vec::with_capacity(pages.len());
    for page in &pages {
        let filename = page
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {page}"))?;

        entries.push(PageEntry {
            filename,
            sha256: sha256_file(page.path())?,
        });
    }

    Ok(PageInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: input_dir.display().to_string(),
        page_count: entries.len(),
        pages: entries,
    })
}

pub fn list_inputs(input_dir: &Path, extensions: &[String]) -> Result<Vec<PageRef>> {
    if !input_dir.is_dir() {
        bail!("missing input directory: {}", input_dir.display());
    }

    let mut paths = discover_pages(input_dir, extensions)?;
    paths.sort();

    Ok(paths.into_iter().map(PageRef::new).collect())
}

fn discover_pages(input_dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();

    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read {}", input_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", input_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        if has_page_extension(&path, extensions) {
            pages.push(path);
        }
    }

    Ok(pages)
}

fn has_page_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|wanted| ext.eq_ignore_ascii_case(wanted.trim_start_matches('.')))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn png() -> Vec<String> {
        vec!["png".to_string()]
    }

    #[test]
    fn list_inputs_filters_and_sorts_pages() {
        let dir = TempDir::new().unwrap();
        for name in ["003.png", "001.png", "notes.txt", "002.PNG"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let pages = list_inputs(dir.path(), &png()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|page| page.path().file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["001.png", "002.PNG", "003.png"]);
    }

    #[test]
    fn list_inputs_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = list_inputs(&dir.path().join("input"), &png()).unwrap_err();
        assert!(err.to_string().contains("missing input directory"));
    }

    #[test]
    fn extension_match_accepts_leading_dot() {
        let exts = vec![".tif".to_string(), "jpg".to_string()];
        assert!(has_page_extension(Path::new("a/b.TIF"), &exts));
        assert!(has_page_extension(Path::new("a/b.jpg"), &exts));
        assert!(!has_page_extension(Path::new("a/b.png"), &exts));
        assert!(!has_page_extension(Path::new("a/tif"), &exts));
    }

    #[test]
    fn build_manifest_hashes_each_page_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.png"), b"second").unwrap();
        fs::write(dir.path().join("a.png"), b"first").unwrap();

        let manifest = build_manifest(dir.path(), &png()).unwrap();
        assert_eq!(manifest.page_count, 2);
        assert_eq!(manifest.pages[0].filename, "a.png");
        assert_eq!(manifest.pages[1].filename, "b.png");
        assert_eq!(manifest.pages[0].sha256.len(), 64);
        assert_ne!(manifest.pages[0].sha256, manifest.pages[1].sha256);
    }
}
