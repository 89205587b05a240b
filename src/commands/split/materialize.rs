use super::*;

pub trait PageStore {
    // Must succeed when `path` already exists.
    fn ensure_dir(&self, path: &Path) -> Result<()>;
    fn copy_bytes(&self, src: &Path, dst: &Path) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPageStore;

impl PageStore for LocalPageStore {
    fn ensure_dir(&self, path: &Path) -> Result<()> {
        ensure_directory(path)
    }

    fn copy_bytes(&self, src: &Path, dst: &Path) -> Result<()> {
        copy_file(src, dst)
    }
}

pub fn output_path(output_root: &Path, coordinate: SegmentCoordinate, extension: &str) -> PathBuf {
    output_root
        .join(format!("form{}", coordinate.form_index))
        .join(format!("page-{}.{}", coordinate.page_index, extension))
}

#[derive(Debug, Clone)]
pub struct OutputPathParser {
    file_name: Regex,
    form_dir: Regex,
}

impl OutputPathParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            file_name: Regex::new(r"^page-(\d+)\.[^.]+$")
                .context("failed to compile output page regex")?,
            form_dir: Regex::new(r"^form(\d+)$").context("failed to compile output form regex")?,
        })
    }

    pub fn parse(&self, path: &Path) -> Option<SegmentCoordinate> {
        let page_index = self
            .file_name
            .captures(path.file_name()?.to_str()?)?
            .get(1)?
            .as_str()
            .parse()
            .ok()?;
        let form_index = self
            .form_dir
            .captures(path.parent()?.file_name()?.to_str()?)?
            .get(1)?
            .as_str()
            .parse()
            .ok()?;

        Some(SegmentCoordinate {
            form_index,
            page_index,
        })
    }
}

pub fn existing_output_pages(output_root: &Path) -> Result<Vec<SegmentCoordinate>> {
    if !output_root.is_dir() {
        return Ok(Vec::new());
    }

    let parser = OutputPathParser::new()?;
    let mut found = Vec::new();

    let forms = fs::read_dir(output_root)
        .with_context(|| format!("failed to read {}", output_root.display()))?;
    for form in forms {
        let form = form
            .with_context(|| format!("failed to read entry in {}", output_root.display()))?
            .path();
        if !form.is_dir() {
            continue;
        }

        let pages =
            fs::read_dir(&form).with_context(|| format!("failed to read {}", form.display()))?;
        for page in pages {
            let page =
                page.with_context(|| format!("failed to read entry in {}", form.display()))?;
            if let Some(coordinate) = parser.parse(&page.path()) {
                found.push(coordinate);
            }
        }
    }

    found.sort_by_key(|coordinate| (coordinate.form_index, coordinate.page_index));
    Ok(found)
}

// The first failing directory or copy aborts the pass.
pub fn materialize<S>(
    store: &S,
    output_root: &Path,
    segmented: &[SegmentedPage],
) -> Result<Vec<MaterializedPage>>
where
    S: PageStore + ?Sized,
{
    let mut written = Vec::with_capacity(segmented.len());

    for entry in segmented {
        let destination = output_path(output_root, entry.coordinate, entry.page.extension());
        if let Some(dir) = destination.parent() {
            store
                .ensure_dir(dir)
                .with_context(|| format!("failed to prepare output for page {}", entry.page))?;
        }

        info!(
            source = %entry.page,
            destination = %destination.display(),
            "copying page"
        );
        store.copy_bytes(entry.page.path(), &destination).with_context(|| {
            format!(
                "failed to copy page {} to {}",
                entry.page,
                destination.display()
            )
        })?;

        written.push(MaterializedPage {
            page: entry.page.clone(),
            coordinate: entry.coordinate,
            destination,
        });
    }

    Ok(written)
}
