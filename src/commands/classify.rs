use anyhow::{Result, bail};
use tracing::info;

use crate::cli::ClassifyArgs;
use crate::commands::split::{PageClassifier, TesseractExtractor, TextExtractor};
use crate::model::PageRef;
use crate::templates::load_templates;

pub fn run(args: ClassifyArgs) -> Result<()> {
    if !args.page.is_file() {
        bail!("page does not exist: {}", args.page.display());
    }

    let templates = load_templates(args.templates.as_deref())?;
    let extractor = TesseractExtractor::new(&args.ocr_lang)?;
    let page = PageRef::new(args.page);

    let text = extractor.extract_text(&page)?;
    let verdict = PageClassifier::new(&templates).evaluate(&text);

    let matched_reference = verdict
        .matched_template
        .and_then(|index| templates.iter().nth(index))
        .map(|template| template.reference_text.as_str())
        .unwrap_or_default();

    info!(
        page = %page,
        is_form_start = verdict.is_form_start,
        min_distance = ?verdict.min_distance,
        matched_template = %matched_reference,
        matched_line = %verdict.matched_line.unwrap_or_default(),
        "page classified"
    );

    Ok(())
}
