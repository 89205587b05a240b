use super::*;

pub fn run(args: SplitArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    info!(
        input_dir = %args.input_dir.display(),
        output_dir = %args.output_dir.display(),
        run_id = %run_id,
        dry_run = args.dry_run,
        "starting split"
    );

    let templates = load_templates(args.templates.as_deref())?;
    let pages = inventory::list_inputs(&args.input_dir, &args.extensions)?;
    let extractor = TesseractExtractor::new(&args.ocr_lang)?;
    let workers = args.workers.unwrap_or_else(default_worker_count);

    let leftover = existing_output_pages(&args.output_dir)?;
    if !leftover.is_empty() {
        warn!(
            pages = leftover.len(),
            output_dir = %args.output_dir.display(),
            "output directory already holds pages from an earlier run; they may be overwritten or mixed in"
        );
    }

    let outcome = split_pages(
        &pages,
        &templates,
        &extractor,
        &LocalPageStore,
        &args.output_dir,
        workers,
        args.dry_run,
    )?;

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = SplitRunManifest {
            manifest_version: 1,
            run_id: run_id.clone(),
            status: "completed".to_string(),
            started_at,
            updated_at: now_utc_string(),
            dry_run: args.dry_run,
            input_dir: args.input_dir.display().to_string(),
            output_dir: args.output_dir.display().to_string(),
            worker_count: outcome.worker_count,
            template_count: templates.len(),
            counts: outcome.counts.clone(),
            pages: outcome.records,
            warnings: outcome.warnings,
        };
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote split run manifest");
    }

    info!(
        pages = outcome.counts.page_count,
        forms = outcome.counts.form_count,
        extraction_failures = outcome.counts.extraction_failure_count,
        "split completed"
    );

    Ok(())
}

#[derive(Debug)]
pub struct SplitOutcome {
    pub worker_count: usize,
    pub counts: SplitCounts,
    pub records: Vec<SplitPageRecord>,
    pub warnings: Vec<String>,
}

pub fn split_pages<E, S>(
    pages: &[PageRef],
    templates: &TemplateSet,
    extractor: &E,
    store: &S,
    output_root: &Path,
    workers: usize,
    dry_run: bool,
) -> Result<SplitOutcome>
where
    E: TextExtractor + ?Sized,
    S: PageStore + ?Sized,
{
    let worker_count = workers.clamp(1, pages.len().max(1));
    info!(pages = pages.len(), workers = worker_count, "classifying pages");

    let classifier = PageClassifier::new(templates);
    let results = classify_all(pages, &classifier, extractor, worker_count)?;
    let segmented = segment(pages, &results);

    let mut warnings = Vec::new();
    let leading = leading_page_count(&segmented);
    if leading > 0 {
        warn!(
            pages = leading,
            "pages before the first detected boundary were placed in form0"
        );
        warnings.push(format!(
            "{leading} page(s) precede the first detected boundary and were placed in form0"
        ));
    }

    let extraction_failures: Vec<&ClassificationResult> = pages
        .iter()
        .filter_map(|page| results.get(page))
        .filter(|result| result.extraction_error.is_some())
        .collect();
    for failure in &extraction_failures {
        warnings.push(format!(
            "text extraction failed for {}: {}",
            failure.page,
            failure.extraction_error.as_deref().unwrap_or_default()
        ));
    }

    let placed: Vec<MaterializedPage> = if dry_run {
        segmented
            .iter()
            .map(|entry| {
                let destination =
                    output_path(output_root, entry.coordinate, entry.page.extension());
                info!(
                    source = %entry.page,
                    destination = %destination.display(),
                    "dry-run: would copy page"
                );
                MaterializedPage {
                    page: entry.page.clone(),
                    coordinate: entry.coordinate,
                    destination,
                }
            })
            .collect()
    } else {
        materialize(store, output_root, &segmented)?
    };

    let records = placed
        .into_iter()
        .map(|placed| {
            let result = results.get(&placed.page);
            SplitPageRecord {
                source: placed.page.to_string(),
                destination: placed.destination.display().to_string(),
                form_index: placed.coordinate.form_index,
                page_index: placed.coordinate.page_index,
                is_form_start: result.is_some_and(|result| result.is_form_start),
                min_distance: result.and_then(|result| result.min_distance),
                matched_template: result.and_then(|result| result.matched_template),
                extraction_error: result.and_then(|result| result.extraction_error.clone()),
            }
        })
        .collect::<Vec<_>>();

    let boundary_page_count = records.iter().filter(|record| record.is_form_start).count();
    let form_count = boundary_page_count + usize::from(leading > 0);

    Ok(SplitOutcome {
        worker_count,
        counts: SplitCounts {
            page_count: pages.len(),
            form_count,
            boundary_page_count,
            leading_page_count: leading,
            extraction_failure_count: extraction_failures.len(),
        },
        records,
        warnings,
    })
}
