use std::sync::{Mutex, mpsc};
use std::thread;

use super::*;

pub type ClassificationMap = HashMap<PageRef, ClassificationResult>;

pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

// Workers only send results; the calling thread is the sole writer of the map.
pub fn classify_all<E>(
    pages: &[PageRef],
    classifier: &PageClassifier<'_>,
    extractor: &E,
    workers: usize,
) -> Result<ClassificationMap>
where
    E: TextExtractor + ?Sized,
{
    let mut results = ClassificationMap::with_capacity(pages.len());
    if pages.is_empty() {
        return Ok(results);
    }

    let workers = workers.clamp(1, pages.len());
    let (work_tx, work_rx) = mpsc::channel::<&PageRef>();
    let work_rx = Mutex::new(work_rx);
    let (result_tx, result_rx) = mpsc::channel::<ClassificationResult>();

    thread::scope(|scope| -> Result<()> {
        for worker in 0..workers {
            let work_rx = &work_rx;
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                loop {
                    let next = match work_rx.lock() {
                        Ok(queue) => queue.recv(),
                        Err(_) => break,
                    };
                    // Queue closed and empty.
                    let Ok(page) = next else { break };

                    let result = classify_page(page, classifier, extractor);
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
                debug!(worker, "classification worker finished");
            });
        }
        drop(result_tx);

        for page in pages {
            if work_tx.send(page).is_err() {
                bail!("classification workers exited before the queue was drained");
            }
        }
        drop(work_tx);

        for result in result_rx {
            let page = result.page.clone();
            ensure!(
                results.insert(page.clone(), result).is_none(),
                "page classified twice: {page}"
            );
        }

        Ok(())
    })?;

    for page in pages {
        ensure!(
            results.contains_key(page),
            "page has no classification result: {page}"
        );
    }

    Ok(results)
}

fn classify_page<E>(
    page: &PageRef,
    classifier: &PageClassifier<'_>,
    extractor: &E,
) -> ClassificationResult
where
    E: TextExtractor + ?Sized,
{
    match extractor.extract_text(page) {
        Ok(text) => {
            let verdict = classifier.evaluate(&text);
            debug!(
                page = %page,
                is_form_start = verdict.is_form_start,
                min_distance = ?verdict.min_distance,
                matched_line = ?verdict.matched_line,
                "classified page"
            );
            ClassificationResult {
                page: page.clone(),
                is_form_start: verdict.is_form_start,
                min_distance: verdict.min_distance,
                matched_template: verdict.matched_template,
                extraction_error: None,
            }
        }
        Err(error) => {
            let error = format!("{error:#}");
            warn!(
                page = %page,
                error = %error,
                "text extraction failed; treating page as continuation"
            );
            ClassificationResult {
                page: page.clone(),
                is_form_start: false,
                min_distance: None,
                matched_template: None,
                extraction_error: Some(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::model::Template;

    use super::*;

    struct MapExtractor {
        texts: HashMap<PageRef, String>,
        calls: AtomicUsize,
    }

    impl TextExtractor for MapExtractor {
        fn extract_text(&self, page: &PageRef) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.texts.get(page) {
                Some(text) => Ok(text.clone()),
                None => bail!("unreadable image"),
            }
        }
    }

    fn hello_templates() -> TemplateSet {
        TemplateSet::new(vec![Template {
            reference_text: "HELLO".to_string(),
            threshold: 2,
        }])
        .unwrap()
    }

    fn fixture(count: usize) -> (Vec<PageRef>, MapExtractor) {
        let pages: Vec<PageRef> = (0..count)
            .map(|index| PageRef::new(format!("input/{index:03}.png")))
            .collect();
        let texts = pages
            .iter()
            .enumerate()
            // every seventh page is unreadable
            .filter(|(index, _)| index % 7 != 6)
            .map(|(index, page)| {
                let body = if index % 3 == 0 { "HELLO" } else { "body text" };
                (page.clone(), format!("header\n{body}\n"))
            })
            .collect();
        (
            pages,
            MapExtractor {
                texts,
                calls: AtomicUsize::new(0),
            },
        )
    }

    #[test]
    fn every_page_is_classified_exactly_once() {
        let templates = hello_templates();
        let classifier = PageClassifier::new(&templates);
        let (pages, extractor) = fixture(40);

        let results = classify_all(&pages, &classifier, &extractor, 4).unwrap();

        assert_eq!(results.len(), pages.len());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), pages.len());
        let keys: HashSet<_> = results.keys().cloned().collect();
        let expected: HashSet<_> = pages.iter().cloned().collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn queue_holding_far_more_pages_than_workers_drains_fully() {
        let templates = hello_templates();
        let classifier = PageClassifier::new(&templates);
        let (pages, extractor) = fixture(500);

        let results = classify_all(&pages, &classifier, &extractor, 2).unwrap();

        assert_eq!(results.len(), 500);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 500);
        assert!(pages.iter().all(|page| results[page].page == *page));
    }

    #[test]
    fn single_worker_and_many_workers_agree() {
        let templates = hello_templates();
        let classifier = PageClassifier::new(&templates);
        let (pages, extractor) = fixture(50);

        let sequential = classify_all(&pages, &classifier, &extractor, 1).unwrap();
        let parallel = classify_all(&pages, &classifier, &extractor, 8).unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn extraction_failure_is_recorded_as_continuation() {
        let templates = hello_templates();
        let classifier = PageClassifier::new(&templates);
        let (pages, extractor) = fixture(7);

        let results = classify_all(&pages, &classifier, &extractor, 3).unwrap();

        let failed = &results[&pages[6]];
        assert!(!failed.is_form_start);
        assert!(
            failed
                .extraction_error
                .as_deref()
                .is_some_and(|error| error.contains("unreadable image"))
        );
        assert!(results[&pages[0]].is_form_start);
        assert!(results[&pages[3]].is_form_start);
        assert!(!results[&pages[1]].is_form_start);
    }

    #[test]
    fn empty_input_yields_empty_map() {
        let templates = hello_templates();
        let classifier = PageClassifier::new(&templates);
        let (_, extractor) = fixture(0);

        let results = classify_all(&[], &classifier, &extractor, 4).unwrap();
        assert!(results.is_empty());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn zero_workers_is_treated_as_one() {
        let templates = hello_templates();
        let classifier = PageClassifier::new(&templates);
        let (pages, extractor) = fixture(5);

        let results = classify_all(&pages, &classifier, &extractor, 0).unwrap();
        assert_eq!(results.len(), 5);
    }
}
