use super::*;

/// Assigns `(form, page)` coordinates by walking `pages` in document order.
///
/// A form-start page bumps the form index and restarts page numbering before
/// it is assigned, so it becomes page 1 of the new form. Pages ahead of the
/// first boundary stay in form 0. A page with no entry in `results` is taken
/// as a continuation page.
pub fn segment(pages: &[PageRef], results: &ClassificationMap) -> Vec<SegmentedPage> {
    let mut form_index = 0;
    let mut page_index = 1;

    pages
        .iter()
        .map(|page| {
            let is_form_start = results
                .get(page)
                .is_some_and(|result| result.is_form_start);
            if is_form_start {
                form_index += 1;
                page_index = 1;
            }

            let coordinate = SegmentCoordinate {
                form_index,
                page_index,
            };
            page_index += 1;

            SegmentedPage {
                page: page.clone(),
                coordinate,
            }
        })
        .collect()
}

pub fn leading_page_count(segmented: &[SegmentedPage]) -> usize {
    segmented
        .iter()
        .take_while(|entry| entry.coordinate.form_index == 0)
        .count()
}
