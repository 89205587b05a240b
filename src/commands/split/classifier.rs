use strsim::levenshtein;

use super::*;

pub fn score(candidate: &str, reference: &str) -> usize {
    levenshtein(candidate, reference)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageVerdict {
    pub is_form_start: bool,
    pub min_distance: Option<usize>,
    pub matched_template: Option<usize>,
    pub matched_line: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageClassifier<'a> {
    templates: &'a TemplateSet,
}

impl<'a> PageClassifier<'a> {
    pub fn new(templates: &'a TemplateSet) -> Self {
        Self { templates }
    }

    #[cfg(test)]
    pub fn classify(&self, text: &str) -> bool {
        self.evaluate(text).is_form_start
    }

    pub fn evaluate(&self, text: &str) -> PageVerdict {
        let mut min_distance: Option<usize> = None;

        // Line 0 is OCR header noise.
        for line in text.split('\n').skip(1).map(str::trim) {
            if line.is_empty() {
                continue;
            }

            for (index, template) in self.templates.iter().enumerate() {
                let distance = score(line, &template.reference_text);
                min_distance = Some(min_distance.map_or(distance, |min| min.min(distance)));

                if distance < template.threshold {
                    return PageVerdict {
                        is_form_start: true,
                        min_distance,
                        matched_template: Some(index),
                        matched_line: Some(line.to_string()),
                    };
                }
            }
        }

        PageVerdict {
            is_form_start: false,
            min_distance,
            matched_template: None,
            matched_line: None,
        }
    }
}
