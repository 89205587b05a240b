use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

use crate::model::Template;

const DEFAULT_TEMPLATES: &[(&str, usize)] = &[
    ("Constitution (disclosures by Members) Regulation 1983", 25),
    ("SECTION 2—MEMBER'S ORDINARY RETURN", 10),
];

#[derive(Debug, Deserialize)]
struct TemplateFile {
    templates: Vec<Template>,
}

#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    pub fn new(templates: Vec<Template>) -> Result<Self> {
        if templates.is_empty() {
            bail!("template set is empty; at least one boundary template is required");
        }

        for (index, template) in templates.iter().enumerate() {
            if template.reference_text.trim().is_empty() {
                bail!("template {index} has an empty reference_text");
            }
            if template.threshold == 0 {
                warn!(
                    template = index,
                    reference_text = %template.reference_text,
                    "template threshold is 0 and can never match"
                );
            }
        }

        Ok(Self { templates })
    }

    pub fn builtin() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES
                .iter()
                .map(|(text, threshold)| Template {
                    reference_text: (*text).to_string(),
                    threshold: *threshold,
                })
                .collect(),
        }
    }

    pub fn from_json(raw: &[u8]) -> Result<Self> {
        let file: TemplateFile =
            serde_json::from_slice(raw).context("failed to parse template configuration")?;
        Self::new(file.templates)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }
}

pub fn load_templates(path: Option<&Path>) -> Result<TemplateSet> {
    let Some(path) = path else {
        let set = TemplateSet::builtin();
        info!(templates = set.len(), "using built-in boundary templates");
        return Ok(set);
    };

    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let set = TemplateSet::from_json(&raw)
        .with_context(|| format!("invalid template configuration in {}", path.display()))?;

    info!(path = %path.display(), templates = set.len(), "loaded boundary templates");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn from_json_reads_template_list() {
        let raw = br#"
        {
          "templates": [
            { "reference_text": "HELLO", "threshold": 2 },
            { "reference_text": "Annual Return", "threshold": 4 }
          ]
        }
        "#;

        let set = TemplateSet::from_json(raw).expect("valid configuration should parse");
        assert_eq!(set.len(), 2);
        let first = set.iter().next().unwrap();
        assert_eq!(first.reference_text, "HELLO");
        assert_eq!(first.threshold, 2);
    }

    #[test]
    fn empty_template_set_is_rejected() {
        let err = TemplateSet::from_json(br#"{ "templates": [] }"#).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn blank_reference_text_is_rejected() {
        let raw = br#"{ "templates": [ { "reference_text": "   ", "threshold": 3 } ] }"#;
        assert!(TemplateSet::from_json(raw).is_err());
    }

    #[test]
    fn malformed_configuration_is_rejected() {
        assert!(TemplateSet::from_json(br#"{ "templates": [ { "threshold": -1 } ] }"#).is_err());
        assert!(TemplateSet::from_json(b"not json").is_err());
    }

    #[test]
    fn zero_threshold_is_accepted() {
        let raw = br#"{ "templates": [ { "reference_text": "HELLO", "threshold": 0 } ] }"#;
        assert!(TemplateSet::from_json(raw).is_ok());
    }

    #[test]
    fn load_templates_falls_back_to_builtin_set() {
        let set = load_templates(None).unwrap();
        assert_eq!(set.len(), DEFAULT_TEMPLATES.len());
    }

    #[test]
    fn load_templates_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_templates(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_templates_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("templates.json");
        fs::write(
            &path,
            r#"{ "templates": [ { "reference_text": "FORM A", "threshold": 3 } ] }"#,
        )
        .unwrap();

        let set = load_templates(Some(&path)).unwrap();
        assert_eq!(set.len(), 1);
    }
}
