use super::*;

pub trait TextExtractor: Sync {
    fn extract_text(&self, page: &PageRef) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    lang: String,
}

impl TesseractExtractor {
    pub fn new(lang: impl Into<String>) -> Result<Self> {
        if !command_available("tesseract") {
            bail!("tesseract is not available on PATH; it is required for page text extraction");
        }

        Ok(Self { lang: lang.into() })
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract_text(&self, page: &PageRef) -> Result<String> {
        let output = Command::new("tesseract")
            .arg(page.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .with_context(|| format!("failed to execute tesseract for {page}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract returned non-zero exit status for {}: {}",
                page,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
    }
}

fn command_available(program: &str) -> bool {
    Command::new(program).arg("--version").output().is_ok()
}
