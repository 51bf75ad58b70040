//! Human confirmation of extracted fields.

use crate::extract::{CompanySource, ExtractionResult, TitleSource};
use std::io::{BufRead, Write};

/// Shows an extracted value and returns the value to keep.
pub trait FieldConfirmer {
    fn confirm(&mut self, label: &str, current: &str) -> String;
}

/// Keeps whatever extraction produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptExtracted;

impl FieldConfirmer for AcceptExtracted {
    fn confirm(&mut self, _label: &str, current: &str) -> String {
        current.to_string()
    }
}

/// Interactive prompt: an empty line keeps the current value.
///
/// Generic over reader and writer so it can be driven from tests; use
/// [`StdinConfirmer::stdio`] for the terminal.
pub struct StdinConfirmer<R, W> {
    input: R,
    output: W,
}

impl StdinConfirmer<std::io::StdinLock<'static>, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> StdinConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> FieldConfirmer for StdinConfirmer<R, W> {
    fn confirm(&mut self, label: &str, current: &str) -> String {
        // A broken terminal falls back to the extracted value.
        let _ = writeln!(self.output, "{label}: {current}");
        let _ = write!(
            self.output,
            "Enter correct {label} (or press Enter to keep): "
        );
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(_) if !line.trim().is_empty() => line.trim().to_string(),
            _ => current.to_string(),
        }
    }
}

/// Run `confirmer` over title then company, marking changed fields as manual.
pub fn confirm_fields(
    mut extracted: ExtractionResult,
    confirmer: &mut dyn FieldConfirmer,
) -> ExtractionResult {
    let title = confirmer.confirm("Job Title", &extracted.title);
    if title != extracted.title {
        extracted.title = title;
        extracted.title_source = TitleSource::Manual;
    }
    let company = confirmer.confirm("Company", &extracted.company);
    if company != extracted.company {
        extracted.company = company;
        extracted.company_source = CompanySource::Manual;
    }
    extracted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn extracted() -> ExtractionResult {
        ExtractionResult {
            title: "Engineer".into(),
            company: "Acme".into(),
            title_source: TitleSource::Heading,
            company_source: CompanySource::SiteName,
        }
    }

    #[test]
    fn enter_keeps_value() {
        let mut out = Vec::new();
        let mut c = StdinConfirmer::new(Cursor::new("\n"), &mut out);
        assert_eq!(c.confirm("Company", "Acme"), "Acme");
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Company: Acme"));
    }

    #[test]
    fn typed_value_replaces_and_is_trimmed() {
        let mut c = StdinConfirmer::new(Cursor::new("  Globex  \n"), Vec::new());
        assert_eq!(c.confirm("Company", "Acme"), "Globex");
    }

    #[test]
    fn eof_keeps_value() {
        let mut c = StdinConfirmer::new(Cursor::new(""), Vec::new());
        assert_eq!(c.confirm("Job Title", "Engineer"), "Engineer");
    }

    #[test]
    fn confirm_fields_marks_overrides_manual() {
        let mut c = StdinConfirmer::new(Cursor::new("\nInitech\n"), Vec::new());
        let r = confirm_fields(extracted(), &mut c);
        assert_eq!(r.title, "Engineer");
        assert_eq!(r.title_source, TitleSource::Heading);
        assert_eq!(r.company, "Initech");
        assert_eq!(r.company_source, CompanySource::Manual);
    }

    #[test]
    fn accept_extracted_is_identity() {
        let r = confirm_fields(extracted(), &mut AcceptExtracted);
        assert_eq!(r, extracted());
    }
}
