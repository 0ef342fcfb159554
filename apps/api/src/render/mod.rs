//! Deck rendering — fills the fixed PPTX template from a final proposal
//! record. Rendering failures are terminal for the submission only; no
//! partial deck is ever left on disk.

use regex::Regex;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

use crate::proposal::record::FinalProposalRecord;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template references unknown field '{0}'")]
    MissingField(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Renders a final proposal record into a slide deck file.
pub trait DeckRenderer: Send + Sync {
    fn render(
        &self,
        record: &FinalProposalRecord,
        template_path: &Path,
        output_path: &Path,
    ) -> Result<(), RenderError>;
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z][a-z0-9_]*)\}").unwrap())
}

/// Placeholder-substituting PPTX renderer. A PPTX is a ZIP archive; slide
/// XML parts carry `{campo}` tokens that are replaced with record values.
/// A token with no matching record key fails the whole render.
pub struct PptxTemplateRenderer;

impl PptxTemplateRenderer {
    fn render_inner(
        &self,
        record: &FinalProposalRecord,
        template_path: &Path,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let template = std::fs::File::open(template_path).map_err(|e| {
            RenderError::Template(format!("cannot open {}: {e}", template_path.display()))
        })?;
        let mut archive = zip::ZipArchive::new(template)?;

        let out_file = std::fs::File::create(output_path)?;
        let mut writer = zip::ZipWriter::new(out_file);
        let options = zip::write::SimpleFileOptions::default();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();

            if is_slide_part(&name) {
                let mut xml = String::new();
                entry.read_to_string(&mut xml).map_err(|e| {
                    RenderError::Template(format!("slide part {name} is not UTF-8: {e}"))
                })?;
                let filled = fill_placeholders(&xml, record)?;
                writer.start_file(name, options)?;
                writer.write_all(filled.as_bytes())?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }

        writer.finish()?;
        Ok(())
    }
}

impl DeckRenderer for PptxTemplateRenderer {
    fn render(
        &self,
        record: &FinalProposalRecord,
        template_path: &Path,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let result = self.render_inner(record, template_path, output_path);
        if result.is_err() {
            // No partial deck on failure.
            let _ = std::fs::remove_file(output_path);
        }
        result
    }
}

fn is_slide_part(name: &str) -> bool {
    name.starts_with("ppt/slides/") && name.ends_with(".xml")
}

/// Replaces every `{campo}` token with the record's value for `campo`.
/// XML-escapes substituted values; errors on tokens with no record key.
fn fill_placeholders(
    xml: &str,
    record: &FinalProposalRecord,
) -> Result<String, RenderError> {
    let mut missing = None;
    let filled = placeholder_re().replace_all(xml, |caps: &regex::Captures| {
        let field = &caps[1];
        match record.get(field) {
            Some(value) => xml_escape(value),
            None => {
                if missing.is_none() {
                    missing = Some(field.to_string());
                }
                String::new()
            }
        }
    });

    match missing {
        Some(field) => Err(RenderError::MissingField(field)),
        None => Ok(filled.into_owned()),
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
