//! Text extraction from document formats (PDF, DOCX, plaintext).

use std::io::Read;
use std::path::Path;

use crate::ingest::IngestError;

/// Reads a plaintext file, tolerating non-UTF8 bytes.
pub fn extract_text_from_plain(path: &Path) -> Result<String, IngestError> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(_) => {
            let bytes = std::fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Extracts text from a PDF.
pub fn extract_text_from_pdf(path: &Path) -> Result<String, IngestError> {
    // pdf-extract can panic on malformed PDFs — wrap in catch_unwind
    let path_buf = path.to_path_buf();
    let result = std::panic::catch_unwind(move || pdf_extract::extract_text(&path_buf));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(IngestError::ExtractionFailed(format!("PDF: {e}"))),
        Err(_) => Err(IngestError::ExtractionFailed(
            "PDF extraction panicked (malformed file)".to_string(),
        )),
    }
}

/// Extracts text from a DOCX: a ZIP archive containing word/document.xml.
/// Walks `<w:t>` text runs, inserting paragraph breaks at `<w:p>` boundaries.
pub fn extract_text_from_docx(path: &Path) -> Result<String, IngestError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| IngestError::ExtractionFailed(format!("DOCX zip: {e}")))?;

    let doc = archive
        .by_name("word/document.xml")
        .map_err(|e| IngestError::ExtractionFailed(format!("DOCX missing document.xml: {e}")))?;

    extract_docx_xml(std::io::BufReader::new(doc))
}

fn extract_docx_xml<R: Read + std::io::BufRead>(reader: R) -> Result<String, IngestError> {
    let mut reader = quick_xml::Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text_tag = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(ref e))
            | Ok(quick_xml::events::Event::Empty(ref e)) => {
                let local = e.local_name();
                if local.as_ref() == b"t" {
                    in_text_tag = true;
                } else if local.as_ref() == b"p" {
                    if in_paragraph && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    in_paragraph = true;
                }
            }
            Ok(quick_xml::events::Event::End(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_tag = false;
                } else if e.local_name().as_ref() == b"p" {
                    in_paragraph = false;
                    if !text.ends_with('\n') {
                        text.push('\n');
                    }
                }
            }
            Ok(quick_xml::events::Event::Text(ref e)) => {
                if in_text_tag {
                    if let Ok(s) = e.unescape() {
                        text.push_str(&s);
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(IngestError::ExtractionFailed(format!("DOCX XML: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docx_xml_extracts_runs_and_paragraphs() {
        let xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>Minuta de reunión</w:t></w:r></w:p>
                <w:p><w:r><w:t>El cliente requiere </w:t></w:r><w:r><w:t>10 licencias</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;
        let text = extract_docx_xml(std::io::BufReader::new(xml.as_bytes())).unwrap();
        assert_eq!(text, "Minuta de reunión\nEl cliente requiere 10 licencias");
    }

    #[test]
    fn test_docx_xml_unescapes_entities() {
        let xml = r#"<w:document xmlns:w="x"><w:p><w:t>Acme &amp; Cía</w:t></w:p></w:document>"#;
        let text = extract_docx_xml(std::io::BufReader::new(xml.as_bytes())).unwrap();
        assert_eq!(text, "Acme & Cía");
    }

    #[test]
    fn test_plaintext_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notas.txt");
        std::fs::write(&path, "texto de la reunión").unwrap();
        assert_eq!(
            extract_text_from_plain(&path).unwrap(),
            "texto de la reunión"
        );
    }

    #[test]
    fn test_pdf_extraction_fails_cleanly_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roto.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        assert!(extract_text_from_pdf(&path).is_err());
    }
}
