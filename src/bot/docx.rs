//! Minimal DOCX (Office Open XML) writing and reading.
//!
//! A DOCX file is a ZIP archive. The body text lives in `word/document.xml`
//! as `<w:p>` paragraphs holding `<w:t>` runs.

use std::io::{Cursor, Read, Write};

use zip::ZipArchive;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

/// Build a right-to-left DOCX with one paragraph per line of `text`.
pub fn build(title: &str, text: &str) -> Result<Vec<u8>, String> {
    let mut document = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for line in text.lines() {
        document.push_str("<w:p><w:pPr><w:bidi/></w:pPr>");
        if !line.is_empty() {
            document.push_str(r#"<w:r><w:rPr><w:rtl/></w:rPr><w:t xml:space="preserve">"#);
            document.push_str(&escape_xml(line));
            document.push_str("</w:t></w:r>");
        }
        document.push_str("</w:p>");
    }
    document.push_str("</w:body></w:document>");

    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let core = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created></cp:coreProperties>"#,
        escape_xml(title)
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document.as_str()),
        ("docProps/core.xml", core.as_str()),
    ];
    for (name, content) in parts {
        zip.start_file(name, options)
            .map_err(|e| format!("Failed to add {name}: {e}"))?;
        zip.write_all(content.as_bytes())
            .map_err(|e| format!("Failed to write {name}: {e}"))?;
    }
    let cursor = zip.finish().map_err(|e| format!("Failed to finish DOCX: {e}"))?;
    Ok(cursor.into_inner())
}

/// Extract plain text from a DOCX file, one line per non-empty paragraph.
///
/// `word/document.xml` may inflate to at most `max_xml_bytes`; larger
/// documents are rejected before and while decompressing.
pub fn extract_text(data: &[u8], max_xml_bytes: u64) -> Result<String, String> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| format!("Invalid DOCX (not a valid ZIP): {e}"))?;

    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| "Invalid DOCX: missing word/document.xml".to_string())?;
    if entry.size() > max_xml_bytes {
        return Err(too_large(max_xml_bytes));
    }

    // The declared size is untrusted
    let mut raw = Vec::new();
    entry
        .take(max_xml_bytes.saturating_add(1))
        .read_to_end(&mut raw)
        .map_err(|e| format!("Failed to read document.xml: {e}"))?;
    if raw.len() as u64 > max_xml_bytes {
        return Err(too_large(max_xml_bytes));
    }
    let document_xml =
        String::from_utf8(raw).map_err(|e| format!("Invalid DOCX: document.xml is not UTF-8: {e}"))?;

    let text = paragraphs(&document_xml).join("\n");
    if text.trim().is_empty() {
        return Err("DOCX appears to be empty or contains no text".to_string());
    }
    Ok(text)
}

fn too_large(limit: u64) -> String {
    format!("DOCX is too large: document text exceeds {limit} bytes")
}

/// Walk the tags of `word/document.xml`, collecting `<w:t>` text per paragraph.
fn paragraphs(xml: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut paragraph: Option<String> = None;
    let mut in_text = false;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        if in_text {
            if let Some(p) = paragraph.as_mut() {
                p.push_str(&unescape_xml(&rest[..open]));
            }
        }
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        let tag = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let self_closing = tag.ends_with('/');
        let (closing, name) = match tag.strip_prefix('/') {
            Some(name) => (true, name),
            None => (false, tag.trim_end_matches('/')),
        };
        let name = name.split_whitespace().next().unwrap_or("");

        match (name, closing) {
            ("w:p", false) if !self_closing => paragraph = Some(String::new()),
            ("w:p", true) => {
                if let Some(p) = paragraph.take() {
                    let trimmed = p.trim();
                    if !trimmed.is_empty() {
                        out.push(trimmed.to_string());
                    }
                }
            }
            ("w:t", false) => in_text = !self_closing,
            ("w:t", true) => in_text = false,
            ("w:br", false) => {
                if let Some(p) = paragraph.as_mut() {
                    p.push('\n');
                }
            }
            ("w:tab", false) => {
                if let Some(p) = paragraph.as_mut() {
                    p.push('\t');
                }
            }
            _ => {}
        }
    }
    out
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
