//! Minimal WordprocessingML reader and writer.
//!
//! Only paragraph text survives a round trip; run formatting, tables and media are
//! flattened to their text content.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::ConversionError;

const DOCUMENT_PART: &str = "word/document.xml";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

/// Extract paragraph texts from a `.docx` package.
pub fn read_paragraphs(bytes: &[u8]) -> Result<Vec<String>, ConversionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ConversionError::Malformed(format!("not a docx package: {e}")))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ConversionError::Malformed(format!("missing {DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ConversionError::Malformed(format!("unreadable {DOCUMENT_PART}: {e}")))?;

    Ok(extract_paragraphs(&xml))
}

/// Build a `.docx` package with one plain run per paragraph.
pub fn write_paragraphs(paragraphs: &[String]) -> Result<Vec<u8>, ConversionError> {
    let mut body = String::new();
    for paragraph in paragraphs {
        if paragraph.is_empty() {
            body.push_str("<w:p/>");
        } else {
            body.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
            body.push_str(&escape_xml(paragraph));
            body.push_str("</w:t></w:r></w:p>");
        }
    }
    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}</w:body></w:document>"
        ),
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        (DOCUMENT_PART, document.as_str()),
    ] {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(name, options).map_err(std::io::Error::other)?;
        writer.write_all(contents.as_bytes())?;
    }
    let cursor = writer.finish().map_err(std::io::Error::other)?;
    Ok(cursor.into_inner())
}

/// Find the next `<name` start tag whose name is exactly `name`.
fn find_start_tag(haystack: &str, name: &str) -> Option<usize> {
    let pattern = format!("<{name}");
    let mut offset = 0;
    while let Some(pos) = haystack[offset..].find(&pattern) {
        let idx = offset + pos;
        match haystack.as_bytes().get(idx + pattern.len()) {
            Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n') => return Some(idx),
            _ => offset = idx + pattern.len(),
        }
    }
    None
}

fn extract_paragraphs(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut rest = xml;

    while let Some(start) = find_start_tag(rest, "w:p") {
        let element = &rest[start..];
        let Some(open_end) = element.find('>') else {
            break;
        };
        if element[..open_end].ends_with('/') {
            paragraphs.push(String::new());
            rest = &element[open_end + 1..];
            continue;
        }

        let body = &element[open_end + 1..];
        let Some(close) = body.find("</w:p>") else {
            break;
        };
        paragraphs.push(extract_text(&body[..close]));
        rest = &body[close + "</w:p>".len()..];
    }

    paragraphs
}

fn extract_text(paragraph: &str) -> String {
    let mut text = String::new();
    let mut rest = paragraph;

    loop {
        let next_text = find_start_tag(rest, "w:t");
        let next_tab = find_start_tag(rest, "w:tab");
        let (start, is_tab) = match (next_text, next_tab) {
            (Some(t), Some(tab)) if tab < t => (tab, true),
            (Some(t), _) => (t, false),
            (None, Some(tab)) => (tab, true),
            (None, None) => break,
        };

        let element = &rest[start..];
        let Some(open_end) = element.find('>') else {
            break;
        };
        let self_closing = element[..open_end].ends_with('/');

        if is_tab {
            text.push('\t');
            rest = &element[open_end + 1..];
            continue;
        }
        if self_closing {
            rest = &element[open_end + 1..];
            continue;
        }

        let content = &element[open_end + 1..];
        let Some(close) = content.find("</w:t>") else {
            break;
        };
        text.push_str(&unescape_xml(&content[..close]));
        rest = &content[close + "</w:t>".len()..];
    }

    text
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let entity = &rest[amp..];
        let Some(semi) = entity.find(';') else {
            out.push_str(entity);
            return out;
        };

        let name = &entity[1..semi];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };

        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&entity[..=semi]),
        }
        rest = &entity[semi + 1..];
    }

    out.push_str(rest);
    out
}
