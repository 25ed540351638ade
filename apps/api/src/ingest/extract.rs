//! File text extraction for operator uploads.
//!
//! Polymorphic over plain text, Word (`.docx`), Excel (`.xlsx`) and PDF. Office
//! formats are read straight from their OOXML parts; PDF goes through `pdf-extract`.
//! Extraction is CPU-bound and callers run it on the blocking pool.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("不支援的檔案格式 ({0})，請上傳 PDF, Word (.docx), Excel (.xlsx) 或純文字檔。")]
    UnsupportedFormat(String),

    #[error("Invalid document archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Could not read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read PDF: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    WordProcessor,
    Spreadsheet,
    Pdf,
}

impl DocumentKind {
    /// Picks the kind from the file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "txt" | "md" => Ok(DocumentKind::PlainText),
            "docx" => Ok(DocumentKind::WordProcessor),
            "xlsx" => Ok(DocumentKind::Spreadsheet),
            "pdf" => Ok(DocumentKind::Pdf),
            "xls" => Err(ExtractError::UnsupportedFormat(
                "legacy .xls, save it as .xlsx".to_string(),
            )),
            "" => Err(ExtractError::UnsupportedFormat("no extension".to_string())),
            other => Err(ExtractError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Extracts the plain text of an uploaded file.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    match DocumentKind::from_filename(filename)? {
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DocumentKind::WordProcessor => docx_text(bytes),
        DocumentKind::Spreadsheet => xlsx_text(bytes),
        DocumentKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Word
// ────────────────────────────────────────────────────────────────────────────

/// Paragraph text from `word/document.xml`, one line per `w:p`.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_part(&mut archive, "word/document.xml")?;

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(ref e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Text(ref t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(out.trim_end().to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Excel
// ────────────────────────────────────────────────────────────────────────────

/// Every worksheet as tab-separated rows, sheets separated by a blank line.
fn xlsx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let shared = match read_part(&mut archive, "xl/sharedStrings.xml") {
        Ok(xml) => shared_strings(&xml)?,
        Err(ExtractError::Archive(zip::result::ZipError::FileNotFound)) => Vec::new(),
        Err(e) => return Err(e),
    };

    let mut sheets: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    sheets.sort_by_key(|n| sheet_number(n));

    let mut out = String::new();
    for name in sheets {
        let xml = read_part(&mut archive, &name)?;
        out.push_str(&sheet_text(&xml, &shared)?);
        out.push('\n');
    }
    Ok(out.trim_end().to_string())
}

fn sheet_number(part: &str) -> u32 {
    part.trim_start_matches("xl/worksheets/sheet")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(u32::MAX)
}

/// `<si>` entries in order; rich-text runs are concatenated.
fn shared_strings(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::End(ref e) => match e.name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(ref t) if in_text => current.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn sheet_text(xml: &str, shared: &[String]) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell_is_shared = false;
    let mut in_value = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"row" => row.clear(),
                b"c" => {
                    cell_is_shared = e
                        .attributes()
                        .flatten()
                        .any(|a| a.key.as_ref() == b"t" && &*a.value == b"s");
                    row.push(String::new());
                }
                b"v" | b"t" => in_value = true,
                _ => {}
            },
            Event::End(ref e) => match e.name().as_ref() {
                b"row" => {
                    out.push_str(row.join("\t").trim_end());
                    out.push('\n');
                }
                b"v" | b"t" => in_value = false,
                _ => {}
            },
            Event::Text(ref t) if in_value => {
                let raw = t.unescape()?;
                let value = if cell_is_shared {
                    raw.trim()
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| shared.get(i))
                        .cloned()
                        .unwrap_or_default()
                } else {
                    raw.into_owned()
                };
                if let Some(cell) = row.last_mut() {
                    cell.push_str(&value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<String, ExtractError> {
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn archive(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_filename("a.TXT").unwrap(), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_filename("notes.md").unwrap(), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_filename("x.docx").unwrap(), DocumentKind::WordProcessor);
        assert_eq!(DocumentKind::from_filename("x.xlsx").unwrap(), DocumentKind::Spreadsheet);
        assert_eq!(DocumentKind::from_filename("x.pdf").unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_unsupported_formats_are_descriptive() {
        for name in ["photo.png", "legacy.xls", "README"] {
            let err = extract_text(name, b"").unwrap_err();
            assert!(matches!(err, ExtractError::UnsupportedFormat(_)), "{name}");
            assert!(err.to_string().contains("不支援的檔案格式"));
        }
        assert!(extract_text("legacy.xls", b"")
            .unwrap_err()
            .to_string()
            .contains(".xlsx"));
    }

    #[test]
    fn test_plain_text_is_lossy_utf8() {
        assert_eq!(extract_text("a.txt", "台北 101".as_bytes()).unwrap(), "台北 101");
        assert_eq!(extract_text("a.md", &[0x61, 0xff]).unwrap(), "a\u{fffd}");
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let doc = r#"<?xml version="1.0"?><w:document xmlns:w="w"><w:body>
            <w:p><w:r><w:t>Day 1</w:t></w:r><w:r><w:tab/><w:t>Taipei &amp; Keelung</w:t></w:r></w:p>
            <w:p><w:r><w:t xml:space="preserve">Day 2 </w:t></w:r></w:p>
            </w:body></w:document>"#;
        let bytes = archive(&[("word/document.xml", doc)]);
        assert_eq!(
            extract_text("plan.docx", &bytes).unwrap(),
            "Day 1\tTaipei & Keelung\nDay 2"
        );
    }

    #[test]
    fn test_xlsx_rows_are_tab_separated_with_shared_strings() {
        let shared = r#"<sst><si><t>Hotel</t></si><si><r><t>Bus</t></r><r><t> fare</t></r></si></sst>"#;
        let sheet1 = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>2500</v></c></row>
            <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="inlineStr"><is><t>800</t></is></c></row>
            </sheetData></worksheet>"#;
        let sheet2 = r#"<worksheet><sheetData><row r="1"><c r="A1"><v>7</v></c></row></sheetData></worksheet>"#;
        let bytes = archive(&[
            ("xl/sharedStrings.xml", shared),
            ("xl/worksheets/sheet2.xml", sheet2),
            ("xl/worksheets/sheet1.xml", sheet1),
        ]);
        assert_eq!(
            extract_text("cost.xlsx", &bytes).unwrap(),
            "Hotel\t2500\nBus fare\t800\n\n7"
        );
    }

    #[test]
    fn test_corrupt_archive_is_an_error() {
        let err = extract_text("broken.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, ExtractError::Archive(_)));
    }
}
