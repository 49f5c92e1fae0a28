use std::io::{Cursor, Read};
use std::sync::LazyLock;

use bytes::Bytes;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::errors::AppError;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOCX_BODY: &str = "word/document.xml";

/// How many times larger than the upload cap the decompressed DOCX body may be.
pub const MAX_DOCX_EXPANSION: u64 = 20;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Only PDF and DOCX files are supported")]
    Unsupported,

    #[error("Could not read document: {0}")]
    Unreadable(String),

    #[error("No text could be extracted from the document")]
    Empty,
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Unsupported => AppError::UnsupportedMediaType(err.to_string()),
            DocumentError::Unreadable(_) | DocumentError::Empty => {
                AppError::UnprocessableEntity(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Kind claimed by the upload's file name or content type.
    fn claimed(file_name: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        let ext = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let content_type = content_type.map(|ct| ct.to_ascii_lowercase());

        match (ext.as_deref(), content_type.as_deref()) {
            (Some("pdf"), _) | (_, Some("application/pdf")) => Some(Self::Pdf),
            (Some("docx"), _) | (_, Some(DOCX_CONTENT_TYPE)) => Some(Self::Docx),
            _ => None,
        }
    }

    fn magic_matches(self, bytes: &[u8]) -> bool {
        match self {
            Self::Pdf => bytes.starts_with(b"%PDF"),
            Self::Docx => bytes.starts_with(b"PK\x03\x04"),
        }
    }

    /// Kind of an upload, confirmed against its leading bytes. Unlabelled
    /// uploads are accepted only when they carry the PDF signature.
    pub fn detect(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Self, DocumentError> {
        let kind = Self::claimed(file_name, content_type).unwrap_or(Self::Pdf);
        if kind.magic_matches(bytes) {
            Ok(kind)
        } else {
            Err(DocumentError::Unsupported)
        }
    }
}

static PARAGRAPH_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:p>").expect("valid regex"));
static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:(?:br|cr)\b[^>]*>").expect("valid regex"));
static TAB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:tab\b[^>]*>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#x(?P<hex>[0-9a-fA-F]+)|#(?P<dec>[0-9]+)|(?P<name>lt|gt|amp|quot|apos));")
        .expect("valid regex")
});

/// Plain text of a WordprocessingML body. Paragraph ends and breaks become
/// newlines, tabs become spaces.
pub fn docx_xml_to_text(xml: &str) -> String {
    let text = PARAGRAPH_END_RE.replace_all(xml, "\n");
    let text = BREAK_RE.replace_all(&text, "\n");
    let text = TAB_RE.replace_all(&text, " ");
    let text = TAG_RE.replace_all(&text, "");
    ENTITY_RE
        .replace_all(&text, |caps: &Captures| decode_entity(caps))
        .into_owned()
}

fn decode_entity(caps: &Captures) -> String {
    let code_point = if let Some(hex) = caps.name("hex") {
        u32::from_str_radix(hex.as_str(), 16).ok()
    } else if let Some(dec) = caps.name("dec") {
        dec.as_str().parse::<u32>().ok()
    } else {
        let named = match caps.name("name").map(|m| m.as_str()) {
            Some("lt") => '<',
            Some("gt") => '>',
            Some("amp") => '&',
            Some("quot") => '"',
            _ => '\'',
        };
        return named.to_string();
    };

    code_point
        .and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_default()
}

/// Reads `word/document.xml`, refusing bodies that inflate past `max_xml_bytes`.
/// Both the declared size and the bytes actually read are held to the cap.
fn docx_text(bytes: &[u8], max_xml_bytes: u64) -> Result<String, DocumentError> {
    let too_large =
        || DocumentError::Unreadable(format!("{DOCX_BODY} expands beyond {max_xml_bytes} bytes"));

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Unreadable(e.to_string()))?;
    let mut body = archive
        .by_name(DOCX_BODY)
        .map_err(|e| DocumentError::Unreadable(format!("{DOCX_BODY}: {e}")))?;

    if body.size() > max_xml_bytes {
        return Err(too_large());
    }

    let mut raw = Vec::new();
    (&mut body)
        .take(max_xml_bytes.saturating_add(1))
        .read_to_end(&mut raw)
        .map_err(|e| DocumentError::Unreadable(e.to_string()))?;
    if raw.len() as u64 > max_xml_bytes {
        return Err(too_large());
    }

    let xml = String::from_utf8(raw).map_err(|e| DocumentError::Unreadable(e.to_string()))?;
    Ok(docx_xml_to_text(&xml))
}

fn pdf_text(bytes: &[u8]) -> Result<String, DocumentError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::Unreadable(e.to_string()))
}

/// Extracts the document's text off the async runtime. A parser panic on a
/// malformed file is reported as unreadable.
pub async fn extract_text(
    kind: DocumentKind,
    bytes: Bytes,
    max_xml_bytes: u64,
) -> Result<String, DocumentError> {
    let text = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf_text(&bytes),
        DocumentKind::Docx => docx_text(&bytes, max_xml_bytes),
    })
    .await
    .map_err(|e| DocumentError::Unreadable(format!("text extraction aborted: {e}")))??;

    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text)
}
