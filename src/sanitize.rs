//! Filename sanitization.
//!
//! Every name that reaches a backend goes through [`sanitize`] first. Only
//! the final path segment of the client's input survives, so a key can be
//! joined onto a trusted directory without escaping it.

use std::fmt;

use crate::error::StoreError;

/// Reduce an untrusted filename to its final path segment.
///
/// Both `/` and `\` count as separators. Empty input, separator-only input,
/// and a final segment of `.` or `..` all come back as the empty string,
/// which callers must treat as invalid.
pub fn sanitize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let last = raw
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or("");

    match last {
        "." | ".." => String::new(),
        name => name.to_string(),
    }
}

/// Case-insensitive `.pdf` suffix check.
pub fn is_pdf_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".pdf")
}

/// Whether a stored name may appear in a listing: a PDF whose name is
/// already its own sanitized key, so the catalog can serve it back.
pub fn is_listable(name: &str) -> bool {
    is_pdf_name(name) && sanitize(Some(name)) == name
}

/// A sanitized filename, safe to use as a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Sanitize `raw`; `None` when nothing usable is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = sanitize(Some(raw));
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    /// Sanitize and apply the write policy: the key must be non-empty and
    /// end in `.pdf`.
    pub fn for_upload(raw: Option<&str>) -> Result<Self, StoreError> {
        let name = sanitize(raw);
        if name.is_empty() {
            return Err(StoreError::Validation("Missing filename".to_string()));
        }
        if !is_pdf_name(&name) {
            return Err(StoreError::Validation("Only PDF files allowed".to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Component, Path};

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize(Some("reports/q1/summary.pdf")), "summary.pdf");
        assert_eq!(sanitize(Some("C:\\Users\\me\\scan.pdf")), "scan.pdf");
        assert_eq!(sanitize(Some("plain.pdf")), "plain.pdf");
        assert_eq!(sanitize(Some("trailing/dir/")), "dir");
    }

    #[test]
    fn test_sanitize_traversal_stays_inside_root() {
        let root = Path::new("/srv/pdfs");
        for raw in [
            "../../etc/passwd",
            "..\\..\\windows\\win.ini",
            "/absolute/path.pdf",
            "a/../../b.pdf",
            "....//....//x.pdf",
        ] {
            let key = sanitize(Some(raw));
            assert!(!key.contains('/'), "{raw} -> {key}");
            assert!(!key.contains('\\'), "{raw} -> {key}");
            let joined = root.join(&key);
            assert!(joined.starts_with(root));
            assert!(joined
                .components()
                .all(|c| !matches!(c, Component::ParentDir)));
        }
    }

    #[test]
    fn test_sanitize_degrades_to_empty() {
        assert_eq!(sanitize(None), "");
        assert_eq!(sanitize(Some("")), "");
        assert_eq!(sanitize(Some("///")), "");
        assert_eq!(sanitize(Some("..")), "");
        assert_eq!(sanitize(Some("foo/..")), "");
        assert_eq!(sanitize(Some("./")), "");
    }

    #[test]
    fn test_is_pdf_name() {
        assert!(is_pdf_name("a.pdf"));
        assert!(is_pdf_name("REPORT.PDF"));
        assert!(is_pdf_name("mixed.Pdf"));
        assert!(!is_pdf_name("pdf"));
        assert!(!is_pdf_name("notes.txt"));
        assert!(!is_pdf_name("archive.pdf.zip"));
    }

    #[test]
    fn test_for_upload_policy() {
        let key = StorageKey::for_upload(Some("../secret/Invoice.PDF")).unwrap();
        assert_eq!(key.as_str(), "Invoice.PDF");

        let err = StorageKey::for_upload(None).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref m) if m == "Missing filename"));

        let err = StorageKey::for_upload(Some("notes.txt")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref m) if m == "Only PDF files allowed"));

        // Suffix is checked after sanitization.
        assert!(StorageKey::for_upload(Some("x.pdf/..")).is_err());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(StorageKey::parse("").is_none());
        assert!(StorageKey::parse("../").is_none());
        assert_eq!(StorageKey::parse("dir/a.pdf").unwrap().to_string(), "a.pdf");
    }

    #[test]
    fn test_is_listable() {
        assert!(is_listable("report.pdf"));
        assert!(!is_listable("a\\b.pdf"));
        assert!(!is_listable("dir/a.pdf"));
        assert!(!is_listable(".."));
        assert!(!is_listable("notes.txt"));
    }
}
