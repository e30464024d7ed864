use std::sync::LazyLock;

use regex::Regex;

static DOCS_EDIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"docs\.google\.com/document/d/([A-Za-z0-9_-]+)/edit").expect("valid docs regex")
});

static DRIVE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"drive\.google\.com/file/d/([A-Za-z0-9_-]+)").expect("valid drive regex")
});

/// How the user asked to download a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMethod {
    /// Fetch the file and save it locally.
    #[default]
    Fetch,
    /// Hand the resolved link to the user without fetching.
    Link,
}

/// Rewrites known document-hosting links into direct download links.
///
/// Docs edit links win over Drive file links. Anything else yields `None`.
pub fn resolve_download_url(url: &str) -> Option<String> {
    docs_export_url(url).or_else(|| drive_download_url(url))
}

/// The rewritten link, or `url` unchanged when no rule applies.
pub fn download_url_for(url: &str) -> String {
    resolve_download_url(url).unwrap_or_else(|| url.to_string())
}

fn docs_export_url(url: &str) -> Option<String> {
    let id = DOCS_EDIT.captures(url)?.get(1)?.as_str();
    Some(format!(
        "https://docs.google.com/document/d/{id}/export?format=pdf"
    ))
}

fn drive_download_url(url: &str) -> Option<String> {
    let id = DRIVE_FILE.captures(url)?.get(1)?.as_str();
    Some(format!(
        "https://drive.google.com/uc?export=download&id={id}"
    ))
}

#[cfg(test)]
mod tests {
    use super::{download_url_for, resolve_download_url};

    #[test]
    fn docs_edit_link_becomes_pdf_export() {
        assert_eq!(
            resolve_download_url("https://docs.google.com/document/d/XYZ/edit").as_deref(),
            Some("https://docs.google.com/document/d/XYZ/export?format=pdf")
        );
        assert_eq!(
            resolve_download_url("https://docs.google.com/document/d/a-b_C9/edit?usp=sharing")
                .as_deref(),
            Some("https://docs.google.com/document/d/a-b_C9/export?format=pdf")
        );
    }

    #[test]
    fn drive_file_link_becomes_direct_download() {
        assert_eq!(
            resolve_download_url("https://drive.google.com/file/d/1AbC_d-E/view?usp=sharing")
                .as_deref(),
            Some("https://drive.google.com/uc?export=download&id=1AbC_d-E")
        );
    }

    #[test]
    fn unknown_and_malformed_links_are_left_alone() {
        assert_eq!(resolve_download_url("https://example.com/report.pdf"), None);
        assert_eq!(resolve_download_url("not a url at all"), None);
        assert_eq!(resolve_download_url(""), None);
        // A docs link without `/edit` matches neither rule.
        assert_eq!(
            resolve_download_url("https://docs.google.com/document/d/XYZ/view"),
            None
        );
        assert_eq!(
            download_url_for("https://example.com/report.pdf"),
            "https://example.com/report.pdf"
        );
    }
}
