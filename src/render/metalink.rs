//! Metalink 3.0 documents.

use std::fmt::Write as _;

use chrono::Utc;

use super::urls::{scheme_of, HostUrls};
use crate::config::{
    METALINK_EXTENSION_NAMESPACE, METALINK_GENERATOR, METALINK_HASHES, METALINK_NAMESPACE,
    METALINK_PREFERENCE_FLOOR, METALINK_PREFERENCE_START, METALINK_PUBDATE_FORMAT,
    METALINK_VERSION,
};
use crate::snapshot::{DirectoryEntry, FileDetail, Snapshot};

/// Escapes text for use in XML content and attribute values.
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}

fn metalink_header() -> String {
    let pubdate = Utc::now().format(METALINK_PUBDATE_FORMAT);
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <metalink version=\"{}\" xmlns=\"{}\" type=\"dynamic\" pubdate=\"{}\" generator=\"{}\" xmlns:mm0=\"{}\">\n",
        METALINK_VERSION, METALINK_NAMESPACE, pubdate, METALINK_GENERATOR, METALINK_EXTENSION_NAMESPACE
    )
}

/// An empty metalink carrying `message` as an XML comment.
pub fn metalink_failure_doc(message: Option<&str>) -> String {
    let mut doc = metalink_header();
    if let Some(message) = message {
        // "--" may not appear inside a comment
        let _ = writeln!(doc, "<!--\n{}\n-->", message.replace("--", "- -"));
    }
    doc.push_str("</metalink>\n");
    doc
}

/// Failure document for a file without file details.
pub fn metalink_file_not_found(directory: &str, file: &str) -> String {
    metalink_failure_doc(Some(&format!(
        "{}/{} not found or has no metalink",
        directory, file
    )))
}

fn write_details(doc: &mut String, detail: &FileDetail, level: usize) {
    if let Some(timestamp) = detail.timestamp {
        let _ = writeln!(doc, "{}<mm0:timestamp>{}</mm0:timestamp>", indent(level), timestamp);
    }
    if let Some(size) = detail.size {
        let _ = writeln!(doc, "{}<size>{}</size>", indent(level), size);
    }
    let _ = writeln!(doc, "{}<verification>", indent(level));
    for kind in METALINK_HASHES {
        let value = match *kind {
            "md5" => &detail.md5,
            "sha1" => &detail.sha1,
            "sha256" => &detail.sha256,
            "sha512" => &detail.sha512,
            _ => continue,
        };
        if let Some(value) = value {
            let _ = writeln!(
                doc,
                "{}<hash type=\"{}\">{}</hash>",
                indent(level + 1),
                kind,
                xml_escape(value)
            );
        }
    }
    let _ = writeln!(doc, "{}</verification>", indent(level));
}

/// Renders the metalink for `file` in `directory`.
///
/// Returns the status code and document: 404 with a failure document when
/// the file has no details, 200 otherwise.
pub fn metalink_document(
    snapshot: &Snapshot,
    entry: &DirectoryEntry,
    directory: &str,
    file: Option<&str>,
    hosts_and_urls: &HostUrls,
) -> (u16, String) {
    let Some(file) = file else {
        return (404, metalink_file_not_found(directory, ""));
    };
    let Some((newest, older)) = snapshot
        .file_details(directory, file)
        .and_then(|details| details.split_first())
    else {
        return (404, metalink_file_not_found(directory, file));
    };

    let mut doc = metalink_header();
    let _ = writeln!(doc, "{}<files>", indent(1));
    let _ = writeln!(doc, "{}<file name=\"{}\">", indent(2), xml_escape(file));
    write_details(&mut doc, newest, 3);

    if !older.is_empty() {
        let _ = writeln!(doc, "{}<mm0:alternates>", indent(3));
        for detail in older {
            let _ = writeln!(doc, "{}<mm0:alternate>", indent(4));
            write_details(&mut doc, detail, 5);
            let _ = writeln!(doc, "{}</mm0:alternate>", indent(4));
        }
        let _ = writeln!(doc, "{}</mm0:alternates>", indent(3));
    }

    let _ = writeln!(doc, "{}<resources maxconnections=\"1\">", indent(3));
    let mut preference = METALINK_PREFERENCE_START;
    for (host_id, urls) in hosts_and_urls {
        let private = if entry.global.contains(host_id) {
            ""
        } else {
            " mm0:private=\"True\""
        };
        let location = snapshot
            .host(*host_id)
            .map(|host| host.country.to_uppercase())
            .unwrap_or_default();
        for url in urls {
            let protocol = scheme_of(url).unwrap_or_default();
            let _ = writeln!(
                doc,
                "{}<url protocol=\"{}\" type=\"{}\" location=\"{}\" preference=\"{}\"{}>{}</url>",
                indent(4),
                protocol,
                protocol,
                xml_escape(&location),
                preference,
                private,
                xml_escape(url)
            );
        }
        preference = preference.saturating_sub(1).max(METALINK_PREFERENCE_FLOOR);
    }
    let _ = writeln!(doc, "{}</resources>", indent(3));
    let _ = writeln!(doc, "{}</file>", indent(2));
    let _ = writeln!(doc, "{}</files>", indent(1));
    doc.push_str("</metalink>\n");
    (200, doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{HostMetadata, SnapshotContents, SnapshotSources};

    fn snapshot() -> (Snapshot, DirectoryEntry) {
        let mut contents = SnapshotContents::default();
        let mut entry = DirectoryEntry::default();
        entry.global.insert(1);
        entry.by_host_id.insert(1, vec![10]);
        entry.by_host_id.insert(2, vec![20]);
        contents
            .directories
            .insert("pub/repo/repodata".to_string(), entry.clone());
        contents.hosts.insert(
            1,
            HostMetadata {
                country: "us".to_string(),
                ..Default::default()
            },
        );
        contents.hosts.insert(
            2,
            HostMetadata {
                country: "FR".to_string(),
                ..Default::default()
            },
        );
        let mut files = std::collections::BTreeMap::new();
        files.insert(
            "repomd.xml".to_string(),
            vec![
                FileDetail {
                    timestamp: Some(200),
                    size: Some(4096),
                    sha256: Some("new".to_string()),
                    ..Default::default()
                },
                FileDetail {
                    timestamp: Some(100),
                    sha256: Some("old".to_string()),
                    ..Default::default()
                },
            ],
        );
        contents
            .file_details
            .insert("pub/repo/repodata".to_string(), files);
        let snapshot = Snapshot::build(contents, &SnapshotSources::default()).unwrap();
        (snapshot, entry)
    }

    #[test]
    fn test_failure_doc_comments_message() {
        let doc = metalink_failure_doc(Some("repo disabled"));
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<metalink version=\"3.0\""));
        assert!(doc.contains("<!--\nrepo disabled\n-->\n"));
        assert!(doc.ends_with("</metalink>\n"));
        assert!(doc.contains("generator=\"mirrormanager\""));
        assert!(doc.contains("pubdate=\""));
        assert!(doc.contains(" GMT\""));
    }

    #[test]
    fn test_missing_file_details_is_not_found() {
        let (snapshot, entry) = snapshot();
        let (code, doc) =
            metalink_document(&snapshot, &entry, "pub/repo/repodata", Some("missing.xml"), &vec![]);
        assert_eq!(code, 404);
        assert!(doc.contains("pub/repo/repodata/missing.xml not found or has no metalink"));
    }

    #[test]
    fn test_document_lists_alternates_and_resources() {
        let (snapshot, entry) = snapshot();
        let hosts = vec![
            (1, vec!["http://us.example/repomd.xml".to_string()]),
            (2, vec!["https://fr.example/a?b&c".to_string()]),
        ];
        let (code, doc) =
            metalink_document(&snapshot, &entry, "pub/repo/repodata", Some("repomd.xml"), &hosts);
        assert_eq!(code, 200);
        assert!(doc.contains("<file name=\"repomd.xml\">"));
        assert!(doc.contains("<mm0:timestamp>200</mm0:timestamp>"));
        assert!(doc.contains("<size>4096</size>"));
        assert!(doc.contains("<hash type=\"sha256\">new</hash>"));
        assert!(doc.contains("<mm0:alternates>"));
        assert!(doc.contains("<hash type=\"sha256\">old</hash>"));
        assert!(doc.contains("<resources maxconnections=\"1\">"));
        assert!(doc.contains(
            "<url protocol=\"http\" type=\"http\" location=\"US\" preference=\"100\">http://us.example/repomd.xml</url>"
        ));
        assert!(doc.contains(
            "<url protocol=\"https\" type=\"https\" location=\"FR\" preference=\"99\" mm0:private=\"True\">https://fr.example/a?b&amp;c</url>"
        ));
    }

    #[test]
    fn test_preference_floor() {
        let (snapshot, entry) = snapshot();
        let hosts: HostUrls = (0..150)
            .map(|_| (1, vec!["http://us.example/r".to_string()]))
            .collect();
        let (_, doc) =
            metalink_document(&snapshot, &entry, "pub/repo/repodata", Some("repomd.xml"), &hosts);
        assert!(doc.contains("preference=\"1\""));
        assert!(!doc.contains("preference=\"0\""));
    }
}
