//! Multipart MIME traversal: one parsed message tree in, plain-text body
//! and attachment blobs out.

use mailparse::{DispositionType, ParsedMail};
use tracing::warn;

/// Placeholder for attachment parts that declare no filename.
const FALLBACK_FILE_NAME: &str = "unknown";

/// Everything the scanner needs out of one message.
#[derive(Debug, Default)]
pub struct ExtractedContent {
    /// All `text/plain` leaves, newline-joined in depth-first order.
    /// Empty when the message has no plain-text part.
    pub body_text: String,
    pub attachments: Vec<ExtractedAttachment>,
}

/// A decoded attachment leaf, not yet persisted anywhere.
#[derive(Debug)]
pub struct ExtractedAttachment {
    /// Declared filename with all whitespace stripped. Collisions between
    /// attachments of the same name are accepted.
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Walks a message tree depth-first. Plain-text leaves accumulate into the
/// body; leaves with an attachment disposition are yielded regardless of
/// their declared MIME type.
///
/// At each multipart level only the first nested multipart container is
/// descended, and siblings after it are not scanned. Messages carrying
/// several sibling containers at one level lose the later ones; this matches
/// the shipped traversal and is kept deliberately (see DESIGN.md).
pub fn walk(root: &ParsedMail) -> ExtractedContent {
    let mut content = ExtractedContent::default();
    visit(root, &mut content);
    content
}

fn visit(part: &ParsedMail, out: &mut ExtractedContent) {
    if !is_multipart(part) {
        collect_leaf(part, out);
        return;
    }
    for child in &part.subparts {
        if is_multipart(child) {
            visit(child, out);
            break;
        }
        collect_leaf(child, out);
    }
}

fn is_multipart(part: &ParsedMail) -> bool {
    part.ctype
        .mimetype
        .to_ascii_lowercase()
        .starts_with("multipart/")
}

fn collect_leaf(part: &ParsedMail, out: &mut ExtractedContent) {
    let disposition = part.get_content_disposition();
    if disposition.disposition == DispositionType::Attachment {
        match part.get_body_raw() {
            Ok(data) => {
                let file_name = disposition
                    .params
                    .get("filename")
                    .or_else(|| part.ctype.params.get("name"))
                    .map(|name| sanitize_file_name(name))
                    .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
                out.attachments.push(ExtractedAttachment { file_name, data });
            }
            Err(e) => warn!("skipping unreadable attachment part: {e}"),
        }
        return;
    }

    if part.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
        match part.get_body() {
            Ok(text) => {
                out.body_text.push_str(&text);
                out.body_text.push('\n');
            }
            Err(e) => warn!("skipping undecodable text part: {e}"),
        }
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_root_becomes_body() {
        let raw = b"Content-Type: text/plain; charset=utf-8\r\n\r\nWe would like to interview you.";
        let parsed = mailparse::parse_mail(raw).unwrap();

        let content = walk(&parsed);
        assert_eq!(content.body_text.trim(), "We would like to interview you.");
        assert!(content.attachments.is_empty());
    }

    #[test]
    fn test_multipart_with_text_and_two_attachments() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b1\"\r\n\r\n",
            "--b1\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n\r\n",
            "Congratulations on your offer.\r\n",
            "--b1\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: attachment; filename=\"offer letter.pdf\"\r\n",
            "Content-Transfer-Encoding: base64\r\n\r\n",
            "aGVsbG8=\r\n",
            "--b1\r\n",
            "Content-Type: application/octet-stream\r\n",
            "Content-Disposition: attachment; filename=\"terms.txt\"\r\n\r\n",
            "standard terms\r\n",
            "--b1--\r\n",
        );
        let parsed = mailparse::parse_mail(raw.as_bytes()).unwrap();

        let content = walk(&parsed);
        assert!(content.body_text.contains("Congratulations on your offer."));
        assert_eq!(content.attachments.len(), 2);
        // whitespace is stripped out of declared filenames
        assert_eq!(content.attachments[0].file_name, "offerletter.pdf");
        assert_eq!(content.attachments[0].data, b"hello");
        assert_eq!(content.attachments[1].file_name, "terms.txt");
    }

    #[test]
    fn test_attachment_disposition_wins_over_declared_text_type() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b1\"\r\n\r\n",
            "--b1\r\n",
            "Content-Type: text/plain\r\n",
            "Content-Disposition: attachment; filename=\"notes.txt\"\r\n\r\n",
            "attached notes\r\n",
            "--b1--\r\n",
        );
        let parsed = mailparse::parse_mail(raw.as_bytes()).unwrap();

        let content = walk(&parsed);
        assert_eq!(content.body_text, "");
        assert_eq!(content.attachments.len(), 1);
        assert_eq!(content.attachments[0].file_name, "notes.txt");
    }

    #[test]
    fn test_missing_filename_uses_placeholder() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b1\"\r\n\r\n",
            "--b1\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: attachment\r\n\r\n",
            "pdf bytes\r\n",
            "--b1--\r\n",
        );
        let parsed = mailparse::parse_mail(raw.as_bytes()).unwrap();

        let content = walk(&parsed);
        assert_eq!(content.attachments.len(), 1);
        assert_eq!(content.attachments[0].file_name, "unknown");
    }

    #[test]
    fn test_no_plain_text_leaf_yields_empty_body() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b1\"\r\n\r\n",
            "--b1\r\n",
            "Content-Type: text/html\r\n\r\n",
            "<p>html only</p>\r\n",
            "--b1--\r\n",
        );
        let parsed = mailparse::parse_mail(raw.as_bytes()).unwrap();

        let content = walk(&parsed);
        assert_eq!(content.body_text, "");
    }

    #[test]
    fn test_descends_into_nested_container() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"outer\"\r\n\r\n",
            "--outer\r\n",
            "Content-Type: multipart/alternative; boundary=\"inner\"\r\n\r\n",
            "--inner\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "nested plain text\r\n",
            "--inner\r\n",
            "Content-Type: text/html\r\n\r\n",
            "<p>nested html</p>\r\n",
            "--inner--\r\n",
            "--outer--\r\n",
        );
        let parsed = mailparse::parse_mail(raw.as_bytes()).unwrap();

        let content = walk(&parsed);
        assert!(content.body_text.contains("nested plain text"));
        assert!(!content.body_text.contains("nested html"));
    }

    #[test]
    fn test_siblings_after_nested_container_are_not_scanned() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"outer\"\r\n\r\n",
            "--outer\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "before the container\r\n",
            "--outer\r\n",
            "Content-Type: multipart/alternative; boundary=\"inner\"\r\n\r\n",
            "--inner\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "inside the container\r\n",
            "--inner--\r\n",
            "--outer\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: attachment; filename=\"late.pdf\"\r\n\r\n",
            "late attachment\r\n",
            "--outer--\r\n",
        );
        let parsed = mailparse::parse_mail(raw.as_bytes()).unwrap();

        let content = walk(&parsed);
        assert!(content.body_text.contains("before the container"));
        assert!(content.body_text.contains("inside the container"));
        // the attachment after the nested container is lost by design
        assert!(content.attachments.is_empty());
    }

    #[test]
    fn test_body_parts_concatenate_in_order() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b1\"\r\n\r\n",
            "--b1\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "first part\r\n",
            "--b1\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "second part\r\n",
            "--b1--\r\n",
        );
        let parsed = mailparse::parse_mail(raw.as_bytes()).unwrap();

        let content = walk(&parsed);
        let first = content.body_text.find("first part").unwrap();
        let second = content.body_text.find("second part").unwrap();
        assert!(first < second);
    }
}
