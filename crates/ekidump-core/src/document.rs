//! Decoding of one decompressed dump block into pages.
//!
//! A multistream block is a run of `<page>` fragments with no enclosing root,
//! so the raw bytes are wrapped in a synthetic `<block>` element before they
//! reach the XML reader. Only `page` children of that root become documents.

use std::io::{BufRead, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

use crate::error::{EkiError, Result};

const WRAPPER_OPEN: &[u8] = b"<block>";
const WRAPPER_CLOSE: &[u8] = b"</block>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// Element positions below the synthetic root that carry document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Body,
}

#[derive(Debug, Default)]
struct PageBuilder {
    id: Option<String>,
    title: Option<String>,
    body: String,
}

impl PageBuilder {
    fn append(&mut self, field: Field, text: &str) {
        match field {
            Field::Id => self.id.get_or_insert_with(String::new).push_str(text),
            Field::Title => self.title.get_or_insert_with(String::new).push_str(text),
            Field::Body => self.body.push_str(text),
        }
    }

    fn finish(self, ordinal: usize) -> Result<Document> {
        let raw_id = self
            .id
            .ok_or_else(|| EkiError::decode(format!("page #{ordinal} has no <id>")))?;
        let id = raw_id.trim().parse::<u64>().map_err(|_| {
            EkiError::decode(format!("page #{ordinal} has non-numeric id {raw_id:?}"))
        })?;
        let title = self
            .title
            .ok_or_else(|| EkiError::decode(format!("page {id} has no <title>")))?;
        Ok(Document {
            id,
            title,
            body: self.body,
        })
    }
}

/// Wraps `raw` in the synthetic root, yielding a well-formed XML stream.
pub fn wrap_fragments(raw: &[u8]) -> impl BufRead + '_ {
    WRAPPER_OPEN.chain(raw).chain(WRAPPER_CLOSE)
}

/// Parses the concatenated page fragments of one block, preserving their order.
pub fn decode_documents(raw: &[u8]) -> Result<Vec<Document>> {
    let mut reader = Reader::from_reader(wrap_fragments(raw));
    let mut buf = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut page: Option<PageBuilder> = None;
    let mut documents = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|err| {
            EkiError::decode(format!(
                "malformed markup near byte {}: {err}",
                reader.buffer_position()
            ))
        })?;
        match event {
            Event::Start(start) => {
                let name = start.name().as_ref().to_vec();
                if path.len() == 1 && name == b"page" {
                    page = Some(PageBuilder::default());
                } else if path.len() == 2 && name == b"revision" {
                    // the last revision of a page wins
                    if let Some(page) = page.as_mut() {
                        page.body.clear();
                    }
                }
                path.push(name);
            }
            Event::End(_) => {
                let closed = path.pop();
                if path.len() == 1 && closed.as_deref() == Some(b"page".as_slice()) {
                    if let Some(finished) = page.take() {
                        documents.push(finished.finish(documents.len() + 1)?);
                    }
                }
            }
            Event::Text(text) => {
                if let (Some(field), Some(page)) = (field_at(&path), page.as_mut()) {
                    let text = text.unescape().map_err(|err| {
                        EkiError::decode(format!("invalid character data: {err}"))
                    })?;
                    page.append(field, &text);
                }
            }
            Event::CData(data) => {
                if let (Some(field), Some(page)) = (field_at(&path), page.as_mut()) {
                    let text = std::str::from_utf8(&data).map_err(|err| {
                        EkiError::decode(format!("CDATA is not valid UTF-8: {err}"))
                    })?;
                    page.append(field, text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !path.is_empty() {
        return Err(EkiError::decode(format!(
            "unexpected end of block inside <{}>",
            String::from_utf8_lossy(path.last().map(Vec::as_slice).unwrap_or_default())
        )));
    }
    Ok(documents)
}

fn field_at(path: &[Vec<u8>]) -> Option<Field> {
    match path {
        [_, page, field] if page.as_slice() == b"page" => match field.as_slice() {
            b"id" => Some(Field::Id),
            b"title" => Some(Field::Title),
            _ => None,
        },
        [_, page, revision, text]
            if page.as_slice() == b"page"
                && revision.as_slice() == b"revision"
                && text.as_slice() == b"text" =>
        {
            Some(Field::Body)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: u64, title: &str, body: &str) -> String {
        format!(
            "  <page>\n    <title>{title}</title>\n    <ns>0</ns>\n    <id>{id}</id>\n    \
             <revision>\n      <id>{}</id>\n      <contributor><id>42</id></contributor>\n      \
             <text bytes=\"{}\" xml:space=\"preserve\">{body}</text>\n    </revision>\n  </page>\n",
            id * 1000,
            body.len()
        )
    }

    #[test]
    fn decodes_concatenated_fragments_in_order() {
        let raw = [page(1, "F1", "one"), page(2, "F2", "two"), page(3, "F3", "three")].concat();
        let documents = decode_documents(raw.as_bytes()).expect("decode");
        let ids = documents.iter().map(|doc| doc.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(documents[1].title, "F2");
        assert_eq!(documents[2].body, "three");
    }

    #[test]
    fn uses_page_id_not_revision_or_contributor_id() {
        let documents = decode_documents(page(5, "Five", "x").as_bytes()).expect("decode");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, 5);
    }

    #[test]
    fn unescapes_entities_in_body_and_title() {
        let raw = page(9, "A &amp; B", "{{|| [[:ja:x|y]]（z）}} &lt;ref&gt;");
        let documents = decode_documents(raw.as_bytes()).expect("decode");
        assert_eq!(documents[0].title, "A & B");
        assert_eq!(documents[0].body, "{{|| [[:ja:x|y]]（z）}} <ref>");
    }

    #[test]
    fn empty_text_element_yields_empty_body() {
        let raw = "<page><title>T</title><id>4</id><revision><text bytes=\"0\" /></revision></page>";
        let documents = decode_documents(raw.as_bytes()).expect("decode");
        assert_eq!(documents[0].body, "");
    }

    #[test]
    fn ignores_non_page_fragments() {
        let raw = format!(
            "<siteinfo><sitename>Wikipedia</sitename></siteinfo>{}",
            page(11, "Eleven", "body")
        );
        let documents = decode_documents(raw.as_bytes()).expect("decode");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, 11);
    }

    #[test]
    fn empty_block_decodes_to_no_documents() {
        assert!(decode_documents(b"").expect("decode").is_empty());
    }

    #[test]
    fn mismatched_tags_fail() {
        let err = decode_documents(b"<page><title>T</id></page>").expect_err("must fail");
        assert!(matches!(err, EkiError::Decode { offset: None, .. }), "{err}");
    }

    #[test]
    fn unclosed_page_fails() {
        let err = decode_documents(b"<page><title>T</title><id>1</id>").expect_err("must fail");
        assert!(matches!(err, EkiError::Decode { .. }), "{err}");
    }

    #[test]
    fn page_without_id_fails() {
        let err = decode_documents(b"<page><title>T</title></page>").expect_err("must fail");
        assert!(err.to_string().contains("has no <id>"), "{err}");
    }

    #[test]
    fn page_without_title_fails() {
        let err = decode_documents(b"<page><id>6</id></page>").expect_err("must fail");
        assert!(err.to_string().contains("page 6 has no <title>"), "{err}");
    }

    #[test]
    fn non_numeric_page_id_fails() {
        let err = decode_documents(b"<page><title>T</title><id>6a</id></page>")
            .expect_err("must fail");
        assert!(matches!(err, EkiError::Decode { .. }), "{err}");
        assert!(err.to_string().contains("non-numeric id \"6a\""), "{err}");
    }
}
