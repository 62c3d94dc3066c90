//! Tag scanner for the feed's XML payload.
//!
//! The payload is a flat list of `<item>` blocks, each holding one level of
//! `<field>value</field>` pairs. A scan over those tags is all the structure
//! the feed has, so no document parser is involved.

use std::collections::HashMap;

/// One `<item>` block: field name → trimmed text.
pub type RawRecord = HashMap<String, String>;

const ITEM_OPEN: &str = "<item>";
const ITEM_CLOSE: &str = "</item>";

/// Extract every `<item>` block. Malformed or empty input yields no records.
pub fn parse_records(raw: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut rest = raw;

    while let Some(start) = rest.find(ITEM_OPEN) {
        let body_start = start + ITEM_OPEN.len();
        let Some(len) = rest[body_start..].find(ITEM_CLOSE) else {
            break;
        };
        let fields = parse_fields(&rest[body_start..body_start + len]);
        if !fields.is_empty() {
            records.push(fields);
        }
        rest = &rest[body_start + len + ITEM_CLOSE.len()..];
    }

    records
}

/// Collect `<tag>value</tag>` pairs from one item body. Unknown tags pass
/// through; an opening tag without its closing tag is skipped.
fn parse_fields(body: &str) -> RawRecord {
    let mut fields = RawRecord::new();
    let mut pos = 0;

    while let Some(offset) = body[pos..].find('<') {
        let open = pos + offset;
        let Some(name_len) = body[open + 1..].find('>') else {
            break;
        };
        let name = &body[open + 1..open + 1 + name_len];
        let value_start = open + 1 + name_len + 1;

        if name.is_empty() || name.starts_with('/') || name.ends_with('/') {
            pos = value_start;
            continue;
        }

        let close_tag = format!("</{name}>");
        match body[value_start..].find(&close_tag) {
            Some(value_len) => {
                let value = &body[value_start..value_start + value_len];
                fields.insert(name.trim().to_string(), unescape(value.trim()));
                pos = value_start + value_len + close_tag.len();
            }
            None => pos = value_start,
        }
    }

    fields
}

/// Decode the predefined XML entities.
fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Read a top-level scalar such as `<totalCount>`; None when absent.
pub fn header_value<'a>(raw: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = raw.find(&open)? + open.len();
    let len = raw[start..].find(&close)?;
    Some(raw[start..start + len].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<response><header><resultCode>000</resultCode><resultMsg>OK</resultMsg></header>
<body><items>
<item><aptNm> 래미안퍼스티지 </aptNm><dealAmount>   245,000</dealAmount><dealYear>2024</dealYear><dealMonth>3</dealMonth><dealDay>7</dealDay><excluUseAr>84.93</excluUseAr><floor>12</floor></item>
<item><aptNm>반포자이</aptNm><dealAmount>310,000</dealAmount><cdealType>O</cdealType></item>
</items><numOfRows>500</numOfRows><pageNo>1</pageNo><totalCount>2</totalCount></body></response>"#;

    #[test]
    fn parses_item_blocks() {
        let records = parse_records(PAYLOAD);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["aptNm"], "래미안퍼스티지");
        assert_eq!(records[0]["dealAmount"], "245,000");
        assert_eq!(records[0]["dealMonth"], "3");
        assert_eq!(records[1]["cdealType"], "O");
        assert!(!records[1].contains_key("floor"));
    }

    #[test]
    fn zero_items_returns_empty() {
        let raw = "<response><header><resultCode>000</resultCode></header><body><items></items></body></response>";
        assert!(parse_records(raw).is_empty());
    }

    #[test]
    fn garbage_returns_empty() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("not xml at all").is_empty());
        assert!(parse_records("<item><aptNm>unterminated").is_empty());
    }

    #[test]
    fn unclosed_field_is_skipped() {
        let raw = "<item><floor>3<aptNm>힐스테이트</aptNm></item>";
        let records = parse_records(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["aptNm"], "힐스테이트");
        assert!(!records[0].contains_key("floor"));
    }

    #[test]
    fn self_closing_and_empty_items_are_ignored() {
        let raw = "<item><cdealType/><aptNm>A</aptNm></item><item></item>";
        let records = parse_records(raw);
        assert_eq!(records.len(), 1);
        assert!(!records[0].contains_key("cdealType"));
    }

    #[test]
    fn decodes_entities() {
        let raw = "<item><aptNm>Lotte &amp; Castle</aptNm></item>";
        assert_eq!(parse_records(raw)[0]["aptNm"], "Lotte & Castle");
    }

    #[test]
    fn reads_header_scalars() {
        assert_eq!(header_value(PAYLOAD, "totalCount"), Some("2"));
        assert_eq!(header_value(PAYLOAD, "resultMsg"), Some("OK"));
        assert_eq!(header_value(PAYLOAD, "missing"), None);
    }
}
