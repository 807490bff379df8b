//! Grammar-aware scanning and rewriting of the registry source.
//!
//! The registry is a constrained TypeScript subset: default-import lines
//! followed by `export const versions ... = [ ... ]` holding one object
//! literal per record. Records and fields are found by balanced-delimiter
//! matching with string-literal awareness, so a record whose id textually
//! overlaps another record's fields can never be confused with it.

use std::ops::Range;

use crate::error::CoreError;

pub type Span = Range<usize>;

const LIST_MARKER: &str = "export const versions";

/// One record block with the byte spans needed to rewrite it. Field spans
/// cover the contents of the quoted literal, quotes excluded, so a
/// replacement never touches punctuation.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub block: Span,
    pub id: String,
    pub title: String,
    pub title_span: Span,
    pub variant: String,
    pub variant_span: Span,
    /// Import binding name, verbatim.
    pub component: String,
}

fn parse_err(msg: &str) -> CoreError {
    CoreError::Parse(msg.to_string())
}

/// Advance past the string literal whose opening quote sits at `start`.
/// Returns the index one past the closing quote.
fn skip_string(text: &str, start: usize) -> Result<usize, CoreError> {
    let bytes = text.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return Err(parse_err("unterminated string literal")),
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(parse_err("unterminated string literal"))
}

/// Span of the version list literal, brackets included.
pub fn array_span(text: &str) -> Result<Span, CoreError> {
    let marker = text
        .find(LIST_MARKER)
        .ok_or_else(|| parse_err("version list declaration not found"))?;
    let eq = text[marker..]
        .find('=')
        .map(|i| marker + i)
        .ok_or_else(|| parse_err("version list has no initializer"))?;
    let open = text[eq..]
        .find('[')
        .map(|i| eq + i)
        .ok_or_else(|| parse_err("version list has no opening bracket"))?;

    let bytes = text.as_bytes();
    let mut depth: i32 = 0;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(text, i)?;
                continue;
            }
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth -= 1;
                if depth == 0 {
                    if bytes[i] == b']' {
                        return Ok(open..i + 1);
                    }
                    return Err(parse_err("mismatched delimiter in version list"));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(parse_err("version list is not closed"))
}

fn matching_brace(text: &str, open: usize, limit: usize) -> Result<usize, CoreError> {
    let bytes = text.as_bytes();
    let mut depth: i32 = 0;
    let mut i = open;
    while i < limit {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(text, i)?;
                continue;
            }
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => {
                depth -= 1;
                if depth == 0 {
                    if bytes[i] == b'}' {
                        return Ok(i);
                    }
                    return Err(parse_err("mismatched delimiter in record block"));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(parse_err("record block is not closed"))
}

/// Spans of the `{ ... }` record blocks at list depth, braces included.
pub fn record_blocks(text: &str) -> Result<Vec<Span>, CoreError> {
    let list = array_span(text)?;
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();
    let mut i = list.start + 1;
    let end = list.end - 1;
    while i < end {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(text, i)?;
            }
            b'{' => {
                let close = matching_brace(text, i, end)?;
                blocks.push(i..close + 1);
                i = close + 1;
            }
            _ => i += 1,
        }
    }
    Ok(blocks)
}

/// Parse one record block into field values and rewrite spans. The four
/// fields of the grammar are required; unknown fields are skipped.
pub fn parse_record(text: &str, block: &Span) -> Result<RawRecord, CoreError> {
    let bytes = text.as_bytes();
    let end = block.end - 1;
    let mut i = block.start + 1;

    let mut id = None;
    let mut title = None;
    let mut variant = None;
    let mut component = None;

    while i < end {
        while i < end && (bytes[i].is_ascii_whitespace() || bytes[i] == b',') {
            i += 1;
        }
        if i >= end {
            break;
        }
        let name_start = i;
        while i < end && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
        {
            i += 1;
        }
        if i == name_start {
            return Err(parse_err("expected a field name in record block"));
        }
        let name = &text[name_start..i];
        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= end || bytes[i] != b':' {
            return Err(parse_err("expected `:` after field name"));
        }
        i += 1;
        while i < end && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= end {
            return Err(parse_err("record field has no value"));
        }

        if bytes[i] == b'"' || bytes[i] == b'\'' {
            let past = skip_string(text, i)?;
            let inner = i + 1..past - 1;
            let value = unescape(&text[inner.clone()]);
            match name {
                "id" => id = Some(value),
                "title" => title = Some((value, inner)),
                "type" => variant = Some((value, inner)),
                _ => {}
            }
            i = past;
        } else {
            let token_start = i;
            let mut depth: i32 = 0;
            while i < end {
                match bytes[i] {
                    b'"' | b'\'' => {
                        i = skip_string(text, i)?;
                        continue;
                    }
                    b'{' | b'[' | b'(' => depth += 1,
                    b'}' | b']' | b')' => depth -= 1,
                    b',' if depth == 0 => break,
                    _ => {}
                }
                i += 1;
            }
            if name == "component" {
                component = Some(text[token_start..i].trim().to_string());
            }
        }
    }

    let id = id.ok_or_else(|| parse_err("record has no id field"))?;
    let (title, title_span) = title.ok_or_else(|| parse_err("record has no title field"))?;
    let (variant, variant_span) = variant.ok_or_else(|| parse_err("record has no type field"))?;
    let component = component.ok_or_else(|| parse_err("record has no component field"))?;

    Ok(RawRecord {
        block: block.clone(),
        id,
        title,
        title_span,
        variant,
        variant_span,
        component,
    })
}

/// All records in registry order.
pub fn parse_all(text: &str) -> Result<Vec<RawRecord>, CoreError> {
    record_blocks(text)?
        .into_iter()
        .map(|block| parse_record(text, &block))
        .collect()
}

/// The unique record with the given id. Zero matches is `NotFound`, more
/// than one is `DuplicateId` — a duplicate means the registry is corrupt
/// and no rewrite should be attempted.
pub fn locate(text: &str, id: &str) -> Result<RawRecord, CoreError> {
    let mut found: Option<RawRecord> = None;
    for block in record_blocks(text)? {
        let record = parse_record(text, &block)?;
        if record.id == id {
            if found.is_some() {
                return Err(CoreError::DuplicateId { id: id.to_string() });
            }
            found = Some(record);
        }
    }
    found.ok_or_else(|| CoreError::NotFound { id: id.to_string() })
}

/// Swap the span contents for `new`, leaving the input untouched.
pub fn replace(text: &str, span: &Span, new: &str) -> String {
    let mut out = String::with_capacity(text.len() - span.len() + new.len());
    out.push_str(&text[..span.start]);
    out.push_str(new);
    out.push_str(&text[span.end..]);
    out
}

/// Full line of the default import named `binding`, trailing newline
/// included, plus its quoted module path.
pub fn import_line(text: &str, binding: &str) -> Option<(Span, String)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let span = offset..offset + line.len();
        offset += line.len();

        let Some(rest) = line.trim_start().strip_prefix("import") else {
            continue;
        };
        let rest = rest.trim_start();
        let ident_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        if ident_len == 0 || &rest[..ident_len] != binding {
            continue;
        }
        let Some(tail) = rest[ident_len..].trim_start().strip_prefix("from") else {
            continue;
        };
        let tail = tail.trim_start();
        let quote = match tail.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => continue,
        };
        let body = &tail[1..];
        let Some(close) = body.find(quote) else {
            continue;
        };
        return Some((span, body[..close].to_string()));
    }
    None
}

/// Drop a record block plus one neighboring comma, then strip any comma
/// left dangling before the list's closing bracket.
pub fn remove_record(text: &str, record: &RawRecord) -> Result<String, CoreError> {
    let bytes = text.as_bytes();
    let mut start = record.block.start;
    let mut end = record.block.end;

    // take the indentation too when the block starts its own line
    let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if text[line_start..start]
        .bytes()
        .all(|b| b == b' ' || b == b'\t')
    {
        start = line_start;
    }

    // prefer swallowing the trailing comma, fall back to a leading one
    let mut cursor = end;
    while cursor < bytes.len() && (bytes[cursor] == b' ' || bytes[cursor] == b'\t') {
        cursor += 1;
    }
    if cursor < bytes.len() && bytes[cursor] == b',' {
        end = cursor + 1;
        if bytes.get(end) == Some(&b'\r') {
            end += 1;
        }
        if bytes.get(end) == Some(&b'\n') {
            end += 1;
        }
    } else {
        let head = text[..start].trim_end();
        if head.ends_with(',') {
            start = head.len() - 1;
        }
    }

    let shorter = format!("{}{}", &text[..start], &text[end..]);
    strip_dangling_comma(&shorter)
}

fn strip_dangling_comma(text: &str) -> Result<String, CoreError> {
    let list = array_span(text)?;
    let bytes = text.as_bytes();
    let mut i = list.end - 1;
    while i > list.start + 1 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    if i > list.start + 1 && bytes[i - 1] == b',' {
        return Ok(format!("{}{}", &text[..i - 1], &text[i..]));
    }
    Ok(text.to_string())
}

/// Escape a value for embedding in a quoted literal.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Lenient inverse of `escape`: an unknown escape collapses to the bare
/// character.
pub fn unescape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"import type { ComponentType } from "react"

import V1Draft from "./src/v1-draft"
import V10Hero from "./src/v10-hero"

export type VariantType = "final" | "page" | "element"

export const versions: { id: string; title: string; type: VariantType; component: ComponentType }[] = [
  { id: "v1", title: "Draft", type: "page", component: V1Draft },
  { id: "v10", title: "Hero", type: "final", component: V10Hero },
]
"#;

    #[test]
    fn test_record_blocks_skips_the_type_annotation() {
        // the annotation between `versions:` and `=` also contains braces
        let blocks = record_blocks(REGISTRY).unwrap();
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_parse_record_fields() {
        let blocks = record_blocks(REGISTRY).unwrap();
        let first = parse_record(REGISTRY, &blocks[0]).unwrap();
        assert_eq!(first.id, "v1");
        assert_eq!(first.title, "Draft");
        assert_eq!(first.variant, "page");
        assert_eq!(first.component, "V1Draft");
        assert_eq!(&REGISTRY[first.title_span.clone()], "Draft");
        assert_eq!(&REGISTRY[first.variant_span.clone()], "page");
    }

    #[test]
    fn test_locate_is_anchored_to_the_id_field() {
        // "v1" is a prefix of "v10"; neither may match the other
        let record = locate(REGISTRY, "v1").unwrap();
        assert_eq!(record.title, "Draft");
        let record = locate(REGISTRY, "v10").unwrap();
        assert_eq!(record.title, "Hero");
    }

    #[test]
    fn test_locate_unknown_id() {
        assert!(matches!(
            locate(REGISTRY, "v2"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_locate_duplicate_id() {
        let doubled = REGISTRY.replace(r#"id: "v10""#, r#"id: "v1""#);
        assert!(matches!(
            locate(&doubled, "v1"),
            Err(CoreError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_unbalanced_list_is_a_parse_error() {
        let broken = REGISTRY.replace("]\n", "");
        assert!(matches!(
            record_blocks(&broken),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn test_replace_only_touches_the_span() {
        let record = locate(REGISTRY, "v1").unwrap();
        let updated = replace(REGISTRY, &record.variant_span, "final");
        assert!(updated.contains(r#"{ id: "v1", title: "Draft", type: "final", component: V1Draft }"#));
        assert!(updated.contains(r#"{ id: "v10", title: "Hero", type: "final", component: V10Hero }"#));
        // input untouched
        assert!(REGISTRY.contains(r#"type: "page""#));
    }

    #[test]
    fn test_import_line_matches_the_whole_binding() {
        let (_, path) = import_line(REGISTRY, "V1Draft").unwrap();
        assert_eq!(path, "./src/v1-draft");
        let (span, _) = import_line(REGISTRY, "V10Hero").unwrap();
        assert_eq!(
            &REGISTRY[span],
            "import V10Hero from \"./src/v10-hero\"\n"
        );
        assert!(import_line(REGISTRY, "V1").is_none());
        assert!(import_line(REGISTRY, "ComponentType").is_none());
    }

    #[test]
    fn test_remove_record_middle_keeps_punctuation() {
        let record = locate(REGISTRY, "v1").unwrap();
        let updated = remove_record(REGISTRY, &record).unwrap();
        assert!(!updated.contains(r#"id: "v1","#));
        assert!(updated.contains(r#"{ id: "v10""#));
        assert!(!updated.contains(",,"));
        assert!(!updated.contains(",\n]"));
        assert_eq!(record_blocks(&updated).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_record_last_strips_dangling_comma() {
        let record = locate(REGISTRY, "v10").unwrap();
        let updated = remove_record(REGISTRY, &record).unwrap();
        assert!(!updated.contains("v10"));
        assert!(!updated.contains(",\n]"));
        assert_eq!(record_blocks(&updated).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_only_record_leaves_an_empty_list() {
        let single = r#"import V1Draft from "./src/v1-draft"

export const versions = [{ id: "v1", title: "Draft", type: "page", component: V1Draft }]
"#;
        let record = locate(single, "v1").unwrap();
        let updated = remove_record(single, &record).unwrap();
        assert_eq!(record_blocks(&updated).unwrap().len(), 0);
        assert!(!updated.contains(','));
    }

    #[test]
    fn test_remove_inline_record_uses_the_leading_comma() {
        let inline = r#"export const versions = [{ id: "a", title: "A", type: "page", component: CA }, { id: "b", title: "B", type: "final", component: CB }]
"#;
        let record = locate(inline, "b").unwrap();
        let updated = remove_record(inline, &record).unwrap();
        assert_eq!(record_blocks(&updated).unwrap().len(), 1);
        assert!(!updated.contains(",]"));
        assert!(updated.contains(r#"id: "a""#));
    }

    #[test]
    fn test_escape_unescape_round_trip() {
        let title = "He said \"hi\" \\ o'clock\nnext\tline";
        assert_eq!(unescape(&escape(title)), title);
    }

    #[test]
    fn test_title_with_quotes_survives_a_rewrite() {
        let record = locate(REGISTRY, "v1").unwrap();
        let updated = replace(REGISTRY, &record.title_span, &escape("Say \"cheese\""));
        let reparsed = locate(&updated, "v1").unwrap();
        assert_eq!(reparsed.title, "Say \"cheese\"");
        // the rest of the record is intact
        assert_eq!(reparsed.variant, "page");
        assert_eq!(reparsed.component, "V1Draft");
    }
}
