// src/core/html.rs
//! Tolerant, case-insensitive HTML scanning.
//!
//! The claims browser is a Drupal site with stable class names, so the page
//! specs locate elements by tag + class and read inside them. No DOM is built.

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

pub fn inner_after_open_tag(block: &str) -> String {
    if let Some(oe) = block.find('>') {
        if let Some(cs) = block.rfind('<') {
            if cs > oe {
                return block[oe + 1..cs].to_string();
            }
        }
    }
    s!()
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                // Keep words from adjacent elements apart ("<li>a</li><li>b</li>").
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    super::sanitize::normalize_ws(&super::sanitize::normalize_entities(&out))
}

/// Does the opening-tag text (`<div class="a b">`) carry `class` as one of its classes?
fn has_class(open_tag: &str, class: &str) -> bool {
    match attr(open_tag, "class") {
        Some(v) => v.split_whitespace().any(|c| c.eq_ignore_ascii_case(class)),
        None => false,
    }
}

/// Does the opening tag carry `id="..."` equal to `id`?
fn has_id(open_tag: &str, id: &str) -> bool {
    attr(open_tag, "id").is_some_and(|v| v.trim().eq_ignore_ascii_case(id))
}

/// Value of attribute `name` inside one opening tag. Handles `"`, `'` and bare values.
pub fn attr(open_tag: &str, name: &str) -> Option<String> {
    let lc = to_lower(open_tag);
    let needle = to_lower(name);
    let mut from = 0usize;

    while let Some(rel) = lc[from..].find(&needle) {
        let at = from + rel;
        from = at + needle.len();

        // Must be a whole attribute name: preceded by whitespace, followed by `=`.
        let before_ok = lc[..at].chars().next_back().is_some_and(|c| c.is_whitespace());
        let rest = lc[from..].trim_start();
        if !before_ok || !rest.starts_with('=') {
            continue;
        }

        let value_start = open_tag.len() - rest.len() + 1;
        let raw = open_tag[value_start..].trim_start();
        let value = match raw.chars().next()? {
            q @ ('"' | '\'') => {
                let body = &raw[1..];
                &body[..body.find(q)?]
            }
            _ => {
                let end = raw
                    .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                    .unwrap_or(raw.len());
                &raw[..end]
            }
        };
        return Some(super::sanitize::normalize_entities(value));
    }
    None
}

/// Text of the opening tag that starts at `start` (up to and including `>`).
pub fn open_tag_at(doc: &str, start: usize) -> Option<&str> {
    let end = doc[start..].find('>')? + start + 1;
    Some(&doc[start..end])
}

/// Start offset of the next `<tag` opener at or after `from` (whole tag name only).
fn next_opener(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let needle = join!("<", tag);
    let mut pos = from;
    loop {
        let at = lc.get(pos..)?.find(&needle)? + pos;
        match lc.as_bytes().get(at + needle.len()).copied() {
            Some(b) if b.is_ascii_whitespace() || b == b'>' || b == b'/' => return Some(at),
            Some(_) => pos = at + needle.len(),
            None => return None,
        }
    }
}

/// Full `(start, end)` range of the `<tag ...>` element opening at `start`,
/// counting nested elements of the same tag. `lc` is `doc` lowercased and
/// `tag` is already lowercase.
fn element_at(doc: &str, lc: &str, tag: &str, start: usize) -> Option<(usize, usize)> {
    let close = join!("</", tag, ">");
    let open_end = doc[start..].find('>')? + start + 1;

    let mut depth = 1usize;
    let mut pos = open_end;
    while depth > 0 {
        let next_close = lc[pos..].find(&close).map(|r| r + pos)?;
        match next_opener(lc, tag, pos) {
            Some(o) if o < next_close => {
                depth += 1;
                pos = o + 1;
            }
            _ => {
                depth -= 1;
                pos = next_close + close.len();
            }
        }
    }
    Some((start, pos))
}

/// First `<tag class="… class …">` element at or after `from`.
pub fn find_by_class(doc: &str, tag: &str, class: &str, from: usize) -> Option<(usize, usize)> {
    find_where(doc, tag, from, |open| has_class(open, class))
}

/// First `<tag id="id">` element.
pub fn find_by_id(doc: &str, tag: &str, id: &str) -> Option<(usize, usize)> {
    find_where(doc, tag, 0, |open| has_id(open, id))
}

fn find_where(doc: &str, tag: &str, from: usize, pred: impl Fn(&str) -> bool) -> Option<(usize, usize)> {
    let lc = to_lower(doc);
    let tag_lc = to_lower(tag);
    let mut pos = from;
    while let Some(at) = next_opener(&lc, &tag_lc, pos) {
        let open = open_tag_at(doc, at)?;
        if pred(open) {
            return element_at(doc, &lc, &tag_lc, at);
        }
        pos = at + 1;
    }
    None
}

/// Every `<tag ...>…</tag>` element directly scanned inside `block`, in order.
/// Nested elements of the same tag are returned as part of their parent only.
pub fn elements<'a>(block: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = to_lower(block);
    let tag_lc = to_lower(tag);
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(at) = next_opener(&lc, &tag_lc, pos) {
        match element_at(block, &lc, &tag_lc, at) {
            Some((s, e)) => {
                out.push(&block[s..e]);
                pos = e;
            }
            None => break,
        }
    }
    out
}

/// Inner text of an element block, tags stripped and whitespace collapsed.
pub fn text_of(block: &str) -> String {
    strip_tags(inner_after_open_tag(block))
}
