//! Lexical rules shared by the xml parser and writer.
//!
//! The writer only escapes what the parser would otherwise read as markup,
//! so text that came out of a parse is written back unchanged.

/// Returns `true` if `c` may start a name (XML 1.0 §2.3 [4]).
pub(crate) const fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// Returns `true` if `c` may continue a name (XML 1.0 §2.3 [4a]).
pub(crate) const fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// Byte length of the name at the start of `text`, 0 if there is none.
#[must_use]
pub fn name_len(text: &str) -> usize {
    match text.chars().next() {
        Some(c) if is_name_start_char(c) => {}
        _ => return 0,
    }
    text.char_indices()
        .skip(1)
        .find(|&(_, c)| !is_name_char(c))
        .map_or(text.len(), |(i, _)| i)
}

/// Byte length of the entity reference at the start of `text`, 0 if there
/// is none. Accepts `&name;`, `&#NNN;` and `&#xHHH;`.
#[must_use]
pub fn entity_len(text: &str) -> usize {
    let Some(body) = text.strip_prefix('&') else {
        return 0;
    };
    let digits = |s: &str, hex: bool| {
        s.len()
            - s.trim_start_matches(|c: char| {
                if hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() }
            })
            .len()
    };
    let len = if let Some(num) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        Some(digits(num, true)).filter(|&n| n > 0).map(|n| n + 2)
    } else if let Some(num) = body.strip_prefix('#') {
        Some(digits(num, false)).filter(|&n| n > 0).map(|n| n + 1)
    } else {
        Some(name_len(body)).filter(|&n| n > 0)
    };
    match len {
        Some(n) if body[n..].starts_with(';') => n + 2,
        _ => 0,
    }
}

/// The character an entity reference such as `&amp;` stands for.
///
/// Only the predefined entities and character references are known.
#[must_use]
pub fn decode_entity(entity: &str) -> Option<char> {
    let body = entity.strip_prefix('&')?.strip_suffix(';')?;
    match body {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = body.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Replace known entity references in an attribute value.
#[must_use]
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let len = entity_len(rest);
        match decode_entity(&rest[..len]) {
            Some(c) if len > 0 => {
                out.push(c);
                rest = &rest[len..];
            }
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Returns `true` if the parser reads markup at the start of `text`.
#[must_use]
pub fn opens_markup(text: &str) -> bool {
    let Some(rest) = text.strip_prefix('<') else {
        return false;
    };
    if rest.starts_with("!--") || rest.starts_with("![CDATA[") || is_doctype(rest) {
        return true;
    }
    let name = rest
        .strip_prefix('/')
        .or_else(|| rest.strip_prefix('?'))
        .unwrap_or(rest);
    name_len(name) > 0
}

/// Returns `true` if `text` (after the `<`) starts a doctype declaration.
pub(crate) fn is_doctype(text: &str) -> bool {
    text.get(..8)
        .is_some_and(|head| head.eq_ignore_ascii_case("!DOCTYPE"))
}

/// Escape `&` and `<` where they would otherwise start an entity or markup.
#[must_use]
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '&' if entity_len(&text[i..]) > 0 => out.push_str("&amp;"),
            '<' if opens_markup(&text[i..]) => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}
