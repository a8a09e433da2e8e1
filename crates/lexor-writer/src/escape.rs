//! One-pass string replacement.

/// Replace every key of `pairs` in `text` in a single left-to-right pass.
///
/// At each position the first matching key wins, and replaced text is never
/// scanned again, so `&` can be escaped alongside entities that contain it.
///
/// ```
/// use lexor_writer::escape::replace;
/// assert_eq!(
///     replace("a < b && b < c", &[("<", "&lt;"), ("&", "&amp;")]),
///     "a &lt; b &amp;&amp; b &lt; c"
/// );
/// ```
#[must_use]
pub fn replace(text: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(c) = rest.chars().next() {
        for (key, value) in pairs {
            if !key.is_empty() && rest.starts_with(key) {
                out.push_str(value);
                rest = &rest[key.len()..];
                continue 'scan;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Escape character data for XML-like output.
#[must_use]
pub fn escape_text(text: &str) -> String {
    replace(text, &[("&", "&amp;"), ("<", "&lt;"), (">", "&gt;")])
}

/// Escape a double-quoted attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    replace(text, &[("&", "&amp;"), ("<", "&lt;"), ("\"", "&quot;")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_is_single_pass() {
        assert_eq!(replace("ab", &[("a", "b"), ("b", "a")]), "ba");
        assert_eq!(replace("", &[("a", "b")]), "");
    }

    #[test]
    fn test_first_listed_key_wins() {
        assert_eq!(replace("aaa", &[("aa", "x"), ("a", "y")]), "xy");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(escape_text("1 < 2 & 3 > 2"), "1 &lt; 2 &amp; 3 &gt; 2");
        assert_eq!(escape_attr("say \"hé\""), "say &quot;hé&quot;");
    }
}
