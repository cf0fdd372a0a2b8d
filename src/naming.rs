//! Centralized filename parsing for the `NN.name` convention.
//!
//! Categories, sub-categories and documents all follow the same naming
//! pattern: an optional numeric prefix (`NN.`) followed by a name. The prefix
//! only drives display order; it never appears in a public URL.
//!
//! - `1.cs/` → ordinal 1, clean name `cs`
//! - `03.quick-sort.md` (stem `03.quick-sort`) → ordinal 3, clean name `quick-sort`
//! - `introduction.md` → unnumbered, clean name `introduction`
//!
//! Unnumbered entries sort after every numbered sibling and keep their
//! encounter order relative to each other.

/// Name of the landing document of a category or sub-category.
pub const INTRODUCTION: &str = "introduction";

/// Result of parsing a numbered entry name like `2.design-pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Ordinal prefix if present (e.g. `2` from `2.design-pattern`).
    pub number: Option<u32>,
    /// The ordinal exactly as written (`"03"` from `03.setup`).
    pub digits: Option<String>,
    /// Name with the ordinal and its separator stripped. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
}

/// Parse an entry name following the `NN.name` convention.
///
/// - `"2.design-pattern"` → number=Some(2), name="design-pattern"
/// - `"10.a.b"` → number=Some(10), name="a.b"
/// - `"7"` → number=Some(7), name=""
/// - `"12abc"` → number=Some(12), name="12abc" (no separator to strip)
/// - `"notes"` → number=None, name="notes"
pub fn parse_entry_name(name: &str) -> ParsedName {
    let digit_len = name.bytes().take_while(u8::is_ascii_digit).count();
    let digits = &name[..digit_len];

    let Ok(number) = digits.parse::<u32>() else {
        return ParsedName {
            number: None,
            digits: None,
            name: name.to_string(),
        };
    };

    let rest = &name[digit_len..];
    let clean = if rest.is_empty() {
        String::new()
    } else if let Some(stripped) = rest.strip_prefix('.') {
        stripped.to_string()
    } else {
        name.to_string()
    };

    ParsedName {
        number: Some(number),
        digits: Some(digits.to_string()),
        name: clean,
    }
}

/// Strip the `NN.` prefix from a single path segment.
pub fn clean_segment(segment: &str) -> String {
    parse_entry_name(segment).name
}

/// Sort key: numbered entries by ordinal, unnumbered entries last.
pub fn sort_key(name: &str) -> u64 {
    parse_entry_name(name)
        .number
        .map(u64::from)
        .unwrap_or(u64::MAX)
}

/// Stable sort by ordinal prefix of the name returned by `name_of`.
///
/// Ties (equal ordinals, or two unnumbered names) keep their input order.
pub fn sort_by_ordinal<T>(items: &mut [T], name_of: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| sort_key(name_of(item)));
}

/// Next free ordinal among `names`: the largest existing ordinal plus one.
pub fn next_ordinal<'a>(names: impl IntoIterator<Item = &'a str>) -> u32 {
    names
        .into_iter()
        .filter_map(|n| parse_entry_name(n).number)
        .max()
        .map(|n| n.saturating_add(1))
        .unwrap_or(1)
}

/// Whether `path` names a markdown file (`.md`, any case).
pub fn is_markdown_path(path: &std::path::Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

/// Whether a file stem names an introduction document (`introduction`,
/// `1.introduction`).
pub fn is_introduction(stem: &str) -> bool {
    parse_entry_name(stem).name == INTRODUCTION
}
