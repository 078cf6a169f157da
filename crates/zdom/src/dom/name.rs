//! Element and attribute name cleaning

/// Bytes allowed to start a name
pub(crate) const fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

/// Bytes allowed anywhere after the first one
pub(crate) const fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// Normalize a raw name.
///
/// Trims the input, drops every character outside `[A-Za-z0-9:_.-]`, then
/// drops the leading run of characters that cannot start a name. The result
/// may be empty; callers decide whether that is an error.
///
/// ```
/// use zdom::clean_name;
///
/// assert_eq!(clean_name("  my tag! "), "mytag");
/// assert_eq!(clean_name("9-lives"), "lives");
/// assert_eq!(clean_name("123"), "");
/// ```
pub fn clean_name(raw: &str) -> String {
    let kept: String = raw
        .trim()
        .chars()
        .filter(|ch| u8::try_from(*ch).is_ok_and(is_name_char))
        .collect();
    kept.trim_start_matches(|ch: char| !u8::try_from(ch).is_ok_and(is_name_start))
        .to_string()
}

/// True when `name` is already in cleaned form and non-empty
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) => is_name_start(*first) && rest.iter().all(|b| is_name_char(*b)),
        None => false,
    }
}
