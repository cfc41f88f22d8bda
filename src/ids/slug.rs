//! Conversion of names and path segments into id segments.

/// Turn an arbitrary name into an id segment.
///
/// Lower-cases, replaces every character outside letters, ASCII digits,
/// `.`, `_` and `-` with `_`, collapses runs of `_` and trims `_` from both
/// ends. The result may be empty.
pub fn path_segment_for_name(name: &str) -> String {
    let mut segment = String::with_capacity(name.len());
    for ch in name.chars() {
        let valid = ch.is_alphabetic() || ch.is_ascii_digit() || matches!(ch, '_' | '.' | '-');
        if !valid {
            if !segment.ends_with('_') {
                segment.push('_');
            }
            continue;
        }
        for lower in ch.to_lowercase() {
            if lower == '_' && segment.ends_with('_') {
                continue;
            }
            segment.push(lower);
        }
    }
    segment.trim_matches('_').to_string()
}

/// Id segment that is safe to use as a base id: never empty and never
/// starting with a digit.
pub fn base_id_for(name: &str) -> String {
    let segment = path_segment_for_name(name);
    match segment.chars().next() {
        None => "id".to_string(),
        Some(first) if first.is_ascii_digit() => format!("a{segment}"),
        Some(_) => segment,
    }
}
