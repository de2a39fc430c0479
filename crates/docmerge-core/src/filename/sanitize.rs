//! Keeps client-supplied output names inside the staging directory.
//!
//! Only what could leave the directory or corrupt the name is touched; spaces,
//! `%`, `#` and the like stay as they are on disk and are percent-encoded when
//! the URL is built.

/// Linux NAME_MAX.
pub(crate) const NAME_MAX: usize = 255;

/// Sanitizes a client-supplied output filename.
///
/// - Replaces NUL, `/`, `\` and control characters with `_`
/// - A name that is blank or only dots becomes empty (caller falls back to
///   its default)
pub fn sanitize_output_name(name: &str) -> String {
    let out: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if out.trim().is_empty() || out.chars().all(|c| c == '.') {
        String::new()
    } else {
        out
    }
}

/// Cut `stem` so that `stem + extension` fits in NAME_MAX bytes, on a char boundary.
pub(crate) fn fit_to_name_max(stem: &str, extension: &str) -> String {
    let budget = NAME_MAX.saturating_sub(extension.len());
    let mut take = stem.len().min(budget);
    while take > 0 && !stem.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}{}", &stem[..take], extension)
}
