//! String helpers for names and Windows-style paths

/// Glyphs removed from program names before import
const TRADEMARK_GLYPHS: [char; 3] = ['™', '©', '®'];

/// Remove trademark, copyright and registered glyphs from a name
pub fn remove_trademarks(name: &str) -> String {
    name.chars()
        .filter(|c| !TRADEMARK_GLYPHS.contains(c))
        .collect()
}

/// Separator used by `path`: `/` for paths that only use forward slashes, `\` otherwise
pub fn dir_separator(path: &str) -> char {
    if path.contains('/') && !path.contains('\\') {
        '/'
    } else {
        '\\'
    }
}

/// Append a directory separator unless `path` already ends with one
pub fn end_with_dir_separator(path: &str, separator: char) -> String {
    if path.ends_with(['\\', '/']) {
        path.to_string()
    } else {
        format!("{path}{separator}")
    }
}

/// Strip `prefix` from the start of `path`, ignoring ASCII case
pub fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let head = path.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &path[prefix.len()..])
}

/// Replace the directory `dir` at the start of `path` with `placeholder`
///
/// Both directory and placeholder are compared and emitted with a trailing
/// separator, so `C:\Games\Foo` never matches `C:\Games\FooBar\x.exe`.
/// Returns `None` when `path` is not inside `dir`.
pub fn replace_dir_prefix(path: &str, dir: &str, placeholder: &str) -> Option<String> {
    let separator = dir_separator(dir);
    let dir = end_with_dir_separator(dir, separator);
    let rest = strip_prefix_ignore_case(path, &dir)?;
    Some(format!(
        "{}{rest}",
        end_with_dir_separator(placeholder, separator)
    ))
}
