use ulid::Ulid;

const MAX_NAME_LEN: usize = 128;

/// Reduces an arbitrary user-supplied file name to a safe key fragment.
///
/// Anything outside `[A-Za-z0-9._/-]` becomes `-`, and empty or dot-only path
/// segments are dropped so the result can neither climb out of the key prefix
/// nor start with a slash.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' | '/' => c,
            _ => '-',
        })
        .collect();

    // Cap before filtering so the cut can never expose a dot-only segment.
    // Everything left is ASCII, so byte slicing is safe.
    let capped = &replaced[replaced.len().saturating_sub(MAX_NAME_LEN)..];

    let trimmed = capped
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.chars().all(|c| c == '.'))
        .collect::<Vec<_>>()
        .join("/");

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed
    }
}

/// Builds `<prefix>/<ulid>-<sanitized name>`.
///
/// The ULID carries 80 random bits next to its millisecond timestamp, so two
/// keys minted in the same millisecond for the same name collide with
/// probability 2^-80.
pub fn generate_object_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let fragment = format!("{}-{}", Ulid::new().to_string().to_lowercase(), sanitize_file_name(name));
    if prefix.is_empty() {
        fragment
    } else {
        format!("{}/{}", prefix, fragment)
    }
}
