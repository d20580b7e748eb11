/// Longest channel name the platform accepts.
pub const MAX_CHANNEL_NAME_CHARS: usize = 100;

/// Turn a free-form reply into a voice channel name.
///
/// Truncates to [`MAX_CHANNEL_NAME_CHARS`] characters, drops everything but
/// ASCII letters, digits, space, `_` and `-`, then trims. May return an empty
/// string; callers decide what to do with it.
pub fn sanitize(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .take(MAX_CHANNEL_NAME_CHARS)
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    kept.trim().to_string()
}
