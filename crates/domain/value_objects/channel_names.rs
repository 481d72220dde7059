/// Maximum channel-name length accepted by the chat provider.
const MAX_CHANNEL_NAME_LEN: usize = 80;

/// Character substituted for a leading non-alphanumeric after invalid-char
/// replacement. The substitution runs before hyphen runs are collapsed, so
/// `"!!x"` becomes `g-x`, not `gx`.
const LEADING_PLACEHOLDER: char = 'g';

/// Normalizes a group name into a channel-name token: lowercase, every
/// character outside `[a-z0-9-_]` replaced with `-`, runs of `-` collapsed,
/// truncated to 80 characters.
pub fn normalize_channel_name(name: &str) -> String {
    let mut replaced: String = name
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            _ => '-',
        })
        .collect();

    // All chars are single-byte ASCII after the replacement above.
    if let Some(first) = replaced.chars().next() {
        if !first.is_ascii_alphanumeric() {
            replaced.replace_range(0..1, &LEADING_PLACEHOLDER.to_string());
        }
    }

    let mut collapsed = String::with_capacity(replaced.len());
    let mut previous_was_hyphen = false;
    for c in replaced.chars() {
        if c == '-' && previous_was_hyphen {
            continue;
        }
        previous_was_hyphen = c == '-';
        collapsed.push(c);
    }

    collapsed.chars().take(MAX_CHANNEL_NAME_LEN).collect()
}
