//! Topic and channel name rules.
//!
//! A name is 1 to 64 characters from `[.a-zA-Z0-9_-]`, optionally followed
//! by the `#ephemeral` suffix (which counts toward the length).

const MAX_NAME_LEN: usize = 64;
const EPHEMERAL_SUFFIX: &str = "#ephemeral";

fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    let base = name.strip_suffix(EPHEMERAL_SUFFIX).unwrap_or(name);
    !base.is_empty()
        && base
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

#[must_use]
pub fn is_valid_topic_name(name: &str) -> bool {
    is_valid_name(name)
}

#[must_use]
pub fn is_valid_channel_name(name: &str) -> bool {
    is_valid_name(name)
}
