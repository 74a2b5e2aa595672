//! Recycle container name generation.

/// Next container name after `max` in the recycle directory.
///
/// Names count upward like a base-26 odometer over `a..=z`: the rightmost
/// character below `z` is incremented and everything to its right resets to
/// `a`. When every character is `z` (or the name is empty) a new group of
/// `width` `a`s is appended. Characters below `a` are treated as one step
/// before `a`, characters above `z` as already carried, so the result is
/// always strictly greater than `max`.
pub fn next_recycle_name(max: Option<&str>, width: usize) -> String {
    let current = max.unwrap_or_default();
    let mut chars: Vec<char> = current.chars().collect();

    for i in (0..chars.len()).rev() {
        let c = chars[i];
        if c >= 'z' {
            continue;
        }
        chars[i] = if c >= 'a' {
            char::from_u32(c as u32 + 1).unwrap_or('z')
        } else {
            'a'
        };
        for tail in &mut chars[i + 1..] {
            *tail = 'a';
        }
        return chars.into_iter().collect();
    }

    let mut next = current.to_string();
    next.push_str(&"a".repeat(width));
    next
}
