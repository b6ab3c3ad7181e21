// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub trait StringExt {
    /// Shortens the string to at most `max_chars` characters, appending an ellipsis if
    /// anything was cut. Whitespace runs (including newlines) collapse to single spaces.
    fn snippet(&self, max_chars: usize) -> String;
}

impl<T> StringExt for T
where
    T: AsRef<str>,
{
    fn snippet(&self, max_chars: usize) -> String {
        let collapsed = self
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if collapsed.chars().count() <= max_chars {
            return collapsed;
        }

        let mut snippet = collapsed
            .chars()
            .take(max_chars.saturating_sub(1))
            .collect::<String>()
            .trim_end()
            .to_string();
        snippet.push('…');
        snippet
    }
}
