// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `include` directives in liblouis table source.

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// File name referenced by one line, if it is an `include` directive.
///
/// The keyword is case-insensitive and must be followed by whitespace. The
/// name stops at whitespace, `#` or `;`, and trailing punctuation is dropped.
pub fn include_target(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let keyword = line.get(..7)?;
    if !keyword.eq_ignore_ascii_case("include") {
        return None;
    }
    let rest = &line[7..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '#' || c == ';')
        .unwrap_or(rest.len());
    let name = rest[..end].trim_end_matches(|c: char| !is_word(c));
    (!name.is_empty()).then_some(name)
}

/// Every table included by `source`, in order of appearance.
pub fn parse_includes(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(include_target)
        .map(str::to_string)
        .collect()
}
