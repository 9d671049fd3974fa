// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input clean-up applied before text reaches liblouis.

use std::borrow::Cow;

/// U+2800, the empty braille cell.
pub const BRAILLE_PATTERN_BLANK: char = '\u{2800}';

/// Outcome of [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized<'a> {
    /// Input was non-empty but blank; answer with these spaces and skip the
    /// engine entirely.
    Blank(String),
    /// Text to hand to the engine.
    Text(Cow<'a, str>),
}

/// Replace blank braille cells with spaces and short-circuit all-blank input.
///
/// The blank answer has one space per character of the original input so a
/// UI can round-trip it without the layout shifting.
pub fn sanitize(input: &str) -> Sanitized<'_> {
    let text = if input.contains(BRAILLE_PATTERN_BLANK) {
        Cow::Owned(input.replace(BRAILLE_PATTERN_BLANK, " "))
    } else {
        Cow::Borrowed(input)
    };

    if !input.is_empty() && text.trim().is_empty() {
        return Sanitized::Blank(" ".repeat(input.chars().count()));
    }
    Sanitized::Text(text)
}
