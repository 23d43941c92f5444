//! Template source text with indentation stripping and line lookup.

/// A template string prepared for scanning.
///
/// On construction the common leading-whitespace margin shared by all
/// non-blank physical lines is stripped from every line, so template text
/// can be written indented inside host source while the logical content
/// stays flush. Two invariants hold:
///
/// - the margin equals the minimum leading-whitespace count over the
///   non-blank lines of the raw text, and
/// - stripping never changes the number of physical lines, so 1-based line
///   numbers computed against the stripped text are valid against the raw
///   text for error reporting.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    /// Template name (for error messages).
    pub name: String,
    /// The raw text as supplied by the caller.
    raw: String,
    /// The text with the margin removed from every line.
    stripped: String,
    /// The number of whitespace characters removed per line.
    margin: usize,
}

impl TemplateSource {
    /// Prepare a template string for scanning.
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let margin = margin_of(&raw);
        let stripped = strip_margin(&raw, margin);
        debug_assert_eq!(raw.split('\n').count(), stripped.split('\n').count());
        Self {
            name: name.into(),
            raw,
            stripped,
            margin,
        }
    }

    /// The margin-stripped text the scanner operates on.
    pub fn text(&self) -> &str {
        &self.stripped
    }

    /// The untouched raw text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The stripped margin width, in characters.
    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Number of physical lines (identical in raw and stripped text).
    pub fn line_count(&self) -> usize {
        self.raw.split('\n').count()
    }

    /// Extract a raw source line by 1-based line number, for error context.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = (line_number as usize).checked_sub(1)?;
        self.raw
            .split('\n')
            .nth(idx)
            .map(|l| l.trim_end_matches('\r'))
    }
}

/// Minimum leading-whitespace count, in characters, over all non-blank
/// lines. Counting bytes would land the strip offset mid-character when
/// the margin holds multi-byte whitespace such as NBSP.
fn margin_of(text: &str) -> usize {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0)
}

/// Drop up to `margin` leading characters from every line.
///
/// Non-blank lines carry at least `margin` whitespace characters by
/// construction; blank lines may be shorter and become empty.
fn strip_margin(text: &str, margin: usize) -> String {
    text.split('\n')
        .map(|line| match line.char_indices().nth(margin) {
            Some((idx, _)) => &line[idx..],
            None => "",
        })
        .collect::<Vec<_>>()
        .join("\n")
}
