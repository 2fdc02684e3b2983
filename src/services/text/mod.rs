//! Event title wrapping.
//!
//! Greedy line breaking on spaces inside an event rectangle, with a hard
//! break for words wider than the rectangle and on the last line that fits.

/// Titles are cut to this many characters before wrapping.
pub const MAX_EVENT_TEXT_LEN: usize = 500;

/// Font metrics supplied by the drawing backend.
pub trait TextMeasure {
    /// Advance width of one character.
    fn char_width(&self, c: char) -> f32;

    /// Full height of a line (ascent plus descent).
    fn line_height(&self) -> f32;

    /// Distance from the top of a line to its baseline.
    fn ascent(&self) -> f32;

    fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.char_width(c)).sum()
    }
}

/// Fixed-advance metrics, handy for tests and headless layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub advance: f32,
    pub height: f32,
}

impl TextMeasure for MonospaceMeasure {
    fn char_width(&self, _c: char) -> f32 {
        self.advance
    }

    fn line_height(&self) -> f32 {
        self.height
    }

    fn ascent(&self) -> f32 {
        self.height * 0.8
    }
}

/// Remove tabs and newlines that would render as boxes.
///
/// A tab or newline directly before a comma is dropped; any other one
/// becomes a space.
pub fn sanitize_event_text(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\t' | '\n' | '\r' if chars.peek() == Some(&',') => {}
            '\t' | '\n' | '\r' => sanitized.push(' '),
            other => sanitized.push(other),
        }
    }
    sanitized
}

/// Pixel pitch between wrapped lines.
pub fn line_pitch(measure: &dyn TextMeasure) -> f32 {
    measure.line_height().ceil() + 1.0
}

/// Break `text` into the lines that fit a `width` x `height` box.
///
/// Returns no lines when the box is narrower than `min_width` or not taller
/// than one line.
pub fn wrap_event_text(
    text: &str,
    width: f32,
    height: f32,
    min_width: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let line_height = line_pitch(measure);
    if width < min_width || height <= line_height {
        return Vec::new();
    }

    let chars: Vec<char> = sanitize_event_text(text)
        .chars()
        .take(MAX_EVENT_TEXT_LEN)
        .collect();
    let widths: Vec<f32> = chars.iter().map(|&c| measure.char_width(c)).collect();
    let len = chars.len();

    let mut lines = Vec::new();
    let mut remaining = height;
    let mut start = 0;

    while start < len && remaining >= line_height + 1.0 {
        let last_line = remaining < 2.0 * line_height + 1.0;

        while start < len && chars[start] == ' ' {
            start += 1;
        }
        if start >= len {
            break;
        }

        let mut sum = 0.0;
        let mut word_end = start;
        let mut line_end = len;
        for i in start..len {
            if chars[i] == ' ' {
                word_end = i;
            }
            sum += widths[i];
            if sum > width {
                line_end = if word_end > start && !last_line {
                    word_end
                } else {
                    // Always take at least one character.
                    i.max(start + 1)
                };
                break;
            }
        }

        lines.push(chars[start..line_end].iter().collect());
        start = line_end;
        remaining -= line_height;
    }

    lines
}
