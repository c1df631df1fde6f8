use std::fmt::{self, Write};

const MAX_LINES: usize = 4;
const MIN_FONT_SIZE: f64 = 12.0;
const MAX_FONT_SIZE: f64 = 48.0;

const ERROR_WIDTH: u32 = 400;
const ERROR_HEIGHT: u32 = 300;
const ERROR_TEXT: &str = "Error loading image";
const STATIC_ERROR_SVG: &str = r##"<svg width="400" height="300" xmlns="http://www.w3.org/2000/svg"><rect width="100%" height="100%" fill="#fee2e2"/></svg>"##;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderStyle {
    pub background: String,
    pub foreground: String,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            background: "#f3f4f6".to_string(),
            foreground: "#6b7280".to_string(),
        }
    }
}

impl PlaceholderStyle {
    pub fn error() -> Self {
        Self {
            background: "#fee2e2".to_string(),
            foreground: "#dc2626".to_string(),
        }
    }

    /// Overrides whichever colors were supplied, keeping defaults for the rest.
    pub fn with_overrides(mut self, background: Option<&str>, foreground: Option<&str>) -> Self {
        if let Some(background) = background.map(str::trim).filter(|value| !value.is_empty()) {
            self.background = background.to_string();
        }
        if let Some(foreground) = foreground.map(str::trim).filter(|value| !value.is_empty()) {
            self.foreground = foreground.to_string();
        }
        self
    }
}

pub fn escape_xml(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for ch in unsafe_text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn font_size(width: u32, height: u32) -> f64 {
    let average = (f64::from(width) + f64::from(height)) / 2.0;
    (average / 8.0).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Greedy word wrap on single spaces, truncated to the first four lines.
pub fn wrap_text(text: &str, max_chars_per_line: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split(' ') {
        let word_len = word.chars().count();
        if current_len + word_len + 1 <= max_chars_per_line {
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.truncate(MAX_LINES);
    lines
}

pub fn build_placeholder_svg(
    width: u32,
    height: u32,
    text: &str,
    style: &PlaceholderStyle,
) -> Result<String, fmt::Error> {
    let font = font_size(width, height);
    let max_chars = (f64::from(width) / (font * 0.6)).floor() as usize;
    let lines = wrap_text(text, max_chars);

    let line_height = font * 1.2;
    let total_text_height = lines.len() as f64 * line_height;
    let start_y = (f64::from(height) - total_text_height) / 2.0 + font;

    let w = f64::from(width);
    let h = f64::from(height);
    let center_x = w / 2.0;
    let background = escape_xml(&style.background);
    let color = escape_xml(&style.foreground);

    let mut svg = String::new();
    writeln!(svg, r#"<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">"#)?;
    writeln!(svg, r#"  <rect width="100%" height="100%" fill="{background}"/>"#)?;
    writeln!(
        svg,
        r#"  <rect x="2" y="2" width="{}" height="{}" fill="none" stroke="{color}" stroke-width="2" stroke-dasharray="10,5" opacity="0.5"/>"#,
        w - 4.0,
        h - 4.0
    )?;

    for (cx, cy) in [(20.0, 20.0), (w - 20.0, 20.0), (20.0, h - 20.0), (w - 20.0, h - 20.0)] {
        writeln!(
            svg,
            r#"  <circle cx="{cx}" cy="{cy}" r="3" fill="{color}" opacity="0.3"/>"#
        )?;
    }

    writeln!(
        svg,
        r#"  <text x="{center_x}" y="25" font-family="Arial, sans-serif" font-size="{}" fill="{color}" text-anchor="middle" opacity="0.6">{width} × {height}</text>"#,
        (font * 0.6).max(10.0)
    )?;

    writeln!(svg, r#"  <g transform="translate({center_x}, {start_y})">"#)?;
    for (index, line) in lines.iter().enumerate() {
        writeln!(
            svg,
            r#"    <text y="{}" font-family="Arial, sans-serif" font-size="{font}" fill="{color}" text-anchor="middle" opacity="0.8">{}</text>"#,
            index as f64 * line_height,
            escape_xml(line)
        )?;
    }
    writeln!(svg, "  </g>")?;

    writeln!(svg, r#"  <g transform="translate({center_x}, {})">"#, h - 40.0)?;
    writeln!(svg, r#"    <circle cx="0" cy="0" r="3" fill="{color}" opacity="0.4">"#)?;
    writeln!(
        svg,
        r#"      <animate attributeName="opacity" values="0.4;1;0.4" dur="1.5s" repeatCount="indefinite"/>"#
    )?;
    writeln!(svg, "    </circle>")?;
    writeln!(
        svg,
        r#"    <text y="20" font-family="Arial, sans-serif" font-size="{}" fill="{color}" text-anchor="middle" opacity="0.5">Generating AI image...</text>"#,
        (font * 0.5).max(10.0)
    )?;
    writeln!(svg, "  </g>")?;
    write!(svg, "</svg>")?;

    Ok(svg)
}

pub fn error_placeholder() -> String {
    build_placeholder_svg(ERROR_WIDTH, ERROR_HEIGHT, ERROR_TEXT, &PlaceholderStyle::error())
        .unwrap_or_else(|_| STATIC_ERROR_SVG.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_five_characters() {
        assert_eq!(
            escape_xml(r#"<script>&"'"#),
            "&lt;script&gt;&amp;&quot;&#039;"
        );
    }

    #[test]
    fn font_size_is_clamped() {
        assert_eq!(font_size(10, 10), 12.0);
        assert_eq!(font_size(800, 600), 48.0);
        assert_eq!(font_size(200, 200), 25.0);
    }

    #[test]
    fn wraps_greedily_and_caps_lines() {
        assert_eq!(wrap_text("a bb ccc", 4), vec!["a bb", "ccc"]);
        let long = "one two three four five six seven eight";
        let lines = wrap_text(long, 6);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "one");
    }

    #[test]
    fn narrow_canvas_puts_each_word_on_its_own_line() {
        assert_eq!(wrap_text("ab cd", 0), vec!["ab", "cd"]);
    }

    #[test]
    fn placeholder_shows_dimensions_and_indicator() {
        let svg = build_placeholder_svg(800, 600, "sunset", &PlaceholderStyle::default()).unwrap();
        assert!(svg.starts_with(r#"<svg width="800" height="600""#));
        assert!(svg.contains("800 × 600"));
        assert!(svg.contains("stroke-dasharray=\"10,5\""));
        assert_eq!(svg.matches("<circle").count(), 5);
        assert!(svg.contains(">sunset</text>"));
        assert!(svg.contains("Generating AI image..."));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn user_text_is_escaped_in_markup() {
        let style = PlaceholderStyle::default().with_overrides(Some(r#"red" onload="x"#), None);
        let svg = build_placeholder_svg(400, 300, r#"<script>&"'"#, &style).unwrap();
        assert!(svg.contains("&lt;script&gt;&amp;&quot;&#039;"));
        assert!(!svg.contains("<script>"));
        assert!(svg.contains(r#"fill="red&quot; onload=&quot;x""#));

        // every tag still closes: no stray angle brackets from user input
        assert_eq!(svg.matches('<').count(), svg.matches('>').count());
    }

    #[test]
    fn fractional_center_is_preserved() {
        let svg = build_placeholder_svg(301, 200, "x", &PlaceholderStyle::default()).unwrap();
        assert!(svg.contains(r#"x="150.5""#));
    }

    #[test]
    fn error_placeholder_uses_error_palette() {
        let svg = error_placeholder();
        assert!(svg.contains("#fee2e2"));
        assert!(svg.contains("Error loading image"));
    }
}
