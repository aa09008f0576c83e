//! Document formatting pipeline: clean → parse → normalize → emit.
//!
//! Used on markup that arrives from outside the canvas (generated output,
//! pasted source) before it replaces the document.

use crate::effects::ensure_effects;
use crate::emitter::emit_document;
use crate::error::ParseError;
use crate::model::{ViewBox, Viewport};
use crate::parser::parse_document;

// ─── Config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Strip a surrounding Markdown code fence. Default: **true**.
    pub strip_fences: bool,

    /// Add the procedural effect definitions. Default: **false**.
    pub inject_effects: bool,

    /// Force the root `viewBox` to `0 0 w h`. Default: unset.
    pub viewport: Option<Viewport>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            strip_fences: true,
            inject_effects: false,
            viewport: None,
        }
    }
}

// ─── Pipeline ─────────────────────────────────────────────────────────────

/// Remove a Markdown code fence (```` ```svg ````, ```` ```xml ```` or a bare
/// fence) around markup, plus surrounding whitespace.
pub fn clean_markup(code: &str) -> &str {
    let cleaned = code.trim();
    let Some(after_open) = cleaned.strip_prefix("```") else {
        return cleaned;
    };
    let body = after_open
        .strip_prefix("svg\n")
        .or_else(|| after_open.strip_prefix("xml\n"))
        .or_else(|| after_open.strip_prefix('\n'))
        .unwrap_or(after_open);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a document, normalize it per `config`, and re-emit canonical text.
///
/// The output is idempotent: formatting it again yields the same string.
///
/// # Errors
/// Returns the parse error if the (cleaned) input is not a valid document.
pub fn format_document(text: &str, config: &FormatConfig) -> Result<String, ParseError> {
    let text = if config.strip_fences {
        clean_markup(text)
    } else {
        text
    };
    let mut scene = parse_document(text)?;

    if let Some(viewport) = config.viewport {
        scene.set_view_box(ViewBox::from_viewport(viewport));
    }
    if config.inject_effects {
        ensure_effects(&mut scene);
    }

    Ok(emit_document(&scene))
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_code_fences() {
        assert_eq!(clean_markup("```svg\n<svg/>\n```"), "<svg/>");
        assert_eq!(clean_markup("  ```\n<svg/>```  "), "<svg/>");
        assert_eq!(clean_markup("<svg/>"), "<svg/>");
    }

    #[test]
    fn format_is_idempotent() {
        let config = FormatConfig {
            inject_effects: true,
            viewport: Some(Viewport::new(375.0, 812.0)),
            ..FormatConfig::default()
        };
        let input = "```xml\n<svg><g><circle r=\"3\"/></g></svg>\n```";
        let first = format_document(input, &config).expect("first format failed");
        let second = format_document(&first, &config).expect("second format failed");
        assert_eq!(first, second, "format must be idempotent");
        assert!(first.contains(r#"viewBox="0 0 375 812""#));
    }

    #[test]
    fn reports_parse_errors() {
        let config = FormatConfig::default();
        assert!(format_document("```svg\n<svg>\n```", &config).is_err());
    }
}
