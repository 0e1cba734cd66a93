//! Visual theme and styling.

use console::Style;

use super::presenter::OutputContext;

/// Colors used by the presenter.
///
/// Styles are forced on because the caller has already decided whether the
/// terminal supports color; `console`'s own TTY check would otherwise turn
/// them off when writing to a pipe or buffer.
#[derive(Debug, Clone)]
pub struct OutputTheme {
    /// Notify labels (cyan).
    pub notify: Style,
    /// Success context (green).
    pub success: Style,
    /// Error context (red).
    pub error: Style,
    /// Message context and section titles (magenta).
    pub msg: Style,
    /// Info context (cyan).
    pub info: Style,
    /// Default context (unstyled).
    pub normal: Style,
}

impl Default for OutputTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            notify: Style::new().cyan().force_styling(true),
            success: Style::new().green().force_styling(true),
            error: Style::new().red().force_styling(true),
            msg: Style::new().magenta().force_styling(true),
            info: Style::new().cyan().force_styling(true),
            normal: Style::new(),
        }
    }

    /// Create a theme without colors.
    pub fn plain() -> Self {
        Self {
            notify: Style::new(),
            success: Style::new(),
            error: Style::new(),
            msg: Style::new(),
            info: Style::new(),
            normal: Style::new(),
        }
    }

    /// Pick the colored or plain theme.
    pub fn for_colors(colors: bool) -> Self {
        if colors {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Style for a message context.
    pub fn context(&self, context: OutputContext) -> &Style {
        match context {
            OutputContext::Success => &self.success,
            OutputContext::Error => &self.error,
            OutputContext::Msg => &self.msg,
            OutputContext::Info => &self.info,
            OutputContext::Default => &self.normal,
        }
    }

    /// Apply the context style to `text`.
    pub fn paint(&self, context: OutputContext, text: &str) -> String {
        self.context(context).apply_to(text).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_adds_no_escapes() {
        let theme = OutputTheme::plain();
        for context in OutputContext::ALL {
            assert_eq!(theme.paint(context, "DONE"), "DONE");
        }
    }

    #[test]
    fn colored_theme_styles_contexts() {
        let theme = OutputTheme::new();
        let painted = theme.paint(OutputContext::Error, "ERROR");
        assert!(painted.contains("\u{1b}["));
        assert!(painted.contains("ERROR"));
    }

    #[test]
    fn default_context_is_unstyled_even_with_colors() {
        let theme = OutputTheme::new();
        assert_eq!(theme.paint(OutputContext::Default, "OK"), "OK");
    }

    #[test]
    fn for_colors_selects_theme() {
        let plain = OutputTheme::for_colors(false);
        assert_eq!(plain.paint(OutputContext::Success, "x"), "x");
        let colored = OutputTheme::for_colors(true);
        assert_ne!(colored.paint(OutputContext::Success, "x"), "x");
    }
}
