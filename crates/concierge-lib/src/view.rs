//! Conversation view — renders the message log as chat bubbles for a terminal.
//!
//! Pure: output depends only on the log, theme and width. User bubbles are
//! right-aligned, assistant bubbles left-aligned.

use concierge_core::text_prep::wrap_text;
use concierge_core::types::{Message, Role, Theme};

const RESET: &str = "\x1b[0m";
const MIN_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy)]
pub struct ConversationView {
    pub width: usize,
    pub theme: Theme,
    /// Emit ANSI colours.
    pub color: bool,
}

impl ConversationView {
    pub fn new(width: usize, theme: Theme) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            theme,
            color: true,
        }
    }

    pub fn plain(width: usize) -> Self {
        Self {
            color: false,
            ..Self::new(width, Theme::Light)
        }
    }

    /// Render every message, separated by blank lines.
    pub fn render(&self, messages: &[Message]) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, message) in messages.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(self.render_bubble(message));
        }
        lines
    }

    /// Render one message as a boxed bubble.
    pub fn render_bubble(&self, message: &Message) -> Vec<String> {
        // Bubbles take at most three quarters of the width; 4 columns go to border + padding.
        let max_inner = (self.width * 3 / 4).saturating_sub(4).max(1);
        let body = wrap_text(&message.text, max_inner);
        let inner = body.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let indent = match message.role {
            Role::User => " ".repeat(self.width.saturating_sub(inner + 4)),
            Role::Assistant => String::new(),
        };
        let (open, close) = self.palette(message.role);

        let mut out = Vec::with_capacity(body.len() + 2);
        out.push(format!("{indent}{open}╭{}╮{close}", "─".repeat(inner + 2)));
        for line in &body {
            let pad = " ".repeat(inner - line.chars().count());
            out.push(format!("{indent}{open}│ {line}{pad} │{close}"));
        }
        out.push(format!("{indent}{open}╰{}╯{close}", "─".repeat(inner + 2)));
        out
    }

    fn palette(&self, role: Role) -> (&'static str, &'static str) {
        if !self.color {
            return ("", "");
        }
        let open = match (role, self.theme) {
            (Role::User, _) => "\x1b[97;44m",
            (Role::Assistant, Theme::Light) => "\x1b[30;47m",
            (Role::Assistant, Theme::Dark) => "\x1b[97;100m",
        };
        (open, RESET)
    }
}

/// First line to show so the newest `viewport` lines are visible.
pub fn scroll_offset(total_lines: usize, viewport: usize) -> usize {
    total_lines.saturating_sub(viewport)
}

/// The tail of `lines` that fits in `viewport`.
pub fn visible_tail(lines: &[String], viewport: usize) -> &[String] {
    &lines[scroll_offset(lines.len(), viewport)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_bubble_left_aligned() {
        let view = ConversationView::plain(40);
        let lines = view.render_bubble(&Message::assistant("Hi"));
        assert_eq!(lines, vec!["╭────╮", "│ Hi │", "╰────╯"]);
    }

    #[test]
    fn user_bubble_right_aligned() {
        let view = ConversationView::plain(20);
        let lines = view.render_bubble(&Message::user("Hi"));
        for line in &lines {
            assert_eq!(line.chars().count(), 20, "{line:?}");
        }
        assert!(lines[1].ends_with("│ Hi │"));
        assert!(lines[1].starts_with("              "));
    }

    #[test]
    fn long_text_wraps_within_bubble() {
        let view = ConversationView::plain(40);
        let text = "Standard checkout time is 11 AM. \
            You can request late checkout based on availability.";
        let lines = view.render_bubble(&Message::assistant(text));
        assert!(lines.len() > 3);
        for line in &lines {
            assert!(line.chars().count() <= 30, "{line:?}");
        }
    }

    #[test]
    fn messages_separated_by_blank_line() {
        let view = ConversationView::plain(40);
        let lines = view.render(&[Message::assistant("Hello"), Message::user("gym")]);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[3], "");
    }

    #[test]
    fn dark_theme_changes_assistant_colours() {
        let msg = Message::assistant("Hi");
        let light = ConversationView::new(40, Theme::Light).render_bubble(&msg);
        let dark = ConversationView::new(40, Theme::Dark).render_bubble(&msg);
        assert_ne!(light, dark);
        assert!(dark[0].starts_with("\x1b[97;100m"));
        assert!(dark[0].ends_with(RESET));
    }

    #[test]
    fn empty_log_renders_nothing() {
        assert!(ConversationView::plain(40).render(&[]).is_empty());
    }

    #[test]
    fn scrolls_to_latest() {
        let lines: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(scroll_offset(10, 4), 6);
        assert_eq!(visible_tail(&lines, 4), &lines[6..]);
        assert_eq!(visible_tail(&lines, 40).len(), 10);
    }
}
