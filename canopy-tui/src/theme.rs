use canopy_core::config::{NamedColor, ThemeColor, ThemeConfig};
use ratatui::style::{Color, Modifier, Style};

/// Colors for each role in the dashboard, resolved once from `[theme]`.
pub struct Theme {
    pub accent: Color,
    pub selection: Color,
    pub session: Color,
    pub attached: Color,
    pub notice: Color,
    pub update: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight_fg: Color,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        let color = |c: &ThemeColor| match c {
            ThemeColor::Rgb(r, g, b) => Color::Rgb(*r, *g, *b),
            ThemeColor::Named(named) => named_color(*named),
        };
        Self {
            accent: color(&config.accent),
            selection: color(&config.selection),
            session: color(&config.session),
            attached: color(&config.attached),
            notice: color(&config.notice),
            update: color(&config.update),
            error: color(&config.error),
            muted: color(&config.muted),
            border: color(&config.border),
            highlight_fg: color(&config.highlight_fg),
        }
    }

    /// Highlight for the selected row of every list.
    pub fn selected_row(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.highlight_fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Tag for a tmux session; attached sessions stand out in bold.
    pub fn session_tag(&self, attached: bool) -> Style {
        if attached {
            Style::default()
                .fg(self.attached)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.session)
        }
    }

    pub fn focus_border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.accent } else { self.border })
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

fn named_color(named: NamedColor) -> Color {
    match named {
        NamedColor::Black => Color::Black,
        NamedColor::Red => Color::Red,
        NamedColor::Green => Color::Green,
        NamedColor::Yellow => Color::Yellow,
        NamedColor::Blue => Color::Blue,
        NamedColor::Magenta => Color::Magenta,
        NamedColor::Cyan => Color::Cyan,
        NamedColor::White => Color::White,
        NamedColor::Gray => Color::Gray,
    }
}
