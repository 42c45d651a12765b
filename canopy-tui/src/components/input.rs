use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub struct InputStyle<'a> {
    pub title: &'a str,
    pub placeholder: &'a str,
    pub border_color: Color,
    pub muted_color: Color,
}

/// Byte offset where the visible tail of `text` starts, and the cursor column
/// just after it. The cursor always sits at the end of the text, so when the
/// text is wider than the field the head scrolls out of view.
fn visible_tail(text: &str, max_width: u16) -> (usize, u16) {
    let max_width = usize::from(max_width);
    if max_width == 0 {
        return (text.len(), 0);
    }
    // One column stays free for the cursor
    let budget = max_width - 1;
    let mut start = text.len();
    let mut width = 0;
    for (idx, grapheme) in text.grapheme_indices(true).rev() {
        let g_width = grapheme.width();
        if width + g_width > budget {
            break;
        }
        width += g_width;
        start = idx;
    }
    (start, u16::try_from(width).unwrap_or(u16::MAX))
}

/// A bordered single-line text field. The terminal cursor is placed only when
/// `focused`.
pub fn draw(f: &mut Frame, area: Rect, style: &InputStyle<'_>, text: &str, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", style.title))
        .border_style(Style::default().fg(style.border_color));
    let inner = block.inner(area);

    let (content, cursor_col) = if text.is_empty() {
        let placeholder = Span::styled(style.placeholder, Style::default().fg(style.muted_color));
        (Line::from(placeholder), 0)
    } else {
        let (start, cursor_col) = visible_tail(text, inner.width);
        (Line::from(Span::raw(&text[start..])), cursor_col)
    };
    f.render_widget(Paragraph::new(content).block(block), area);

    if focused && inner.width > 0 && inner.height > 0 {
        f.set_cursor_position((inner.x.saturating_add(cursor_col), inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::visible_tail;

    #[test]
    fn test_short_text_is_fully_visible() {
        assert_eq!(visible_tail("hello", 10), (0, 5));
    }

    #[test]
    fn test_long_text_keeps_the_tail() {
        let text = "hello world";
        let (start, col) = visible_tail(text, 5);
        assert_eq!(&text[start..], "orld");
        assert_eq!(col, 4);
    }

    #[test]
    fn test_wide_grapheme_is_not_split() {
        let text = "A👩‍💻B";
        let (start, col) = visible_tail(text, 4);
        assert_eq!(&text[start..], "👩‍💻B");
        assert_eq!(col, 3);

        let (start, col) = visible_tail(text, 3);
        assert_eq!(&text[start..], "B");
        assert_eq!(col, 1);
    }

    #[test]
    fn test_combining_mark_stays_with_base() {
        let text = "xe\u{0301}";
        let (start, col) = visible_tail(text, 2);
        assert_eq!(&text[start..], "e\u{0301}");
        assert_eq!(col, 1);
    }

    #[test]
    fn test_zero_width_field() {
        assert_eq!(visible_tail("abc", 0), (3, 0));
    }
}
