use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn bind(key: &'static str, pad: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(pad),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        bind("Ctrl-C", "      ", "Quit"),
        bind("Esc", "         ", "Quit (close this help first)"),
        bind("Tab", "         ", "Cycle focus: brand, prompt, results"),
        bind("Ctrl-S", "      ", "Submit the current prompt/brand"),
        bind("Enter", "       ", "Submit (brand field) / newline (prompt field)"),
        bind("Ctrl-E", "      ", "Export the result log as CSV"),
        bind("F1", "          ", "Show this help"),
        Line::from(""),
        Line::from("Results pane:"),
        bind("j/k or ↑/↓", "  ", "Scroll"),
        bind("e", "           ", "Export CSV"),
        bind("y", "           ", "Copy last exported path to clipboard"),
        bind("q", "           ", "Quit"),
        Line::from(""),
        Line::from("The backend URL comes from --base-url or BRAND_CHECK_BASE_URL."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
