use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PromptKind {
    NewList,
    RenameList,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PromptResult {
    Pending,
    Submitted(String),
    Cancelled,
}

/// A modal single-line text prompt.
pub(crate) struct Prompt<'a> {
    kind: PromptKind,
    editor: TextArea<'a>,
}

impl<'a> Prompt<'a> {
    pub(crate) fn new_list() -> Self {
        Self::with_editor(PromptKind::NewList, TextArea::default())
    }

    /// Starts out holding the list's current name.
    pub(crate) fn rename_list(current: &str) -> Self {
        let mut editor = TextArea::new(vec![current.to_string()]);
        editor.move_cursor(CursorMove::End);
        Self::with_editor(PromptKind::RenameList, editor)
    }

    fn with_editor(kind: PromptKind, mut editor: TextArea<'a>) -> Self {
        editor.set_cursor_line_style(Style::default());
        editor.set_style(Style::default().fg(Color::White));
        Prompt { kind, editor }
    }

    pub(crate) fn kind(&self) -> PromptKind {
        self.kind
    }

    fn title(&self) -> &'static str {
        match self.kind {
            PromptKind::NewList => "Task List",
            PromptKind::RenameList => "Rename Task List",
        }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            PromptKind::NewList => "Enter the name of the new task list:",
            PromptKind::RenameList => "Enter the new name of the task list:",
        }
    }

    pub(crate) fn input(&mut self, input: Input) -> PromptResult {
        match input {
            Input { key: Key::Esc, .. } => PromptResult::Cancelled,
            Input {
                key: Key::Enter, ..
            }
            | Input {
                key: Key::Char('m'),
                ctrl: true,
                ..
            } => PromptResult::Submitted(self.editor.lines().join(" ")),
            input => {
                self.editor.input(input);
                PromptResult::Pending
            }
        }
    }

    pub(crate) fn render(&self, frame: &mut Frame, area: Rect) {
        let area = centered_rect(60, 4, area);
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(Paragraph::new(self.message()), chunks[0]);
        frame.render_widget(self.editor.widget(), chunks[1]);
    }
}

/// Draws a modal message box. The caller dismisses it on the next key.
pub(crate) fn render_notice(frame: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
    let area = centered_rect(60, 5, area);
    frame.render_widget(Clear, area);
    let notice = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(Span::styled(
            "Press any key to continue.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(notice, area);
}

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
