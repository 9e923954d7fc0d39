use crate::{
    commands::{parse_command, Command},
    config::Config,
    controller::{Controller, Outcome, Pane, PaneKind, Warning},
    error::{Error, Result},
    views::prompt::{render_notice, Prompt, PromptKind, PromptResult},
};
use crossterm::event::{Event, KeyEventKind};
use log::{debug, error};
use ratatui::{
    prelude::*,
    style::Style,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};
use tui_textarea::{Input, Key, TextArea};

const HELP: &str = "Tab focus | Enter add/complete | d remove | PgUp/PgDn list | ^N new list | ^R rename | Esc quit";

pub(crate) enum AppState {
    Home,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Entry,
    Ongoing,
    Completed,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Entry => Focus::Ongoing,
            Focus::Ongoing => Focus::Completed,
            Focus::Completed => Focus::Entry,
        }
    }

    fn pane(self) -> Option<PaneKind> {
        match self {
            Focus::Entry => None,
            Focus::Ongoing => Some(PaneKind::Ongoing),
            Focus::Completed => Some(PaneKind::Completed),
        }
    }
}

enum Modal<'a> {
    Prompt(Prompt<'a>),
    Notice {
        title: &'static str,
        message: String,
        color: Color,
    },
}

struct HomeView<'a> {
    entry: TextArea<'a>,
    focus: Focus,
    modal: Option<Modal<'a>>,
    show_ids: bool,
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

impl<'a> HomeView<'a> {
    fn new(config: &Config) -> Self {
        let mut view = HomeView {
            entry: TextArea::default(),
            focus: Focus::Entry,
            modal: None,
            show_ids: config.show_ids,
        };
        view.reset_entry();
        view
    }

    fn reset_entry(&mut self) {
        let mut entry = TextArea::default();
        entry.set_cursor_line_style(Style::default());
        entry.set_placeholder_text("Enter a task, or :new, :rename, :list <id>, :done, :rm, :q");
        entry.set_style(Style::default().fg(Color::White));
        self.entry = entry;
        self.style_entry();
    }

    fn style_entry(&mut self) {
        let focused = self.focus == Focus::Entry;
        self.entry.set_block(
            Block::default()
                .title("New Task")
                .borders(Borders::ALL)
                .border_style(border_style(focused)),
        );
        let cursor = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.entry.set_cursor_style(cursor);
    }

    /// Focus alone never selects a row; rows are picked with Up/Down.
    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.style_entry();
    }

    fn notice(&mut self, title: &'static str, message: String, color: Color) {
        self.modal = Some(Modal::Notice {
            title,
            message,
            color,
        });
    }

    fn report(&mut self, outcome: Outcome) {
        if let Outcome::Warning(warning) = outcome {
            debug!("Warning: {warning}");
            self.notice("Warning", warning.to_string(), Color::Yellow);
        }
    }

    fn open_rename(&mut self, controller: &Controller) {
        match controller.active_list() {
            Some(list) => self.modal = Some(Modal::Prompt(Prompt::rename_list(&list.name))),
            None => self.report(Outcome::Warning(Warning::NoListSelected)),
        }
    }

    /// Applies one key press, turning a failed handler into an error dialog.
    /// `Some` ends the home view.
    fn process(&mut self, controller: &mut Controller, input: Input) -> Option<AppState> {
        match self.handle(controller, input) {
            Ok(next) => next,
            Err(e) => {
                self.recover(controller, e);
                None
            }
        }
    }

    fn recover(&mut self, controller: &mut Controller, e: Error) {
        error!("{e}");
        self.notice("Error", e.to_string(), Color::Red);
        if let Err(e) = controller.refresh() {
            error!("Could not reload tasks: {e}");
        }
    }

    fn handle(&mut self, controller: &mut Controller, input: Input) -> Result<Option<AppState>> {
        if let Some(modal) = self.modal.take() {
            match modal {
                Modal::Notice { .. } => {}
                Modal::Prompt(mut prompt) => match prompt.input(input) {
                    PromptResult::Pending => self.modal = Some(Modal::Prompt(prompt)),
                    PromptResult::Cancelled => debug!("{:?} prompt cancelled", prompt.kind()),
                    PromptResult::Submitted(text) => {
                        let outcome = match prompt.kind() {
                            PromptKind::NewList => controller.create_list(&text)?,
                            PromptKind::RenameList => controller.rename_active_list(&text)?,
                        };
                        self.report(outcome);
                    }
                },
            }
            return Ok(None);
        }

        match input {
            Input { key: Key::Esc, .. }
            | Input {
                key: Key::Char('q'),
                ctrl: true,
                ..
            } => return Ok(Some(AppState::Exit)),
            Input { key: Key::Tab, .. } => {
                let next = self.focus.next();
                self.set_focus(next);
            }
            Input {
                key: Key::Char('n'),
                ctrl: true,
                ..
            } => self.modal = Some(Modal::Prompt(Prompt::new_list())),
            Input {
                key: Key::Char('r'),
                ctrl: true,
                ..
            } => self.open_rename(controller),
            Input {
                key: Key::PageUp, ..
            } => {
                let outcome = controller.cycle_list(-1)?;
                self.report(outcome);
            }
            Input {
                key: Key::PageDown,
                ..
            } => {
                let outcome = controller.cycle_list(1)?;
                self.report(outcome);
            }
            input => match self.focus.pane() {
                None => return self.handle_entry(controller, input),
                Some(kind) => self.handle_pane(controller, kind, input)?,
            },
        }
        Ok(None)
    }

    fn handle_entry(&mut self, controller: &mut Controller, input: Input) -> Result<Option<AppState>> {
        match input {
            Input {
                key: Key::Enter, ..
            }
            | Input {
                key: Key::Char('m'),
                ctrl: true,
                ..
            } => {
                let line = self.entry.lines().join(" ");
                match parse_command(&line) {
                    Ok(command) => return self.run(controller, command),
                    Err(e) => self.notice("Warning", e.to_string(), Color::Yellow),
                }
            }
            input => {
                self.entry.input(input);
            }
        }
        Ok(None)
    }

    fn run(&mut self, controller: &mut Controller, command: Command) -> Result<Option<AppState>> {
        debug!("Running {command:?}");
        let adds_task = matches!(command, Command::AddTask(_));
        let outcome = match command {
            Command::AddTask(text) => controller.add_task(&text)?,
            Command::NewList(Some(name)) => controller.create_list(&name)?,
            Command::NewList(None) => {
                self.modal = Some(Modal::Prompt(Prompt::new_list()));
                Outcome::Unchanged
            }
            Command::RenameList(Some(name)) => controller.rename_active_list(&name)?,
            Command::RenameList(None) => {
                self.open_rename(controller);
                Outcome::Unchanged
            }
            Command::SelectList(list_id) => controller.select_list(list_id)?,
            Command::Complete => controller.complete_selected()?,
            Command::Remove => controller.remove_selected()?,
            Command::DeleteList => controller.delete_active_list()?,
            Command::Quit => return Ok(Some(AppState::Exit)),
        };
        // a rejected task stays in the entry so it can be fixed
        if !adds_task || outcome == Outcome::Changed {
            self.reset_entry();
        }
        self.report(outcome);
        Ok(None)
    }

    fn handle_pane(&mut self, controller: &mut Controller, kind: PaneKind, input: Input) -> Result<()> {
        match input {
            Input { key: Key::Up, .. }
            | Input {
                key: Key::Char('k'),
                ctrl: false,
                alt: false,
                ..
            } => controller.move_selection(kind, -1),
            Input { key: Key::Down, .. }
            | Input {
                key: Key::Char('j'),
                ctrl: false,
                alt: false,
                ..
            } => controller.move_selection(kind, 1),
            Input {
                key: Key::Enter, ..
            }
            | Input {
                key: Key::Char('c' | ' '),
                ctrl: false,
                ..
            } => {
                let outcome = controller.complete_selected()?;
                self.report(outcome);
            }
            Input {
                key: Key::Delete, ..
            }
            | Input {
                key: Key::Char('d'),
                ctrl: false,
                ..
            } => {
                let outcome = controller.remove_selected()?;
                self.report(outcome);
            }
            Input {
                key: Key::Char(c @ ('[' | ']')),
                ..
            } => {
                let outcome = controller.cycle_list(if c == '[' { -1 } else { 1 })?;
                self.report(outcome);
            }
            Input {
                key: Key::Char('a'),
                ctrl: false,
                ..
            } => self.set_focus(Focus::Entry),
            _ => {}
        }
        Ok(())
    }
}

fn render_pane(frame: &mut Frame, area: Rect, pane: &Pane, title: &str, focused: bool, show_ids: bool) {
    let items: Vec<ListItem> = pane
        .rows()
        .iter()
        .map(|t| ListItem::new(t.label(show_ids)))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(border_style(focused)),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::REVERSED)
        })
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(pane.selected());
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw(frame: &mut Frame, controller: &Controller, view: &HomeView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let selector_block = Block::default().title("Task Lists").borders(Borders::ALL);
    if controller.lists().is_empty() {
        let empty = Paragraph::new("No task lists yet, press Ctrl-N to create one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(selector_block);
        frame.render_widget(empty, chunks[0]);
    } else {
        let titles: Vec<String> = controller.lists().iter().map(|l| l.to_string()).collect();
        let selected = controller
            .active_list()
            .and_then(|active| controller.lists().iter().position(|l| l.id == active.id))
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .block(selector_block)
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);
    }

    frame.render_widget(view.entry.widget(), chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_pane(
        frame,
        panes[0],
        controller.pane(PaneKind::Ongoing),
        "Ongoing Tasks",
        view.focus == Focus::Ongoing,
        view.show_ids,
    );
    render_pane(
        frame,
        panes[1],
        controller.pane(PaneKind::Completed),
        "Completed Tasks",
        view.focus == Focus::Completed,
        view.show_ids,
    );

    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    let area = frame.size();
    match &view.modal {
        Some(Modal::Prompt(prompt)) => prompt.render(frame, area),
        Some(Modal::Notice {
            title,
            message,
            color,
        }) => render_notice(frame, area, title, message, *color),
        None => {}
    }
}

pub(crate) fn render_home<B>(
    term: &mut Terminal<B>,
    controller: &mut Controller,
    config: &Config,
) -> Result<AppState>
where
    B: Backend,
{
    let mut view = HomeView::new(config);
    loop {
        term.draw(|frame| draw(frame, controller, &view))?;
        let event = crossterm::event::read()?;
        if let Event::Key(key) = &event {
            if key.kind != KeyEventKind::Press {
                continue;
            }
        }
        if let Some(next) = view.process(controller, event.into()) {
            return Ok(next);
        }
    }
}
