use crate::{
    db::Db,
    error::Result,
    types::{ListId, Task, TaskList},
};
use log::{debug, info};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaneKind {
    Ongoing,
    Completed,
}

/// A user-input problem. The action that raised it changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Warning {
    MissingTaskOrList,
    NoListSelected,
    NoTaskToRemove,
    NoTaskToComplete,
    TaskNotFound,
    UnknownList(ListId),
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingTaskOrList => {
                write!(f, "You must enter a task and select a task list.")
            }
            Warning::NoListSelected => write!(f, "You must select a task list."),
            Warning::NoTaskToRemove => write!(f, "You must select a task to remove."),
            Warning::NoTaskToComplete => {
                write!(f, "You must select a task to mark as completed.")
            }
            Warning::TaskNotFound => write!(f, "Selected task not found."),
            Warning::UnknownList(id) => write!(f, "There is no task list with id {id}."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Changed,
    Unchanged,
    Warning(Warning),
}

/// The rows of one result pane. Rows are resolved to tasks by position, so
/// two tasks with the same description stay distinct.
#[derive(Debug, Default)]
pub(crate) struct Pane {
    rows: Vec<Task>,
    selected: Option<usize>,
}

impl Pane {
    pub(crate) fn rows(&self) -> &[Task] {
        &self.rows
    }

    pub(crate) fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|i| self.rows.get(i))
    }

    fn replace(&mut self, rows: Vec<Task>) {
        self.rows = rows;
        self.selected = match self.selected {
            Some(_) if self.rows.is_empty() => None,
            Some(i) => Some(i.min(self.rows.len() - 1)),
            None => None,
        };
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.selected = None;
    }
}

/// Tracks the active list and the two panes rendered from it. Every mutation
/// goes to the database first and then re-reads both panes.
pub(crate) struct Controller {
    db: Db,
    lists: Vec<TaskList>,
    active: Option<ListId>,
    ongoing: Pane,
    completed: Pane,
}

impl Controller {
    pub(crate) fn new(db: Db) -> Result<Controller> {
        let mut controller = Controller {
            db,
            lists: Vec::new(),
            active: None,
            ongoing: Pane::default(),
            completed: Pane::default(),
        };
        controller.reload_lists()?;
        Ok(controller)
    }

    #[cfg(test)]
    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub(crate) fn lists(&self) -> &[TaskList] {
        &self.lists
    }

    pub(crate) fn active_list(&self) -> Option<&TaskList> {
        let active = self.active?;
        self.lists.iter().find(|l| l.id == active)
    }

    pub(crate) fn pane(&self, kind: PaneKind) -> &Pane {
        match kind {
            PaneKind::Ongoing => &self.ongoing,
            PaneKind::Completed => &self.completed,
        }
    }

    fn pane_mut(&mut self, kind: PaneKind) -> &mut Pane {
        match kind {
            PaneKind::Ongoing => &mut self.ongoing,
            PaneKind::Completed => &mut self.completed,
        }
    }

    /// The pane holding the row selection, if any row is selected.
    pub(crate) fn selection(&self) -> Option<PaneKind> {
        if self.ongoing.selected.is_some() {
            Some(PaneKind::Ongoing)
        } else if self.completed.selected.is_some() {
            Some(PaneKind::Completed)
        } else {
            None
        }
    }

    /// Selects a row, clearing any selection in the other pane. Out of range
    /// indices are clamped and an empty pane selects nothing.
    pub(crate) fn select_row(&mut self, kind: PaneKind, index: usize) {
        let other = match kind {
            PaneKind::Ongoing => PaneKind::Completed,
            PaneKind::Completed => PaneKind::Ongoing,
        };
        self.pane_mut(other).selected = None;
        let pane = self.pane_mut(kind);
        pane.selected = if pane.rows.is_empty() {
            None
        } else {
            Some(index.min(pane.rows.len() - 1))
        };
    }

    pub(crate) fn move_selection(&mut self, kind: PaneKind, delta: isize) {
        let index = match self.pane(kind).selected {
            Some(i) => i.saturating_add_signed(delta),
            None => 0,
        };
        self.select_row(kind, index);
    }

    fn reload_lists(&mut self) -> Result<()> {
        self.lists = self.db.list_lists()?;
        let still_there = self
            .active
            .is_some_and(|id| self.lists.iter().any(|l| l.id == id));
        if !still_there {
            self.active = self.lists.first().map(|l| l.id);
            self.ongoing.selected = None;
            self.completed.selected = None;
        }
        self.refresh()
    }

    /// Re-reads both panes for the active list.
    pub(crate) fn refresh(&mut self) -> Result<()> {
        match self.active {
            Some(list_id) => {
                let ongoing = self.db.list_tasks(list_id, Some(false))?;
                let completed = self.db.list_tasks(list_id, Some(true))?;
                debug!(
                    "List {list_id}: {} ongoing, {} completed",
                    ongoing.len(),
                    completed.len()
                );
                self.ongoing.replace(ongoing);
                self.completed.replace(completed);
            }
            None => {
                self.ongoing.clear();
                self.completed.clear();
            }
        }
        Ok(())
    }

    pub(crate) fn select_list(&mut self, list_id: ListId) -> Result<Outcome> {
        if !self.lists.iter().any(|l| l.id == list_id) {
            return Ok(Outcome::Warning(Warning::UnknownList(list_id)));
        }
        if self.active == Some(list_id) {
            self.refresh()?;
            return Ok(Outcome::Unchanged);
        }
        self.active = Some(list_id);
        self.ongoing.selected = None;
        self.completed.selected = None;
        self.refresh()?;
        Ok(Outcome::Changed)
    }

    /// Moves the list selection `delta` places, wrapping around.
    pub(crate) fn cycle_list(&mut self, delta: isize) -> Result<Outcome> {
        if self.lists.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        let len = self.lists.len() as isize;
        let current = self
            .active
            .and_then(|id| self.lists.iter().position(|l| l.id == id))
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        let list_id = self.lists[next].id;
        self.select_list(list_id)
    }

    pub(crate) fn create_list(&mut self, name: &str) -> Result<Outcome> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        let list_id = self.db.create_list(name)?;
        info!("Created list {list_id} '{name}'");
        if self.active.is_none() {
            self.active = Some(list_id);
        }
        self.reload_lists()?;
        Ok(Outcome::Changed)
    }

    pub(crate) fn rename_active_list(&mut self, name: &str) -> Result<Outcome> {
        let Some(list_id) = self.active else {
            return Ok(Outcome::Warning(Warning::NoListSelected));
        };
        let name = name.trim();
        if name.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        self.db.rename_list(list_id, name)?;
        info!("Renamed list {list_id} to '{name}'");
        self.reload_lists()?;
        Ok(Outcome::Changed)
    }

    /// Deletes the active list and its tasks, then selects the first
    /// remaining list.
    pub(crate) fn delete_active_list(&mut self) -> Result<Outcome> {
        let Some(list_id) = self.active else {
            return Ok(Outcome::Warning(Warning::NoListSelected));
        };
        self.db.delete_list(list_id)?;
        info!("Deleted list {list_id}");
        self.active = None;
        self.reload_lists()?;
        Ok(Outcome::Changed)
    }

    pub(crate) fn add_task(&mut self, text: &str) -> Result<Outcome> {
        let text = text.trim();
        let list_id = match self.active {
            Some(list_id) if !text.is_empty() => list_id,
            _ => return Ok(Outcome::Warning(Warning::MissingTaskOrList)),
        };
        let task_id = self.db.create_task(text, list_id)?;
        debug!("Created task {task_id} in list {list_id}");
        self.refresh()?;
        Ok(Outcome::Changed)
    }

    pub(crate) fn remove_selected(&mut self) -> Result<Outcome> {
        let Some(kind) = self.selection() else {
            return Ok(Outcome::Warning(Warning::NoTaskToRemove));
        };
        let Some(task) = self.pane(kind).selected_task() else {
            return Ok(Outcome::Warning(Warning::TaskNotFound));
        };
        let task_id = task.id;
        debug!("Removing task {task_id} ({})", task.status());
        self.db.delete_task(task_id)?;
        self.refresh()?;
        Ok(Outcome::Changed)
    }

    pub(crate) fn complete_selected(&mut self) -> Result<Outcome> {
        if self.selection() != Some(PaneKind::Ongoing) {
            return Ok(Outcome::Warning(Warning::NoTaskToComplete));
        }
        let Some(task) = self.ongoing.selected_task() else {
            return Ok(Outcome::Warning(Warning::TaskNotFound));
        };
        let task_id = task.id;
        self.db.complete_task(task_id)?;
        debug!("Completed task {task_id}");
        self.refresh()?;
        Ok(Outcome::Changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller {
        Controller::new(Db::open_in_memory().unwrap()).unwrap()
    }

    fn shown(c: &Controller, kind: PaneKind) -> Vec<String> {
        c.pane(kind)
            .rows()
            .iter()
            .map(|t| t.description.clone())
            .collect()
    }

    fn task_count(c: &Controller) -> i64 {
        c.db.count_tasks().unwrap()
    }

    #[test]
    fn starts_with_no_list_selected() {
        let c = controller();
        assert!(c.active_list().is_none());
        assert!(c.pane(PaneKind::Ongoing).rows().is_empty());
        assert!(c.pane(PaneKind::Completed).rows().is_empty());
    }

    #[test]
    fn buy_milk_lifecycle() {
        let mut c = controller();
        assert_eq!(c.create_list("Home").unwrap(), Outcome::Changed);
        assert_eq!(c.active_list().map(|l| l.id), Some(1));

        assert_eq!(c.add_task("Buy milk").unwrap(), Outcome::Changed);
        assert_eq!(shown(&c, PaneKind::Ongoing), vec!["Buy milk"]);
        assert!(shown(&c, PaneKind::Completed).is_empty());

        c.select_row(PaneKind::Ongoing, 0);
        assert_eq!(c.complete_selected().unwrap(), Outcome::Changed);
        assert!(shown(&c, PaneKind::Ongoing).is_empty());
        assert_eq!(shown(&c, PaneKind::Completed), vec!["Buy milk"]);

        c.select_row(PaneKind::Completed, 0);
        assert_eq!(c.remove_selected().unwrap(), Outcome::Changed);
        assert!(shown(&c, PaneKind::Ongoing).is_empty());
        assert!(shown(&c, PaneKind::Completed).is_empty());
    }

    #[test]
    fn adding_without_a_list_warns_and_creates_nothing() {
        let mut c = controller();
        assert_eq!(
            c.add_task("Buy milk").unwrap(),
            Outcome::Warning(Warning::MissingTaskOrList)
        );
        assert_eq!(task_count(&c), 0);
    }

    #[test]
    fn adding_empty_text_warns() {
        let mut c = controller();
        c.create_list("Home").unwrap();
        assert_eq!(
            c.add_task("   ").unwrap(),
            Outcome::Warning(Warning::MissingTaskOrList)
        );
        assert_eq!(task_count(&c), 0);
    }

    #[test]
    fn selecting_a_list_shows_only_its_tasks() {
        let mut c = controller();
        c.create_list("Work").unwrap();
        c.create_list("Home").unwrap();
        let work = c.lists()[0].id;
        let home = c.lists()[1].id;

        assert_eq!(c.active_list().map(|l| l.id), Some(work));
        c.add_task("A").unwrap();
        assert_eq!(c.select_list(home).unwrap(), Outcome::Changed);
        c.add_task("B").unwrap();

        assert_eq!(shown(&c, PaneKind::Ongoing), vec!["B"]);
        c.select_list(work).unwrap();
        assert_eq!(shown(&c, PaneKind::Ongoing), vec!["A"]);
        c.select_list(home).unwrap();
        assert_eq!(shown(&c, PaneKind::Ongoing), vec!["B"]);
    }

    #[test]
    fn creating_a_list_keeps_the_current_selection() {
        let mut c = controller();
        c.create_list("Work").unwrap();
        c.create_list("Home").unwrap();
        assert_eq!(c.active_list().unwrap().name, "Work");
        assert_eq!(c.lists().len(), 2);
    }

    #[test]
    fn blank_list_name_changes_nothing() {
        let mut c = controller();
        assert_eq!(c.create_list("").unwrap(), Outcome::Unchanged);
        assert_eq!(c.create_list("  ").unwrap(), Outcome::Unchanged);
        assert!(c.lists().is_empty());
        assert!(c.active_list().is_none());
    }

    #[test]
    fn rename_active_list() {
        let mut c = controller();
        assert_eq!(
            c.rename_active_list("Home").unwrap(),
            Outcome::Warning(Warning::NoListSelected)
        );
        c.create_list("Hmoe").unwrap();
        assert_eq!(c.rename_active_list("").unwrap(), Outcome::Unchanged);
        assert_eq!(c.rename_active_list("Home").unwrap(), Outcome::Changed);
        assert_eq!(c.active_list().unwrap().name, "Home");
    }

    #[test]
    fn delete_active_list_falls_back_to_first() {
        let mut c = controller();
        c.create_list("Work").unwrap();
        c.create_list("Home").unwrap();
        let home = c.lists()[1].id;
        c.select_list(home).unwrap();
        c.add_task("B").unwrap();

        assert_eq!(c.delete_active_list().unwrap(), Outcome::Changed);
        assert_eq!(c.lists().len(), 1);
        assert_eq!(c.active_list().unwrap().name, "Work");
        assert!(shown(&c, PaneKind::Ongoing).is_empty());

        c.delete_active_list().unwrap();
        assert!(c.active_list().is_none());
        assert_eq!(
            c.delete_active_list().unwrap(),
            Outcome::Warning(Warning::NoListSelected)
        );
    }

    #[test]
    fn reselecting_the_active_list_repaints() {
        let mut c = controller();
        c.create_list("Home").unwrap();
        let home = c.active_list().unwrap().id;
        c.db.create_task("Added elsewhere", home).unwrap();
        assert!(shown(&c, PaneKind::Ongoing).is_empty());

        assert_eq!(c.select_list(home).unwrap(), Outcome::Unchanged);
        assert_eq!(shown(&c, PaneKind::Ongoing), vec!["Added elsewhere"]);
    }

    #[test]
    fn unknown_list_warns() {
        let mut c = controller();
        assert_eq!(
            c.select_list(5).unwrap(),
            Outcome::Warning(Warning::UnknownList(5))
        );
    }

    #[test]
    fn cycle_list_wraps() {
        let mut c = controller();
        assert_eq!(c.cycle_list(1).unwrap(), Outcome::Unchanged);
        for name in ["One", "Two", "Three"] {
            c.create_list(name).unwrap();
        }
        c.cycle_list(1).unwrap();
        assert_eq!(c.active_list().unwrap().name, "Two");
        c.cycle_list(2).unwrap();
        assert_eq!(c.active_list().unwrap().name, "One");
        c.cycle_list(-1).unwrap();
        assert_eq!(c.active_list().unwrap().name, "Three");
    }

    #[test]
    fn remove_and_complete_need_a_selection() {
        let mut c = controller();
        c.create_list("Home").unwrap();
        c.add_task("Buy milk").unwrap();
        assert_eq!(
            c.remove_selected().unwrap(),
            Outcome::Warning(Warning::NoTaskToRemove)
        );
        assert_eq!(
            c.complete_selected().unwrap(),
            Outcome::Warning(Warning::NoTaskToComplete)
        );

        c.select_row(PaneKind::Ongoing, 0);
        c.complete_selected().unwrap();
        c.select_row(PaneKind::Completed, 0);
        assert_eq!(
            c.complete_selected().unwrap(),
            Outcome::Warning(Warning::NoTaskToComplete)
        );
    }

    #[test]
    fn duplicate_descriptions_resolve_to_the_selected_row() {
        let mut c = controller();
        c.create_list("Home").unwrap();
        c.add_task("Buy milk").unwrap();
        c.add_task("Buy milk").unwrap();
        let second = c.pane(PaneKind::Ongoing).rows()[1].id;

        c.select_row(PaneKind::Ongoing, 1);
        c.complete_selected().unwrap();

        assert_eq!(c.pane(PaneKind::Ongoing).rows().len(), 1);
        assert_eq!(c.pane(PaneKind::Completed).rows()[0].id, second);
    }

    #[test]
    fn selection_is_exclusive_and_clamped() {
        let mut c = controller();
        c.create_list("Home").unwrap();
        for name in ["a", "b", "c"] {
            c.add_task(name).unwrap();
        }
        c.select_row(PaneKind::Ongoing, 10);
        assert_eq!(c.pane(PaneKind::Ongoing).selected(), Some(2));

        c.complete_selected().unwrap();
        assert_eq!(c.pane(PaneKind::Ongoing).selected(), Some(1));

        c.select_row(PaneKind::Completed, 0);
        assert_eq!(c.selection(), Some(PaneKind::Completed));
        assert_eq!(c.pane(PaneKind::Ongoing).selected(), None);

        c.move_selection(PaneKind::Ongoing, -1);
        assert_eq!(c.pane(PaneKind::Ongoing).selected(), Some(0));
        c.move_selection(PaneKind::Ongoing, 1);
        assert_eq!(c.pane(PaneKind::Ongoing).selected(), Some(1));
        c.move_selection(PaneKind::Ongoing, 5);
        assert_eq!(c.pane(PaneKind::Ongoing).selected(), Some(1));
    }

    #[test]
    fn stale_selection_reports_task_not_found() {
        let mut c = controller();
        c.create_list("Home").unwrap();
        c.add_task("Buy milk").unwrap();
        c.select_row(PaneKind::Ongoing, 0);
        c.ongoing.selected = Some(4);
        assert_eq!(
            c.remove_selected().unwrap(),
            Outcome::Warning(Warning::TaskNotFound)
        );
        assert_eq!(task_count(&c), 1);
    }
}
