use std::fmt::Display;

pub(crate) type ListId = i64;
pub(crate) type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TaskStatus {
    #[default]
    Ongoing,
    Completed,
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            TaskStatus::Ongoing => ' ',
            TaskStatus::Completed => 'x',
        };
        write!(f, "[{c}]")
    }
}

impl From<bool> for TaskStatus {
    fn from(completed: bool) -> Self {
        if completed {
            Self::Completed
        } else {
            Self::Ongoing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskList {
    pub(crate) id: ListId,
    pub(crate) name: String,
}

impl Display for TaskList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) description: String,
    pub(crate) completed: bool,
}

impl Task {
    pub(crate) fn status(&self) -> TaskStatus {
        self.completed.into()
    }

    /// The text shown for this task in a result pane.
    pub(crate) fn label(&self, show_id: bool) -> String {
        if show_id {
            format!("#{} {}", self.id, self.description)
        } else {
            self.description.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        let task = Task {
            id: 7,
            description: "Buy milk".into(),
            completed: true,
        };
        assert_eq!(task.label(false), "Buy milk");
        assert_eq!(task.label(true), "#7 Buy milk");
        assert_eq!(task.status().to_string(), "[x]");
        assert_eq!(TaskStatus::default().to_string(), "[ ]");
    }

    #[test]
    fn list_display_matches_selector_format() {
        let list = TaskList {
            id: 3,
            name: "Home".into(),
        };
        assert_eq!(list.to_string(), "3: Home");
    }
}
