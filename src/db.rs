use crate::{
    config::Config,
    error::{Error, Result},
    types::{ListId, Task, TaskId, TaskList},
};
use chrono::Utc;
use log::{debug, info};
use rusqlite::{Connection, Result as SQLiteResult, Row, Transaction};
use std::path::Path;

/// The schema version produced by the last entry of `MIGRATIONS`.
pub(crate) const SCHEMA_VERSION: u32 = 1;

/// Name of the list that takes in tasks left over from the single-list layout.
const ADOPTED_LIST: &str = "Tasks";

const CREATE_META: &str = "
CREATE TABLE IF NOT EXISTS _meta (
	version	INTEGER NOT NULL,
	applied	INTEGER NOT NULL,
	PRIMARY KEY(version)
);
";

const CREATE_TASK_LISTS: &str = "
CREATE TABLE IF NOT EXISTS task_lists (
	id	INTEGER PRIMARY KEY AUTOINCREMENT,
	name	TEXT NOT NULL
);
";

const CREATE_TASKS: &str = "
CREATE TABLE IF NOT EXISTS tasks (
	id	INTEGER PRIMARY KEY AUTOINCREMENT,
	description	TEXT NOT NULL,
	completed	BOOLEAN NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
	list_id	INTEGER REFERENCES task_lists(id) ON DELETE CASCADE
);
";

const SELECT_TASKS: &str =
    "SELECT id, description, completed FROM tasks WHERE list_id = ? ORDER BY id";
const SELECT_TASKS_BY_STATUS: &str =
    "SELECT id, description, completed FROM tasks WHERE list_id = ? AND completed = ? ORDER BY id";

struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction<'_>) -> Result<()>,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "task_lists",
    up: migrate_task_lists,
}];

/// Creates both tables, or upgrades a database written by the single-list
/// version: old column names are renamed, `tasks.list_id` is added, and tasks
/// without a list are moved into a new one.
fn migrate_task_lists(tx: &Transaction<'_>) -> Result<()> {
    let list_columns = table_columns(tx, "task_lists")?;
    if list_columns.is_empty() {
        tx.execute_batch(CREATE_TASK_LISTS)?;
    } else if has_column(&list_columns, "list_name") && !has_column(&list_columns, "name") {
        debug!("Renaming task_lists.list_name to name");
        tx.execute_batch("ALTER TABLE task_lists RENAME COLUMN list_name TO name;")?;
    }

    let task_columns = table_columns(tx, "tasks")?;
    if task_columns.is_empty() {
        tx.execute_batch(CREATE_TASKS)?;
        return Ok(());
    }
    if has_column(&task_columns, "task") && !has_column(&task_columns, "description") {
        debug!("Renaming tasks.task to description");
        tx.execute_batch("ALTER TABLE tasks RENAME COLUMN task TO description;")?;
    }
    if !has_column(&task_columns, "list_id") {
        debug!("Adding tasks.list_id");
        tx.execute_batch(
            "ALTER TABLE tasks ADD COLUMN list_id INTEGER REFERENCES task_lists(id) ON DELETE CASCADE;",
        )?;
    }

    let orphans: i64 = tx.query_row(
        "SELECT COUNT(*) FROM tasks WHERE list_id IS NULL",
        [],
        |row| row.get(0),
    )?;
    if orphans > 0 {
        tx.execute("INSERT INTO task_lists(name) VALUES(?)", (ADOPTED_LIST,))?;
        let list_id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE tasks SET list_id = ? WHERE list_id IS NULL",
            (list_id,),
        )?;
        info!("Moved {orphans} task(s) without a list into '{ADOPTED_LIST}' ({list_id})");
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?) ORDER BY cid")?;
    let columns = stmt
        .query_map((table,), |row| row.get(0))?
        .collect::<SQLiteResult<Vec<String>>>()?;
    Ok(columns)
}

fn has_column(columns: &[String], name: &str) -> bool {
    columns.iter().any(|c| c == name)
}

fn task_from_row(row: &Row<'_>) -> SQLiteResult<Task> {
    Ok(Task {
        id: row.get(0)?,
        description: row.get(1)?,
        completed: row.get(2)?,
    })
}

pub(crate) struct Db {
    conn: Connection,
}

impl Db {
    pub(crate) fn new(config: &Config) -> Result<Db> {
        let db_path = config.database_file()?;
        Self::open(db_path)
    }

    pub(crate) fn open(path: impl AsRef<Path>) -> Result<Db> {
        let path = path.as_ref();
        debug!("Opening database at {path:?}");
        let conn = Connection::open(path)?;
        debug!("Database connection opened, initializing...");
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Db> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Db> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let mut db = Db { conn };
        db.ensure_schema()?;
        debug!("Database initialized.");
        Ok(db)
    }

    /// Brings the schema up to `SCHEMA_VERSION`. Does nothing when it already
    /// is.
    pub(crate) fn ensure_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(CREATE_META)?;
        let current = self.schema_version()?;
        if current > SCHEMA_VERSION {
            return Err(Error::SchemaTooNew {
                found: current,
                supported: SCHEMA_VERSION,
            });
        }
        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            info!(
                "Applying migration {} ({})",
                migration.version, migration.name
            );
            let tx = self.conn.transaction()?;
            (migration.up)(&tx)?;
            tx.execute(
                "INSERT INTO _meta(version, applied) VALUES(?, ?)",
                (migration.version, Utc::now().timestamp()),
            )?;
            tx.commit()?;
        }
        Ok(())
    }

    pub(crate) fn schema_version(&self) -> Result<u32> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _meta",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    /// Every user table with its columns, in name order.
    pub(crate) fn describe_schema(&self) -> Result<Vec<(String, Vec<String>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name",
        )?;
        let tables = stmt
            .query_map([], |row| row.get(0))?
            .collect::<SQLiteResult<Vec<String>>>()?;
        tables
            .into_iter()
            .map(|table| -> Result<(String, Vec<String>)> {
                let columns = table_columns(&self.conn, &table)?;
                Ok((table, columns))
            })
            .collect()
    }

    pub(crate) fn create_list(&self, name: &str) -> Result<ListId> {
        self.conn
            .execute("INSERT INTO task_lists(name) VALUES(?)", (name,))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn list_lists(&self) -> Result<Vec<TaskList>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM task_lists ORDER BY id")?;
        let lists = stmt
            .query_map([], |row| {
                Ok(TaskList {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<SQLiteResult<Vec<_>>>()?;
        Ok(lists)
    }

    pub(crate) fn rename_list(&self, list_id: ListId, name: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE task_lists SET name = ? WHERE id = ?",
            (name, list_id),
        )?;
        Ok(())
    }

    /// Deletes the list together with all of its tasks.
    pub(crate) fn delete_list(&mut self, list_id: ListId) -> Result<()> {
        let tx = self.conn.transaction()?;
        let tasks = tx.execute("DELETE FROM tasks WHERE list_id = ?", (list_id,))?;
        tx.execute("DELETE FROM task_lists WHERE id = ?", (list_id,))?;
        tx.commit()?;
        debug!("Deleted list {list_id} and {tasks} task(s)");
        Ok(())
    }

    pub(crate) fn create_task(&self, description: &str, list_id: ListId) -> Result<TaskId> {
        self.conn.execute(
            "INSERT INTO tasks(description, completed, list_id) VALUES(?, 0, ?)",
            (description, list_id),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn delete_task(&self, task_id: TaskId) -> Result<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?", (task_id,))?;
        Ok(())
    }

    pub(crate) fn complete_task(&self, task_id: TaskId) -> Result<()> {
        self.conn
            .execute("UPDATE tasks SET completed = 1 WHERE id = ?", (task_id,))?;
        Ok(())
    }

    pub(crate) fn list_tasks(&self, list_id: ListId, completed: Option<bool>) -> Result<Vec<Task>> {
        let tasks = match completed {
            Some(completed) => {
                let mut stmt = self.conn.prepare(SELECT_TASKS_BY_STATUS)?;
                let tasks = stmt
                    .query_map((list_id, completed), task_from_row)?
                    .collect::<SQLiteResult<Vec<_>>>()?;
                tasks
            }
            None => {
                let mut stmt = self.conn.prepare(SELECT_TASKS)?;
                let tasks = stmt
                    .query_map((list_id,), task_from_row)?
                    .collect::<SQLiteResult<Vec<_>>>()?;
                tasks
            }
        };
        Ok(tasks)
    }

    /// Leaves the connection unable to serve any task query.
    #[cfg(test)]
    pub(crate) fn drop_tasks_table(&self) -> Result<()> {
        self.conn.execute_batch("DROP TABLE tasks;")?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn count_tasks(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?)
    }
}
