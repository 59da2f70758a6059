//! Textual statement classification and rewriting.
//!
//! The merge pipeline edits SQL via anchored pattern substitution rather than
//! parsing into an AST. All pattern knowledge lives here so the decision logic
//! in `reconcile` never touches regex syntax, and this module could be swapped
//! for a real tokenizer later. Patterns match a bare, optionally backquoted
//! identifier immediately after the leading keyword; a table name that only
//! appears deeper in the statement is not touched.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::{NoExpand, Regex};

static CREATE_TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^CREATE\s+TABLE\s+`?([A-Za-z0-9_]+)`?").unwrap());
static DML_INTO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(INSERT|REPLACE)(\s+INTO\s+)`?([A-Za-z0-9_]+)`?").unwrap());
static ALTER_TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ALTER\s+TABLE\s+`?([A-Za-z0-9_]+)`?").unwrap());
static INSERT_INTO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^INSERT\s+INTO").unwrap());

/// What a statement does to a table, judged by its leading keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable { table: String },
    DmlInto { table: String },
    AlterTable { table: String },
    Other,
}

pub fn classify(statement: &str) -> StatementKind {
    if let Some(caps) = CREATE_TABLE_RE.captures(statement) {
        StatementKind::CreateTable {
            table: caps[1].to_string(),
        }
    } else if let Some(caps) = DML_INTO_RE.captures(statement) {
        StatementKind::DmlInto {
            table: caps[3].to_string(),
        }
    } else if let Some(caps) = ALTER_TABLE_RE.captures(statement) {
        StatementKind::AlterTable {
            table: caps[1].to_string(),
        }
    } else {
        StatementKind::Other
    }
}

/// Rewrites the identifier immediately following `CREATE TABLE`.
pub fn rename_create_target(statement: &str, table: &str) -> String {
    CREATE_TABLE_RE
        .replace(statement, NoExpand(&format!("CREATE TABLE `{table}`")))
        .into_owned()
}

/// Rewrites the `INTO <name>` clause, keeping the original verb and spacing.
pub fn rename_dml_target(statement: &str, table: &str) -> String {
    DML_INTO_RE
        .replace(statement, |caps: &regex::Captures<'_>| {
            format!("{}{}`{table}`", &caps[1], &caps[2])
        })
        .into_owned()
}

/// Rewrites the identifier following `ALTER TABLE`.
pub fn rename_alter_target(statement: &str, table: &str) -> String {
    ALTER_TABLE_RE
        .replace(statement, NoExpand(&format!("ALTER TABLE `{table}`")))
        .into_owned()
}

/// Turns a leading `INSERT INTO` into the duplicate-tolerant `INSERT IGNORE
/// INTO`. A `REPLACE INTO` statement passes through unchanged.
pub fn make_insert_ignore(statement: &str) -> String {
    INSERT_INTO_RE
        .replace(statement, NoExpand("INSERT IGNORE INTO"))
        .into_owned()
}

/// Lowercases, trims, and collapses whitespace runs to single spaces.
///
/// Used solely for equality comparison between an incoming `CREATE TABLE`
/// statement and the definition the server reports for an existing table,
/// never for execution. Idempotent.
pub fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{
        StatementKind, classify, make_insert_ignore, normalize_sql, rename_alter_target,
        rename_create_target, rename_dml_target,
    };

    #[test]
    fn classifies_by_leading_keyword() {
        assert_eq!(
            classify("CREATE TABLE `users` (id INT)"),
            StatementKind::CreateTable {
                table: "users".to_string()
            }
        );
        assert_eq!(
            classify("insert  into orders VALUES (1)"),
            StatementKind::DmlInto {
                table: "orders".to_string()
            }
        );
        assert_eq!(
            classify("REPLACE INTO orders VALUES (1)"),
            StatementKind::DmlInto {
                table: "orders".to_string()
            }
        );
        assert_eq!(
            classify("ALTER TABLE users ADD COLUMN email VARCHAR(100)"),
            StatementKind::AlterTable {
                table: "users".to_string()
            }
        );
        assert_eq!(classify("DROP TABLE users"), StatementKind::Other);
        assert_eq!(classify("SET NAMES utf8mb4"), StatementKind::Other);
    }

    #[test]
    fn create_rename_touches_only_the_leading_identifier() {
        let rewritten = rename_create_target(
            "CREATE TABLE users (id INT, manager_users INT REFERENCES users(id))",
            "users_v2",
        );
        assert_eq!(
            rewritten,
            "CREATE TABLE `users_v2` (id INT, manager_users INT REFERENCES users(id))"
        );
    }

    #[test]
    fn dml_rename_preserves_verb_and_spacing() {
        assert_eq!(
            rename_dml_target("REPLACE  INTO  users VALUES (1)", "users_v2"),
            "REPLACE  INTO  `users_v2` VALUES (1)"
        );
        assert_eq!(
            rename_dml_target("INSERT INTO `users` VALUES (1)", "users_v2"),
            "INSERT INTO `users_v2` VALUES (1)"
        );
    }

    #[test]
    fn alter_rename_targets_the_mapped_table() {
        assert_eq!(
            rename_alter_target("ALTER TABLE users ADD INDEX idx_a (a)", "users_v2"),
            "ALTER TABLE `users_v2` ADD INDEX idx_a (a)"
        );
    }

    #[test]
    fn insert_ignore_leaves_replace_untouched() {
        assert_eq!(
            make_insert_ignore("INSERT INTO users VALUES (1)"),
            "INSERT IGNORE INTO users VALUES (1)"
        );
        let replace = "REPLACE INTO users VALUES (1)";
        assert_eq!(make_insert_ignore(replace), replace);
    }

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(
            normalize_sql("  CREATE TABLE  Users\n  (id INT)  "),
            "create table users (id int)"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_sql("CREATE   TABLE t\t(a INT,\n b INT)");
        assert_eq!(normalize_sql(&once), once);
    }
}
