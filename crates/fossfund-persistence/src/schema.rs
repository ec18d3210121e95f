//! Schema setup for a fresh or existing PostgreSQL database
//!
//! [`setup`] drops every enum type and base table of the `public` schema and
//! recreates the fossfund schema. All of this runs in one transaction.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement, TransactionTrait};
use tracing::info;

/// Enum types of the schema with their labels
pub const ENUMS: &[(&str, &[&str])] = &[
    (
        "urltype",
        &["paypal", "patreon", "liberapay", "opencollective", "other"],
    ),
    ("oauthprovider", &["github", "bitbucket", "google"]),
];

/// Table definitions in dependency order
pub const TABLES: &[(&str, &str)] = &[
    (
        "organisations",
        r#"CREATE TABLE organisations (
    org_id SERIAL PRIMARY KEY,
    name VARCHAR(40) NOT NULL,
    "desc" VARCHAR(300) CHECK (char_length("desc") > 14),
    logo BOOLEAN NOT NULL DEFAULT FALSE
);"#,
    ),
    (
        "groups",
        r#"CREATE TABLE groups (
    grp_id SERIAL PRIMARY KEY,
    name VARCHAR(40) NOT NULL,
    "desc" VARCHAR(300) CHECK (char_length("desc") > 14),
    logo BOOLEAN NOT NULL DEFAULT FALSE
);"#,
    ),
    (
        "projects",
        r#"CREATE TABLE projects (
    proj_id SERIAL PRIMARY KEY,
    org_id INTEGER REFERENCES organisations (org_id) ON DELETE SET NULL,
    name VARCHAR(40) NOT NULL,
    "desc" VARCHAR(300) CHECK (char_length("desc") > 14),
    homepage VARCHAR,
    logo BOOLEAN NOT NULL DEFAULT FALSE
);"#,
    ),
    (
        "urls",
        r#"CREATE TABLE urls (
    url_id SERIAL PRIMARY KEY,
    name VARCHAR(40) NOT NULL,
    url VARCHAR,
    type urltype
);"#,
    ),
    (
        "memberships",
        r#"CREATE TABLE memberships (
    proj_id INTEGER NOT NULL REFERENCES projects (proj_id) ON DELETE CASCADE,
    grp_id INTEGER NOT NULL REFERENCES groups (grp_id) ON DELETE CASCADE,
    PRIMARY KEY (proj_id, grp_id)
);"#,
    ),
    (
        "users",
        r#"CREATE TABLE users (
    user_id SERIAL PRIMARY KEY,
    provider oauthprovider,
    provider_user_id VARCHAR,
    joined TIMESTAMP NOT NULL DEFAULT now()
);"#,
    ),
    (
        "sessions",
        r#"CREATE TABLE sessions (
    ses_id VARCHAR PRIMARY KEY DEFAULT uuid_generate_v4(),
    user_id INTEGER NOT NULL REFERENCES users (user_id) ON DELETE CASCADE
);"#,
    ),
];

const EXISTING_TABLES_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = 'public' AND table_type = 'BASE TABLE';";

/// Build a `DROP <subject> [IF EXISTS] <target>[ CASCADE];` statement
pub fn drop_sql(subject: &str, targets: &[&str], check: bool, cascade: bool) -> String {
    format!(
        "DROP {} {}{}{};",
        subject,
        if check { "IF EXISTS " } else { "" },
        targets
            .iter()
            .map(|t| quote_ident(t))
            .collect::<Vec<_>>()
            .join(", "),
        if cascade { " CASCADE" } else { "" }
    )
}

/// Build a `CREATE TYPE <name> AS ENUM (...)` statement
pub fn create_enum_sql(name: &str, labels: &[&str]) -> String {
    let labels = labels
        .iter()
        .map(|l| format!("'{}'", l.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TYPE {} AS ENUM ({});", quote_ident(name), labels)
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// All statements run by [`setup`], given the tables that currently exist
pub fn setup_statements(existing_tables: &[String]) -> Vec<String> {
    let mut statements = vec!["CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\";".to_string()];

    for (name, labels) in ENUMS {
        statements.push(drop_sql("TYPE", &[name], true, true));
        statements.push(create_enum_sql(name, labels));
    }

    for table in existing_tables {
        statements.push(drop_sql("TABLE", &[table.as_str()], true, true));
    }

    for (_, create) in TABLES {
        statements.push(create.to_string());
    }

    statements
}

/// Recreate the database schema
///
/// Existing tables and types are dropped with CASCADE, then all types and
/// tables are created.
pub async fn setup(db: &DatabaseConnection) -> anyhow::Result<()> {
    let existing_tables: Vec<String> = db
        .query_all(Statement::from_string(
            DbBackend::Postgres,
            EXISTING_TABLES_SQL,
        ))
        .await?
        .iter()
        .map(|row| row.try_get::<String>("", "table_name"))
        .collect::<Result<_, _>>()?;

    info!(
        existing = existing_tables.len(),
        "Recreating database schema"
    );

    let txn = db.begin().await?;
    for statement in setup_statements(&existing_tables) {
        txn.execute_unprepared(&statement).await?;
    }
    txn.commit().await?;

    info!(tables = TABLES.len(), "Database schema created");

    Ok(())
}
