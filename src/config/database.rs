//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Composite uniqueness that the entity
//! attributes cannot express is added as explicit indexes.

use crate::entities::{
    Duty, LoadItem, LoadSettings, LoadStatement, PlanningPhase, Semester, SemesterDuty,
    TeachingAssignment, load_statement,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/dekanat.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables (if missing) from the entity definitions, plus the unique
/// `(phase_id, person_id)` index on load statements.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Semester).await?;
    create_table(db, &schema, PlanningPhase).await?;
    create_table(db, &schema, Duty).await?;
    create_table(db, &schema, SemesterDuty).await?;
    create_table(db, &schema, TeachingAssignment).await?;
    create_table(db, &schema, LoadSettings).await?;
    create_table(db, &schema, LoadStatement).await?;
    create_table(db, &schema, LoadItem).await?;

    let statement_pair = Index::create()
        .if_not_exists()
        .name("idx_load_statements_phase_person")
        .table(LoadStatement)
        .col(load_statement::Column::PhaseId)
        .col(load_statement::Column::PersonId)
        .unique()
        .to_owned();
    db.execute(builder.build(&statement_pair)).await?;

    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        load_item::Model as LoadItemModel, load_statement::Model as LoadStatementModel,
        planning_phase::Model as PlanningPhaseModel, semester::Model as SemesterModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<SemesterModel> = Semester::find().limit(1).all(&db).await?;
        let _: Vec<PlanningPhaseModel> = PlanningPhase::find().limit(1).all(&db).await?;
        let _: Vec<LoadStatementModel> = LoadStatement::find().limit(1).all(&db).await?;
        let _: Vec<LoadItemModel> = LoadItem::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_default_database_url_is_sqlite() {
        assert!(DEFAULT_DATABASE_URL.starts_with("sqlite://"));
    }
}
