use sqlx::MySqlPool;

use keyaudit_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub async fn fetch_database_name(pool: &MySqlPool) -> Result<Option<String>> {
    sqlx::query_scalar::<_, Option<String>>("select cast(database() as char)")
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

pub async fn constraint_exists(
    pool: &MySqlPool,
    schema: Option<&str>,
    foreign_table: &str,
    foreign_column: &str,
    parent_table: &str,
    parent_column: &str,
) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        select count(*)
        from information_schema.key_column_usage
        where table_schema = coalesce(?, database())
          and table_name = ?
          and column_name = ?
          and referenced_table_name = ?
          and referenced_column_name = ?
        "#,
    )
    .bind(schema)
    .bind(foreign_table)
    .bind(foreign_column)
    .bind(parent_table)
    .bind(parent_column)
    .fetch_one(pool)
    .await
    .map_err(db_error)?;

    Ok(count > 0)
}

pub async fn is_indexed(
    pool: &MySqlPool,
    schema: Option<&str>,
    table: &str,
    column: &str,
) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        select count(*)
        from information_schema.statistics
        where table_schema = coalesce(?, database())
          and table_name = ?
          and column_name = ?
        "#,
    )
    .bind(schema)
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await
    .map_err(db_error)?;

    Ok(count > 0)
}

pub struct RawForeignKey {
    pub name: String,
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

pub async fn list_foreign_keys(pool: &MySqlPool, schema: Option<&str>) -> Result<Vec<RawForeignKey>> {
    let rows = sqlx::query_as::<_, (String, String, String, String, String)>(
        r#"
        select
          cast(constraint_name as char),
          cast(table_name as char),
          cast(column_name as char),
          cast(referenced_table_name as char),
          cast(referenced_column_name as char)
        from information_schema.key_column_usage
        where table_schema = coalesce(?, database())
          and referenced_table_name is not null
        order by table_name, constraint_name, ordinal_position
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(
            |(name, table, column, referenced_table, referenced_column)| RawForeignKey {
                name,
                table,
                column,
                referenced_table,
                referenced_column,
            },
        )
        .collect())
}

/// One row per indexed column; callers group them by index.
pub struct RawIndexColumn {
    pub index_name: String,
    pub table: String,
    pub column: String,
    pub non_unique: bool,
}

pub async fn list_index_columns(
    pool: &MySqlPool,
    schema: Option<&str>,
) -> Result<Vec<RawIndexColumn>> {
    let rows = sqlx::query_as::<_, (String, String, String, i64)>(
        r#"
        select
          cast(index_name as char),
          cast(table_name as char),
          cast(column_name as char),
          cast(non_unique as signed)
        from information_schema.statistics
        where table_schema = coalesce(?, database())
          and column_name is not null
        order by table_name, index_name, seq_in_index
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(|(index_name, table, column, non_unique)| RawIndexColumn {
            index_name,
            table,
            column,
            non_unique: non_unique != 0,
        })
        .collect())
}
