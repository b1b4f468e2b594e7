use sqlx::PgPool;

use keyaudit_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub async fn fetch_database_name(pool: &PgPool) -> Result<String> {
    sqlx::query_scalar::<_, String>("select current_database()::text")
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

pub async fn current_schemas(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, Vec<String>>("select current_schemas(false)::text[]")
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

pub async fn constraint_exists(
    pool: &PgPool,
    schemas: &[String],
    foreign_table: &str,
    foreign_column: &str,
    parent_schema: Option<&str>,
    parent_table: &str,
    parent_column: &str,
) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        select exists (
          select 1
          from pg_constraint con
          join pg_class src_rel on src_rel.oid = con.conrelid
          join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
          join pg_class ref_rel on ref_rel.oid = con.confrelid
          join pg_namespace ref_nsp on ref_nsp.oid = ref_rel.relnamespace
          join unnest(con.conkey, con.confkey) as k(src_attnum, ref_attnum) on true
          join pg_attribute src_att on src_att.attrelid = src_rel.oid and src_att.attnum = k.src_attnum
          join pg_attribute ref_att on ref_att.attrelid = ref_rel.oid and ref_att.attnum = k.ref_attnum
          where con.contype = 'f'
            and src_nsp.nspname = any($1)
            and src_rel.relname = $2
            and src_att.attname = $3
            and ($4::text is null or ref_nsp.nspname = $4)
            and ref_rel.relname = $5
            and ref_att.attname = $6
        )
        "#,
    )
    .bind(schemas)
    .bind(foreign_table)
    .bind(foreign_column)
    .bind(parent_schema)
    .bind(parent_table)
    .bind(parent_column)
    .fetch_one(pool)
    .await
    .map_err(db_error)
}

pub async fn is_indexed(pool: &PgPool, schemas: &[String], table: &str, column: &str) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        select exists (
          select 1
          from pg_index i
          join pg_class tbl on tbl.oid = i.indrelid
          join pg_namespace nsp on nsp.oid = tbl.relnamespace
          join pg_attribute att on att.attrelid = tbl.oid and att.attnum = any(i.indkey)
          where nsp.nspname = any($1)
            and tbl.relname = $2
            and att.attname = $3
        )
        "#,
    )
    .bind(schemas)
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await
    .map_err(db_error)
}

pub struct RawForeignKey {
    pub name: String,
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

pub async fn list_foreign_keys(pool: &PgPool, schemas: &[String]) -> Result<Vec<RawForeignKey>> {
    let rows = sqlx::query_as::<_, (String, String, String, String, String)>(
        r#"
        select
          con.conname::text,
          src_rel.relname::text,
          src_att.attname::text,
          ref_rel.relname::text,
          ref_att.attname::text
        from pg_constraint con
        join pg_class src_rel on src_rel.oid = con.conrelid
        join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
        join pg_class ref_rel on ref_rel.oid = con.confrelid
        join unnest(con.conkey, con.confkey) as k(src_attnum, ref_attnum) on true
        join pg_attribute src_att on src_att.attrelid = src_rel.oid and src_att.attnum = k.src_attnum
        join pg_attribute ref_att on ref_att.attrelid = ref_rel.oid and ref_att.attnum = k.ref_attnum
        where con.contype = 'f'
          and src_nsp.nspname = any($1)
        order by src_rel.relname, con.conname, src_att.attname
        "#,
    )
    .bind(schemas)
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

pub struct RawIndex {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
}

pub async fn list_indexes(pool: &PgPool, schemas: &[String]) -> Result<Vec<RawIndex>> {
    let rows = sqlx::query_as::<_, (String, String, Vec<String>, bool, bool)>(
        r#"
        select
          idx.relname::text,
          tbl.relname::text,
          array_agg(att.attname::text order by k.ord),
          i.indisunique,
          i.indisprimary
        from pg_index i
        join pg_class tbl on tbl.oid = i.indrelid
        join pg_namespace nsp on nsp.oid = tbl.relnamespace
        join pg_class idx on idx.oid = i.indexrelid
        join unnest(i.indkey::int2[]) with ordinality as k(attnum, ord) on true
        join pg_attribute att on att.attrelid = tbl.oid and att.attnum = k.attnum
        where nsp.nspname = any($1)
        group by idx.relname, tbl.relname, i.indisunique, i.indisprimary
        order by tbl.relname, idx.relname
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(|(name, table, columns, is_unique, is_primary)| RawIndex {
            name,
            table,
            columns,
            is_unique,
            is_primary,
        })
        .collect())
}
