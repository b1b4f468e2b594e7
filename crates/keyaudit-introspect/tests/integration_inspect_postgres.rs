use anyhow::{Context, Result};
use keyaudit_core::{QualifiedColumn, SchemaInspector};
use keyaudit_introspect::{InspectOptions, PostgresInspector};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL").ok()
}

async fn run_script(pool: &PgPool, script: &str) -> Result<()> {
    for statement in script.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .with_context(|| format!("executing {sql}"))?;
    }
    Ok(())
}

fn fixture(schema: &str) -> String {
    format!(
        r#"
        create schema {schema};
        create table {schema}.customers (id bigint primary key);
        create table {schema}.invoices (
          id bigint primary key,
          customer_id bigint not null,
          constraint invoices_customer_fk foreign key (customer_id) references {schema}.customers (id)
        );
        create table {schema}.payments (
          id bigint primary key,
          invoice_id bigint not null
        );
        create index payments_lookup_idx on {schema}.payments (id, invoice_id)
        "#
    )
}

fn column(raw: &str) -> QualifiedColumn {
    raw.parse().expect("qualified column")
}

#[tokio::test]
async fn inspects_constraints_and_indexes() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to Postgres")?;

    let schema = format!("keyaudit_{}", uuid::Uuid::new_v4().simple());
    run_script(&pool, &fixture(&schema)).await?;

    let opts = InspectOptions {
        schemas: Some(vec![schema.clone()]),
        ..InspectOptions::default()
    };
    let inspector = PostgresInspector::from_pool(pool.clone(), &opts).await?;

    let outcome = async {
        assert!(
            inspector
                .constraint_exists(&column("customers.id"), &column("invoices.customer_id"))
                .await?
        );
        assert!(
            !inspector
                .constraint_exists(&column("invoices.id"), &column("payments.invoice_id"))
                .await?
        );

        // Second key position of a composite index still counts.
        assert!(inspector.is_indexed(&column("payments.invoice_id")).await?);
        assert!(!inspector.is_indexed(&column("invoices.customer_id")).await?);

        let snapshot = inspector.snapshot().await?;
        assert_eq!(snapshot.foreign_keys.len(), 1);
        assert!(snapshot.has_index(&column("customers.id")));
        anyhow::Ok(())
    }
    .await;

    run_script(&pool, &format!("drop schema {schema} cascade")).await?;
    outcome
}
