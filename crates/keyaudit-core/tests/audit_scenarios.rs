use async_trait::async_trait;
use keyaudit_core::{
    CatalogSnapshot, CheckKind, Diagnostic, Error, QualifiedColumn, Relationship,
    RelationshipRecord, Result, SchemaInspector, Status, SuppressionList, Verbosity, audit,
};

fn invoice_customer() -> RelationshipRecord {
    RelationshipRecord::new(
        "Invoice",
        Relationship::belongs_to("customer", "customers.id", "invoices.customer_id")
            .expect("valid keys"),
    )
}

fn show_all() -> Verbosity {
    Verbosity {
        show_all: true,
        show_others: false,
    }
}

struct UnreachableInspector;

#[async_trait]
impl SchemaInspector for UnreachableInspector {
    fn engine(&self) -> &'static str {
        "unreachable"
    }

    async fn constraint_exists(
        &self,
        _parent: &QualifiedColumn,
        _foreign: &QualifiedColumn,
    ) -> Result<bool> {
        Err(Error::Db("permission denied for table pg_constraint".to_string()))
    }

    async fn is_indexed(&self, _column: &QualifiedColumn) -> Result<bool> {
        Err(Error::Db("connection reset".to_string()))
    }
}

#[tokio::test]
async fn constraint_and_index_present_pass_only_with_show_all() {
    let catalog = CatalogSnapshot::new("postgres", Some("shop".to_string()))
        .with_foreign_key("customers.id", "invoices.customer_id")
        .with_index("invoices_customer_id_idx", "invoices", &["customer_id"]);
    let suppression = SuppressionList::new();

    for kind in CheckKind::ALL {
        let quiet = audit(
            &catalog,
            vec![invoice_customer()],
            kind,
            &suppression,
            Verbosity::default(),
        )
        .await;
        assert_eq!(quiet.entries[0].status, Status::Pass);
        assert!(quiet.render_lines().is_empty());

        let loud = audit(&catalog, vec![invoice_customer()], kind, &suppression, show_all()).await;
        assert_eq!(loud.render_lines().len(), 1);
        assert!(loud.render_lines()[0].starts_with("PASS"));
    }
}

#[tokio::test]
async fn missing_constraint_fails() {
    let catalog = CatalogSnapshot::new("postgres", None);
    let report = audit(
        &catalog,
        vec![invoice_customer()],
        CheckKind::Constraint,
        &SuppressionList::new(),
        Verbosity::default(),
    )
    .await;

    assert_eq!(report.entries[0].status, Status::Fail);
    assert_eq!(
        report.entries[0].message,
        "customer: customers.id has no foreign key constraint"
    );
    assert!(report.has_failures());
}

#[tokio::test]
async fn suppressed_constraint_warns_without_changing_result() {
    let catalog = CatalogSnapshot::new("postgres", None);
    let suppression = SuppressionList::from_entries(["customer: customers.id"]);
    let report = audit(
        &catalog,
        vec![invoice_customer()],
        CheckKind::Constraint,
        &suppression,
        Verbosity::default(),
    )
    .await;

    let entry = &report.entries[0];
    assert_eq!(entry.status, Status::Warn);
    assert!(!entry.record.constraint_exists);
    assert!(
        entry
            .message
            .starts_with("customer: customers.id has no foreign key constraint")
    );
    assert!(!report.has_failures());
    assert_eq!(report.summary.warn, 1);
}

#[tokio::test]
async fn constraint_without_index_fails_index_check() {
    let catalog = CatalogSnapshot::new("postgres", None)
        .with_foreign_key("customers.id", "invoices.customer_id");
    let suppression = SuppressionList::new();

    let constraint = audit(
        &catalog,
        vec![invoice_customer()],
        CheckKind::Constraint,
        &suppression,
        Verbosity::default(),
    )
    .await;
    assert_eq!(constraint.entries[0].status, Status::Pass);

    let index = audit(
        &catalog,
        vec![invoice_customer()],
        CheckKind::Index,
        &suppression,
        Verbosity::default(),
    )
    .await;
    assert_eq!(index.entries[0].status, Status::Fail);
    assert_eq!(
        index.render_lines(),
        vec!["FAIL  invoices.customer_id is not indexed".to_string()]
    );
}

#[tokio::test]
async fn shared_foreign_column_reports_once_in_index_mode() {
    let catalog = CatalogSnapshot::new("postgres", None);
    let records = vec![
        invoice_customer(),
        RelationshipRecord::new(
            "Billing::Statement",
            Relationship::belongs_to("billedCustomer", "customers.id", "invoices.customer_id")
                .expect("valid keys"),
        ),
    ];

    let report = audit(
        &catalog,
        records,
        CheckKind::Index,
        &SuppressionList::new(),
        Verbosity::default(),
    )
    .await;
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].record.model, "Invoice");
}

fn statement_billed_customer() -> RelationshipRecord {
    RelationshipRecord::new(
        "Billing::Statement",
        Relationship::belongs_to("billedCustomer", "customers.id", "invoices.customer_id")
            .expect("valid keys"),
    )
}

#[tokio::test]
async fn suppressing_any_member_of_a_shared_column_warns() {
    let catalog = CatalogSnapshot::new("postgres", None);
    let suppression = SuppressionList::from_entries(["billedCustomer: invoices.customer_id"]);

    let orders = [
        vec![invoice_customer(), statement_billed_customer()],
        vec![statement_billed_customer(), invoice_customer()],
    ];
    for records in orders {
        let report = audit(
            &catalog,
            records,
            CheckKind::Index,
            &suppression,
            Verbosity::default(),
        )
        .await;

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].status, Status::Warn);
        assert!(!report.entries[0].record.is_indexed);
        assert_eq!(report.summary.fail, 0);
    }
}

#[tokio::test]
async fn rerun_against_unchanged_schema_is_identical() {
    let catalog = CatalogSnapshot::new("postgres", None)
        .with_foreign_key("customers.id", "invoices.customer_id")
        .with_index("payments_invoice_id_idx", "payments", &["invoice_id"]);
    let records = vec![
        RelationshipRecord::new(
            "Payment",
            Relationship::belongs_to("invoice", "invoices.id", "payments.invoice_id")
                .expect("valid keys"),
        ),
        invoice_customer(),
        RelationshipRecord::new(
            "Customer",
            Relationship::has_many("invoices", "customers.id", "invoices.customer_id")
                .expect("valid keys"),
        ),
    ];
    let suppression = SuppressionList::new();

    for kind in CheckKind::ALL {
        let first = audit(&catalog, records.clone(), kind, &suppression, show_all()).await;
        let second = audit(&catalog, records.clone(), kind, &suppression, show_all()).await;
        assert_eq!(first, second);
    }

    let report = audit(&catalog, records, CheckKind::Constraint, &suppression, show_all()).await;
    let subjects: Vec<&str> = report.entries.iter().map(|e| e.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec![
            "customer: customers.id",
            "invoices: customers.id",
            "invoice: invoices.id"
        ]
    );
}

#[tokio::test]
async fn failed_queries_resolve_to_absent() {
    let report = audit(
        &UnreachableInspector,
        vec![invoice_customer()],
        CheckKind::Constraint,
        &SuppressionList::new(),
        Verbosity::default(),
    )
    .await;

    assert_eq!(report.entries[0].status, Status::Fail);
    assert!(matches!(
        &report.diagnostics[0],
        Diagnostic::SchemaQuery { subject, .. } if subject == "customer: customers.id"
    ));
}
