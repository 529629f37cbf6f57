//! Integration test: validate descriptor files on disk the way
//! `specgate validate` does.

use std::path::{Path, PathBuf};

use specgate_catalog::GateConfig;
use specgate_cli::validate::{build_report, run_validate, Outcome, ReportFormat, ValidateArgs};

const CATALOG: &str = r#"
apiVersion: backstage.io/v1alpha1
kind: Component
metadata:
  name: orders-service
spec:
  type: service
---
apiVersion: backstage.io/v1alpha1
kind: API
metadata:
  name: orders-api
spec:
  type: openapi
  definition:
    $text: ./specs/orders.yaml
---
apiVersion: backstage.io/v1alpha1
kind: API
metadata:
  name: broken-api
spec:
  type: openapi
  definition: |
    {"openapi": "3.0.0", "paths": {}}
---
apiVersion: backstage.io/v1alpha1
kind: API
metadata:
  name: events-api
spec:
  type: asyncapi
  definition: |
    asyncapi: 2.6.0
    info:
      title: Events
      version: 1.0.0
    channels:
      order/created:
        subscribe:
          operationId: onOrderCreated
---
apiVersion: backstage.io/v1alpha1
kind: API
metadata:
  name: search-api
spec:
  type: graphql
  definition: "type Query { search: [String] }"
"#;

const ORDERS_SPEC: &str = r#"
openapi: 3.0.3
info:
  title: Orders
  version: 1.0.0
paths:
  /orders/{orderId}:
    get:
      operationId: getOrder
      parameters:
        - name: orderId
          in: path
          required: true
          schema:
            type: string
      responses:
        "200":
          description: The order
"#;

fn write_catalog(dir: &Path) -> PathBuf {
    std::fs::create_dir_all(dir.join("specs")).unwrap();
    std::fs::write(dir.join("specs/orders.yaml"), ORDERS_SPEC).unwrap();
    let path = dir.join("catalog-info.yaml");
    std::fs::write(&path, CATALOG).unwrap();
    path
}

#[test]
fn test_report_classifies_each_entity() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_catalog(dir.path());

    let report = build_report(&[path], &GateConfig::default()).unwrap();
    let outcomes: Vec<(&str, Outcome)> = report
        .entities
        .iter()
        .map(|e| (e.name.as_str(), e.outcome))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("orders-service", Outcome::Skip),
            ("orders-api", Outcome::Pass),
            ("broken-api", Outcome::Fail),
            ("events-api", Outcome::Pass),
            ("search-api", Outcome::Skip),
        ]
    );
    assert_eq!((report.passed, report.failed, report.skipped), (2, 1, 2));
    assert_eq!(report.exit_code(), 1);

    let broken = &report.entities[2];
    assert!(broken
        .error
        .as_deref()
        .unwrap()
        .contains("Validation failed for OPENAPI spec in API 'broken-api'"));
    assert_eq!(broken.violations.len(), 1);
    assert_eq!(broken.violations[0].code, "oas3-schema");
}

#[test]
fn test_reject_policy_fails_unknown_dialects() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_catalog(dir.path());
    let config = GateConfig::from_yaml_str("unknown_dialect: reject\n").unwrap();

    let report = build_report(&[path], &config).unwrap();
    let search = report.entities.iter().find(|e| e.name == "search-api").unwrap();
    assert_eq!(search.outcome, Outcome::Fail);
    assert!(search.error.as_deref().unwrap().contains("graphql"));
}

#[test]
fn test_overrides_can_make_advisory_rules_block() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_catalog(dir.path());
    let config = GateConfig::from_yaml_str("rules:\n  operation-tags: error\n").unwrap();

    let report = build_report(&[path], &config).unwrap();
    let orders = report.entities.iter().find(|e| e.name == "orders-api").unwrap();
    assert_eq!(orders.outcome, Outcome::Fail);
    assert!(orders.violations.iter().all(|v| v.code == "operation-tags"));
}

#[test]
fn test_run_validate_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let clean = dir.path().join("clean.yaml");
    std::fs::write(
        &clean,
        "kind: API\nmetadata:\n  name: ok\nspec:\n  type: openapi\n  definition: '{\"openapi\":\"3.0.0\",\"info\":{\"title\":\"t\",\"version\":\"1\"},\"paths\":{}}'\n",
    )
    .unwrap();
    let args = ValidateArgs { paths: vec![clean], format: ReportFormat::Json };
    assert_eq!(run_validate(&args, &GateConfig::default()).unwrap(), 0);

    let failing = write_catalog(dir.path());
    let args = ValidateArgs { paths: vec![failing], format: ReportFormat::Text };
    assert_eq!(run_validate(&args, &GateConfig::default()).unwrap(), 1);
}

#[test]
fn test_missing_descriptor_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    let err = build_report(&[missing], &GateConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("nope.yaml"));
}
