//! Integration test: the validate contract end to end, driven through the
//! catalog processor the way the ingestion pipeline calls it.

use std::sync::{Arc, OnceLock};

use proptest::prelude::*;
use serde_json::json;

use specgate_catalog::{
    register_validator_module, DiscardEmitter, GateConfig, LocationSpec, MemoryProcessorCache,
    ProcessorRegistry, SpecValidator,
};
use specgate_core::{Entity, GateError, LogLevel, MemoryLogSink};
use specgate_schema::RulesetBundle;

const VALID_OPENAPI: &str =
    r#"{"openapi":"3.0.0","info":{"title":"Test API","version":"1.0.0"},"paths":{}}"#;
const OPENAPI_WITHOUT_INFO: &str = r#"{"openapi":"3.0.0","paths":{}}"#;
const VALID_ASYNCAPI: &str =
    r#"{"asyncapi":"2.0.0","info":{"title":"Test API","version":"1.0.0"},"channels":{}}"#;
const ASYNCAPI_WITHOUT_INFO: &str = r#"{"asyncapi":"2.0.0","channels":{}}"#;

fn validator() -> &'static SpecValidator {
    static VALIDATOR: OnceLock<SpecValidator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        SpecValidator::new(Arc::new(RulesetBundle::new().expect("bundled rulesets build")))
    })
}

fn api(name: &str, spec_type: &str, definition: &str) -> Entity {
    Entity::new("API", name)
        .with_spec_field("type", spec_type)
        .with_spec_field("definition", definition)
}

#[tokio::test]
async fn test_non_api_entity_passes_through_silently() {
    let log = MemoryLogSink::new();
    let entity = Entity::new("Component", "test-component").with_spec_field("type", "service");
    let result = validator().validate(entity.clone(), &log).await.unwrap();
    assert_eq!(result, entity);
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_api_without_type_or_definition_passes_through_silently() {
    let log = MemoryLogSink::new();
    let mut bare = Entity::new("API", "test-api");
    bare.spec = Some(serde_json::Map::new());
    let cases = [
        bare,
        Entity::new("API", "no-spec"),
        Entity::new("API", "type-only").with_spec_field("type", "openapi"),
        Entity::new("API", "definition-only").with_spec_field("definition", VALID_OPENAPI),
        api("empty-definition", "openapi", ""),
        Entity::new("API", "non-string")
            .with_spec_field("type", "openapi")
            .with_spec_field("definition", json!({"openapi": "3.0.0"})),
    ];
    for entity in cases {
        let result = validator().validate(entity.clone(), &log).await.unwrap();
        assert_eq!(result, entity);
    }
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_valid_openapi_logs_success() {
    let log = MemoryLogSink::new();
    let entity = api("test-api", "openapi", VALID_OPENAPI);
    let result = validator().validate(entity.clone(), &log).await.unwrap();
    assert_eq!(result, entity);
    assert_eq!(log.len(), 1);
    assert_eq!(
        log.messages(LogLevel::Info),
        vec!["Successfully validated OPENAPI spec for API: test-api".to_string()]
    );
}

#[tokio::test]
async fn test_valid_asyncapi_logs_success() {
    let log = MemoryLogSink::new();
    let entity = api("test-async-api", "asyncapi", VALID_ASYNCAPI);
    let result = validator().validate(entity.clone(), &log).await.unwrap();
    assert_eq!(result, entity);
    assert_eq!(
        log.messages(LogLevel::Info),
        vec!["Successfully validated ASYNCAPI spec for API: test-async-api".to_string()]
    );
}

#[tokio::test]
async fn test_openapi_missing_info_is_rejected() {
    let log = MemoryLogSink::new();
    let err = validator()
        .validate(api("test-api", "openapi", OPENAPI_WITHOUT_INFO), &log)
        .await
        .unwrap_err();

    assert!(err.is_spec_validation());
    let message = err.to_string();
    assert!(message.contains("Validation failed for OPENAPI spec in API 'test-api'"), "{message}");
    assert!(message.contains("OpenAPI validation errors in test-api: (root): "), "{message}");

    let errors = log.messages(LogLevel::Error);
    assert_eq!(log.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("test-api"));
}

#[tokio::test]
async fn test_asyncapi_missing_info_is_rejected() {
    let log = MemoryLogSink::new();
    let err = validator()
        .validate(api("invalid-async-api", "asyncapi", ASYNCAPI_WITHOUT_INFO), &log)
        .await
        .unwrap_err();

    let GateError::SpecValidation(inner) = &err else {
        panic!("expected a spec validation error, got {err:?}");
    };
    assert_eq!(inner.entity_name, "invalid-async-api");
    assert!(inner.violations.iter().all(|f| f.severity.is_blocking()));
    assert!(err
        .to_string()
        .contains("Validation failed for ASYNCAPI spec in API 'invalid-async-api'"));
    assert_eq!(log.messages(LogLevel::Error).len(), 1);
}

#[tokio::test]
async fn test_yaml_definition_is_decoded() {
    let log = MemoryLogSink::new();
    let yaml = "\nopenapi: \"3.0.0\"\ninfo:\n  title: \"Test API\"\n  version: \"1.0.0\"\npaths: {}\n      ";
    let entity = api("yaml-api", "openapi", yaml);
    assert_eq!(validator().validate(entity.clone(), &log).await.unwrap(), entity);
    assert_eq!(
        log.messages(LogLevel::Info),
        vec!["Successfully validated OPENAPI spec for API: yaml-api".to_string()]
    );
}

#[tokio::test]
async fn test_yaml_with_null_and_complex_keys_is_decoded() {
    let log = MemoryLogSink::new();
    let yaml = "openapi: 3.0.0\ninfo:\n  title: t\n  version: '1'\npaths: {}\nx-meta:\n  ~: nothing\n  ? [a, b]\n  : pair\n";
    let entity = api("odd-keys", "openapi", yaml);
    assert_eq!(validator().validate(entity.clone(), &log).await.unwrap(), entity);
    assert!(log.messages(LogLevel::Error).is_empty());
}

#[tokio::test]
async fn test_undecodable_definition_is_a_parse_error() {
    let log = MemoryLogSink::new();
    let err = validator()
        .validate(api("broken-api", "openapi", "invalid-json-and-yaml: ["), &log)
        .await
        .unwrap_err();

    assert!(err.is_parse());
    let message = err.to_string();
    assert!(message.contains("Failed to parse API definition as JSON or YAML"), "{message}");
    assert!(message.contains("JSON attempt"), "{message}");
    let errors = log.messages(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("broken-api"));
}

#[tokio::test]
async fn test_unknown_dialect_passes_through_without_parsing() {
    let log = MemoryLogSink::new();
    let entity = api("graph", "graphql", "invalid-json-and-yaml: [");
    assert_eq!(validator().validate(entity.clone(), &log).await.unwrap(), entity);

    let upper = api("upper", "OpenAPI", OPENAPI_WITHOUT_INFO);
    assert_eq!(validator().validate(upper.clone(), &log).await.unwrap(), upper);
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_missing_name_is_reported_as_unknown() {
    let log = MemoryLogSink::new();
    let err = validator()
        .validate(api("", "openapi", OPENAPI_WITHOUT_INFO), &log)
        .await
        .unwrap_err();
    assert_eq!(err.entity_name(), Some("unknown"));
    assert!(log.messages(LogLevel::Error)[0].contains("'unknown'"));
}

#[tokio::test]
async fn test_warnings_do_not_block() {
    let log = MemoryLogSink::new();
    // Missing operationId, tags, contact and description are all advisory.
    let definition = json!({
        "openapi": "3.0.0",
        "info": {"title": "t", "version": "1"},
        "paths": {"/users": {"get": {"responses": {"200": {"description": "ok"}}}}}
    })
    .to_string();
    let entity = api("advisory", "openapi", &definition);
    assert_eq!(validator().validate(entity.clone(), &log).await.unwrap(), entity);
    assert!(log.messages(LogLevel::Error).is_empty());
}

#[tokio::test]
async fn test_concurrent_validations_share_one_bundle() {
    let bundle = Arc::new(RulesetBundle::new().unwrap());
    let validator = Arc::new(SpecValidator::new(bundle));
    let log = Arc::new(MemoryLogSink::new());

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..32 {
        let validator = Arc::clone(&validator);
        let log = Arc::clone(&log);
        tasks.spawn(async move {
            let (spec_type, definition) = if i % 2 == 0 {
                ("openapi", VALID_OPENAPI)
            } else {
                ("asyncapi", ASYNCAPI_WITHOUT_INFO)
            };
            let entity = api(&format!("api-{i}"), spec_type, definition);
            validator.validate(entity, log.as_ref()).await.is_ok()
        });
    }

    let mut passed = 0;
    while let Some(joined) = tasks.join_next().await {
        if joined.unwrap() {
            passed += 1;
        }
    }
    assert_eq!(passed, 16);
    assert_eq!(log.len(), 32);
    assert_eq!(log.messages(LogLevel::Error).len(), 16);
}

#[tokio::test]
async fn test_registered_module_gates_pipeline() {
    let log = Arc::new(MemoryLogSink::new());
    let mut registry = ProcessorRegistry::new();
    let config = GateConfig::from_yaml_str("unknown_dialect: reject\n").unwrap();
    register_validator_module(&mut registry, log.clone(), &config).unwrap();
    log.clear();

    let location = LocationSpec::file("catalog-info.yaml");
    let cache = MemoryProcessorCache::new();

    let ok = registry
        .pre_process(
            api("test-api", "openapi", VALID_OPENAPI),
            &location,
            &DiscardEmitter,
            &location,
            &cache,
        )
        .await;
    assert!(ok.is_ok());

    let rejected = registry
        .pre_process(
            api("grpc-api", "grpc", "syntax = \"proto3\";"),
            &location,
            &DiscardEmitter,
            &location,
            &cache,
        )
        .await
        .unwrap_err();
    assert!(rejected.is_input_error());
    assert_eq!(log.len(), 2);
}

fn arb_kind() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,12}".prop_filter("must not be the gate kind", |k| k != "API")
}

proptest! {
    /// Any entity whose kind is not `API` comes back unchanged with no log
    /// record, whatever its spec holds.
    #[test]
    fn non_api_entities_pass_through(
        kind in arb_kind(),
        name in "[a-z0-9-]{0,16}",
        spec_type in prop::option::of("[a-z]{0,10}"),
        definition in prop::option::of(".{0,64}"),
    ) {
        let mut entity = Entity::new(kind, name);
        if let Some(t) = spec_type {
            entity = entity.with_spec_field("type", t);
        }
        if let Some(d) = definition {
            entity = entity.with_spec_field("definition", d);
        }

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let log = MemoryLogSink::new();
        let result = runtime.block_on(validator().validate(entity.clone(), &log));
        prop_assert_eq!(result.unwrap(), entity);
        prop_assert!(log.is_empty());
    }
}
