//! Integration tests for compiling document operations into requests

mod common;

use common::fixtures;
use curlsmith::openapi::{build_catalog, list_operations};
use curlsmith::request::{build_request, build_request_with, BuildOptions, FormValue, RequestBody};
use curlsmith::sample::SampleConfig;
use curlsmith::CurlsmithError;
use serde_json::{json, Map, Value};

fn params(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

// =============================================================================
// Operation listing
// =============================================================================

#[test]
fn test_list_operations_in_document_order() {
    let document = fixtures::document("petstore-v3.yaml");
    let listed: Vec<(String, Option<String>)> = list_operations(&document)
        .into_iter()
        .map(|op| (op.method, op.operation_id))
        .collect();

    let ids: Vec<&str> = listed.iter().filter_map(|(_, id)| id.as_deref()).collect();
    assert_eq!(ids, ["listPets", "addPet", "getPet", "deletePet", "uploadPhoto", "votePet", "exportPets"]);
    assert!(listed.iter().all(|(method, _)| method != "trace"));
}

// =============================================================================
// OpenAPI 3
// =============================================================================

#[test]
fn test_server_variables_and_query_params() {
    let document = fixtures::document("petstore-v3.yaml");
    let p = params(json!({"tag": ["a", "b"], "limit": 10, "X-Request-Id": "r1", "session": "s"}));
    let request = build_request(&document, "listPets", None, Some(&p)).unwrap();

    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "https://eu.petstore.example.com/v1/pets?tag=a&tag=b&limit=10");
    assert_eq!(request.headers.len(), 1);
    assert_eq!(request.headers.get("X-Request-Id").map(String::as_str), Some("r1"));
    assert!(request.body.is_none());
}

#[test]
fn test_json_body() {
    let document = fixtures::document("petstore-v3.yaml");
    let body = json!({"name": "doggie"});
    let request = build_request(&document, "addPet", Some(&body), None).unwrap();

    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "https://eu.petstore.example.com/v1/pets");
    assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some("application/json"));
    assert_eq!(request.body, Some(RequestBody::Json(body)));
}

#[test]
fn test_path_level_parameter() {
    let document = fixtures::document("petstore-v3.yaml");
    let request = build_request(&document, "deletePet", None, Some(&params(json!({"petId": 7})))).unwrap();
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.url, "https://eu.petstore.example.com/v1/pets/7");

    let err = build_request(&document, "deletePet", None, None).unwrap_err();
    assert!(matches!(err, CurlsmithError::MissingPathParameter { ref name, .. } if name == "petId"));
}

#[test]
fn test_urlencoded_preferred_over_unsupported() {
    let document = fixtures::document("petstore-v3.yaml");
    let body = json!({"score": 5, "comment": "good boy"});
    let request = build_request(&document, "votePet", Some(&body), Some(&params(json!({"petId": 1})))).unwrap();

    assert_eq!(
        request.headers.get("Content-Type").map(String::as_str),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(request.body, Some(RequestBody::Text("score=5&comment=good%20boy".to_string())));
}

#[test]
fn test_unsupported_only_body_is_omitted() {
    let document = fixtures::document("petstore-v3.yaml");
    let request = build_request(&document, "exportPets", Some(&json!({"a": 1})), None).unwrap();
    assert!(request.headers.is_empty());
    assert!(request.body.is_none());
}

#[test]
fn test_base_url_override() {
    let document = fixtures::document("petstore-v3.yaml");
    let options = BuildOptions { base_url: Some("http://localhost:8080".to_string()), ..Default::default() };
    let request = build_request_with(&document, "getPet", None, Some(&params(json!({"petId": "x y"}))), &options).unwrap();
    assert_eq!(request.url, "http://localhost:8080/pets/x%20y");
}

// =============================================================================
// Swagger 2
// =============================================================================

#[test]
fn test_swagger_body_parameter() {
    let document = fixtures::document("swagger-v2.json");
    let body = json!({"name": "ada", "age": 36});
    let request = build_request(&document, "createUser", Some(&body), None).unwrap();

    assert_eq!(request.url, "https://legacy.example.com/api/users");
    assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some("application/json"));
    assert_eq!(request.body, Some(RequestBody::Json(body)));
}

#[test]
fn test_swagger_form_data_and_csv_query() {
    let document = fixtures::document("swagger-v2.json");
    let p = params(json!({"id": "u1", "scopes": ["read", "write"]}));
    let request = build_request(&document, "login", Some(&json!({"password": "s3cret"})), Some(&p)).unwrap();

    assert_eq!(request.url, "https://legacy.example.com/api/users/u1/login?scopes=read,write");
    assert_eq!(request.body, Some(RequestBody::Text("password=s3cret".to_string())));
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_catalog_compiles_every_identified_operation() {
    let document = fixtures::document("petstore-v3.yaml");
    let catalog = build_catalog(&document, &SampleConfig::default());

    assert_eq!(catalog.len(), 7);
    assert!(catalog.iter().all(|item| item.request.is_some()));

    let get_pet = catalog.iter().find(|item| item.operation_id == "getPet").unwrap();
    assert_eq!(get_pet.request.as_ref().unwrap().url, "https://eu.petstore.example.com/v1/pets/7");
}

#[test]
fn test_catalog_multipart_form() {
    let document = fixtures::document("petstore-v3.yaml");
    let catalog = build_catalog(&document, &SampleConfig::default());
    let upload = catalog.iter().find(|item| item.operation_id == "uploadPhoto").unwrap();
    let request = upload.request.as_ref().unwrap();

    assert!(request.is_multipart());
    match &request.body {
        Some(RequestBody::Form(fields)) => {
            assert_eq!(fields.get("caption"), Some(&FormValue::Value(json!("sleepy"))));
        }
        other => panic!("expected form body, got {other:?}"),
    }
}

#[test]
fn test_catalog_json_sample_and_schema() {
    let document = fixtures::document("run-input.json");
    let catalog = build_catalog(&document, &SampleConfig::default());
    let run = catalog.iter().find(|item| item.operation_id == "run_run_post").unwrap();

    let request = run.request.as_ref().unwrap();
    assert_eq!(request.url, "/run");
    match &request.body {
        Some(RequestBody::Json(body)) => assert_eq!(body["num_return_sequences"], json!(1)),
        other => panic!("expected json body, got {other:?}"),
    }
    assert_eq!(run.schema.as_ref().unwrap()["title"], json!("RunInput"));
}
