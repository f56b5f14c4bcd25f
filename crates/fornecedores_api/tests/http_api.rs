use fornecedores_api::{build_router, AppState, ServerConfig};
use fornecedores_core::db::schema::setup;
use fornecedores_core::{Datastore, DbOptions};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestServer {
    base_url: String,
    client: Client,
    db_path: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn spawn_server() -> TestServer {
    spawn_server_with(|_| ServerConfig::default(), true, DbOptions::default()).await
}

async fn spawn_server_with(
    configure: impl FnOnce(&TempDir) -> ServerConfig,
    run_setup: bool,
    db_options: DbOptions,
) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("http.sqlite");
    let datastore = Datastore::new(&db_path, db_options);
    if run_setup {
        setup(&datastore).await.unwrap();
    }

    let config = configure(&dir);
    let router = build_router(AppState::new(datastore), &config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        client: Client::new(),
        db_path,
        _dir: dir,
    }
}

fn acme() -> Value {
    json!({
        "nome": "Acme",
        "email": "a@acme.com",
        "telefone": "(11) 1234-5678",
        "endereco": "Rua A, 1",
        "cnpj": "00.000.000/0001-00"
    })
}

async fn post_json(server: &TestServer, path: &str, body: &Value) -> (StatusCode, Value) {
    let response = server
        .client
        .post(server.url(path))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn create_get_update_delete_lifecycle() {
    let server = spawn_server().await;

    let (status, created) = post_json(&server, "/fornecedores", &acme()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["nome"], "Acme");
    assert_eq!(created["ativo"], 1);
    assert!(created["created_at"].as_str().unwrap().ends_with('Z'));

    let fetched: Value = server
        .client
        .get(server.url("/fornecedores/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let response = server
        .client
        .put(server.url("/fornecedores/1"))
        .json(&json!({ "nome": "Acme Co", "email": "a@acme.com", "ativo": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["nome"], "Acme Co");
    assert_eq!(updated["ativo"], 0);
    assert_eq!(updated["telefone"], Value::Null);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_ne!(updated["updated_at"], created["updated_at"]);

    let response = server
        .client
        .delete(server.url("/fornecedores/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Fornecedor removido com sucesso");

    let response = server
        .client
        .get(server.url("/fornecedores/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Fornecedor não encontrado");
}

#[tokio::test]
async fn duplicate_email_and_tax_id_are_rejected() {
    let server = spawn_server().await;
    post_json(&server, "/fornecedores", &acme()).await;

    let (status, body) = post_json(
        &server,
        "/fornecedores",
        &json!({ "nome": "Other", "email": "a@acme.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email já está em uso");

    let (status, body) = post_json(
        &server,
        "/fornecedores",
        &json!({ "nome": "Other", "email": "o@other.com", "cnpj": "00.000.000/0001-00" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CNPJ já está em uso");
}

#[tokio::test]
async fn missing_required_fields_are_rejected() {
    let server = spawn_server().await;

    let (status, body) =
        post_json(&server, "/fornecedores", &json!({ "nome": "Only name" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nome e email são obrigatórios");

    let response = server
        .client
        .put(server.url("/fornecedores/1"))
        .json(&json!({ "nome": "  ", "email": "x@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let server = spawn_server().await;

    let response = server
        .client
        .post(server.url("/fornecedores"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Corpo da requisição inválido");
}

#[tokio::test]
async fn unknown_and_non_integer_ids_are_not_found() {
    let server = spawn_server().await;

    for path in ["/fornecedores/999", "/fornecedores/abc"] {
        let response = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {path}");
    }

    let response = server
        .client
        .put(server.url("/fornecedores/999"))
        .json(&json!({ "nome": "Ghost", "email": "ghost@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .client
        .delete(server.url("/fornecedores/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seed_and_reset_drive_the_listing() {
    let server = spawn_server().await;
    post_json(&server, "/fornecedores", &acme()).await;

    let (status, body) = post_json(&server, "/seed-database", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dados de teste inseridos com sucesso");
    assert_eq!(body["count"], 3);

    let listed: Vec<Value> = server
        .client
        .get(server.url("/fornecedores"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|supplier| supplier["email"] != "a@acme.com"));

    let (status, body) = post_json(&server, "/reset-database", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Database resetado com sucesso");

    let listed: Vec<Value> = server
        .client
        .get(server.url("/fornecedores"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn api_prefix_serves_the_same_routes() {
    let server = spawn_server().await;

    let (status, created) = post_json(&server, "/api/fornecedores", &acme()).await;
    assert_eq!(status, StatusCode::CREATED);

    let fetched: Value = server
        .client
        .get(server.url(&format!("/fornecedores/{}", created["id"])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let (status, body) = post_json(&server, "/api/seed-database", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn rows_are_visible_to_direct_database_readers() {
    let server = spawn_server().await;
    post_json(&server, "/fornecedores", &acme()).await;

    let conn = rusqlite::Connection::open(&server.db_path).unwrap();
    let (nome, ativo): (String, i64) = conn
        .query_row(
            "SELECT nome, ativo FROM fornecedores WHERE email = ?1",
            ["a@acme.com"],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(nome, "Acme");
    assert_eq!(ativo, 1);
}

#[tokio::test]
async fn storage_failure_returns_generic_error() {
    // No setup: the table does not exist.
    let server = spawn_server_with(|_| ServerConfig::default(), false, DbOptions::default()).await;

    let response = server
        .client
        .get(server.url("/fornecedores"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Erro interno do servidor");
}

#[tokio::test]
async fn create_whose_row_vanishes_before_refetch_is_a_server_error() {
    let server = spawn_server().await;
    let conn = rusqlite::Connection::open(&server.db_path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER drop_new_supplier AFTER INSERT ON fornecedores
         BEGIN
             DELETE FROM fornecedores WHERE id = NEW.id;
         END;",
    )
    .unwrap();
    drop(conn);

    let (status, body) = post_json(
        &server,
        "/fornecedores",
        &json!({ "nome": "A", "email": "a@a.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erro interno do servidor");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn write_blocked_past_busy_timeout_is_a_server_error() {
    let server = spawn_server_with(
        |_| ServerConfig::default(),
        true,
        DbOptions {
            busy_timeout: Duration::from_millis(200),
        },
    )
    .await;
    let holder = rusqlite::Connection::open(&server.db_path).unwrap();
    holder.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let (status, body) = post_json(&server, "/fornecedores", &acme()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erro interno do servidor");

    holder.execute_batch("ROLLBACK;").unwrap();
    let (status, _) = post_json(&server, "/fornecedores", &acme()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn static_files_are_served_when_no_route_matches() {
    let server = spawn_server_with(
        |dir| {
            let public = dir.path().join("public");
            std::fs::create_dir_all(&public).unwrap();
            std::fs::write(public.join("index.html"), "<h1>Fornecedores</h1>").unwrap();
            ServerConfig {
                public_dir: Some(public),
                ..ServerConfig::default()
            }
        },
        true,
        DbOptions::default(),
    )
    .await;

    let response = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Fornecedores"));

    let response = server
        .client
        .get(server.url("/fornecedores"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn cors_headers_allow_any_origin() {
    let server = spawn_server().await;

    let response = server
        .client
        .get(server.url("/fornecedores"))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}
