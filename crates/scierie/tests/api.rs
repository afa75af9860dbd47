//! End-to-end tests of the HTTP API against a file-backed database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use scierie::api::{build_router, AppState};
use scierie::{Config, Storage};

struct TestApp {
    router: Router,
    _dir: tempfile::TempDir,
}

fn test_app(require_auth: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.storage.database_path = Some(dir.path().join("scierie.db"));
    config.server.require_auth = require_auth;
    config.auth.jwt_secret = "integration-secret".to_string();

    let storage = Storage::open(config.database_path()).unwrap();
    TestApp {
        router: build_router(AppState::new(storage, config)),
        _dir: dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let body = match body {
        Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn api(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = send(router, request(method, uri, body)).await;
    let status = response.status();
    (status, body_json(response).await)
}

fn approx(value: &Value, expected: f64) -> bool {
    value
        .as_f64()
        .is_some_and(|v| (v - expected).abs() < 1e-6)
}

async fn register(router: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    api(
        router,
        "POST",
        "/api/auth/register",
        Some(json!({ "name": "Amani", "email": email, "password": password })),
    )
    .await
}

/// Log in and return the session token taken from the cookie.
async fn login_token(router: &Router, email: &str, password: &str) -> String {
    let response = send(
        router,
        request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("token="))
        .unwrap()
        .to_string()
}

// =====================================================================
// System
// =====================================================================

#[tokio::test]
async fn health_and_version() {
    let app = test_app(false);

    let (status, body) = api(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = api(&app.router, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "scierie");
}

// =====================================================================
// Auth
// =====================================================================

#[tokio::test]
async fn register_then_login() {
    let app = test_app(false);

    let (status, body) = register(&app.router, "amani@example.com", "bois-dur").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "amani@example.com");
    assert_eq!(body["user"]["role"], "EMPLOYEE");
    assert!(body["user"].get("passwordHash").is_none());

    let token = login_token(&app.router, "amani@example.com", "bois-dur").await;
    assert!(!token.is_empty());

    let me = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, format!("token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, me).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["name"], "Amani");
}

#[tokio::test]
async fn register_rejects_duplicates_and_missing_fields() {
    let app = test_app(false);

    let (status, _) = register(&app.router, "dup@example.com", "x1").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = register(&app.router, "dup@example.com", "x2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("existe déjà"));

    let (status, body) = api(
        &app.router,
        "POST",
        "/api/auth/register",
        Some(json!({ "name": "", "email": "a@b.c", "password": "p" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Veuillez remplir tous les champs obligatoires.");

    let (status, _) = api(
        &app.router,
        "POST",
        "/api/auth/register",
        Some(json!({ "name": "B", "email": "b@b.c", "password": "p", "role": "boss" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures() {
    let app = test_app(false);
    register(&app.router, "kito@example.com", "right").await;

    let (status, body) = api(
        &app.router,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "kito@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Mot de passe incorrect");

    let (status, body) = api(
        &app.router,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "nobody@example.com", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Utilisateur introuvable");

    let (status, _) = api(&app.router, "GET", "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_guard_when_required() {
    let app = test_app(true);

    let (status, body) = api(&app.router, "GET", "/stock/api", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = api(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    register(&app.router, "chef@example.com", "scie").await;
    let token = login_token(&app.router, "chef@example.com", "scie").await;

    let authorized = Request::builder()
        .uri("/stock/api")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app.router, authorized).await.status(), StatusCode::OK);

    let tampered = Request::builder()
        .uri("/stock/api")
        .header(header::AUTHORIZATION, format!("Bearer {token}x"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        send(&app.router, tampered).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

// =====================================================================
// Stock and sales
// =====================================================================

#[tokio::test]
async fn stock_upsert_by_type() {
    let app = test_app(false);

    let (status, first) = api(
        &app.router,
        "POST",
        "/stock/api",
        Some(json!({ "type": "Acajou", "quantity": 10, "unitPrice": "100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&first["total"], 1000.0));

    let (_, second) = api(
        &app.router,
        "POST",
        "/stock/api",
        Some(json!({ "type": "Acajou", "quantity": 12, "unitPrice": 110 })),
    )
    .await;
    assert_eq!(second["id"], first["id"]);
    assert!(approx(&second["total"], 1320.0));

    let (_, list) = api(&app.router, "GET", "/stock/api", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, body) = api(
        &app.router,
        "POST",
        "/stock/api",
        Some(json!({ "type": "Acajou", "quantity": 0, "unitPrice": 110 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Champs manquants");
}

#[tokio::test]
async fn stock_update_and_delete() {
    let app = test_app(false);
    let (_, item) = api(
        &app.router,
        "POST",
        "/stock/api",
        Some(json!({ "type": "Iroko", "quantity": 5, "unitPrice": 20 })),
    )
    .await;
    let id = item["id"].as_i64().unwrap();

    let (status, updated) = api(
        &app.router,
        "PUT",
        "/stock/api",
        Some(json!({ "id": id, "type": "Iroko", "quantity": 7, "unitPrice": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&updated["total"], 140.0));

    // Clients that serialize every number as a float send ids like `3.0`.
    #[allow(clippy::cast_precision_loss)]
    let float_id = id as f64;
    let (status, updated) = api(
        &app.router,
        "PUT",
        "/stock/api",
        Some(json!({ "id": float_id, "type": "Iroko", "quantity": 8, "unitPrice": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"].as_i64(), Some(id));
    assert!(approx(&updated["total"], 160.0));

    let (status, _) = api(
        &app.router,
        "PUT",
        "/stock/api",
        Some(json!({ "id": 9999, "type": "Iroko", "quantity": 7, "unitPrice": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = api(&app.router, "DELETE", "/stock/api", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ID manquant");

    let (status, body) = api(&app.router, "DELETE", &format!("/stock/api?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted"]["type"], "Iroko");
}

#[tokio::test]
async fn sale_decrements_stock_floored_at_zero() {
    let app = test_app(false);
    api(
        &app.router,
        "POST",
        "/stock/api",
        Some(json!({ "type": "Acajou", "quantity": 10, "unitPrice": 100 })),
    )
    .await;

    let (status, body) = api(
        &app.router,
        "POST",
        "/sales/api",
        Some(json!({ "type": "Acajou", "quantity": 4, "unitPrice": 150, "unite": "m3" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(approx(&body["vente"]["total"], 600.0));
    assert_eq!(body["vente"]["unite"], "m3");

    let (_, stock) = api(&app.router, "GET", "/stock/api", None).await;
    assert!(approx(&stock[0]["quantity"], 6.0));
    assert!(approx(&stock[0]["total"], 600.0));

    api(
        &app.router,
        "POST",
        "/sales/api",
        Some(json!({ "type": "Acajou", "quantity": 20, "unitPrice": 150 })),
    )
    .await;
    let (_, stock) = api(&app.router, "GET", "/stock/api", None).await;
    assert!(approx(&stock[0]["quantity"], 0.0));
    assert!(approx(&stock[0]["total"], 0.0));

    let (_, sales) = api(&app.router, "GET", "/sales/api", None).await;
    assert_eq!(sales.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sale_without_stock_is_recorded() {
    let app = test_app(false);

    let (status, _) = api(
        &app.router,
        "POST",
        "/sales/api",
        Some(json!({ "type": "Sapelli", "quantity": 1, "unitPrice": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, stock) = api(&app.router, "GET", "/stock/api", None).await;
    assert!(stock.as_array().unwrap().is_empty());

    let (status, body) = api(
        &app.router,
        "POST",
        "/sales/api",
        Some(json!({ "type": "Sapelli", "quantity": "beaucoup", "unitPrice": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// =====================================================================
// Profit
// =====================================================================

#[tokio::test]
async fn profit_is_production_minus_charges_and_expenses() {
    let app = test_app(false);

    let (status, production) = api(
        &app.router,
        "POST",
        "/productions/api",
        Some(json!({ "typeBois": "Acajou", "quantity": 10, "unitPrice": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(approx(&production["total"], 10_000.0));

    let (status, _) = api(
        &app.router,
        "POST",
        "/charges/api",
        Some(json!({
            "date": "2025-01-10",
            "fournisseur": "Grumes Kasai",
            "quantite": 2,
            "poids": 100,
            "prix": 3000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, expense) = api(
        &app.router,
        "POST",
        "/expenses/api",
        Some(json!({ "date": "2025-01-11", "categorie": "Carburant", "montant": "500" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = api(&app.router, "GET", "/benefice/api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["benefice"], 6_500.0));

    let id = expense["id"].as_i64().unwrap();
    let (status, _) = api(&app.router, "DELETE", &format!("/expenses/api?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = api(&app.router, "GET", "/benefice/api/summary", None).await;
    assert!(approx(&summary["beneficeNet"], 7_000.0));
    assert!(approx(&summary["totalProduction"], 10_000.0));
    assert!(approx(&summary["totalCharges"], 3_000.0));

    let (_, history) = api(&app.router, "GET", "/benefice/api/history", None).await;
    assert!(!history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn profit_summary_reads_stored_row() {
    let app = test_app(false);

    let (status, summary) = api(&app.router, "GET", "/benefice/api/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&summary["beneficeNet"], 0.0));
    assert!(summary["updatedAt"].is_string());

    // No GET /benefice/api in between: the mutation itself updates the row.
    let (status, _) = api(
        &app.router,
        "POST",
        "/productions/api",
        Some(json!({ "typeBois": "Iroko", "quantity": 4, "unitPrice": 250 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, summary) = api(&app.router, "GET", "/benefice/api/summary", None).await;
    assert!(approx(&summary["totalProduction"], 1_000.0));
    assert!(approx(&summary["beneficeNet"], 1_000.0));
}

#[tokio::test]
async fn charge_patch_keeps_other_fields() {
    let app = test_app(false);
    let (_, charge) = api(
        &app.router,
        "POST",
        "/charges/api",
        Some(json!({
            "date": "2025-02-01",
            "fournisseur": "Scierie Lukaya",
            "quantite": 3,
            "poids": 40,
            "prix": 900
        })),
    )
    .await;
    let id = charge["id"].as_i64().unwrap();

    let (status, updated) = api(
        &app.router,
        "PUT",
        "/charges/api",
        Some(json!({ "id": id, "prix": 1200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&updated["prix"], 1200.0));
    assert_eq!(updated["fournisseur"], "Scierie Lukaya");

    let (_, body) = api(&app.router, "GET", "/benefice/api", None).await;
    assert!(approx(&body["benefice"], -1200.0));

    let (status, body) = api(&app.router, "DELETE", &format!("/charges/api?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn production_validation_messages() {
    let app = test_app(false);

    let (status, body) = api(
        &app.router,
        "POST",
        "/productions/api",
        Some(json!({ "typeBois": "Acajou", "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Champs manquants : typeBois, quantity ou unitPrice");

    let (status, body) = api(&app.router, "DELETE", "/productions/api", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ID manquant pour la suppression");

    let (status, _) = api(&app.router, "DELETE", "/productions/api?id=404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =====================================================================
// Invoices
// =====================================================================

#[tokio::test]
async fn invoice_lifecycle_and_pdf() {
    let app = test_app(false);

    let (status, invoice) = api(
        &app.router,
        "POST",
        "/invoices/api",
        Some(json!({
            "clientNom": "Menuiserie Mbala",
            "clientTelephone": "+243 810 000 000",
            "typeDeProduit": "Planche acajou",
            "quantity": "10",
            "price": 1500
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(invoice["numeroFacture"].as_str().unwrap().starts_with("FAC-"));
    assert!(approx(&invoice["total"], 15_000.0));
    assert_eq!(invoice["modePaiement"], "Espèces");
    assert_eq!(invoice["statut"], "En attente");
    let id = invoice["id"].as_i64().unwrap();

    let response = send(
        &app.router,
        request("GET", &format!("/invoices/api/pdf/{id}"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("inline; filename=facture-FAC-"));
    let bytes = axum::body::to_bytes(response.into_body(), 10 * 1024 * 1024)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF-"));

    let (status, body) = api(&app.router, "GET", "/invoices/api/pdf/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Facture introuvable");

    let (status, updated) = api(
        &app.router,
        "PUT",
        "/invoices/api",
        Some(json!({ "id": id, "statut": "Payée" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["statut"], "Payée");
    assert_eq!(updated["numeroFacture"], invoice["numeroFacture"]);

    let (status, _) = api(&app.router, "DELETE", &format!("/invoices/api?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = api(&app.router, "GET", "/invoices/api", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invoice_with_several_products() {
    let app = test_app(false);

    let (status, invoice) = api(
        &app.router,
        "POST",
        "/invoices/api",
        Some(json!({
            "clientNom": "Chantier Gombe",
            "clientTelephone": "0990000000",
            "modePaiement": "Mobile Money",
            "products": [
                { "typeDeProduit": "Chevron", "quantity": 4, "price": 2500 },
                { "typeDeProduit": "Madrier", "quantity": 2, "price": 7000 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&invoice["total"], 24_000.0));
    assert_eq!(invoice["products"].as_array().unwrap().len(), 2);
    assert_eq!(invoice["typeDeProduit"], "Chevron");
    assert_eq!(invoice["modePaiement"], "Mobile Money");

    let (status, body) = api(
        &app.router,
        "POST",
        "/invoices/api",
        Some(json!({ "clientNom": "Sans produit", "clientTelephone": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Tous les champs sont requis");
}

// =====================================================================
// Reports and dashboard
// =====================================================================

#[tokio::test]
async fn weekly_report_compares_with_previous_week() {
    let app = test_app(false);
    for (date, montant) in [("2025-01-11", 500), ("2025-01-14", 200)] {
        let (status, _) = api(
            &app.router,
            "POST",
            "/expenses/api",
            Some(json!({ "date": date, "categorie": "Carburant", "montant": montant })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, report) = api(
        &app.router,
        "GET",
        "/reports/api?type=depenses&period=weekly&date=2025-01-15",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = report["data"].as_array().unwrap();
    assert_eq!(data.len(), 7);
    assert_eq!(data[0]["day"], "Monday");
    assert!(approx(&data[1]["value"], 200.0));
    assert!(approx(&data[5]["prev"], 500.0));
    assert!(approx(&report["totalCurrent"], 200.0));
    assert!(approx(&report["totalPrev"], 500.0));
    assert!(approx(&report["percentChange"], -60.0));
}

#[tokio::test]
async fn yearly_and_daily_reports() {
    let app = test_app(false);
    api(
        &app.router,
        "POST",
        "/charges/api",
        Some(json!({
            "date": "2025-03-05",
            "fournisseur": "Grumes",
            "quantite": 1,
            "poids": 1,
            "prix": 250
        })),
    )
    .await;

    let (status, report) = api(
        &app.router,
        "GET",
        "/reports/api?type=charges&period=yearly&date=2025-06-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = report["data"].as_array().unwrap();
    assert_eq!(data.len(), 12);
    assert_eq!(data[2]["month"], "Mar");
    assert!(approx(&data[2]["value"], 250.0));
    assert!(approx(&report["total"], 250.0));

    let (_, daily) = api(
        &app.router,
        "GET",
        "/reports/api?type=charges&period=daily&date=2025-03-05",
        None,
    )
    .await;
    assert_eq!(daily["items"].as_array().unwrap().len(), 1);
    assert!(approx(&daily["total"], 250.0));
}

#[tokio::test]
async fn report_rejects_bad_parameters() {
    let app = test_app(false);

    let (status, body) = api(&app.router, "GET", "/reports/api?type=bois", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Type invalide");

    let (status, _) = api(
        &app.router,
        "GET",
        "/reports/api?type=ventes&period=hourly",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = api(&app.router, "GET", "/reports/api?type=ventes&date=demain", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_summary() {
    let app = test_app(false);
    api(
        &app.router,
        "POST",
        "/stock/api",
        Some(json!({ "type": "Acajou", "quantity": 10, "unitPrice": 100 })),
    )
    .await;
    api(
        &app.router,
        "POST",
        "/productions/api",
        Some(json!({ "typeBois": "Acajou", "quantity": 2, "unitPrice": 400 })),
    )
    .await;

    let (status, dashboard) = api(&app.router, "GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["stocks"].as_array().unwrap().len(), 1);
    assert!(approx(&dashboard["resume"]["totalStock"], 1000.0));
    assert!(approx(&dashboard["resume"]["totalBenefice"], 800.0));
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = test_app(false);
    let bad = Request::builder()
        .method("POST")
        .uri("/stock/api")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app.router, bad).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
