//! API 통합 테스트
//!
//! 데모 데이터가 들어 있는 메모리 백엔드로 라우터 전체를 호출합니다.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bitfuse::backend::{BackendClient, InMemoryBackend, DEMO_EMAIL, DEMO_PASSWORD};
use bitfuse::config::{AppConfig, ServerConfig};
use bitfuse::countdown::ManualClock;
use bitfuse::domain::Balance;
use bitfuse::server::{build_router, ServerState};

struct TestApp {
    router: Router,
    backend: Arc<InMemoryBackend>,
}

fn test_app() -> TestApp {
    let app = AppConfig::default();
    let clock = Arc::new(ManualClock::new(app.system_time));
    let backend = Arc::new(InMemoryBackend::seeded(&app));

    let state = ServerState::new(
        backend.clone() as Arc<dyn BackendClient>,
        app,
        ServerConfig::default(),
        clock,
    );
    TestApp { router: build_router(state), backend }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn demo_login(router: &Router) -> String {
    let (status, body) = send(
        router,
        post("/api/v1/auth/login", None, json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

fn registration_body(email: &str, username: &str) -> Value {
    json!({
        "name": "Maria Silva",
        "email": email,
        "username": username,
        "phone": "11999998888",
        "cpf": "12345678909",
        "password": "segura123",
        "confirmPassword": "segura123",
        "acceptTerms": true,
        "ref": "bybitearnusdt-web"
    })
}

#[tokio::test]
async fn test_login_and_dashboard() {
    let app = test_app();
    let token = demo_login(&app.router).await;

    let (status, body) = send(&app.router, get("/api/v1/dashboard", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "ready");
    assert_eq!(body["account"]["name"], "Paul Stephen");
    assert_eq!(body["account"]["initials"], "PS");
    assert_eq!(body["balance"]["total"], "R$\u{a0}15.420,50");
    assert_eq!(body["balance"]["active_investments"], 1);
    assert_eq!(body["recent_transactions"].as_array().unwrap().len(), 3);
    assert_eq!(body["recent_transactions"][0]["id"], "txn-001");

    let investment = &body["active_investments"][0];
    assert_eq!(investment["plan_name"], "Miner Cósmico");
    assert_eq!(investment["days_remaining"], 56);
    assert!((investment["daily_return"].as_f64().unwrap() - 177.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_login_errors() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post("/api/v1/auth/login", None, json!({ "email": DEMO_EMAIL, "password": "errada" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");

    let (status, body) = send(
        &app.router,
        post("/api/v1/auth/login", None, json!({ "email": "sem-arroba", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["email"], "Email inválido");
    assert_eq!(body["fields"]["password"], "Senha é obrigatória");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();

    let (status, body) = send(&app.router, get("/api/v1/dashboard", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "MISSING_TOKEN");

    let (status, body) = send(&app.router, get("/api/v1/referral", Some("desconhecido"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let app = test_app();
    let token = demo_login(&app.router).await;

    let (status, _) = send(&app.router, post("/api/v1/auth/logout", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, get("/api/v1/dashboard", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_and_duplicate() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        post("/api/v1/auth/register", None, registration_body("maria@bitfuse.com", "maria")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["phone"], "(11) 99999-8888");
    assert_eq!(body["account"]["cpf"], "123.456.789-09");

    let (status, body) = send(
        &app.router,
        post("/api/v1/auth/register", None, registration_body("MARIA@bitfuse.com", "maria2")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_EXISTS");

    // 추천인에게 1단계 추천 관계가 추가됨
    let token = demo_login(&app.router).await;
    let (_, body) = send(&app.router, get("/api/v1/referral", Some(&token))).await;
    assert_eq!(body["total_referrals"], 3);
    assert_eq!(body["direct_referrals"], 2);
}

#[tokio::test]
async fn test_register_validation() {
    let app = test_app();
    let body = json!({
        "name": "",
        "email": "maria",
        "username": "ma",
        "phone": "123",
        "cpf": "00000000000",
        "password": "curta",
        "confirmPassword": "outra",
        "acceptTerms": false
    });

    let (status, body) = send(&app.router, post("/api/v1/auth/register", None, body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let fields = body["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 8);
    assert_eq!(fields["cpf"], "CPF inválido");
    assert_eq!(fields["confirmPassword"], "Senhas não coincidem");
}

#[tokio::test]
async fn test_plans_and_projection() {
    let app = test_app();

    let (status, body) = send(&app.router, get("/api/v1/plans", None)).await;
    assert_eq!(status, StatusCode::OK);
    let plans = body.as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["id"], "miner-start");

    let (status, body) = send(&app.router, get("/api/v1/plans/miner-start/projection?amount=1000", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!((body["daily_return"].as_f64().unwrap() - 15.0).abs() < 1e-9);
    assert!((body["total_return"].as_f64().unwrap() - 450.0).abs() < 1e-9);

    let (status, body) = send(&app.router, get("/api/v1/plans/miner-start/projection?amount=100", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert!(body["fields"]["amount"].as_str().unwrap().starts_with("Valor deve estar entre"));
    assert!(body.get("daily_return").is_none());

    let (status, body) = send(&app.router, get("/api/v1/plans/nao-existe/projection", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "PLAN_NOT_FOUND");
}

#[tokio::test]
async fn test_deposit_flow() {
    let app = test_app();
    let token = demo_login(&app.router).await;

    let (_, body) = send(&app.router, get("/api/v1/deposit/quote?amount=5000", None)).await;
    assert_eq!(body["usdt_display"], "917.43");
    assert_eq!(body["meets_minimum"], true);

    let (status, body) = send(&app.router, post("/api/v1/deposit", Some(&token), json!({ "amount": "150" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["amount"], "Valor mínimo: R$\u{a0}200,00");

    let (status, body) = send(&app.router, post("/api/v1/deposit", Some(&token), json!({ "amount": "5000" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next"], "/deposit/details?amount=5000");

    let (_, body) = send(&app.router, get("/api/v1/deposit/details?amount=5000", Some(&token))).await;
    assert_eq!(body["state"], "ready");
    assert!(body["deposit_id"].as_str().unwrap().starts_with("DEP-"));
    assert_eq!(body["countdown"], "1h 30m 0s");
    assert!(body["confirmation_link"].as_str().unwrap().starts_with("https://wa.me/5511999999999?text="));

    let (_, body) = send(&app.router, get("/api/v1/deposit/details", Some(&token))).await;
    assert_eq!(body["state"], "incomplete");
    assert_eq!(body["title"], "Valor não especificado");
}

#[tokio::test]
async fn test_withdrawal_blocked_by_active_investment() {
    let app = test_app();
    let token = demo_login(&app.router).await;

    let form = json!({ "method": "crypto", "amount": "1000", "walletAddress": "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy" });
    let (status, body) = send(&app.router, post("/api/v1/withdrawal", Some(&token), form)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["amount"], "Não é possível sacar com investimentos ativos");
}

#[tokio::test]
async fn test_withdrawal_flow() {
    let app = test_app();
    let (_, body) = send(
        &app.router,
        post("/api/v1/auth/register", None, registration_body("joao@bitfuse.com", "joao")),
    )
    .await;
    let token = body["access_token"].as_str().unwrap().to_string();
    let user_id = body["account"]["id"].as_str().unwrap().to_string();

    // 잔고가 없으면 잔고 부족
    let form = json!({ "method": "pix", "amount": "1000", "pixKey": "joao@bitfuse.com", "pixKeyType": "email" });
    let (status, body) = send(&app.router, post("/api/v1/withdrawal", Some(&token), form.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["amount"], "Saldo insuficiente. Disponível: R$\u{a0}0,00");

    let balance = Balance { total: 2000.0, available: 2000.0, invested: 0.0, referral_earnings: 0.0 };
    app.backend.set_balance(&user_id, balance).await.unwrap();

    let (status, body) = send(&app.router, post("/api/v1/withdrawal", Some(&token), form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["destination"]["method"], "pix");
    let next = body["next"].as_str().unwrap().to_string();
    assert!(next.starts_with("/withdrawal/confirm?method=pix&amount=1000"));

    let query = next.trim_start_matches("/withdrawal/confirm");
    let (_, body) = send(&app.router, get(&format!("/api/v1/withdrawal/confirm{}", query), Some(&token))).await;
    assert_eq!(body["state"], "ready");
    assert!((body["fee"].as_f64().unwrap() - 20.0).abs() < 1e-9);
    assert!((body["final_amount"].as_f64().unwrap() - 980.0).abs() < 1e-9);
    assert_eq!(body["pix_key"], "joao@bitfuse.com");
    assert!(body["withdrawal_id"].as_str().unwrap().starts_with("WTH-"));
}

#[tokio::test]
async fn test_withdrawal_confirmation_incomplete() {
    let app = test_app();
    let token = demo_login(&app.router).await;

    let (_, body) = send(&app.router, get("/api/v1/withdrawal/confirm?method=crypto&amount=abc", Some(&token))).await;
    assert_eq!(body["state"], "incomplete");
    assert_eq!(body["title"], "Dados incompletos");
}

#[tokio::test]
async fn test_non_positive_amounts_are_incomplete() {
    let app = test_app();
    let token = demo_login(&app.router).await;

    // %2B = '+'
    for amount in ["-1000", "%2B0"] {
        let (status, body) = send(&app.router, get(&format!("/api/v1/deposit/details?amount={}", amount), Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "incomplete", "deposit amount={}", amount);
        assert_eq!(body["title"], "Valor não especificado");
        assert!(body.get("deposit_id").is_none());

        let uri = format!("/api/v1/withdrawal/confirm?method=pix&amount={}&pixKey=joao%40bitfuse.com&pixKeyType=email", amount);
        let (status, body) = send(&app.router, get(&uri, Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "incomplete", "withdrawal amount={}", amount);
        assert_eq!(body["title"], "Dados incompletos");
        assert!(body.get("withdrawal_id").is_none());
    }
}

#[tokio::test]
async fn test_referral_support_and_clock() {
    let app = test_app();
    let token = demo_login(&app.router).await;

    let (status, body) = send(&app.router, get("/api/v1/referral", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["link"], "https://bitfuse.com/auth/register?ref=bybitearnusdt-web");
    assert_eq!(body["tiers"].as_array().unwrap().len(), 5);
    assert_eq!(body["tiers"][1]["commission_on_min_deposit"], "R$\u{a0}10,00");
    assert_eq!(body["total_referrals"], 2);

    let (_, body) = send(&app.router, get("/api/v1/support", None)).await;
    assert_eq!(body["message"], "Olá! Preciso de ajuda com a plataforma BITFUSE.");
    assert_eq!(body["phone"], "+5511999999999");

    let (_, body) = send(&app.router, get("/api/v1/clock", None)).await;
    assert_eq!(body["display"], "17:18:00");
}
