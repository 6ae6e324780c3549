//! The two surfaces fail authentication differently: browser routes bounce
//! anonymous users to the login page with the destination preserved, API
//! routes answer 401. These tests drive the extractors and the error
//! renderer through a real actix service.

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, HttpResponse};

use pulse_service::auth::{ApiUser, TokenManager, TokenPair, WebUser};
use pulse_service::error::AppError;

fn token_manager() -> TokenManager {
    TokenManager::new("contract-test-secret", 3_600, 86_400)
}

async fn web_probe(user: WebUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body(user.0.username))
}

async fn api_probe(user: ApiUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body(user.0.username))
}

macro_rules! probe_app {
    ($tokens:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($tokens))
                .route("/guarded/page/", web::get().to(web_probe))
                .route("/v1/guarded/", web::get().to(api_probe))
                .route(
                    "/v1/token/refresh/",
                    web::post().to(pulse_service::handlers::auth::refresh_token),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn anonymous_web_request_redirects_to_login_with_next() {
    let app = probe_app!(token_manager());

    let req = test::TestRequest::get().uri("/guarded/page/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(location, "/auth/login/?next=%2Fguarded%2Fpage%2F");
}

#[actix_web::test]
async fn anonymous_api_request_is_unauthorized() {
    let app = probe_app!(token_manager());

    let req = test::TestRequest::get().uri("/v1/guarded/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn bearer_token_authenticates_both_surfaces() {
    let tokens = token_manager();
    let pair = tokens
        .issue_pair(uuid::Uuid::new_v4(), "leo")
        .expect("issue pair");
    let app = probe_app!(tokens);

    for uri in ["/guarded/page/", "/v1/guarded/"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.access_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, "leo");
    }
}

#[actix_web::test]
async fn garbage_bearer_redirects_web_but_401s_api() {
    let app = probe_app!(token_manager());

    let req = test::TestRequest::get()
        .uri("/guarded/page/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::get()
        .uri("/v1/guarded/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn refresh_endpoint_rotates_the_pair() {
    let tokens = token_manager();
    let user_id = uuid::Uuid::new_v4();
    let pair = tokens.issue_pair(user_id, "mira").expect("issue pair");
    let app = probe_app!(tokens.clone());

    let req = test::TestRequest::post()
        .uri("/v1/token/refresh/")
        .set_json(serde_json::json!({ "refresh": pair.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let rotated: TokenPair = test::read_body_json(resp).await;
    let claims = tokens.validate_access(&rotated.access_token).expect("valid access");
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.username, "mira");
}

#[actix_web::test]
async fn refresh_endpoint_rejects_an_access_token() {
    let tokens = token_manager();
    let pair = tokens
        .issue_pair(uuid::Uuid::new_v4(), "mira")
        .expect("issue pair");
    let app = probe_app!(tokens);

    let req = test::TestRequest::post()
        .uri("/v1/token/refresh/")
        .set_json(serde_json::json!({ "refresh": pair.access_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
