use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::tokens::TokenManager;
use crate::error::AppError;

/// Identity established from a validated bearer token.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: Uuid,
    pub username: String,
}

fn bearer_identity(req: &HttpRequest) -> Result<Option<AuthedUser>, AppError> {
    let Some(header) = req.headers().get("Authorization") else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Malformed Authorization header".to_string()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".to_string()))?;

    let tokens = req
        .app_data::<web::Data<TokenManager>>()
        .ok_or_else(|| AppError::Internal("Token manager not configured".to_string()))?;

    let claims = tokens.validate_access(token)?;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

    Ok(Some(AuthedUser {
        id,
        username: claims.username,
    }))
}

/// Required identity for API routes; missing or invalid credentials are a 401.
#[derive(Debug, Clone)]
pub struct ApiUser(pub AuthedUser);

impl FromRequest for ApiUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match bearer_identity(req) {
            Ok(Some(user)) => Ok(ApiUser(user)),
            Ok(None) => Err(AppError::Unauthorized(
                "Missing Authorization header".to_string(),
            )),
            Err(e) => Err(e),
        })
    }
}

/// Required identity for browser-facing routes; an anonymous request is
/// redirected to the login page with the original destination preserved,
/// not rejected with a 401.
#[derive(Debug, Clone)]
pub struct WebUser(pub AuthedUser);

impl FromRequest for WebUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let next = req.path().to_string();
        ready(match bearer_identity(req) {
            Ok(Some(user)) => Ok(WebUser(user)),
            Ok(None) | Err(AppError::Unauthorized(_)) => Err(AppError::LoginRequired { next }),
            Err(e) => Err(e),
        })
    }
}

/// Optional identity for public routes. Anonymous viewers are fine; the
/// query layer omits per-viewer fields for them. Invalid credentials on a
/// public route are still rejected rather than silently downgraded.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthedUser>);

impl Viewer {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|u| u.id)
    }
}

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(bearer_identity(req).map(Viewer))
    }
}
