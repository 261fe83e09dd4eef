use actix_web::body::EitherBody;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use chrono::Utc;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use uuid::Uuid;

use crate::config::{AppConfig, JwtConfig};
use crate::entity::users;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub is_admin: bool,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)
    }
}

/// Issues and validates bearer tokens for users
pub trait AuthProvider {
    fn issue_token(&self, user: &users::Model) -> Result<String, AppError>;
    fn validate(&self, token: &str) -> Result<Claims, AppError>;
}

#[derive(Clone)]
pub struct JwtProvider {
    config: JwtConfig,
}

impl JwtProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

impl AuthProvider for JwtProvider {
    fn issue_token(&self, user: &users::Model) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            iat: now as usize,
            exp: (now + self.config.expire_hours * 3600) as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_ref()),
        )
        .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    fn validate(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_ref()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
        .map_err(|_| AppError::InvalidToken)
    }
}

/// Resolves the bearer token, if any, into the calling user.
///
/// Requests without an Authorization header pass through untouched so public
/// routes can share the scope; handlers that need a user use the
/// [`AuthUser`], [`RegisteredUser`] or [`AdminUser`] extractors. A header
/// carrying a bad token is rejected with 401.
#[derive(Clone, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_owned);

            let Some(token) = token else {
                let res = svc.call(req).await?;
                return Ok(res.map_into_left_body());
            };

            match authenticate(&req, &token).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = svc.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    let (req, _pl) = req.into_parts();
                    let resp = err.error_response();
                    Ok(ServiceResponse::new(req, resp).map_into_right_body())
                }
            }
        })
    }
}

async fn authenticate(req: &ServiceRequest, token: &str) -> Result<users::Model, AppError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::Internal("AppConfig not registered".to_string()))?;
    let db = req
        .app_data::<web::Data<DatabaseConnection>>()
        .ok_or_else(|| AppError::Internal("database not registered".to_string()))?;

    let claims = JwtProvider::new(config.jwt.clone()).validate(token)?;
    users::Entity::find_by_id(claims.user_id()?)
        .one(db.get_ref())
        .await?
        .ok_or(AppError::InvalidToken)
}

/// The user resolved by [`JwtAuth`], if the request carried a valid token
pub fn get_user(req: &HttpRequest) -> Option<users::Model> {
    req.extensions().get::<users::Model>().cloned()
}

/// Any authenticated user
pub struct AuthUser(pub users::Model);

/// An authenticated user signed up for the current season
pub struct RegisteredUser(pub users::Model);

/// An authenticated admin
pub struct AdminUser(pub users::Model);

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(get_user(req).map(AuthUser).ok_or(AppError::Unauthenticated))
    }
}

impl FromRequest for RegisteredUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match get_user(req) {
            Some(user) if user.is_registered => Ok(RegisteredUser(user)),
            Some(_) => Err(AppError::NotRegistered),
            None => Err(AppError::Unauthenticated),
        })
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match get_user(req) {
            Some(user) if user.is_admin => Ok(AdminUser(user)),
            Some(_) => Err(AppError::AdminRequired),
            None => Err(AppError::Unauthenticated),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtProvider {
        JwtProvider::new(JwtConfig {
            secret: "unit-test-secret".to_string(),
            expire_hours: 1,
        })
    }

    fn sample_user(is_admin: bool) -> users::Model {
        let now = Utc::now().into();
        users::Model {
            id: Uuid::new_v4(),
            username: "liubei".to_string(),
            password_hash: String::new(),
            nickname: "Liu Bei".to_string(),
            is_admin,
            is_registered: true,
            space: 350,
            used_space: 0,
            club_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_then_validate_carries_identity() {
        let user = sample_user(true);
        let token = provider().issue_token(&user).unwrap();
        let claims = provider().validate(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.username, "liubei");
        assert!(claims.is_admin);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = JwtProvider::new(JwtConfig {
            secret: "another-secret".to_string(),
            expire_hours: 1,
        });
        let token = other.issue_token(&sample_user(false)).unwrap();
        assert!(matches!(
            provider().validate(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = JwtProvider::new(JwtConfig {
            secret: "unit-test-secret".to_string(),
            expire_hours: -2,
        });
        let token = expired.issue_token(&sample_user(false)).unwrap();
        assert!(provider().validate(&token).is_err());
    }
}
