use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use serde::Deserialize;

use crate::auth::credentials::CredentialStore;
use crate::auth::extractors::AuthenticatedUser;
use crate::auth::guard::authenticate;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// Rejects any request without a valid bearer token and records the caller's
/// username in request extensions for [`AuthenticatedUser`].
///
/// The token is read from `Authorization: Bearer <token>`, falling back to a
/// `token` query parameter.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Pulls the raw token string out of the request, header first.
pub fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(|token| token.trim().to_string());

    from_header.or_else(|| {
        web::Query::<TokenQuery>::from_query(req.query_string())
            .ok()
            .and_then(|query| query.into_inner().token)
    })
}

fn resolve_user(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let token = bearer_token(req).ok_or_else(AppError::invalid_credentials)?;

    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::InternalServerError("Token service not configured".into()))?;
    let credentials = req
        .app_data::<web::Data<CredentialStore>>()
        .ok_or_else(|| AppError::InternalServerError("Credential store not configured".into()))?;

    authenticate(&token, tokens, credentials).map(AuthenticatedUser)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match resolve_user(&req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
            }
            Err(app_err) => {
                log::debug!("Rejected {} {}: {}", req.method(), req.path(), app_err);
                // Answer directly so the rejection is an ordinary 401 response.
                let response = req.error_response(app_err).map_into_right_body();
                Box::pin(ready(Ok(response)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_from_header() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_srv_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_from_query() {
        let req = TestRequest::with_uri("/tasks?token=abc.def.ghi").to_srv_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_header_wins_over_query() {
        let req = TestRequest::with_uri("/tasks?token=from-query")
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_srv_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_missing_or_non_bearer_token() {
        let req = TestRequest::default().to_srv_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwdw=="))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);
    }
}
