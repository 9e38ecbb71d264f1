/// HTTP middleware utilities for the post service
///
/// Credential verification lives in an upstream session gateway; by the
/// time a request reaches this service the gateway has resolved it to a
/// `(user id, username)` pair forwarded in the `X-User-Id` and
/// `X-User-Name` headers. `AuthenticatedUser` materializes that pair and
/// rejects requests that arrive without it. The service never parses
/// credentials itself.
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics::HTTP_REQUEST_DURATION_SECONDS;
use crate::models::Author;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USERNAME_HEADER: &str = "X-User-Name";

// =====================================================================
// Request identity
// =====================================================================

/// Identity resolved by the upstream authentication collaborator.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn into_author(self) -> Author {
        Author {
            username: self.username,
            id: self.id,
        }
    }

    fn from_headers(req: &HttpRequest) -> Result<Self, AppError> {
        let id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or(AppError::Unauthorized)?;

        let username = req
            .headers()
            .get(USERNAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|name| !name.is_empty())
            .ok_or(AppError::Unauthorized)?
            .to_string();

        Ok(Self { id, username })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}

// =====================================================================
// Request timing
// =====================================================================

/// Records per-request latency into the Prometheus histogram.
pub struct RequestTimer;

impl<S, B> Transform<S, ServiceRequest> for RequestTimer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestTimerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTimerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let status = match &res {
                Ok(response) => response.status().as_u16(),
                Err(err) => err.as_response_error().status_code().as_u16(),
            };
            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[&method, &status.to_string()])
                .observe(start.elapsed().as_secs_f64());
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn identity_resolves_from_gateway_headers() {
        let user_id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, user_id.to_string()))
            .insert_header((USERNAME_HEADER, "alice"))
            .to_http_request();

        let user = AuthenticatedUser::from_headers(&req).unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn missing_headers_are_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = AuthenticatedUser::from_headers(&req).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn malformed_user_id_is_unauthorized() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .insert_header((USERNAME_HEADER, "alice"))
            .to_http_request();
        let err = AuthenticatedUser::from_headers(&req).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
