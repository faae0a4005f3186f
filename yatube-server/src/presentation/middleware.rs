use std::future::{Ready, ready};
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Instant;

use crate::application::auth_service::AuthService;
use crate::domain::actor::Actor;
use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::utils::resolve_actor;
use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage, web};
use futures_util::future::LocalBoxFuture;
use tracing::{info, warn};
use uuid::Uuid;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
static TIMING_HEADER: HeaderName = HeaderName::from_static("server-timing");

#[derive(Clone)]
pub struct RequestId(pub String);

/// Tags every request with an id (taken from `x-request-id` when the client
/// sends one), echoes it back, and logs one line per completed request with
/// its status, duration and acting user.
pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTraceService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceService { service }))
    }
}

pub struct RequestTraceService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let request_id = req
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut().insert(RequestId(request_id.clone()));
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let user = res
                .request()
                .extensions()
                .get::<Actor>()
                .and_then(|actor| actor.username().map(str::to_owned));
            info!(
                request_id = %request_id,
                user = user.as_deref().unwrap_or("-"),
                method = %method,
                path = %path,
                status = res.status().as_u16(),
                duration_ms = elapsed_ms,
                "request completed"
            );

            let headers = res.response_mut().headers_mut();
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                headers.insert(REQUEST_ID_HEADER.clone(), value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("app;dur={elapsed_ms}")) {
                headers.insert(TIMING_HEADER.clone(), value);
            }
            Ok(res)
        })
    }
}

/// Turns a bearer token into an [`Actor`] stored in request extensions.
///
/// Requests without an `Authorization` header pass through and are treated
/// as anonymous downstream. A header that is present but does not verify is
/// answered with 401 before any handler runs.
pub struct BearerAuth {
    keys: JwtKeys,
}

impl BearerAuth {
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct BearerAuthService<S> {
    service: Rc<S>,
    keys: JwtKeys,
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let keys = self.keys.clone();
        let users = req.app_data::<web::Data<AuthService>>().cloned();
        // outer None: no header at all; inner None: header is not valid text
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().ok().map(str::to_owned));

        Box::pin(async move {
            let Some(header) = header else {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            };

            match authenticate(header.as_deref(), &keys, users.as_deref().map(|v| &**v)).await {
                Ok(actor) => {
                    req.extensions_mut().insert(actor);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    warn!(path = %req.path(), error = %err, "rejected bearer token");
                    Ok(req.error_response(err).map_into_right_body())
                }
            }
        })
    }
}

async fn authenticate(
    header: Option<&str>,
    keys: &JwtKeys,
    users: Option<&AuthService>,
) -> Result<Actor, DomainError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(DomainError::Unauthorized)?;
    let users =
        users.ok_or_else(|| DomainError::Internal("auth service is not registered".into()))?;
    resolve_actor(token, keys, users).await
}
