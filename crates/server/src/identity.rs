//! Caller identity forwarded by the authenticating proxy.
//!
//! The proxy sets `x-actor-role` (`team` or `admin`) and `x-actor-id`; the
//! middleware turns them into an [`Actor`] request extension.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as HeaderError, Header},
    typed_header::TypedHeaderRejection,
};
use engine::Actor;

static ACTOR_ROLE_HEADER: HeaderName = HeaderName::from_static("x-actor-role");
static ACTOR_ID_HEADER: HeaderName = HeaderName::from_static("x-actor-id");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Team,
    Admin,
}

/// `TypedHeader` for the `x-actor-role` header.
#[derive(Debug)]
pub struct ActorRole(pub Role);

impl Header for ActorRole {
    fn name() -> &'static HeaderName {
        &ACTOR_ROLE_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(HeaderError::invalid());
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "team" => Ok(ActorRole(Role::Team)),
            "admin" => Ok(ActorRole(Role::Admin)),
            _ => Err(HeaderError::invalid()),
        }
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let value = match self.0 {
            Role::Team => "team",
            Role::Admin => "admin",
        };
        values.extend(std::iter::once(HeaderValue::from_static(value)));
    }
}

/// `TypedHeader` for the `x-actor-id` header.
#[derive(Debug)]
pub struct ActorId(pub i64);

impl Header for ActorId {
    fn name() -> &'static HeaderName {
        &ACTOR_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(HeaderError::invalid());
        };
        let Ok(value) = value.trim().parse() else {
            return Err(HeaderError::invalid());
        };

        Ok(ActorId(value))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-actor-id header"),
        }
    }
}

/// Rejects requests with a missing or malformed identity with 401.
pub async fn identify(
    role: Result<TypedHeader<ActorRole>, TypedHeaderRejection>,
    id: Result<TypedHeader<ActorId>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let (Ok(TypedHeader(role)), Ok(TypedHeader(id))) = (role, id) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let actor = match role.0 {
        Role::Team => Actor::Team { team_id: id.0 },
        Role::Admin => Actor::Admin { admin_id: id.0 },
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
