use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use super::error::ApiError;
use crate::domain::order::{Identity, Role, UserId};

/// Set by the authentication gateway in front of this service
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, ApiError> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated(format!("missing {name} header")))
}

fn identity_from_request(req: &HttpRequest) -> Result<Identity, ApiError> {
    let user_id = header(req, USER_ID_HEADER)?
        .parse::<Uuid>()
        .map_err(|_| ApiError::Unauthenticated(format!("{USER_ID_HEADER} is not a valid user id")))?;
    let role = header(req, USER_ROLE_HEADER)?
        .parse::<Role>()
        .map_err(ApiError::Unauthenticated)?;

    Ok(Identity::new(UserId(user_id), role))
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_request(req))
    }
}
