use axum::{
    http::{StatusCode, Request},
    middleware::Next,
    response::Response,
    body::Body,
};
use uuid::Uuid;
use super::validate_jwt;

#[derive(Clone, Copy)]
pub struct UserId(pub Uuid);

pub async fn require_auth(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match auth_header {
        Some(token) => token.trim(),
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    match validate_jwt(token) {
        Ok(user_id) => {
            request.extensions_mut().insert(UserId(user_id));
            Ok(next.run(request).await)
        },
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}
