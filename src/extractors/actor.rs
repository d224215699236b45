//! Extract the acting user id from the request (`X-User-ID`, set by the auth layer in front of us).

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const ACTOR_ID_HEADER: &str = "X-User-ID";

/// Acting user, if the header is present and numeric. Anything else reads as anonymous.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActorId(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .and_then(|s| s.parse::<i64>().ok());
        Ok(ActorId(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> ActorId {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header(ACTOR_ID_HEADER, h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        ActorId::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn reads_numeric_header() {
        assert_eq!(extract(Some(" 42 ")).await, ActorId(Some(42)));
    }

    #[tokio::test]
    async fn missing_or_garbage_is_anonymous() {
        assert_eq!(extract(None).await, ActorId(None));
        assert_eq!(extract(Some("alice")).await, ActorId(None));
    }
}
