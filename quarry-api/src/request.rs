//! The request capability implemented by every endpoint.

use bytes::Bytes;
use quarry_transport::WireRequest;
use serde::Serialize;

/// A typed request that can describe itself on the wire.
///
/// `build` is a pure function of the request's fields. It may only fail
/// when the body cannot be serialized, in which case nothing is sent.
pub trait ApiRequest: Send + Sync {
    /// Produce the method, path, body, query parameters and headers.
    fn build(&self) -> Result<WireRequest, serde_json::Error>;
}

/// A prebuilt wire request dispatches as itself.
impl ApiRequest for WireRequest {
    fn build(&self) -> Result<WireRequest, serde_json::Error> {
        Ok(self.clone())
    }
}

impl<R: ApiRequest + ?Sized> ApiRequest for &R {
    fn build(&self) -> Result<WireRequest, serde_json::Error> {
        (**self).build()
    }
}

/// Serialize a JSON request body.
pub fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<Bytes, serde_json::Error> {
    serde_json::to_vec(body).map(Bytes::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_transport::Method;
    use std::collections::HashMap;

    #[test]
    fn test_wire_request_builds_itself() {
        let wire = WireRequest::new(Method::GET, "/_cat/health").with_param("v", "true");
        let built = wire.build().unwrap();

        assert_eq!(built.path, "/_cat/health");
        assert_eq!(built.params["v"], "true");
    }

    #[test]
    fn test_json_body() {
        let body = json_body(&serde_json::json!({"query": {"match_all": {}}})).unwrap();
        assert_eq!(&body[..], br#"{"query":{"match_all":{}}}"#);
    }

    #[test]
    fn test_json_body_rejects_non_string_keys() {
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "pair");
        assert!(json_body(&map).is_err());
    }
}
