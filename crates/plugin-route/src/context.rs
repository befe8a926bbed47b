//! Request extractors for plugin handlers.

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use apis::{Auth, Meta, RequestContext, AUTH_HEADER, META_HEADER};

use crate::error::RouteError;

/// [`RequestContext`] decoded from the `X-Plugin-Meta` and `X-Plugin-Auth`
/// headers.
///
/// The meta header is required. The auth header is optional, but a present
/// header that fails to decode rejects the request with 400.
#[derive(Debug, Clone)]
pub struct PluginContext(pub RequestContext);

impl PluginContext {
    /// Decodes the context from request headers.
    pub fn from_headers(req: &HttpRequest) -> Result<Self, RouteError> {
        let meta = match header_str(req, META_HEADER)? {
            Some(value) => {
                Meta::from_header_value(value).map_err(|e| RouteError::bad_request(e.to_string()))?
            }
            None => {
                return Err(RouteError::bad_request(format!(
                    "missing {META_HEADER} header"
                )))
            }
        };

        let auth = header_str(req, AUTH_HEADER)?
            .map(Auth::from_header_value)
            .transpose()
            .map_err(|e| RouteError::bad_request(e.to_string()))?;

        Ok(Self(RequestContext::new(meta, auth)))
    }

    /// Unwraps the context.
    pub fn into_inner(self) -> RequestContext {
        self.0
    }
}

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Result<Option<&'a str>, RouteError> {
    match req.headers().get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| RouteError::bad_request(format!("{name} header is not valid ascii"))),
    }
}

impl Deref for PluginContext {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for PluginContext {
    type Error = RouteError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use apis::PluginErrorKind;

    #[test]
    fn decodes_meta_and_auth() {
        let meta = Meta::new("https://gitlab.example.com").with_version("v4");
        let auth = Auth::personal_token("glpat-123");
        let req = TestRequest::default()
            .insert_header((META_HEADER, meta.to_header_value()))
            .insert_header((AUTH_HEADER, auth.to_header_value()))
            .to_http_request();

        let ctx = PluginContext::from_headers(&req).unwrap();
        assert_eq!(ctx.meta, meta);
        assert_eq!(ctx.auth.as_ref().unwrap().access_token().unwrap(), "glpat-123");
    }

    #[test]
    fn auth_is_optional() {
        let req = TestRequest::default()
            .insert_header((META_HEADER, Meta::new("https://h").to_header_value()))
            .to_http_request();
        let ctx = PluginContext::from_headers(&req).unwrap();
        assert!(ctx.auth.is_none());
    }

    #[test]
    fn missing_or_malformed_headers_are_bad_requests() {
        let req = TestRequest::default().to_http_request();
        let err = PluginContext::from_headers(&req).unwrap_err();
        assert_eq!(err.plugin_error().kind, PluginErrorKind::BadRequest);

        let req = TestRequest::default()
            .insert_header((META_HEADER, Meta::new("https://h").to_header_value()))
            .insert_header((AUTH_HEADER, "%%%"))
            .to_http_request();
        let err = PluginContext::from_headers(&req).unwrap_err();
        assert_eq!(err.plugin_error().kind, PluginErrorKind::BadRequest);
    }
}
