use super::*;
use actix_web::FromRequest;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::web;
use std::future::Ready;
use std::future::ready;
use std::marker::PhantomData;
use uam_core::ID;
use uam_directory::Account;

/// Rejections raised before a protected handler runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("Authentication required")]
    Missing,
    #[error("Invalid or expired token")]
    Invalid,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Token service not configured")]
    Unconfigured,
}

impl ResponseError for Denial {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Missing | Self::Invalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if self.status_code() == StatusCode::UNAUTHORIZED {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        response.json(Message::fail(self.to_string()))
    }
}

/// The token from an `Authorization: Bearer <token>` header.
/// The scheme is matched case-insensitively.
pub fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

/// Verified claims of the request's access token.
/// Refresh tokens are not access tokens and are refused.
fn claims(req: &HttpRequest) -> Result<Claims, Denial> {
    let token = bearer(req).ok_or(Denial::Missing)?;
    let crypto = req
        .app_data::<web::Data<Crypto>>()
        .ok_or(Denial::Unconfigured)?;
    crypto
        .decode(token)
        .filter(|claims| !claims.is_refresh())
        .filter(|claims| claims.subject().is_some())
        .ok_or(Denial::Invalid)
}

/// A role code required at the type level.
pub trait Clearance {
    const ROLE: &'static str;
}

/// Account and role administration.
pub struct UserAdmin;
impl Clearance for UserAdmin {
    const ROLE: &'static str = uam_core::USER_ADMIN;
}

/// Extractor for requests bearing a valid access token of any role.
pub struct Auth(pub Claims);

impl Auth {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
    pub fn user(&self) -> Option<ID<Account>> {
        self.0.subject()
    }
}

impl FromRequest for Auth {
    type Error = Denial;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(claims(req).map(Auth))
    }
}

/// Extractor for requests whose access token carries role `R::ROLE`.
/// Checked afresh on every request.
pub struct Gate<R: Clearance>(pub Claims, PhantomData<R>);

impl<R: Clearance> Gate<R> {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
    pub fn user(&self) -> Option<ID<Account>> {
        self.0.subject()
    }
}

impl<R: Clearance> FromRequest for Gate<R> {
    type Error = Denial;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(claims(req).and_then(|claims| match claims.role() == Some(R::ROLE) {
            true => Ok(Gate(claims, PhantomData)),
            false => {
                log::debug!("denied {} to role {:?}", req.path(), claims.role());
                Err(Denial::Forbidden)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn request(authorization: Option<&str>) -> HttpRequest {
        let req = TestRequest::default().app_data(web::Data::new(Crypto::new("secret")));
        match authorization {
            Some(value) => req.insert_header((header::AUTHORIZATION, value)).to_http_request(),
            None => req.to_http_request(),
        }
    }

    fn gate(authorization: Option<&str>) -> Result<Gate<UserAdmin>, Denial> {
        Gate::<UserAdmin>::from_request(&request(authorization), &mut Payload::None).into_inner()
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer(&request(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer(&request(Some("bearer   abc "))), Some("abc"));
        assert_eq!(bearer(&request(Some("Basic abc"))), None);
        assert_eq!(bearer(&request(Some("Bearer"))), None);
        assert_eq!(bearer(&request(None)), None);
    }

    #[test]
    fn gate_states() {
        let crypto = Crypto::new("secret");
        let admin = crypto.issue_access(ID::from(1), Some(uam_core::USER_ADMIN)).unwrap();
        let csr = crypto.issue_access(ID::from(2), Some(uam_core::CSR_REP)).unwrap();
        let refresh = crypto.issue_refresh(ID::from(1)).unwrap();
        let forged = Crypto::new("other").issue_access(ID::from(1), Some(uam_core::USER_ADMIN)).unwrap();
        assert_eq!(gate(None).err(), Some(Denial::Missing));
        assert_eq!(gate(Some("Bearer junk")).err(), Some(Denial::Invalid));
        assert_eq!(gate(Some(&format!("Bearer {}", forged))).err(), Some(Denial::Invalid));
        assert_eq!(gate(Some(&format!("Bearer {}", refresh))).err(), Some(Denial::Invalid));
        assert_eq!(gate(Some(&format!("Bearer {}", csr))).err(), Some(Denial::Forbidden));
        let passed = gate(Some(&format!("Bearer {}", admin))).ok().unwrap();
        assert_eq!(passed.user(), Some(ID::from(1)));
    }

    #[test]
    fn denials_render_json_with_challenge() {
        let response = Denial::Missing.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        let response = Denial::Forbidden.error_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
