use super::*;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use uam_directory::Directory;

/// Always 200; the body's `success` flag carries the outcome.
pub async fn login(
    directory: web::Data<dyn Directory>,
    crypto: web::Data<Crypto>,
    verifier: web::Data<Verifier>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    let outcome = authenticate(directory.get_ref(), &crypto, *verifier.get_ref(), &req).await;
    HttpResponse::Ok().json(LoginResponse::from(outcome))
}

/// Exchanges a refresh token for an access token carrying the account's
/// current role. Missing or suspended accounts are refused.
pub async fn refresh(
    directory: web::Data<dyn Directory>,
    crypto: web::Data<Crypto>,
    req: web::Json<RefreshRequest>,
) -> impl Responder {
    let Some(subject) = crypto.redeem(&req.refresh_token) else {
        return HttpResponse::Unauthorized().json(Message::fail("Invalid or expired refresh token"));
    };
    let account = match directory.account(subject).await {
        Ok(Some(account)) if account.active => account,
        Ok(_) => return HttpResponse::Unauthorized().json(Message::fail("Account is not available")),
        Err(e) => {
            log::error!("refresh failed while resolving account {}: {}", subject, e);
            return HttpResponse::InternalServerError().json(Message::fail("Token refresh failed"));
        }
    };
    match crypto.issue_access(account.id, Some(&account.role_code)) {
        Ok(access_token) => HttpResponse::Ok().json(RefreshResponse {
            access_token,
            token_type: BEARER,
            expires_in: crypto.expires_in(),
        }),
        Err(e) => {
            log::error!("refresh failed while issuing access token: {}", e);
            HttpResponse::InternalServerError().json(Message::fail("Token refresh failed"))
        }
    }
}

/// Tokens are not revoked server-side; clients discard them.
pub async fn logout(auth: Auth) -> impl Responder {
    log::info!("logout {}", auth.claims().sub);
    HttpResponse::Ok().json(Message::ok("Logged out successfully"))
}

pub async fn me(directory: web::Data<dyn Directory>, auth: Auth) -> impl Responder {
    let Some(id) = auth.user() else {
        return HttpResponse::Unauthorized().json(Message::fail("Invalid or expired token"));
    };
    match directory.account(id).await {
        Ok(Some(account)) => HttpResponse::Ok().json(serde_json::json!({ "success": true, "user": account })),
        Ok(None) => HttpResponse::NotFound().json(Message::fail("User not found")),
        Err(e) => {
            log::error!("profile lookup failed for {}: {}", id, e);
            HttpResponse::InternalServerError().json(Message::fail("Failed to load profile"))
        }
    }
}
