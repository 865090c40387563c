//! User Administration Backend
//!
//! Wires the authentication core and the administrative operations into
//! a single actix-web server over one injected directory.
//!
//! ## Routes
//!
//! - `GET /`, `GET /api/health` — public
//! - `POST /api/login`, `POST /api/refresh` — public
//! - `POST /api/logout`, `GET /api/me` — any valid access token
//! - `/api/users/**`, `/api/roles/**` — `USER_ADMIN` only
mod config;

pub use config::*;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::error::InternalError;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use uam_auth::Crypto;
use uam_auth::Message;
use uam_auth::Settings;
use uam_auth::Verifier;
use uam_directory::Directory;
use uam_directory::Filter;

/// Application state shared by every worker.
#[derive(Clone)]
pub struct Backend {
    directory: web::Data<dyn Directory>,
    crypto: web::Data<Crypto>,
    verifier: web::Data<Verifier>,
}

impl Backend {
    pub fn new(directory: Arc<dyn Directory>, settings: &Settings) -> Self {
        Self {
            directory: web::Data::from(directory),
            crypto: web::Data::new(Crypto::from(settings)),
            verifier: web::Data::new(Verifier::new(settings.allow_legacy_plaintext)),
        }
    }

    pub fn directory(&self) -> &dyn Directory {
        self.directory.get_ref()
    }

    /// Registers state, body limits, and every route.
    #[rustfmt::skip]
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.directory.clone())
            .app_data(self.crypto.clone())
            .app_data(self.verifier.clone())
            .app_data(web::JsonConfig::default().error_handler(|e, _| {
                let response = HttpResponse::BadRequest().json(Message::fail(e.to_string()));
                InternalError::from_response(e, response).into()
            }))
            .route("/",            web::get().to(root))
            .route("/api/health",  web::get().to(health))
            .route("/api/login",   web::post().to(uam_auth::login))
            .route("/api/refresh", web::post().to(uam_auth::refresh))
            .route("/api/logout",  web::post().to(uam_auth::logout))
            .route("/api/me",      web::get().to(uam_auth::me));
        uam_admin::configure(cfg);
    }
}

async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "User Administration API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/login": "Authenticate and receive tokens",
            "POST /api/refresh": "Exchange a refresh token for an access token",
            "POST /api/logout": "Acknowledge logout",
            "GET /api/me": "Current account",
            "GET /api/health": "Health check",
            "/api/users": "Account administration (USER_ADMIN)",
            "/api/roles": "Role administration (USER_ADMIN)",
        }
    }))
}

async fn health(directory: web::Data<dyn Directory>) -> impl Responder {
    match directory
        .ping()
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "status": "healthy", "database": "connected" })),
        Err(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({ "status": "unhealthy", "database": "unavailable" })),
    }
}

fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

/// Creates the administrator named by `ADMIN_USERNAME`/`ADMIN_PASSWORD`
/// when both are set and no such account exists yet.
pub async fn bootstrap(directory: &dyn Directory) -> anyhow::Result<()> {
    let (Ok(username), Ok(password)) = (std::env::var("ADMIN_USERNAME"), std::env::var("ADMIN_PASSWORD")) else {
        return Ok(());
    };
    if !directory.find_accounts(&Filter::default().username(username.as_str())).await?.is_empty() {
        return Ok(());
    }
    let role = directory
        .roles()
        .await?
        .into_iter()
        .find(|r| r.code == uam_core::USER_ADMIN)
        .ok_or_else(|| anyhow::anyhow!("{} role is missing", uam_core::USER_ADMIN))?;
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| format!("{}@localhost.localdomain", username));
    let request = uam_admin::CreateUser {
        username,
        password,
        full_name: String::from("Administrator"),
        email,
        role_id: role.id,
    };
    let account = uam_admin::users::create(directory, &request)
        .await
        .map_err(|e| anyhow::anyhow!("bootstrap administrator: {}", e))?;
    log::info!("bootstrapped administrator {}", account.username);
    Ok(())
}

#[rustfmt::skip]
pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    let config = Config::from_env();
    let client = uam_pg::db().await?;
    uam_directory::prepare(&client).await?;
    let backend = Backend::new(Arc::new(client), &settings);
    bootstrap(backend.directory()).await?;
    log::info!("listening on {}", config.bind);
    let origins = config.origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(cors(&origins))
            .configure(|cfg| backend.configure(cfg))
    })
    .bind(config.bind.as_str())?
    .run()
    .await?;
    Ok(())
}
