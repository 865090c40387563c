//! User Administration Backend Binary
//!
//! Serves the authentication and administration API on BIND_ADDR
//! (default 0.0.0.0:8000) against the database at DB_URL.

#[tokio::main]
async fn main() {
    if let Err(e) = uam_core::log() {
        eprintln!("logging unavailable: {}", e);
    }
    uam_core::kys();
    if let Err(e) = uam_server::run().await {
        log::error!("backend stopped: {:#}", e);
        std::process::exit(1);
    }
}
