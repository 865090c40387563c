use super::*;
use actix_web::HttpResponse;
use actix_web::web;
use uam_auth::Gate;
use uam_auth::UserAdmin;
use uam_core::ID;
use uam_directory::Account;
use uam_directory::Directory;
use uam_directory::Role;

type Admin = Gate<UserAdmin>;
type Reply = Result<HttpResponse, AdminError>;

fn account_list(accounts: Vec<Account>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "count": accounts.len(), "users": accounts }))
}

fn account_reply(message: &str, account: Account) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": message, "user": account }))
}

fn role_list(roles: Vec<Role>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "count": roles.len(), "roles": roles }))
}

fn role_reply(message: &str, role: Role) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": message, "role": role }))
}

pub async fn list_users(_: Admin, directory: web::Data<dyn Directory>, query: web::Query<UserQuery>) -> Reply {
    Ok(account_list(users::list(directory.get_ref(), &query).await?))
}

pub async fn search_users(_: Admin, directory: web::Data<dyn Directory>, query: web::Query<SearchQuery>) -> Reply {
    Ok(account_list(users::search(directory.get_ref(), &query).await?))
}

pub async fn get_user(_: Admin, directory: web::Data<dyn Directory>, id: web::Path<ID<Account>>) -> Reply {
    Ok(account_reply("User found", users::get(directory.get_ref(), *id).await?))
}

pub async fn create_user(admin: Admin, directory: web::Data<dyn Directory>, req: web::Json<CreateUser>) -> Reply {
    let account = users::create(directory.get_ref(), &req).await?;
    log::info!("account {} created by {}", account.id, admin.claims().sub);
    Ok(account_reply("User account created successfully.", account))
}

pub async fn update_user(
    _: Admin,
    directory: web::Data<dyn Directory>,
    id: web::Path<ID<Account>>,
    req: web::Json<UpdateUser>,
) -> Reply {
    Ok(account_reply("User account updated successfully.", users::update(directory.get_ref(), *id, &req).await?))
}

pub async fn suspend_user(_: Admin, directory: web::Data<dyn Directory>, id: web::Path<ID<Account>>) -> Reply {
    let account = users::suspend(directory.get_ref(), *id).await?;
    let message = format!("User \"{}\" has been suspended successfully.", account.username);
    Ok(account_reply(&message, account))
}

pub async fn activate_user(_: Admin, directory: web::Data<dyn Directory>, id: web::Path<ID<Account>>) -> Reply {
    let account = users::activate(directory.get_ref(), *id).await?;
    let message = format!("User \"{}\" has been activated successfully.", account.username);
    Ok(account_reply(&message, account))
}

pub async fn toggle_user(_: Admin, directory: web::Data<dyn Directory>, id: web::Path<ID<Account>>) -> Reply {
    let account = users::toggle(directory.get_ref(), *id).await?;
    let message = match account.active {
        true => format!("User \"{}\" has been activated successfully.", account.username),
        false => format!("User \"{}\" has been suspended successfully.", account.username),
    };
    Ok(account_reply(&message, account))
}

pub async fn suspend_users(_: Admin, directory: web::Data<dyn Directory>, req: web::Json<BulkSuspend>) -> Reply {
    let report = users::suspend_many(directory.get_ref(), &req.user_ids).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": report.failure_count == 0, "report": report })))
}

pub async fn list_roles(_: Admin, directory: web::Data<dyn Directory>) -> Reply {
    Ok(role_list(roles::list(directory.get_ref()).await?))
}

pub async fn search_roles(_: Admin, directory: web::Data<dyn Directory>, query: web::Query<RoleSearch>) -> Reply {
    Ok(role_list(roles::search(directory.get_ref(), &query).await?))
}

pub async fn get_role(_: Admin, directory: web::Data<dyn Directory>, id: web::Path<ID<Role>>) -> Reply {
    Ok(role_reply("Role found", roles::get(directory.get_ref(), *id).await?))
}

pub async fn create_role(_: Admin, directory: web::Data<dyn Directory>, req: web::Json<CreateRole>) -> Reply {
    Ok(role_reply("Role created successfully.", roles::create(directory.get_ref(), &req).await?))
}

pub async fn update_role(
    _: Admin,
    directory: web::Data<dyn Directory>,
    id: web::Path<ID<Role>>,
    req: web::Json<UpdateRole>,
) -> Reply {
    Ok(role_reply("Role updated successfully.", roles::update(directory.get_ref(), *id, &req).await?))
}

pub async fn toggle_role(_: Admin, directory: web::Data<dyn Directory>, id: web::Path<ID<Role>>) -> Reply {
    Ok(role_reply("Role status updated.", roles::toggle(directory.get_ref(), *id).await?))
}

pub async fn delete_role(
    admin: Admin,
    directory: web::Data<dyn Directory>,
    id: web::Path<ID<Role>>,
    query: web::Query<DeleteQuery>,
) -> Reply {
    let removed = roles::delete(directory.get_ref(), *id, query.cascade).await?;
    log::warn!("role {} deleted by {}", *id, admin.claims().sub);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Role deleted successfully.",
        "deleted_users": removed,
    })))
}

/// Registers `/api/users` and `/api/roles`. Fixed segments precede `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/search", web::get().to(search_users))
            .route("/suspend", web::post().to(suspend_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(suspend_user))
            .route("/{id}/suspend", web::post().to(suspend_user))
            .route("/{id}/activate", web::post().to(activate_user))
            .route("/{id}/toggle", web::post().to(toggle_user)),
    )
    .service(
        web::scope("/api/roles")
            .route("", web::get().to(list_roles))
            .route("", web::post().to(create_role))
            .route("/search", web::get().to(search_roles))
            .route("/{id}", web::get().to(get_role))
            .route("/{id}", web::put().to(update_role))
            .route("/{id}", web::delete().to(delete_role))
            .route("/{id}/toggle", web::post().to(toggle_role)),
    );
}
