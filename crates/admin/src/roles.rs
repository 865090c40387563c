//! Role administration.
use super::*;
use uam_core::ID;
use uam_directory::Directory;
use uam_directory::DirectoryError;
use uam_directory::Field;
use uam_directory::NewRole;
use uam_directory::Role;
use uam_directory::RoleChanges;

async fn unique(directory: &dyn Directory, field: Field, value: &str, except: Option<ID<Role>>) -> Result<(), AdminError> {
    match directory.taken(field, value, except.map(|id| id.inner())).await? {
        true => Err(AdminError::Duplicate(field)),
        false => Ok(()),
    }
}

pub async fn list(directory: &dyn Directory) -> Result<Vec<Role>, AdminError> {
    Ok(directory.roles().await?)
}

pub async fn search(directory: &dyn Directory, query: &RoleSearch) -> Result<Vec<Role>, AdminError> {
    Ok(directory.search_roles(query.q.trim()).await?)
}

pub async fn get(directory: &dyn Directory, id: ID<Role>) -> Result<Role, AdminError> {
    directory.role(id).await?.ok_or(AdminError::NotFound("Role"))
}

pub async fn create(directory: &dyn Directory, req: &CreateRole) -> Result<Role, AdminError> {
    let name = validate::required("Role name", &req.role_name)?;
    let code = Role::normalize(validate::required("Role code", &req.role_code)?);
    let route = validate::required("Dashboard route", &req.dashboard_route)?;
    unique(directory, Field::RoleCode, &code, None).await?;
    unique(directory, Field::RoleName, name, None).await?;
    let role = directory
        .insert_role(&NewRole {
            name: name.to_string(),
            code,
            route: route.to_string(),
            description: req.description.clone().filter(|d| !d.trim().is_empty()),
        })
        .await?;
    log::info!("created role {}", role.code);
    Ok(role)
}

pub async fn update(directory: &dyn Directory, id: ID<Role>, req: &UpdateRole) -> Result<Role, AdminError> {
    get(directory, id).await?;
    let mut changes = RoleChanges::default();
    if let Some(name) = req.role_name.as_deref() {
        let name = validate::required("Role name", name)?;
        unique(directory, Field::RoleName, name, Some(id)).await?;
        changes.name = Some(name.to_string());
    }
    if let Some(code) = req.role_code.as_deref() {
        let code = Role::normalize(validate::required("Role code", code)?);
        unique(directory, Field::RoleCode, &code, Some(id)).await?;
        changes.code = Some(code);
    }
    if let Some(route) = req.dashboard_route.as_deref() {
        changes.route = Some(validate::required("Dashboard route", route)?.to_string());
    }
    changes.description = req.description.clone().filter(|d| !d.trim().is_empty());
    changes.active = req.is_active;
    if changes.is_empty() {
        return Err(AdminError::invalid("No fields provided for update."));
    }
    directory
        .update_role(id, &changes)
        .await?
        .ok_or(AdminError::NotFound("Role"))
}

pub async fn toggle(directory: &dyn Directory, id: ID<Role>) -> Result<Role, AdminError> {
    let role = get(directory, id).await?;
    let changes = RoleChanges {
        active: Some(!role.active),
        ..RoleChanges::default()
    };
    directory
        .update_role(id, &changes)
        .await?
        .ok_or(AdminError::NotFound("Role"))
}

/// Removes a role. A role still assigned to accounts is kept unless
/// `cascade` is set, in which case those accounts are removed with it.
/// Returns the number of accounts removed.
pub async fn delete(directory: &dyn Directory, id: ID<Role>, cascade: bool) -> Result<u64, AdminError> {
    let role = get(directory, id).await?;
    let assigned = directory.count_accounts_by_role(id).await?;
    let in_use = || {
        AdminError::conflict(format!(
            "Role \"{}\" is assigned to {} user account(s). Reassign them or delete with cascade.",
            role.name, assigned
        ))
    };
    if assigned > 0 && !cascade {
        return Err(in_use());
    }
    match directory.delete_role(id, cascade).await {
        Ok(Some(removed)) => {
            log::warn!("deleted role {} and {} account(s)", role.code, removed);
            Ok(removed)
        }
        Ok(None) => Err(AdminError::NotFound("Role")),
        Err(DirectoryError::Reference) => Err(in_use()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uam_directory::Memory;

    async fn role_description(memory: &Memory, id: ID<Role>) -> Option<String> {
        get(memory, id).await.unwrap().description
    }

    fn auditor() -> CreateRole {
        CreateRole {
            role_name: "Auditor".into(),
            role_code: " auditor ".into(),
            dashboard_route: "/dashboard/audit".into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_normalizes_and_rejects_duplicates() {
        let memory = Memory::seeded().await;
        let role = create(&memory, &auditor()).await.unwrap();
        assert_eq!(role.code, "AUDITOR");
        assert!(role.active);
        assert_eq!(create(&memory, &auditor()).await, Err(AdminError::Duplicate(Field::RoleCode)));
        let mut renamed = auditor();
        renamed.role_code = "AUDIT2".into();
        assert_eq!(create(&memory, &renamed).await, Err(AdminError::Duplicate(Field::RoleName)));
        let mut routeless = auditor();
        routeless.role_code = "AUDIT3".into();
        routeless.role_name = "Auditor 3".into();
        routeless.dashboard_route = " ".into();
        assert!(matches!(create(&memory, &routeless).await, Err(AdminError::Validation(_))));
    }

    #[tokio::test]
    async fn update_and_toggle() {
        let memory = Memory::seeded().await;
        let role = create(&memory, &auditor()).await.unwrap();
        assert!(matches!(
            update(&memory, role.id, &UpdateRole::default()).await,
            Err(AdminError::Validation(_))
        ));
        let clash = UpdateRole {
            role_code: Some("pin".into()),
            ..UpdateRole::default()
        };
        assert_eq!(update(&memory, role.id, &clash).await, Err(AdminError::Duplicate(Field::RoleCode)));
        let routed = UpdateRole {
            dashboard_route: Some("/dashboard/audits".into()),
            ..UpdateRole::default()
        };
        assert_eq!(update(&memory, role.id, &routed).await.unwrap().route, "/dashboard/audits");
        let blank = UpdateRole {
            description: Some("  ".into()),
            ..UpdateRole::default()
        };
        assert!(matches!(update(&memory, role.id, &blank).await, Err(AdminError::Validation(_))));
        assert_eq!(role_description(&memory, role.id).await, None);
        let described = UpdateRole {
            description: Some("Reads the ledgers".into()),
            ..UpdateRole::default()
        };
        update(&memory, role.id, &described).await.unwrap();
        assert_eq!(role_description(&memory, role.id).await.as_deref(), Some("Reads the ledgers"));
        assert!(!toggle(&memory, role.id).await.unwrap().active);
        assert_eq!(search(&memory, &RoleSearch { q: "AUD".into() }).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_rejects_by_default_and_cascades_on_request() {
        let memory = Memory::seeded().await;
        let role = create(&memory, &auditor()).await.unwrap();
        users::create(
            &memory,
            &CreateUser {
                username: "carol".into(),
                password: "pw".into(),
                full_name: "Carol C".into(),
                email: "carol@x.com".into(),
                role_id: role.id,
            },
        )
        .await
        .unwrap();
        assert!(matches!(delete(&memory, role.id, false).await, Err(AdminError::Conflict(_))));
        assert_eq!(delete(&memory, role.id, true).await, Ok(1));
        assert_eq!(delete(&memory, role.id, true).await, Err(AdminError::NotFound("Role")));
        assert_eq!(memory.credential("carol").await, Ok(None));
    }

    #[tokio::test]
    async fn unused_roles_delete_cleanly() {
        let memory = Memory::seeded().await;
        let role = create(&memory, &auditor()).await.unwrap();
        assert_eq!(delete(&memory, role.id, false).await, Ok(0));
        assert_eq!(list(&memory).await.unwrap().len(), 4);
    }
}
