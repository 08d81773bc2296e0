//! Role and permission catalog service
//!
//! Roles are seeded at registration and read-only afterwards; the permission
//! strings they grant ride in the JWT claims.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use shared::models::{Action, Resource};

/// Role service
#[derive(Clone)]
pub struct RoleService {
    db: PgPool,
}

/// A role with its permission strings
#[derive(Debug, Serialize)]
pub struct RoleInfo {
    pub id: Uuid,
    pub name: String,
    pub is_system_role: bool,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    is_system_role: bool,
    created_at: DateTime<Utc>,
}

/// The full permission catalog, for role-management UIs
pub fn permission_catalog() -> Vec<String> {
    let resources = [
        Resource::Product,
        Resource::Batch,
        Resource::Dispensary,
        Resource::Order,
        Resource::Report,
        Resource::Insights,
        Resource::User,
        Resource::Role,
        Resource::Business,
    ];
    let actions = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Export,
    ];

    let mut permissions = Vec::with_capacity(resources.len() * actions.len());
    for resource in &resources {
        for action in &actions {
            permissions.push(format!(
                "{}:{}",
                super::auth::resource_str(resource),
                super::auth::action_str(action)
            ));
        }
    }
    permissions
}

impl RoleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List roles for a business with their permission grants
    pub async fn list_roles(&self, business_id: Uuid) -> AppResult<Vec<RoleInfo>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, is_system_role, created_at
            FROM roles
            WHERE business_id = $1
            ORDER BY name
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in rows {
            let permissions = sqlx::query_scalar::<_, String>(
                r#"
                SELECT CONCAT(resource, ':', action)
                FROM role_permissions
                WHERE role_id = $1
                ORDER BY resource, action
                "#,
            )
            .bind(row.id)
            .fetch_all(&self.db)
            .await?;

            roles.push(RoleInfo {
                id: row.id,
                name: row.name,
                is_system_role: row.is_system_role,
                permissions,
                created_at: row.created_at,
            });
        }

        Ok(roles)
    }
}
