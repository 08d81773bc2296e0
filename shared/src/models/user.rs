//! User and role models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub business_id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role defining permissions within a business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub is_system_role: bool,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
}

/// A permission granting access to a resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub resource: Resource,
    pub actions: Vec<Action>,
}

/// Resources that can be accessed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Product,
    Batch,
    Dispensary,
    Order,
    Report,
    Insights,
    User,
    Role,
    Business,
}

/// Actions that can be performed on resources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Export,
}

/// Default roles created for new businesses
pub fn default_roles() -> Vec<(&'static str, Vec<Permission>)> {
    vec![
        (
            "administrator",
            vec![
                Permission {
                    resource: Resource::Business,
                    actions: vec![
                        Action::View,
                        Action::Create,
                        Action::Edit,
                        Action::Delete,
                        Action::Export,
                    ],
                },
                Permission {
                    resource: Resource::Product,
                    actions: vec![Action::View, Action::Create, Action::Edit, Action::Delete],
                },
                Permission {
                    resource: Resource::Batch,
                    actions: vec![Action::View, Action::Create, Action::Edit, Action::Delete],
                },
                Permission {
                    resource: Resource::Dispensary,
                    actions: vec![Action::View, Action::Create, Action::Edit, Action::Delete],
                },
                Permission {
                    resource: Resource::Order,
                    actions: vec![Action::View, Action::Create, Action::Edit],
                },
                Permission {
                    resource: Resource::Report,
                    actions: vec![Action::View, Action::Export],
                },
                Permission {
                    resource: Resource::Insights,
                    actions: vec![Action::View, Action::Create],
                },
                Permission {
                    resource: Resource::User,
                    actions: vec![Action::View, Action::Create, Action::Edit, Action::Delete],
                },
                Permission {
                    resource: Resource::Role,
                    actions: vec![Action::View],
                },
            ],
        ),
        (
            "sales_representative",
            vec![
                Permission {
                    resource: Resource::Product,
                    actions: vec![Action::View],
                },
                Permission {
                    resource: Resource::Batch,
                    actions: vec![Action::View],
                },
                Permission {
                    resource: Resource::Dispensary,
                    actions: vec![Action::View, Action::Create, Action::Edit],
                },
                Permission {
                    resource: Resource::Order,
                    actions: vec![Action::View, Action::Create],
                },
                Permission {
                    resource: Resource::Report,
                    actions: vec![Action::View],
                },
            ],
        ),
    ]
}
