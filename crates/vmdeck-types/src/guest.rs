use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown guest '{id}'. Available guests: {available}")]
    UnknownGuest { id: String, available: String },
}

/// Guest operating system the operator can boot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

impl GuestProfile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Windows guests get a DOS-style prompt instead of a POSIX shell
    pub fn is_windows(&self) -> bool {
        self.id.to_lowercase().starts_with("windows")
    }

    /// Look up a built-in guest by id (case-insensitive)
    pub fn from_catalog(id: &str) -> Result<Self, CatalogError> {
        let wanted = id.trim().to_lowercase();
        GUEST_CATALOG
            .iter()
            .find(|(guest_id, _, _)| *guest_id == wanted)
            .map(|(guest_id, name, description)| {
                GuestProfile::new(*guest_id, *name).with_description(*description)
            })
            .ok_or_else(|| CatalogError::UnknownGuest {
                id: id.to_string(),
                available: GUEST_CATALOG
                    .iter()
                    .map(|(guest_id, _, _)| *guest_id)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// All built-in guests in catalogue order
    pub fn catalog() -> Vec<Self> {
        GUEST_CATALOG
            .iter()
            .map(|(id, name, description)| GuestProfile::new(*id, *name).with_description(*description))
            .collect()
    }
}

impl std::fmt::Display for GuestProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

/// Built-in guests: (id, display name, description)
pub const GUEST_CATALOG: &[(&str, &str, &str)] = &[
    ("linux-mint", "Linux Mint", "User-friendly Linux distribution"),
    ("windows-10", "Windows 10", "Microsoft Windows operating system"),
    ("ubuntu", "Ubuntu", "Popular Linux distribution"),
];
