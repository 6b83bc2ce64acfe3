use std::path::PathBuf;

use crate::{DriveError, DriveResult};

/// Environment prefix read by [`DriveConfig::from_env`]
pub const ENV_PREFIX: &str = "DOG_DRIVE__";

pub const DEFAULT_FOLDER_DESCRIPTION: &str = "Backup of files";
pub const DEFAULT_INSERT_DESCRIPTION: &str = "File uploaded by DriveUploader For Windows";
pub const DEFAULT_UPDATE_DESCRIPTION: &str = "File updated by DriveUploader for Windows";

/// Service account the credential provider signs in as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    pub email: String,
    pub private_key_path: PathBuf,
}

/// Configuration for a drive session
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Identifies this client in logs
    pub client_id: String,

    /// User the service account acts on behalf of
    pub user_email: String,

    pub service_account: ServiceAccount,

    /// Title of the folder every upload of the session targets
    pub folder_title: String,

    /// Description given to the folder when it has to be created
    pub folder_description: String,

    /// Description used by inserts that don't set one
    pub insert_description: String,

    /// Description used by updates that don't set one
    pub update_description: String,

    /// Page size requested from listings; `None` leaves it to the service
    pub page_size: Option<u32>,
}

impl DriveConfig {
    /// Create a config with the default descriptions
    pub fn new<C, U, E, K, F>(
        client_id: C,
        user_email: U,
        service_account_email: E,
        service_account_key_path: K,
        folder_title: F,
    ) -> Self
    where
        C: Into<String>,
        U: Into<String>,
        E: Into<String>,
        K: Into<PathBuf>,
        F: Into<String>,
    {
        Self {
            client_id: client_id.into(),
            user_email: user_email.into(),
            service_account: ServiceAccount {
                email: service_account_email.into(),
                private_key_path: service_account_key_path.into(),
            },
            folder_title: folder_title.into(),
            folder_description: DEFAULT_FOLDER_DESCRIPTION.to_string(),
            insert_description: DEFAULT_INSERT_DESCRIPTION.to_string(),
            update_description: DEFAULT_UPDATE_DESCRIPTION.to_string(),
            page_size: None,
        }
    }

    /// Load from `DOG_DRIVE__*` environment variables
    pub fn from_env() -> DriveResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load from `DOG_DRIVE__*` key/value pairs.
    ///
    /// `DOG_DRIVE__FOLDER_TITLE` → `folder_title`. Unknown keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> DriveResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut client_id = None;
        let mut user_email = None;
        let mut account_email = None;
        let mut key_path = None;
        let mut folder_title = None;
        let mut folder_description = None;
        let mut insert_description = None;
        let mut update_description = None;
        let mut page_size = None;

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.into();
            match name.to_lowercase().as_str() {
                "client_id" => client_id = Some(value),
                "user_email" => user_email = Some(value),
                "service_account_email" => account_email = Some(value),
                "service_account_key_path" => key_path = Some(value),
                "folder_title" => folder_title = Some(value),
                "folder_description" => folder_description = Some(value),
                "insert_description" => insert_description = Some(value),
                "update_description" => update_description = Some(value),
                "page_size" => {
                    let size = value.parse::<u32>().map_err(|_| {
                        DriveError::invalid(format!("{}PAGE_SIZE is not a number: {}", ENV_PREFIX, value))
                    })?;
                    page_size = Some(size);
                }
                _ => {}
            }
        }

        let mut config = Self::new(
            required(client_id, "CLIENT_ID")?,
            required(user_email, "USER_EMAIL")?,
            required(account_email, "SERVICE_ACCOUNT_EMAIL")?,
            required(key_path, "SERVICE_ACCOUNT_KEY_PATH")?,
            required(folder_title, "FOLDER_TITLE")?,
        );
        if let Some(description) = folder_description {
            config.folder_description = description;
        }
        if let Some(description) = insert_description {
            config.insert_description = description;
        }
        if let Some(description) = update_description {
            config.update_description = description;
        }
        config.page_size = page_size;

        config.validate()?;
        Ok(config)
    }

    /// Set the folder description used on creation
    pub fn with_folder_description<S: Into<String>>(mut self, description: S) -> Self {
        self.folder_description = description.into();
        self
    }

    /// Set the default insert description
    pub fn with_insert_description<S: Into<String>>(mut self, description: S) -> Self {
        self.insert_description = description.into();
        self
    }

    /// Set the default update description
    pub fn with_update_description<S: Into<String>>(mut self, description: S) -> Self {
        self.update_description = description.into();
        self
    }

    /// Set the listing page size
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Check the invariants a session relies on
    pub fn validate(&self) -> DriveResult<()> {
        if self.folder_title.is_empty() {
            return Err(DriveError::invalid("Folder title must not be empty"));
        }
        if self.page_size == Some(0) {
            return Err(DriveError::invalid("Page size must be at least 1"));
        }
        Ok(())
    }
}

fn required(value: Option<String>, key: &str) -> DriveResult<String> {
    value.ok_or_else(|| DriveError::invalid(format!("Missing {}{}", ENV_PREFIX, key)))
}
