//! Saved database connection profiles

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use stowage_store::{Persistable, TypedValidator, ValidationError, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Postgres,
    Mysql,
    Sqlserver,
    Redis,
    Mongodb,
}

impl Driver {
    pub fn default_port(self) -> u16 {
        match self {
            Driver::Postgres => 5432,
            Driver::Mysql => 3306,
            Driver::Sqlserver => 1433,
            Driver::Redis => 6379,
            Driver::Mongodb => 27017,
        }
    }
}

/// A named connection, unique by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    pub driver: Driver,
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub user: Option<String>,
}

impl Persistable for ConnectionProfile {
    const TYPE_NAME: &'static str = "connection_profile";
    type Key = String;

    fn primary_key(&self) -> String {
        self.name.clone()
    }
}

fn check_profile(profile: &ConnectionProfile) -> Result<bool, ValidationError> {
    if profile.name.trim().is_empty() {
        return Err(ValidationError::new("profile name must not be empty"));
    }
    if profile.host.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "profile '{}' has no host",
            profile.name
        )));
    }
    Ok(profile.port != 0)
}

/// Validator installed on the CLI's store
pub fn profile_validator() -> impl Validator {
    TypedValidator::new(check_profile)
}
