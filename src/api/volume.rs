//! Volume endpoints

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::request::{resource_path, Identifier, Query};
use super::ApiClient;
use crate::types::Filters;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateVolumeOptions {
    /// Daemon picks a random name when unset
    pub name: Option<String>,
    pub driver: Option<String>,
    pub driver_opts: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

impl CreateVolumeOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn with_driver_opt(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.driver_opts.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

impl ApiClient {
    /// `{"Volumes": [...], "Warnings": ...}`
    pub fn volumes(&self, filters: Option<&Filters>) -> Result<Value> {
        self.require("1.21", "volumes")?;
        self.get_json("/volumes", &Query::new().filters(filters))
    }

    pub fn create_volume(&self, options: &CreateVolumeOptions) -> Result<Value> {
        self.require("1.21", "create_volume")?;
        let mut body = Map::new();
        if let Some(ref name) = options.name {
            body.insert("Name".into(), Value::String(name.clone()));
        }
        if let Some(ref driver) = options.driver {
            body.insert("Driver".into(), Value::String(driver.clone()));
        }
        body.insert("DriverOpts".into(), serde_json::to_value(&options.driver_opts)?);
        if !options.labels.is_empty() {
            self.require("1.23", "volume labels")?;
            body.insert("Labels".into(), serde_json::to_value(&options.labels)?);
        }
        self.post_json("/volumes/create", &Query::new(), Some(&Value::Object(body)))
    }

    pub fn inspect_volume(&self, name: &(impl Identifier + ?Sized)) -> Result<Value> {
        self.require("1.21", "inspect_volume")?;
        let path = resource_path("/volumes", name, "")?;
        self.get_json(&path, &Query::new())
    }

    pub fn remove_volume(&self, name: &(impl Identifier + ?Sized)) -> Result<()> {
        self.require("1.21", "remove_volume")?;
        let path = resource_path("/volumes", name, "")?;
        self.delete(&path, &Query::new())
    }
}
