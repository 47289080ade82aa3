//! Swarm service and task endpoints (API 1.24+)

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::request::{resource_path, Identifier, Query};
use super::ApiClient;
use crate::types::{EndpointSpec, Filters, ServiceMode, TaskTemplate, UpdateConfig};
use crate::Result;

/// Service definition; `task_template` carries the container half
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceOptions {
    pub task_template: TaskTemplate,
    pub name: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub mode: Option<ServiceMode>,
    pub update_config: Option<UpdateConfig>,
    pub networks: Vec<String>,
    pub endpoint_spec: Option<EndpointSpec>,
}

impl ServiceOptions {
    pub fn new(task_template: TaskTemplate) -> Self {
        Self {
            task_template,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_mode(mut self, mode: ServiceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_update_config(mut self, config: UpdateConfig) -> Self {
        self.update_config = Some(config);
        self
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.networks.push(network.into());
        self
    }

    pub fn with_endpoint_spec(mut self, spec: EndpointSpec) -> Self {
        self.endpoint_spec = Some(spec);
        self
    }

    pub(crate) fn to_body(&self) -> Result<Value> {
        let mut data = Map::new();
        data.insert(
            "Name".into(),
            self.name.clone().map(Value::String).unwrap_or(Value::Null),
        );
        data.insert("Labels".into(), serde_json::to_value(&self.labels)?);
        data.insert("TaskTemplate".into(), serde_json::to_value(&self.task_template)?);
        data.insert("Mode".into(), serde_json::to_value(self.mode)?);
        data.insert("UpdateConfig".into(), serde_json::to_value(&self.update_config)?);
        if !self.networks.is_empty() {
            let networks: Vec<Value> = self
                .networks
                .iter()
                .map(|n| serde_json::json!({"Target": n}))
                .collect();
            data.insert("Networks".into(), Value::Array(networks));
        }
        data.insert("EndpointSpec".into(), serde_json::to_value(&self.endpoint_spec)?);
        Ok(Value::Object(data))
    }
}

impl ApiClient {
    pub fn services(&self, filters: Option<&Filters>) -> Result<Vec<Value>> {
        self.require("1.24", "services")?;
        self.get_json("/services", &Query::new().filters(filters))
    }

    /// Returns the new service id
    pub fn create_service(&self, options: &ServiceOptions) -> Result<String> {
        self.require("1.24", "create_service")?;
        let body = options.to_body()?;
        tracing::info!(name = ?options.name, "creating service");
        let created: Value = self.post_json("/services/create", &Query::new(), Some(&body))?;
        Ok(created
            .get("ID")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    pub fn inspect_service(&self, service: &(impl Identifier + ?Sized)) -> Result<Value> {
        self.require("1.24", "inspect_service")?;
        let path = resource_path("/services", service, "")?;
        self.get_json(&path, &Query::new())
    }

    /// Replace the service definition; `version` is the current
    /// `Version.Index`, guarding against concurrent updates
    pub fn update_service(
        &self,
        service: &(impl Identifier + ?Sized),
        version: u64,
        options: &ServiceOptions,
    ) -> Result<()> {
        self.require("1.24", "update_service")?;
        let body = options.to_body()?;
        let path = resource_path("/services", service, "/update")?;
        let query = Query::new().param("version", version);
        self.post_json::<Value, _>(&path, &query, Some(&body)).map(|_| ())
    }

    pub fn remove_service(&self, service: &(impl Identifier + ?Sized)) -> Result<()> {
        self.require("1.24", "remove_service")?;
        let path = resource_path("/services", service, "")?;
        self.delete(&path, &Query::new())
    }

    pub fn tasks(&self, filters: Option<&Filters>) -> Result<Vec<Value>> {
        self.require("1.24", "tasks")?;
        self.get_json("/tasks", &Query::new().filters(filters))
    }

    pub fn inspect_task(&self, task: &(impl Identifier + ?Sized)) -> Result<Value> {
        self.require("1.24", "inspect_task")?;
        let path = resource_path("/tasks", task, "")?;
        self.get_json(&path, &Query::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::{MockTransport, Response};
    use crate::types::ContainerSpec;
    use crate::version::ApiVersion;
    use crate::Error;
    use http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn client(version: &str, transport: MockTransport) -> ApiClient {
        let config = ClientConfig::builder()
            .version(ApiVersion::parse(version).unwrap())
            .build();
        ApiClient::with_transport(Arc::new(transport), &config).unwrap()
    }

    #[test]
    fn test_create_service_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                let body: Value = serde_json::from_slice(&req.body.as_ref().unwrap().data).unwrap();
                req.route() == "/v1.24/services/create"
                    && body["Name"] == "web"
                    && body["TaskTemplate"]["ContainerSpec"]["Image"] == "nginx"
                    && body["Mode"] == json!({"Replicated": {"Replicas": 3}})
                    && body["Networks"] == json!([{"Target": "overlay"}])
            })
            .times(1)
            .returning(|_| Ok(Response::json(StatusCode::CREATED, &json!({"ID": "svc1"}))));

        let opts = ServiceOptions::new(TaskTemplate::new(ContainerSpec::new("nginx")))
            .with_name("web")
            .with_mode(ServiceMode::Replicated(3))
            .with_network("overlay");
        assert_eq!(client("1.24", transport).create_service(&opts).unwrap(), "svc1");
    }

    #[test]
    fn test_update_service_sends_version() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.route() == "/v1.24/services/svc1/update"
                    && req.query_param("version").as_deref() == Some("12")
            })
            .times(1)
            .returning(|_| Ok(Response::empty(StatusCode::OK)));

        let opts = ServiceOptions::new(TaskTemplate::new(ContainerSpec::new("nginx:1.11")));
        client("1.24", transport).update_service("svc1", 12, &opts).unwrap();
    }

    #[test]
    fn test_services_need_1_24() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let api = client("1.23", transport);
        assert!(matches!(api.services(None), Err(Error::InvalidVersion(_))));
        assert!(matches!(api.tasks(None), Err(Error::InvalidVersion(_))));
    }
}
