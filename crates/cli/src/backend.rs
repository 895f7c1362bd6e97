//! Where action requests run: in-process or on a cost agent

use anyhow::{Context, Result};
use cost_analyzer::{
    load_catalog, ActionHandler, CostAnalyzer, PricingCatalog, PricingEntry,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::client::ApiClient;

pub enum Backend {
    Local(ActionHandler),
    Remote(ApiClient),
}

impl Backend {
    /// In-process analyzer over the built-in catalog or a catalog file
    pub fn local(catalog: Option<&Path>, region: Option<&str>) -> Result<Self> {
        let catalog = match catalog {
            Some(path) => load_catalog(path)?,
            None => PricingCatalog::aws_default(),
        };
        let mut analyzer = CostAnalyzer::new(Arc::new(catalog));
        if let Some(region) = region {
            analyzer = analyzer.with_region(region);
        }
        Ok(Backend::Local(ActionHandler::new(analyzer)))
    }

    pub fn remote(api_url: &str) -> Result<Self> {
        Ok(Backend::Remote(ApiClient::new(api_url)?))
    }

    /// Run one action request and decode its result
    pub async fn invoke<T: DeserializeOwned>(&self, request: Value) -> Result<T> {
        let document = match self {
            Backend::Local(handler) => {
                let response = handler.handle_value(request)?;
                serde_json::to_value(response)?
            }
            Backend::Remote(client) => client.invoke(&request).await?,
        };
        serde_json::from_value(document).context("Unexpected response shape")
    }

    pub async fn catalog(&self) -> Result<Vec<PricingEntry>> {
        match self {
            Backend::Local(handler) => Ok(handler
                .analyzer()
                .catalog()
                .entries()
                .into_iter()
                .cloned()
                .collect()),
            Backend::Remote(client) => client.catalog().await,
        }
    }
}
