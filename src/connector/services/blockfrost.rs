//! Blockfrost Cardano chain data: address transactions and UTxOs.
//! Authenticates with the `project_id` header.

use crate::connector::core::{Auth, Connector, ConnectorConfig};
use crate::connector::request::ApiRequest;
use crate::error::AppError;
use reqwest::Method;

pub struct BlockfrostConnector {
    config: ConnectorConfig,
}

impl BlockfrostConnector {
    pub const SERVICE: &'static str = "blockfrost";

    pub fn new(base_url: &str, project_id: Option<String>) -> Self {
        BlockfrostConnector {
            config: ConnectorConfig::new(base_url).maybe_auth(project_id.map(|id| Auth::Header {
                name: "project_id".to_string(),
                value: id,
            })),
        }
    }
}

impl Connector for BlockfrostConnector {
    fn service(&self) -> &'static str {
        Self::SERVICE
    }
    fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

/// Transactions touching one address, newest first.
pub struct GetAddressTransactionsRequest {
    pub address: String,
    pub page: Option<u32>,
}

impl GetAddressTransactionsRequest {
    pub fn new(address: impl Into<String>) -> Self {
        GetAddressTransactionsRequest {
            address: address.into(),
            page: None,
        }
    }
}

impl ApiRequest for GetAddressTransactionsRequest {
    fn service(&self) -> &'static str {
        BlockfrostConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::GET
    }
    fn endpoint(&self) -> Result<String, AppError> {
        if self.address.is_empty() {
            return Err(AppError::Construction("address required for transactions request".into()));
        }
        Ok(format!("/addresses/{}/transactions", self.address))
    }
    fn query(&self) -> Vec<(String, String)> {
        let mut q = vec![("order".to_string(), "desc".to_string())];
        if let Some(page) = self.page {
            q.push(("page".to_string(), page.to_string()));
        }
        q
    }
}

/// Inputs and outputs of one transaction.
pub struct GetTransactionUtxosRequest {
    pub hash: String,
}

impl GetTransactionUtxosRequest {
    pub fn new(hash: impl Into<String>) -> Self {
        GetTransactionUtxosRequest { hash: hash.into() }
    }
}

impl ApiRequest for GetTransactionUtxosRequest {
    fn service(&self) -> &'static str {
        BlockfrostConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::GET
    }
    fn endpoint(&self) -> Result<String, AppError> {
        if self.hash.is_empty() {
            return Err(AppError::Construction("tx hash required for utxos request".into()));
        }
        Ok(format!("/txs/{}/utxos", self.hash))
    }
}
