//! Catalyst governance gateway: proposals and voting results per fund.
//! The gateway serves CBOR alongside JSON; responses are requested as JSON
//! here and the raw bytes stay available for CBOR-aware callers.

use crate::connector::core::{Connector, ConnectorConfig};
use crate::connector::request::ApiRequest;
use crate::error::AppError;
use reqwest::Method;

pub struct CatalystGatewayConnector {
    config: ConnectorConfig,
}

impl CatalystGatewayConnector {
    pub const SERVICE: &'static str = "catalyst_gateway";

    pub fn new(base_url: &str) -> Self {
        CatalystGatewayConnector {
            config: ConnectorConfig::new(base_url)
                .header("Accept", "application/json, application/cbor"),
        }
    }
}

impl Connector for CatalystGatewayConnector {
    fn service(&self) -> &'static str {
        Self::SERVICE
    }
    fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

/// Page of proposals for one fund.
pub struct GetFundProposalsRequest {
    pub fund_id: String,
    pub page: u32,
    pub page_size: u32,
}

impl GetFundProposalsRequest {
    pub fn new(fund_id: impl Into<String>, page: u32, page_size: u32) -> Self {
        GetFundProposalsRequest {
            fund_id: fund_id.into(),
            page,
            page_size,
        }
    }
}

impl ApiRequest for GetFundProposalsRequest {
    fn service(&self) -> &'static str {
        CatalystGatewayConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::GET
    }
    fn endpoint(&self) -> Result<String, AppError> {
        if self.fund_id.is_empty() {
            return Err(AppError::Construction("fund id required for proposals request".into()));
        }
        Ok(format!("/funds/{}/proposals", self.fund_id))
    }
    fn query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ]
    }
}

/// Tallied voting results for one fund.
pub struct GetVotingResultsRequest {
    pub fund_id: String,
}

impl GetVotingResultsRequest {
    pub fn new(fund_id: impl Into<String>) -> Self {
        GetVotingResultsRequest {
            fund_id: fund_id.into(),
        }
    }
}

impl ApiRequest for GetVotingResultsRequest {
    fn service(&self) -> &'static str {
        CatalystGatewayConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::GET
    }
    fn endpoint(&self) -> Result<String, AppError> {
        if self.fund_id.is_empty() {
            return Err(AppError::Construction("fund id required for voting results request".into()));
        }
        Ok(format!("/funds/{}/voting-results", self.fund_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::request::resolve_call;

    #[test]
    fn proposals_request_targets_fund_scope() {
        let connector = CatalystGatewayConnector::new("https://gateway.test/api/v1");
        let call = resolve_call(&connector, &GetFundProposalsRequest::new("f12", 3, 100)).unwrap();
        assert_eq!(
            call.url.as_str(),
            "https://gateway.test/api/v1/funds/f12/proposals?page=3&page_size=100"
        );
        assert_eq!(
            call.headers,
            vec![("Accept".to_string(), "application/json, application/cbor".to_string())]
        );
    }

    #[test]
    fn empty_fund_id_fails_before_any_network_activity() {
        let connector = CatalystGatewayConnector::new("https://gateway.test/api/v1");
        assert!(matches!(
            resolve_call(&connector, &GetVotingResultsRequest::new("")),
            Err(AppError::Construction(_))
        ));
    }
}
