//! Catalyst reviews API: moderated proposal reviews, paginated.

use crate::connector::core::{Connector, ConnectorConfig};
use crate::connector::request::ApiRequest;
use crate::error::AppError;
use reqwest::Method;

pub struct CatalystReviewsConnector {
    config: ConnectorConfig,
}

impl CatalystReviewsConnector {
    pub const SERVICE: &'static str = "catalyst_reviews";

    pub fn new(base_url: &str) -> Self {
        CatalystReviewsConnector {
            config: ConnectorConfig::new(base_url).header("Accept", "application/json"),
        }
    }
}

impl Connector for CatalystReviewsConnector {
    fn service(&self) -> &'static str {
        Self::SERVICE
    }
    fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

/// One page of filtered proposal reviews.
pub struct GetFilteredProposalReviewsRequest {
    pub page: u32,
    pub page_size: u32,
}

impl GetFilteredProposalReviewsRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        GetFilteredProposalReviewsRequest { page, page_size }
    }
}

impl ApiRequest for GetFilteredProposalReviewsRequest {
    fn service(&self) -> &'static str {
        CatalystReviewsConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::GET
    }
    fn endpoint(&self) -> Result<String, AppError> {
        Ok("/reviews".to_string())
    }
    fn query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ]
    }
}
