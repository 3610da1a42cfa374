//! One canonical connector + request pair per external service.

pub mod blockfrost;
pub mod gateway;
pub mod ollama;
pub mod openai;
pub mod reviews;
pub mod vimeo;
pub mod youtube;

pub use blockfrost::BlockfrostConnector;
pub use gateway::CatalystGatewayConnector;
pub use ollama::OllamaConnector;
pub use openai::OpenAiConnector;
pub use reviews::CatalystReviewsConnector;
pub use vimeo::VimeoConnector;
pub use youtube::YouTubeConnector;
