pub mod ai;
pub mod browser;
pub mod polymarket;

pub use ai::{create_completion_client, CompletionClient, CompletionRequest};
pub use browser::{Browser, ElementHandle, WebDriverBrowser};
pub use polymarket::{PositionalSelectors, PolymarketSite};
