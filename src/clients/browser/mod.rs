pub mod webdriver;

pub use webdriver::WebDriverBrowser;

use crate::Result;
use async_trait::async_trait;

/// Opaque reference to an element of the current page.
///
/// Handles are only valid until the next navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The browser operations the pipeline needs. Lookups are single-shot;
/// waiting is layered on top by `pipeline::locator`.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn go_back(&self) -> Result<()>;
    /// `Ok(None)` when nothing on the page matches.
    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>>;
    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>>;
    async fn find_child(
        &self,
        parent: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>>;
    async fn text(&self, element: ElementHandle) -> Result<String>;
    async fn scroll_into_view(&self, element: ElementHandle) -> Result<()>;
    /// Script-driven click, so overlays cannot intercept it.
    async fn click(&self, element: ElementHandle) -> Result<()>;
    async fn close(&self) -> Result<()>;
}
