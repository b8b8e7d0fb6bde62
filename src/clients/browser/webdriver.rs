use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clients::browser::{Browser, ElementHandle};
use crate::config::BrowserConfig;
use crate::{AppError, Result};

const SCROLL_SCRIPT: &str = "arguments[0].scrollIntoView(true);";
const CLICK_SCRIPT: &str = "arguments[0].click();";

/// `Browser` backed by a WebDriver session (chromedriver or Selenium).
pub struct WebDriverBrowser {
    client: Client,
    elements: Mutex<HashMap<u64, Element>>,
    next_id: AtomicU64,
}

impl WebDriverBrowser {
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let mut args = vec![
            format!("--window-size={},{}", config.window_width, config.window_height),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];
        if config.headless {
            args.insert(0, "--headless=new".to_string());
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| AppError::Browser(format!("Failed to start WebDriver session: {}", e)))?;

        info!("WebDriver session started at {}", config.webdriver_url);

        Ok(Self {
            client,
            elements: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    async fn register(&self, element: Element) -> ElementHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.elements.lock().await.insert(id, element);
        ElementHandle::new(id)
    }

    async fn resolve(&self, handle: ElementHandle) -> Result<Element> {
        self.elements
            .lock()
            .await
            .get(&handle.id())
            .cloned()
            .ok_or_else(|| AppError::Browser(format!("Stale element handle {}", handle.id())))
    }

    async fn forget_elements(&self) {
        self.elements.lock().await.clear();
    }

    async fn run_script(&self, script: &str, handle: ElementHandle) -> Result<()> {
        let element = self.resolve(handle).await?;
        let arg = serde_json::to_value(&element)?;
        self.client
            .execute(script, vec![arg])
            .await
            .map_err(|e| AppError::NotInteractable(format!("Script `{}` failed: {}", script, e)))?;
        Ok(())
    }
}

fn lookup_error(selector: &str, err: CmdError) -> AppError {
    AppError::Browser(format!("Lookup of `{}` failed: {}", selector, err))
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.forget_elements().await;
        self.client
            .goto(url)
            .await
            .map_err(|e| AppError::Browser(format!("Navigation to {} failed: {}", url, e)))
    }

    async fn go_back(&self) -> Result<()> {
        self.forget_elements().await;
        self.client
            .back()
            .await
            .map_err(|e| AppError::Browser(format!("History back failed: {}", e)))
    }

    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(self.register(element).await)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(lookup_error(selector, e)),
        }
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let found = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| lookup_error(selector, e))?;

        let mut handles = Vec::with_capacity(found.len());
        for element in found {
            handles.push(self.register(element).await);
        }
        Ok(handles)
    }

    async fn find_child(
        &self,
        parent: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        let parent = self.resolve(parent).await?;
        match parent.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(self.register(element).await)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(lookup_error(selector, e)),
        }
    }

    async fn text(&self, handle: ElementHandle) -> Result<String> {
        let element = self.resolve(handle).await?;
        element
            .text()
            .await
            .map_err(|e| AppError::Browser(format!("Reading element text failed: {}", e)))
    }

    async fn scroll_into_view(&self, handle: ElementHandle) -> Result<()> {
        self.run_script(SCROLL_SCRIPT, handle).await
    }

    async fn click(&self, handle: ElementHandle) -> Result<()> {
        self.run_script(CLICK_SCRIPT, handle).await
    }

    async fn close(&self) -> Result<()> {
        self.forget_elements().await;
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| AppError::Browser(format!("Closing WebDriver session failed: {}", e)))
    }
}
