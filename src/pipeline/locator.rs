//! Role-based element location on top of a [`Browser`].
//!
//! Extraction code asks for a [`Role`]; a [`SelectorStrategy`] decides how
//! that role is found on the page. Waiting is explicit polling bounded by a
//! [`WaitPolicy`], never a fixed sleep.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::clients::browser::{Browser, ElementHandle};
use crate::{AppError, Result};

/// Sub-elements of one outcome row in the multi-outcome layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotField {
    Title,
    Volume,
    Percentage,
    BuyYes,
    BuyNo,
}

/// Elements of the single-outcome layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingleField {
    Percentage,
    OutcomeType,
    BuyYes,
    BuyNo,
}

/// Every element the pipeline reads or clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// All market cards of the results list.
    MarketCards,
    /// Title of a card, relative to the card element.
    CardTitle,
    /// Clickable title link of the card at `index` (1-based).
    CardLink { index: usize },
    DetailTitle,
    DetailVolume,
    DetailEndDate,
    OutcomeSlot { slot: usize, field: SlotField },
    SingleOutcome(SingleField),
}

pub trait SelectorStrategy: Send + Sync {
    fn selector(&self, role: Role) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Upper bound for a single element to appear.
    pub element_timeout: Duration,
    /// Upper bound for the landmark of a new view to appear after navigation.
    pub page_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_secs(15),
            page_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Repeats `attempt` until it yields a value or `timeout` elapses.
///
/// The attempt always runs at least once, so a zero timeout is a single probe.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut attempt: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = attempt().await? {
            return Ok(Some(value));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(interval.min(deadline - now)).await;
    }
}

#[derive(Clone)]
pub struct PageLocator {
    browser: Arc<dyn Browser>,
    selectors: Arc<dyn SelectorStrategy>,
    wait: WaitPolicy,
}

impl PageLocator {
    pub fn new(
        browser: Arc<dyn Browser>,
        selectors: Arc<dyn SelectorStrategy>,
        wait: WaitPolicy,
    ) -> Self {
        Self {
            browser,
            selectors,
            wait,
        }
    }

    pub fn browser(&self) -> &dyn Browser {
        self.browser.as_ref()
    }

    pub fn selector(&self, role: Role) -> String {
        self.selectors.selector(role)
    }

    /// Single lookup without waiting.
    pub async fn probe(&self, role: Role) -> Result<Option<ElementHandle>> {
        self.browser.find_element(&self.selector(role)).await
    }

    /// Waits up to the element timeout for `role` to be present.
    pub async fn locate(&self, role: Role) -> Result<ElementHandle> {
        let selector = self.selector(role);
        let found = self.wait_for_selector(&selector, self.wait.element_timeout).await?;
        found.ok_or_else(|| AppError::ElementNotFound(format!("{:?} ({})", role, selector)))
    }

    /// Text of `role`, trimmed. Any failure only makes this one field absent.
    pub async fn read_text(&self, role: Role) -> Option<String> {
        let result = async {
            let element = self.locate(role).await?;
            self.browser.text(element).await
        }
        .await;

        match result {
            Ok(text) => Some(text.trim().to_string()),
            Err(e) => {
                warn!("Could not read {:?}: {}", role, e);
                None
            }
        }
    }

    /// Waits up to the page timeout for at least one match; an empty list
    /// means the view never rendered any.
    pub async fn locate_all(&self, role: Role) -> Result<Vec<ElementHandle>> {
        let selector = self.selector(role);
        let browser = self.browser.as_ref();
        let selector_ref = selector.as_str();
        let found = poll_until(self.wait.page_timeout, self.wait.poll_interval, move || async move {
            let elements = browser.find_elements(selector_ref).await?;
            Ok::<_, AppError>((!elements.is_empty()).then_some(elements))
        })
        .await?;
        Ok(found.unwrap_or_default())
    }

    /// Text of `role` inside `parent`, or `None` when the parent has no such
    /// child.
    pub async fn read_child_text(
        &self,
        parent: ElementHandle,
        role: Role,
    ) -> Result<Option<String>> {
        let selector = self.selector(role);
        match self.browser.find_child(parent, &selector).await? {
            Some(child) => Ok(Some(self.browser.text(child).await?.trim().to_string())),
            None => Ok(None),
        }
    }

    /// Waits for the landmark element of a freshly loaded view. Returns
    /// whether it showed up; callers carry on either way.
    pub async fn await_view(&self, landmark: Role) -> bool {
        let selector = self.selector(landmark);
        match self.wait_for_selector(&selector, self.wait.page_timeout).await {
            Ok(Some(_)) => true,
            Ok(None) => {
                warn!(
                    "View landmark {:?} did not appear within {:?}",
                    landmark, self.wait.page_timeout
                );
                false
            }
            Err(e) => {
                warn!("Waiting for {:?} failed: {}", landmark, e);
                false
            }
        }
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<ElementHandle>> {
        debug!("Waiting for `{}`", selector);
        let browser = self.browser.as_ref();
        poll_until(timeout, self.wait.poll_interval, move || browser.find_element(selector)).await
    }
}
