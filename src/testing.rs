//! Fixtures shared by the unit tests: a scripted page model standing in for
//! the WebDriver session, and a canned completion service.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::ai::{CompletionClient, CompletionRequest};
use crate::clients::browser::{Browser, ElementHandle};
use crate::config::{BrowserConfig, CompletionConfig, Config, ExtractionConfig};
use crate::pipeline::locator::WaitPolicy;
use crate::{AppError, Result};

pub const ANALYSIS_JSON: &str = r#"{
    "analysis": {
        "bet_description": "Number of Starship launches in 2024.",
        "probabilities": "5 launches is priced at 40%.",
        "volume_and_liquidity": "Over $2m traded.",
        "opportunities": "None obvious.",
        "risks": "FAA licensing delays.",
        "additional_info": "Resolves on Dec 31.",
        "summary": "Market leans towards 5 launches."
    }
}"#;

pub fn fast_wait() -> WaitPolicy {
    WaitPolicy {
        element_timeout: Duration::from_millis(20),
        page_timeout: Duration::from_millis(20),
        poll_interval: Duration::from_millis(1),
    }
}

pub fn test_config() -> Config {
    Config {
        completion: CompletionConfig {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            triage_model: "triage".to_string(),
            analysis_model: "analysis".to_string(),
            timeout: Duration::from_secs(1),
        },
        browser: BrowserConfig::default(),
        site_url: "https://polymarket.com".to_string(),
        output_path: PathBuf::from("market_analysis.json"),
        wait: fast_wait(),
        extraction: ExtractionConfig::default(),
    }
}

/// One rendered page state.
#[derive(Debug, Clone, Default)]
pub struct View {
    texts: HashMap<String, String>,
    links: HashMap<String, String>,
    cards: HashMap<String, (String, Vec<Option<String>>)>,
    scroll_failures: HashSet<String>,
    broken: HashSet<String>,
    delayed: HashMap<String, usize>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(selector.into(), text.into());
        self
    }

    /// A clickable element leading to the view registered under `target`.
    pub fn link(
        mut self,
        selector: impl Into<String>,
        text: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let selector = selector.into();
        self.texts.insert(selector.clone(), text.into());
        self.links.insert(selector, target.into());
        self
    }

    /// A list of cards; `None` entries have no readable title child.
    pub fn cards(
        mut self,
        list: impl Into<String>,
        title: impl Into<String>,
        titles: Vec<Option<&str>>,
    ) -> Self {
        let titles = titles.into_iter().map(|t| t.map(str::to_string)).collect();
        self.cards.insert(list.into(), (title.into(), titles));
        self
    }

    pub fn scroll_fails(mut self, selector: impl Into<String>) -> Self {
        self.scroll_failures.insert(selector.into());
        self
    }

    /// Lookups of `selector` error out instead of missing.
    pub fn broken(mut self, selector: impl Into<String>) -> Self {
        self.broken.insert(selector.into());
        self
    }

    /// `selector` is only found from lookup number `lookups + 1` on.
    pub fn appears_after(mut self, selector: impl Into<String>, lookups: usize) -> Self {
        self.delayed.insert(selector.into(), lookups);
        self
    }
}

#[derive(Debug, Clone)]
enum Node {
    Single(String),
    Card { list: String, position: usize },
    CardTitle(String),
}

#[derive(Default)]
struct PageState {
    views: HashMap<String, View>,
    current: Option<String>,
    history: Vec<String>,
    navigations: Vec<String>,
    nodes: HashMap<u64, Node>,
    next_id: u64,
    lookups: HashMap<String, usize>,
    clicks: Vec<String>,
    closed: bool,
}

impl PageState {
    fn view(&self) -> Result<&View> {
        self.current
            .as_ref()
            .and_then(|key| self.views.get(key))
            .ok_or_else(|| AppError::Browser("No page loaded".to_string()))
    }

    fn register(&mut self, node: Node) -> ElementHandle {
        self.next_id += 1;
        self.nodes.insert(self.next_id, node);
        ElementHandle::new(self.next_id)
    }

    fn node(&self, handle: ElementHandle) -> Result<Node> {
        self.nodes
            .get(&handle.id())
            .cloned()
            .ok_or_else(|| AppError::Browser(format!("Stale element handle {}", handle.id())))
    }

    fn show(&mut self, key: &str) -> Result<()> {
        if !self.views.contains_key(key) {
            return Err(AppError::Browser(format!("No fixture for {}", key)));
        }
        if let Some(previous) = self.current.replace(key.to_string()) {
            self.history.push(previous);
        }
        self.nodes.clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBrowser {
    state: Mutex<PageState>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(self, key: impl Into<String>, view: View) -> Self {
        self.state.lock().unwrap().views.insert(key.into(), view);
        self
    }

    /// Loads a view without recording a navigation.
    pub fn open(&self, key: &str) {
        self.state.lock().unwrap().show(key).unwrap();
    }

    pub fn current(&self) -> Option<String> {
        self.state.lock().unwrap().current.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn lookups(&self, selector: &str) -> usize {
        self.state.lock().unwrap().lookups.get(selector).copied().unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.show(url)
    }

    async fn go_back(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let previous = state
            .history
            .pop()
            .ok_or_else(|| AppError::Browser("History is empty".to_string()))?;
        state.current = Some(previous);
        state.nodes.clear();
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        let seen = {
            let count = state.lookups.entry(selector.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        let view = state.view()?;
        if view.broken.contains(selector) {
            return Err(AppError::Browser(format!("Session lost while looking up `{}`", selector)));
        }
        if !view.texts.contains_key(selector) && !view.cards.contains_key(selector) {
            return Ok(None);
        }
        if view.delayed.get(selector).is_some_and(|after| seen <= *after) {
            return Ok(None);
        }
        Ok(Some(state.register(Node::Single(selector.to_string()))))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        let count = match state.view()?.cards.get(selector) {
            Some((_, titles)) => titles.len(),
            None => 0,
        };
        Ok((0..count)
            .map(|position| {
                state.register(Node::Card {
                    list: selector.to_string(),
                    position,
                })
            })
            .collect())
    }

    async fn find_child(
        &self,
        parent: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        let Node::Card { list, position } = state.node(parent)? else {
            return Ok(None);
        };
        let title = match state.view()?.cards.get(&list) {
            Some((child, titles)) if child == selector => titles.get(position).cloned().flatten(),
            _ => None,
        };
        Ok(title.map(|t| state.register(Node::CardTitle(t))))
    }

    async fn text(&self, element: ElementHandle) -> Result<String> {
        let state = self.state.lock().unwrap();
        match state.node(element)? {
            Node::Single(selector) => state
                .view()?
                .texts
                .get(&selector)
                .cloned()
                .ok_or_else(|| AppError::Browser(format!("`{}` is gone", selector))),
            Node::CardTitle(title) => Ok(title),
            Node::Card { .. } => Ok(String::new()),
        }
    }

    async fn scroll_into_view(&self, element: ElementHandle) -> Result<()> {
        let state = self.state.lock().unwrap();
        if let Node::Single(selector) = state.node(element)? {
            if state.view()?.scroll_failures.contains(&selector) {
                return Err(AppError::NotInteractable(format!(
                    "`{}` cannot be scrolled to",
                    selector
                )));
            }
        }
        Ok(())
    }

    async fn click(&self, element: ElementHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let Node::Single(selector) = state.node(element)? else {
            return Ok(());
        };
        state.clicks.push(selector.clone());
        let target = state.view()?.links.get(&selector).cloned();
        match target {
            Some(target) => state.show(&target),
            None => Ok(()),
        }
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Answers completion requests from a queue and records what was asked.
#[derive(Default)]
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, content: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    pub fn fail(self, error: AppError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AppError::ServiceUnavailable(
                    "No scripted response left".to_string(),
                ))
            })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
