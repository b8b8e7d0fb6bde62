use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::pipeline::locator::WaitPolicy;
use crate::{AppError, Result};

pub const API_KEY_VAR: &str = "GLHF_API_KEY";
pub const BASE_URL_VAR: &str = "COMPLETION_BASE_URL";
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://glhf.chat/api/openai/v1";
pub const DEFAULT_TRIAGE_MODEL: &str = "hf:google/gemma-2-9b-it";
pub const DEFAULT_ANALYSIS_MODEL: &str = "hf:nvidia/Llama-3.1-Nemotron-70B-Instruct-HF";
pub const DEFAULT_OUTPUT_PATH: &str = "market_analysis.json";
const COMPLETION_TIMEOUT_SECS: u64 = 120;

/// What to do when an outcome slot of a multi-outcome layout cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FallbackPolicy {
    /// Give up on the multi-outcome layout entirely and read the
    /// single-outcome layout instead.
    #[default]
    AbandonState,
    /// Skip only the failed slot; the single-outcome layout is read when no
    /// slot produced an outcome.
    SkipSlot,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    /// Used for keyword extraction and relevance filtering.
    pub triage_model: String,
    /// Used for the final narrative analysis.
    pub analysis_model: String,
    pub timeout: Duration,
}

impl CompletionConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which resolves variable names the way
    /// the process environment does.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(format!("{} environment variable not set", API_KEY_VAR))
            })?;

        let base_url =
            lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url,
            triage_model: DEFAULT_TRIAGE_MODEL.to_string(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            timeout: Duration::from_secs(COMPLETION_TIMEOUT_SECS),
        })
    }
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            // Tablet-sized viewport; the positional selectors assume this layout.
            window_width: 820,
            window_height: 1180,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub fallback_policy: FallbackPolicy,
    /// Structural slots holding outcome rows. The first two slots of the
    /// detail view are header and summary regions.
    pub outcome_slots: RangeInclusive<usize>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_policy: FallbackPolicy::default(),
            outcome_slots: 3..=4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub completion: CompletionConfig,
    pub browser: BrowserConfig,
    pub site_url: String,
    pub output_path: PathBuf,
    pub wait: WaitPolicy,
    pub extraction: ExtractionConfig,
}

impl Config {
    /// Defaults for everything except the completion credential, which must
    /// come from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            completion: CompletionConfig::from_env()?,
            browser: BrowserConfig::default(),
            site_url: crate::clients::polymarket::SITE_BASE.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            wait: WaitPolicy::default(),
            extraction: ExtractionConfig::default(),
        })
    }
}
