//! Scripted in-memory renderer for unit tests

use super::{PageRenderer, RenderError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePage {
    pub html: String,
    pub anchors: Vec<String>,
    pub elements: HashSet<String>,
}

impl FakePage {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            ..Default::default()
        }
    }

    pub fn with_anchors(mut self, anchors: &[&str]) -> Self {
        self.anchors = anchors.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_element(mut self, selector: &str) -> Self {
        self.elements.insert(selector.to_string());
        self
    }
}

/// Serves pages from a map and records every call it receives
#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    pub pages: HashMap<String, FakePage>,
    /// Remaining navigation failures per URL
    pub failures: HashMap<String, u32>,
    /// Selectors whose interactions are rejected with `Unsupported`
    pub unsupported: HashSet<String>,
    pub calls: Vec<String>,
    current: Option<String>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn failing(mut self, url: &str, times: u32) -> Self {
        self.failures.insert(url.to_string(), times);
        self
    }

    pub fn navigations(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| c.strip_prefix("navigate "))
            .collect()
    }

    fn loaded(&self) -> Result<&FakePage, RenderError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .ok_or(RenderError::NoPage)
    }

    fn element(&self, selector: &str) -> Result<(), RenderError> {
        if self.unsupported.contains(selector) {
            return Err(RenderError::Unsupported("interaction"));
        }
        if self.loaded()?.elements.contains(selector) {
            Ok(())
        } else {
            Err(RenderError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.calls.push(format!("navigate {}", url));
        self.current = None;

        if let Some(remaining) = self.failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    message: "connection reset".to_string(),
                });
            }
        }

        if !self.pages.contains_key(url) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "HTTP 404".to_string(),
            });
        }

        self.current = Some(url.to_string());
        Ok(())
    }

    async fn current_html(&mut self) -> Result<String, RenderError> {
        Ok(self.loaded()?.html.clone())
    }

    async fn scroll(&mut self, pixels: i64) -> Result<(), RenderError> {
        self.calls.push(format!("scroll {}", pixels));
        self.loaded().map(|_| ())
    }

    async fn click(&mut self, selector: &str) -> Result<(), RenderError> {
        self.calls.push(format!("click {}", selector));
        self.element(selector)
    }

    async fn fill_input(&mut self, selector: &str, text: &str) -> Result<(), RenderError> {
        self.calls.push(format!("input {} {}", selector, text));
        self.element(selector)
    }

    async fn anchors(&mut self) -> Result<Vec<String>, RenderError> {
        self.calls.push("anchors".to_string());
        Ok(self.loaded()?.anchors.clone())
    }
}
