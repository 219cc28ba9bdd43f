//! Mock driver for unit testing
//!
//! [`MockDriver`] is an in-memory page: a title, a table of locator →
//! element snapshots, and a call history. Elements and titles can be
//! scheduled to appear after a number of polls, and clicks can rewrite the
//! page, which is enough to exercise waits, page helpers and step dispatch
//! without a browser. Clones share the same page.

use crate::config::Viewport;
use crate::driver::{Driver, ElementState};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type ClickEffect = Arc<dyn Fn(&mut MockPage) + Send + Sync>;

/// Elements scheduled to appear once a locator has been queried enough times
#[derive(Debug, Clone)]
struct Reveal {
    after_queries: usize,
    elements: Vec<ElementState>,
}

/// Mutable state behind a [`MockDriver`]
#[derive(Default)]
pub struct MockPage {
    url: String,
    title: String,
    pending_title: Option<(usize, String)>,
    title_reads: usize,
    elements: HashMap<Locator, Vec<ElementState>>,
    reveals: HashMap<Locator, Reveal>,
    query_counts: HashMap<Locator, usize>,
    click_effects: HashMap<Locator, ClickEffect>,
    failing_queries: usize,
    history: Vec<String>,
    viewport: Option<Viewport>,
    closed: bool,
}

impl std::fmt::Debug for MockPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPage")
            .field("url", &self.url)
            .field("title", &self.title)
            .field("elements", &self.elements.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl MockPage {
    /// Replace the page title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.pending_title = None;
    }

    /// Replace every element matching a locator
    pub fn set_elements(&mut self, locator: Locator, elements: Vec<ElementState>) {
        let _ = self.reveals.remove(&locator);
        let _ = self.elements.insert(locator, elements);
    }

    /// Remove every element matching a locator
    pub fn remove_elements(&mut self, locator: &Locator) {
        let _ = self.elements.remove(locator);
        let _ = self.reveals.remove(locator);
    }

    /// Remove every element and reveal
    pub fn clear_elements(&mut self) {
        self.elements.clear();
        self.reveals.clear();
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current form value of a matched element
    #[must_use]
    pub fn value_of(&self, locator: &Locator, index: usize) -> Option<String> {
        self.elements
            .get(locator)
            .and_then(|els| els.get(index))
            .and_then(|el| el.value.clone())
    }

    fn record(&mut self, call: String) {
        self.history.push(call);
    }

    fn element_mut(&mut self, locator: &Locator, index: usize) -> E2eResult<&mut ElementState> {
        self.elements
            .get_mut(locator)
            .and_then(|els| els.get_mut(index))
            .ok_or_else(|| E2eError::StaleElement {
                locator: locator.to_string(),
                index,
            })
    }
}

/// Mock driver for unit testing
#[derive(Clone, Default)]
pub struct MockDriver {
    page: Arc<Mutex<MockPage>>,
}

impl std::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriver").field("page", &*self.lock()).finish()
    }
}

impl MockDriver {
    /// Create new mock driver with an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockPage> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the page directly
    pub fn with_page<R>(&self, f: impl FnOnce(&mut MockPage) -> R) -> R {
        f(&mut self.lock())
    }

    /// Set the page title
    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().set_title(title);
    }

    /// Change the title once it has been read `reads` times
    pub fn set_title_after(&self, reads: usize, title: impl Into<String>) {
        let mut page = self.lock();
        let target = page.title_reads + reads;
        page.pending_title = Some((target, title.into()));
    }

    /// Add one element for a locator
    pub fn add_element(&self, locator: Locator, element: ElementState) {
        self.lock().elements.entry(locator).or_default().push(element);
    }

    /// Replace every element matching a locator
    pub fn set_elements(&self, locator: Locator, elements: Vec<ElementState>) {
        self.lock().set_elements(locator, elements);
    }

    /// Make elements appear after the locator has been queried `queries` times
    pub fn reveal_after(&self, locator: Locator, queries: usize, elements: Vec<ElementState>) {
        let mut page = self.lock();
        let seen = page.query_counts.get(&locator).copied().unwrap_or(0);
        let _ = page.reveals.insert(
            locator,
            Reveal {
                after_queries: seen + queries,
                elements,
            },
        );
    }

    /// Run `effect` against the page whenever the locator is clicked
    pub fn on_click<F>(&self, locator: Locator, effect: F)
    where
        F: Fn(&mut MockPage) + Send + Sync + 'static,
    {
        let _ = self.lock().click_effects.insert(locator, Arc::new(effect));
    }

    /// Make the next `count` queries fail with a script error
    pub fn fail_next_queries(&self, count: usize) {
        self.lock().failing_queries = count;
    }

    /// Call history, e.g. `goto:http://..`, `click:link text 'Rooms'#0`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if a call with this prefix was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }

    /// How many times a locator has been queried
    #[must_use]
    pub fn query_count(&self, locator: &Locator) -> usize {
        self.lock().query_counts.get(locator).copied().unwrap_or(0)
    }

    /// Current form value of a matched element
    #[must_use]
    pub fn value_of(&self, locator: &Locator, index: usize) -> Option<String> {
        self.lock().value_of(locator, index)
    }

    /// Viewport last applied
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.lock().viewport
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut page = self.lock();
        page.record(format!("goto:{url}"));
        page.url = url.to_string();
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        let mut page = self.lock();
        page.title_reads += 1;
        if let Some((target, _)) = &page.pending_title {
            if page.title_reads > *target {
                if let Some((_, title)) = page.pending_title.take() {
                    page.title = title;
                }
            }
        }
        Ok(page.title.clone())
    }

    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementState>> {
        let mut page = self.lock();
        if page.failing_queries > 0 {
            page.failing_queries -= 1;
            return Err(E2eError::script("Execution context was destroyed"));
        }

        let count = {
            let entry = page.query_counts.entry(locator.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        let due = page
            .reveals
            .get(locator)
            .is_some_and(|reveal| count > reveal.after_queries);
        if due {
            if let Some(reveal) = page.reveals.remove(locator) {
                let _ = page.elements.insert(locator.clone(), reveal.elements);
            }
        }

        Ok(page.elements.get(locator).cloned().unwrap_or_default())
    }

    async fn click(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        let effect = {
            let mut page = self.lock();
            let _ = page.element_mut(locator, index)?;
            page.record(format!("click:{locator}#{index}"));
            page.click_effects.get(locator).cloned()
        };
        if let Some(effect) = effect {
            effect(&mut self.lock());
        }
        Ok(())
    }

    async fn clear(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        let mut page = self.lock();
        page.element_mut(locator, index)?.value = Some(String::new());
        page.record(format!("clear:{locator}#{index}"));
        Ok(())
    }

    async fn send_keys(&self, locator: &Locator, index: usize, text: &str) -> E2eResult<()> {
        let mut page = self.lock();
        let element = page.element_mut(locator, index)?;
        if element.tag == "select" {
            if !text.is_empty() {
                element.value = Some(text.to_string());
            }
        } else {
            let mut value = element.value.take().unwrap_or_default();
            value.push_str(text);
            element.value = Some(value);
        }
        page.record(format!("send_keys:{locator}#{index}:{text}"));
        Ok(())
    }

    async fn set_viewport(&self, viewport: Viewport) -> E2eResult<()> {
        let mut page = self.lock();
        page.viewport = Some(viewport);
        page.record(format!("set_viewport:{viewport}"));
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        self.lock().record("screenshot".to_string());
        Ok(Vec::new())
    }

    async fn close(&self) -> E2eResult<()> {
        let mut page = self.lock();
        page.closed = true;
        page.record("close".to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_returns_registered_elements() {
        let driver = MockDriver::new();
        let loc = Locator::tag("h1");
        driver.add_element(loc.clone(), ElementState::new("h1").with_text("Welcome"));

        let found = driver.query(&loc).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Welcome");
        assert_eq!(driver.query_count(&loc), 1);
    }

    #[tokio::test]
    async fn test_reveal_after_queries() {
        let driver = MockDriver::new();
        let loc = Locator::css("table");
        driver.reveal_after(loc.clone(), 2, vec![ElementState::new("table")]);

        assert!(driver.query(&loc).await.unwrap().is_empty());
        assert!(driver.query(&loc).await.unwrap().is_empty());
        assert_eq!(driver.query(&loc).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_title_after_reads() {
        let driver = MockDriver::new();
        driver.set_title("Add new room");
        driver.set_title_after(1, "Room List");

        assert_eq!(driver.title().await.unwrap(), "Add new room");
        assert_eq!(driver.title().await.unwrap(), "Room List");
    }

    #[tokio::test]
    async fn test_click_runs_effect() {
        let driver = MockDriver::new();
        let link = Locator::link_text("Rooms");
        driver.add_element(link.clone(), ElementState::new("a").with_text("Rooms"));
        driver.on_click(link.clone(), |page| page.set_title("Room List"));

        driver.click(&link, 0).await.unwrap();
        assert_eq!(driver.title().await.unwrap(), "Room List");
        assert!(driver.was_called("click:link text 'Rooms'#0"));
    }

    #[tokio::test]
    async fn test_click_missing_element_is_stale() {
        let driver = MockDriver::new();
        let err = driver.click(&Locator::id("nope"), 0).await.unwrap_err();
        assert!(matches!(err, E2eError::StaleElement { index: 0, .. }));
    }

    #[tokio::test]
    async fn test_clear_then_type() {
        let driver = MockDriver::new();
        let field = Locator::name("roomNumber");
        driver.add_element(field.clone(), ElementState::new("input").with_value("999"));

        driver.clear(&field, 0).await.unwrap();
        driver.send_keys(&field, 0, "101").await.unwrap();
        assert_eq!(driver.value_of(&field, 0).as_deref(), Some("101"));
    }

    #[tokio::test]
    async fn test_select_replaces_value() {
        let driver = MockDriver::new();
        let select = Locator::name("hasView");
        driver.add_element(select.clone(), ElementState::new("select").with_value("No"));

        driver.send_keys(&select, 0, "Yes").await.unwrap();
        assert_eq!(driver.value_of(&select, 0).as_deref(), Some("Yes"));
    }

    #[tokio::test]
    async fn test_select_ignores_empty_text() {
        let driver = MockDriver::new();
        let select = Locator::name("hasView");
        driver.add_element(select.clone(), ElementState::new("select").with_value("No"));

        driver.send_keys(&select, 0, "").await.unwrap();
        assert_eq!(driver.value_of(&select, 0).as_deref(), Some("No"));
    }

    #[tokio::test]
    async fn test_failing_queries_then_recover() {
        let driver = MockDriver::new();
        driver.fail_next_queries(1);
        let loc = Locator::tag("h1");
        assert!(driver.query(&loc).await.unwrap_err().is_transient());
        assert!(driver.query(&loc).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_and_viewport_recorded() {
        let driver = MockDriver::new();
        driver
            .set_viewport(Viewport { width: 1920, height: 1080 })
            .await
            .unwrap();
        driver.close().await.unwrap();
        assert!(driver.is_closed());
        assert_eq!(driver.history(), vec!["set_viewport:1920x1080", "close"]);
    }
}
