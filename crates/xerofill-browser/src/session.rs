//! Thin session layer over chromiumoxide: one browser, one page, and the
//! bounded-poll wait primitives everything else is built from.

use crate::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

/// CSS selector for a Xero `data-automationid` attribute.
pub fn automation_id(id: &str) -> String {
    format!("[data-automationid=\"{id}\"]")
}

/// CSS selector for a Xero `data-name` attribute.
pub fn data_name(name: &str) -> String {
    format!("[data-name=\"{name}\"]")
}

/// Bounds for one polling wait.
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitOptions {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub chrome_path: PathBuf,
    pub profile_dir: PathBuf,
    pub headless: bool,
}

/// One Chrome session bound to a profile directory. Owns the browser
/// process, the CDP handler task, and the page all operations go through.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        tracing::info!(
            "Launching Chrome with profile {}",
            options.profile_dir.display()
        );

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&options.chrome_path)
            .user_data_dir(&options.profile_dir);
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(Error::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The handler stream must be polled for any CDP command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = match browser.pages().await?.first() {
            Some(page) => page.clone(),
            None => browser.new_page("about:blank").await?,
        };

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {url}");
        self.page.goto(url).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    pub async fn find(&self, selector: &str) -> Result<Element> {
        Ok(self.page.find_element(selector).await?)
    }

    pub async fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        Ok(self.page.find_elements(selector).await?)
    }

    /// Wait until `selector` matches an element that is visible and
    /// enabled, and return it.
    pub async fn wait_clickable(&self, selector: &str, wait: &WaitOptions) -> Result<Element> {
        let deadline = Instant::now() + wait.timeout;

        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                if is_interactable(&element).await {
                    return Ok(element);
                }
            }

            if Instant::now() >= deadline {
                return Err(Error::WaitTimeout {
                    what: format!("clickable element {selector}"),
                    timeout: wait.timeout,
                });
            }
            tokio::time::sleep(wait.interval).await;
        }
    }

    /// Wait for the element among `selector`'s matches whose trimmed text
    /// equals `label` exactly.
    pub async fn wait_labelled(
        &self,
        selector: &str,
        label: &str,
        wait: &WaitOptions,
    ) -> Result<Element> {
        let deadline = Instant::now() + wait.timeout;

        loop {
            for element in self.page.find_elements(selector).await.unwrap_or_default() {
                if let Ok(Some(text)) = element.inner_text().await {
                    if text.trim() == label {
                        return Ok(element);
                    }
                }
            }

            if Instant::now() >= deadline {
                return Err(Error::WaitTimeout {
                    what: format!("{selector} labelled {label:?}"),
                    timeout: wait.timeout,
                });
            }
            tokio::time::sleep(wait.interval).await;
        }
    }

    pub async fn wait_url_contains(&self, fragment: &str, wait: &WaitOptions) -> Result<()> {
        self.wait_url_contains_any(&[fragment], wait).await?;
        Ok(())
    }

    /// Wait until the page URL contains one of `fragments`; returns the
    /// index of the fragment that matched.
    pub async fn wait_url_contains_any(
        &self,
        fragments: &[&str],
        wait: &WaitOptions,
    ) -> Result<usize> {
        let deadline = Instant::now() + wait.timeout;

        loop {
            let url = self.current_url().await?;
            if let Some(index) = fragments.iter().position(|f| url.contains(f)) {
                return Ok(index);
            }

            if Instant::now() >= deadline {
                return Err(Error::WaitTimeout {
                    what: format!("URL containing one of {fragments:?} (currently {url})"),
                    timeout: wait.timeout,
                });
            }
            tokio::time::sleep(wait.interval).await;
        }
    }

    /// Wait until two consecutive samples of the texts under `selector`
    /// are identical and non-empty, and return them. Replaces fixed settle
    /// delays after UI actions whose effect lands asynchronously.
    pub async fn wait_list_stable(
        &self,
        selector: &str,
        wait: &WaitOptions,
    ) -> Result<Vec<String>> {
        let deadline = Instant::now() + wait.timeout;
        let mut previous: Option<Vec<String>> = None;

        loop {
            let mut texts = Vec::new();
            for element in self.page.find_elements(selector).await.unwrap_or_default() {
                if let Ok(Some(text)) = element.inner_text().await {
                    texts.push(text);
                }
            }

            if !texts.is_empty() && previous.as_ref() == Some(&texts) {
                return Ok(texts);
            }
            previous = Some(texts);

            if Instant::now() >= deadline {
                return Err(Error::WaitTimeout {
                    what: format!("stable list under {selector}"),
                    timeout: wait.timeout,
                });
            }
            tokio::time::sleep(wait.interval).await;
        }
    }

    /// Click `selector` if it is present; absence is success. Returns
    /// whether anything was clicked.
    pub async fn close_if_present(&self, selector: &str) -> Result<bool> {
        match self.page.find_element(selector).await {
            Ok(element) => {
                element.click().await?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Select the `<select>` option whose visible text equals `label` and
    /// fire a change event, since CDP has no native select support.
    pub async fn select_by_label(&self, selector: &str, label: &str, wait: &WaitOptions) -> Result<()> {
        let element = self.wait_clickable(selector, wait).await?;

        let wanted = serde_json::to_string(label)
            .map_err(|e| Error::Browser(format!("unencodable option label: {e}")))?;
        let select_fn = format!(
            r#"function() {{
                const wanted = {wanted};
                for (const option of this.options) {{
                    if (option.textContent.trim() === wanted) {{
                        this.value = option.value;
                        this.dispatchEvent(new Event("change", {{ bubbles: true }}));
                        return true;
                    }}
                }}
                return false;
            }}"#
        );

        let returns = element.call_js_fn(select_fn, false).await?;
        let matched = returns
            .result
            .value
            .as_ref()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if !matched {
            return Err(Error::Browser(format!(
                "No option labelled {label:?} in {selector}"
            )));
        }
        Ok(())
    }

    /// Close every other tab whose host does not contain `host_fragment`.
    pub async fn close_other_pages(&self, host_fragment: &str) -> Result<()> {
        let own_target = self.page.target_id().clone();

        for page in self.browser.pages().await? {
            if *page.target_id() == own_target {
                continue;
            }

            let url = page.url().await?.unwrap_or_default();
            let host = Url::parse(&url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();

            if !host.contains(host_fragment) {
                tracing::debug!("Closing extraneous tab: {url}");
                let _ = page.close().await;
            }
        }

        Ok(())
    }

    /// Shut the browser down and stop the handler task.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}

/// Visible and enabled, as far as the DOM can tell.
async fn is_interactable(element: &Element) -> bool {
    const PROBE: &str = r#"function() {
        if (this.disabled) return false;
        const rect = this.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    }"#;

    match element.call_js_fn(PROBE, false).await {
        Ok(returns) => returns
            .result
            .value
            .as_ref()
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        Err(_) => false,
    }
}
