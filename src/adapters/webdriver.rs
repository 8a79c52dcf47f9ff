//! Order form driven through a W3C WebDriver server (chromedriver,
//! geckodriver, ...).
//!
//! The protocol is plain JSON over HTTP, so the adapter only needs the
//! shared `reqwest` client. Elements are looked up again on every call;
//! nothing is cached between form operations, which keeps a retried
//! placement working against a reloaded page.

use crate::core::{FormAction, FormDriver, FormLauncher};
use crate::utils::error::{OrderError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// W3C web element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const XPATH: &str = "xpath";
const CSS_SELECTOR: &str = "css selector";

/// Where the pieces of the menu form live on the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormLocators {
    pub items_table: String,
    pub item_rows: String,
    pub row_cells: String,
    pub cell_input: String,
    /// CSS selector, matched fields are filled by position
    pub credential_fields: String,
    pub compute_button: String,
    pub confirm_button: String,
    pub total_field: String,
}

impl Default for FormLocators {
    fn default() -> Self {
        Self {
            items_table: r#"//*[@id="midmid"]/form/table[1]"#.to_string(),
            item_rows: ".//tr".to_string(),
            row_cells: ".//td".to_string(),
            cell_input: ".//input".to_string(),
            credential_fields: ".input2".to_string(),
            compute_button: r#"//*[@id="midmid"]/form/div/input[1]"#.to_string(),
            confirm_button: r#"//*[@id="midmid"]/form/div/input[2]"#.to_string(),
            total_field: r#"//*[@id="summamokrici"]"#.to_string(),
        }
    }
}

/// Opens one browser session per run.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    client: Client,
    server_url: String,
    browser: String,
    headless: bool,
    page_load_timeout: Duration,
    locators: FormLocators,
}

impl WebDriverLauncher {
    pub fn new(
        server_url: &str,
        browser: &str,
        headless: bool,
        page_load_timeout: Duration,
        locators: FormLocators,
    ) -> Self {
        Self {
            client: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            browser: browser.to_string(),
            headless,
            page_load_timeout,
            locators,
        }
    }

    fn capabilities(&self) -> Value {
        let mut always_match = json!({ "browserName": self.browser });
        if self.headless {
            match self.browser.as_str() {
                "chrome" => {
                    always_match["goog:chromeOptions"] = json!({ "args": ["--headless"] });
                }
                "firefox" => {
                    always_match["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
                }
                other => {
                    tracing::warn!("Headless mode is not known for browser '{}'", other);
                }
            }
        }
        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

#[async_trait]
impl FormLauncher for WebDriverLauncher {
    type Driver = WebDriverForm;

    async fn launch(&self) -> Result<WebDriverForm> {
        tracing::debug!("Creating WebDriver session at {}", self.server_url);
        let response = send(
            &self.client,
            Method::POST,
            &format!("{}/session", self.server_url),
            Some(self.capabilities()),
            "new session",
        )
        .await?;

        let session_id = response
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| OrderError::WebDriver {
                command: "new session".to_string(),
                message: "response has no sessionId".to_string(),
            })?;

        let form = WebDriverForm {
            client: self.client.clone(),
            session_url: format!("{}/session/{}", self.server_url, session_id),
            locators: self.locators.clone(),
        };
        tracing::info!("🧭 WebDriver session {} started", session_id);

        if let Err(e) = form.set_page_load_timeout(self.page_load_timeout).await {
            // 已經建立的 session 不能留著
            if let Err(close_error) = form.close().await {
                tracing::warn!(error = %close_error, "Failed to close the new session");
            }
            return Err(e);
        }
        Ok(form)
    }
}

/// One WebDriver session showing the menu form.
#[derive(Debug, Clone)]
pub struct WebDriverForm {
    client: Client,
    session_url: String,
    locators: FormLocators,
}

impl WebDriverForm {
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.session_url, path);
        let name = format!("{} {}", method, path);
        send(&self.client, method, &url, body, &name).await
    }

    async fn set_page_load_timeout(&self, timeout: Duration) -> Result<()> {
        self.command(
            Method::POST,
            "/timeouts",
            Some(json!({ "pageLoad": timeout.as_millis() as u64 })),
        )
        .await?;
        Ok(())
    }

    async fn find_element(&self, using: &str, value: &str) -> Result<String> {
        let found = self
            .command(
                Method::POST,
                "/element",
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        element_id(&found)
    }

    async fn find_elements(&self, using: &str, value: &str) -> Result<Vec<String>> {
        let found = self
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        element_ids(&found)
    }

    async fn find_children(&self, parent: &str, xpath: &str) -> Result<Vec<String>> {
        let found = self
            .command(
                Method::POST,
                &format!("/element/{}/elements", parent),
                Some(json!({ "using": XPATH, "value": xpath })),
            )
            .await?;
        element_ids(&found)
    }

    async fn item_rows(&self) -> Result<Vec<String>> {
        let table = self.find_element(XPATH, &self.locators.items_table).await?;
        self.find_children(&table, &self.locators.item_rows).await
    }

    /// 第 row 列、第 cell 格裡的 input
    async fn cell_input(&self, row: usize, cell: usize) -> Result<String> {
        let rows = self.item_rows().await?;
        let row_id = rows.get(row).ok_or_else(|| {
            OrderError::form(format!("row {} not found, table has {} rows", row, rows.len()))
        })?;

        let cells = self.find_children(row_id, &self.locators.row_cells).await?;
        let cell_id = cells.get(cell).ok_or_else(|| {
            OrderError::form(format!("cell {} not found in row {}", cell, row))
        })?;

        let inputs = self.find_children(cell_id, &self.locators.cell_input).await?;
        inputs
            .into_iter()
            .next()
            .ok_or_else(|| OrderError::form(format!("no input in row {} cell {}", row, cell)))
    }

    async fn type_into(&self, element: &str, value: &str) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/clear", element),
            Some(json!({})),
        )
        .await?;
        self.command(
            Method::POST,
            &format!("/element/{}/value", element),
            Some(json!({ "text": value })),
        )
        .await?;
        Ok(())
    }

    async fn click(&self, element: &str) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl FormDriver for WebDriverForm {
    async fn open(&self, url: &str) -> Result<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        let source = self.command(Method::GET, "/source", None).await?;
        Ok(source.as_str().unwrap_or_default().to_string())
    }

    async fn item_row_count(&self) -> Result<usize> {
        Ok(self.item_rows().await?.len())
    }

    async fn read_cell_input(&self, row: usize, cell: usize) -> Result<String> {
        let input = self.cell_input(row, cell).await?;
        let value = self
            .command(Method::GET, &format!("/element/{}/property/value", input), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn write_cell_input(&self, row: usize, cell: usize, value: &str) -> Result<()> {
        let input = self.cell_input(row, cell).await?;
        self.type_into(&input, value).await
    }

    async fn fill_credential_field(&self, index: usize, value: &str) -> Result<()> {
        let fields = self
            .find_elements(CSS_SELECTOR, &self.locators.credential_fields)
            .await?;
        let field = fields.get(index).ok_or_else(|| {
            OrderError::form(format!(
                "credential field {} not found, form has {}",
                index,
                fields.len()
            ))
        })?;
        self.type_into(field, value).await
    }

    async fn trigger(&self, action: FormAction) -> Result<()> {
        let locator = match action {
            FormAction::ComputeTotal => &self.locators.compute_button,
            FormAction::Confirm => &self.locators.confirm_button,
        };
        let button = self.find_element(XPATH, locator).await?;
        self.click(&button).await
    }

    async fn read_total(&self) -> Result<String> {
        let field = self.find_element(XPATH, &self.locators.total_field).await?;
        let text = self
            .command(Method::GET, &format!("/element/{}/text", field), None)
            .await?;
        Ok(text.as_str().unwrap_or_default().to_string())
    }

    async fn close(&self) -> Result<()> {
        self.command(Method::DELETE, "", None).await?;
        tracing::debug!("WebDriver session closed");
        Ok(())
    }
}

/// Sends one WebDriver command and unwraps the `value` member of the reply.
async fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    command: &str,
) -> Result<Value> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    let mut reply: Value = serde_json::from_str(&text).map_err(|_| OrderError::WebDriver {
        command: command.to_string(),
        message: format!("HTTP {} with non-JSON body: {}", status, text),
    })?;
    let value = reply.get_mut("value").map(Value::take).unwrap_or(Value::Null);

    if !status.is_success() {
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(OrderError::WebDriver {
            command: command.to_string(),
            message: format!("{}: {}", error, message),
        });
    }

    Ok(value)
}

fn element_id(value: &Value) -> Result<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| OrderError::WebDriver {
            command: "find element".to_string(),
            message: format!("unexpected element reference: {}", value),
        })
}

fn element_ids(value: &Value) -> Result<Vec<String>> {
    value
        .as_array()
        .map(|items| items.iter().map(element_id).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}
