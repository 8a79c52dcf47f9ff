// Adapters layer: concrete implementations for external systems (spreadsheet over HTTP, browser form over WebDriver).

pub mod http;
pub mod webdriver;
