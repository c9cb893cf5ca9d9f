#![allow(dead_code)]

pub mod mock_engine;
pub mod mock_page;

use ctrlb::bridge::{LocalTabs, TabHandle};
use ctrlb::config::Config;
use ctrlb::Extension;
use mock_engine::MockEngine;
use mock_page::MockPage;
use std::sync::Arc;

pub struct TestContext {
    pub engine: Arc<MockEngine>,
    pub tabs: Arc<LocalTabs>,
    pub tab: TabHandle,
    pub page: MockPage,
    pub extension: Arc<Extension>,
}

impl TestContext {
    /// Streaming controller with one open tab showing `selection`
    pub fn new(engine: MockEngine, selection: &str) -> Self {
        Self::with_config(engine, selection, Config::default())
    }

    /// Batch-mode controller with one open tab showing `selection`
    pub fn batch(engine: MockEngine, selection: &str) -> Self {
        let config = Config {
            streaming: false,
            ..Config::default()
        };
        Self::with_config(engine, selection, config)
    }

    pub fn with_config(engine: MockEngine, selection: &str, config: Config) -> Self {
        let engine = Arc::new(engine);
        let tabs = Arc::new(LocalTabs::new());
        let page = MockPage::with_selection(selection);
        let tab = tabs
            .open_tab(Box::new(page.clone()))
            .expect("Failed to open tab");
        let extension = Arc::new(
            Extension::new(config, engine.clone(), tabs.clone()).expect("Failed to build menu"),
        );

        TestContext {
            engine,
            tabs,
            tab,
            page,
            extension,
        }
    }
}
