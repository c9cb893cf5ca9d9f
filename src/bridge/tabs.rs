//! Tab Messaging
//!
//! Point-to-point delivery from the background controller to one tab's
//! content bridge. [`LocalTabs`] hosts each tab's bridge on its own task;
//! requests and replies cross as serialized JSON.

use super::content::{ContentBridge, Overlay, Page};
use super::messages::{ContentReply, ContentRequest};
use crate::error::{CtrlError, CtrlResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub type TabId = u32;

/// Requests queued per tab before senders wait
const TAB_QUEUE: usize = 32;

/// Delivery surface of the browser
#[async_trait]
pub trait TabMessenger: Send + Sync {
    /// Tab the user is looking at right now
    async fn active_tab(&self) -> CtrlResult<TabId>;

    /// Send `request` to exactly `tab` and wait for its reply
    async fn send(&self, tab: TabId, request: ContentRequest) -> CtrlResult<ContentReply>;
}

/// One request line in flight to a tab
struct Envelope {
    line: String,
    reply: oneshot::Sender<String>,
}

#[derive(Default)]
struct TabsInner {
    next_id: TabId,
    active: Option<TabId>,
    tabs: HashMap<TabId, mpsc::Sender<Envelope>>,
}

/// In-process tab host
#[derive(Default)]
pub struct LocalTabs {
    inner: Mutex<TabsInner>,
}

/// Caller-side handle to an opened tab, used for user actions on the overlay
#[derive(Clone)]
pub struct TabHandle {
    pub id: TabId,
    bridge: Arc<Mutex<ContentBridge>>,
}

impl TabHandle {
    /// Snapshot of the overlay
    pub fn overlay(&self) -> CtrlResult<Overlay> {
        Ok(self.bridge.lock()?.overlay().clone())
    }

    /// User clicked "close"
    pub fn close_overlay(&self) -> CtrlResult<()> {
        self.bridge.lock()?.close();
        Ok(())
    }

    /// User clicked "copy"
    pub fn copy_overlay(&self) -> CtrlResult<()> {
        self.bridge.lock()?.copy()
    }

    /// User edited the overlay text
    pub fn edit_overlay(&self, text: &str) -> CtrlResult<()> {
        self.bridge.lock()?.edit(text);
        Ok(())
    }
}

impl LocalTabs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tab showing `page` and make it active.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open_tab(&self, page: Box<dyn Page>) -> CtrlResult<TabHandle> {
        let bridge = Arc::new(Mutex::new(ContentBridge::new(page)));
        let (tx, mut rx) = mpsc::channel::<Envelope>(TAB_QUEUE);

        let id = {
            let mut inner = self.inner.lock()?;
            inner.next_id += 1;
            let id = inner.next_id;
            inner.tabs.insert(id, tx);
            inner.active = Some(id);
            id
        };

        let task_bridge = bridge.clone();
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                match handle_line(&task_bridge, &envelope.line) {
                    Ok(reply) => {
                        let _ = envelope.reply.send(reply);
                    }
                    Err(e) => warn!("Tab {} rejected request: {}", id, e),
                }
            }
            debug!("Tab {} content bridge stopped", id);
        });

        info!("🗂️ Opened tab {}", id);
        Ok(TabHandle { id, bridge })
    }

    /// Switch the active tab
    pub fn activate(&self, tab: TabId) -> CtrlResult<()> {
        let mut inner = self.inner.lock()?;
        if !inner.tabs.contains_key(&tab) {
            return Err(CtrlError::Delivery {
                tab,
                reason: "no such tab".to_string(),
            });
        }
        inner.active = Some(tab);
        Ok(())
    }

    /// Close (or navigate away from) a tab; its content bridge goes away
    pub fn close_tab(&self, tab: TabId) -> CtrlResult<()> {
        let mut inner = self.inner.lock()?;
        inner.tabs.remove(&tab);
        if inner.active == Some(tab) {
            inner.active = None;
        }
        info!("🗂️ Closed tab {}", tab);
        Ok(())
    }

    fn sender(&self, tab: TabId) -> CtrlResult<mpsc::Sender<Envelope>> {
        self.inner
            .lock()?
            .tabs
            .get(&tab)
            .cloned()
            .ok_or_else(|| CtrlError::Delivery {
                tab,
                reason: "no receiving end".to_string(),
            })
    }
}

#[async_trait]
impl TabMessenger for LocalTabs {
    async fn active_tab(&self) -> CtrlResult<TabId> {
        self.inner.lock()?.active.ok_or_else(|| CtrlError::Delivery {
            tab: 0,
            reason: "no active tab".to_string(),
        })
    }

    async fn send(&self, tab: TabId, request: ContentRequest) -> CtrlResult<ContentReply> {
        let sender = self.sender(tab)?;
        let line = serde_json::to_string(&request)?;
        debug!("📤 tab {} <- {}", tab, line);

        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send(Envelope {
                line,
                reply: reply_tx,
            })
            .await
            .map_err(|_| CtrlError::Delivery {
                tab,
                reason: "tab closed".to_string(),
            })?;

        let reply = reply_rx.await.map_err(|_| CtrlError::Delivery {
            tab,
            reason: "tab closed before replying".to_string(),
        })?;
        Ok(serde_json::from_str(&reply)?)
    }
}

/// Decode one request line, run it through the bridge, encode the reply
fn handle_line(bridge: &Mutex<ContentBridge>, line: &str) -> CtrlResult<String> {
    let request: ContentRequest = serde_json::from_str(line)?;
    let reply = bridge.lock()?.handle(request);
    Ok(serde_json::to_string(&reply)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::content::{OverlayPhase, LOADING_TEXT};

    struct StaticPage(&'static str);

    impl Page for StaticPage {
        fn selected_text(&self) -> String {
            self.0.to_string()
        }

        fn render(&mut self, _overlay: &Overlay) {}

        fn write_clipboard(&mut self, _text: &str) -> CtrlResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_send_reaches_only_target_tab() {
        let tabs = LocalTabs::new();
        let first = tabs.open_tab(Box::new(StaticPage("one"))).unwrap();
        let second = tabs.open_tab(Box::new(StaticPage("two"))).unwrap();
        assert_eq!(tabs.active_tab().await.unwrap(), second.id);

        let reply = tabs
            .send(first.id, ContentRequest::GrabSelectedText)
            .await
            .unwrap();
        assert_eq!(
            reply,
            ContentReply::SelectedText {
                text: "one".to_string()
            }
        );
        assert_eq!(first.overlay().unwrap().text, LOADING_TEXT);
        assert_eq!(second.overlay().unwrap().phase, OverlayPhase::Idle);
    }

    #[tokio::test]
    async fn test_closed_tab_fails_delivery() {
        let tabs = LocalTabs::new();
        let tab = tabs.open_tab(Box::new(StaticPage("x"))).unwrap();
        tabs.close_tab(tab.id).unwrap();

        let err = tabs
            .send(tab.id, ContentRequest::DisplayFailure)
            .await
            .unwrap_err();
        assert!(matches!(err, CtrlError::Delivery { .. }));
        assert!(tabs.active_tab().await.is_err());
    }

    #[tokio::test]
    async fn test_activate_unknown_tab() {
        let tabs = LocalTabs::new();
        assert!(tabs.activate(42).is_err());
    }
}
