//! Background Controller
//!
//! Resolves a trigger to a task, captures the active tab once, pulls the
//! selection from that tab, runs the engine under the execution guard and
//! forwards every increment (or the failure) back to the same tab.

use crate::bridge::{ContentReply, ContentRequest, TabId, TabMessenger};
use crate::config::Config;
use crate::engine::LlmEngine;
use crate::error::{CtrlError, CtrlResult};
use crate::guard::ExecutionGuard;
use crate::invoker::{InvokeMode, TaskInvoker, TaskOutput};
use crate::registry::{Action, ActionId, ActionRegistry, MenuItem};
use crate::task::{TaskKind, TaskRequest, Tone};
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How one trigger settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another task held the guard
    Dropped,
    /// Result delivered to the tab
    Completed,
    /// Engine failed; failure message shown if the tab was reachable
    EngineFailed,
    /// The tab could not be reached
    DeliveryFailed,
}

pub struct BackgroundController {
    guard: ExecutionGuard,
    invoker: TaskInvoker,
    tabs: Arc<dyn TabMessenger>,
    config: Config,
}

impl BackgroundController {
    pub fn new(config: Config, engine: Arc<dyn LlmEngine>, tabs: Arc<dyn TabMessenger>) -> Self {
        let mode = if config.streaming {
            InvokeMode::Streaming
        } else {
            InvokeMode::Batch
        };
        Self {
            guard: ExecutionGuard::new(),
            invoker: TaskInvoker::new(engine, mode),
            tabs,
            config,
        }
    }

    /// True while a task holds the guard
    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    /// Run `kind` against the active tab, unless a task is already running
    pub async fn run(&self, kind: TaskKind) -> RunOutcome {
        let Some(_permit) = self.guard.try_permit() else {
            info!("⏳ Task already running, dropping {:?}", kind);
            return RunOutcome::Dropped;
        };

        let tab = match self.tabs.active_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                warn!("No tab to run {:?} in: {}", kind, e);
                return RunOutcome::DeliveryFailed;
            }
        };

        info!("▶️ Running {:?} in tab {}", kind, tab);
        match self.execute(tab, kind).await {
            Ok(()) => {
                info!("✅ {:?} finished in tab {}", kind, tab);
                RunOutcome::Completed
            }
            Err(e) if e.is_engine() => {
                error!("❌ LLM task {:?} failed: {}", kind, e);
                if let Err(e) = self.tabs.send(tab, ContentRequest::DisplayFailure).await {
                    warn!("Could not show failure in tab {}: {}", tab, e);
                }
                RunOutcome::EngineFailed
            }
            Err(e) => {
                warn!("⚠️ Delivery to tab {} failed: {}", tab, e);
                RunOutcome::DeliveryFailed
            }
        }
    }

    async fn execute(&self, tab: TabId, kind: TaskKind) -> CtrlResult<()> {
        let text = self.grab_selected_text(tab).await?;
        let request = TaskRequest::new(
            text,
            kind,
            self.config.ollama_model.as_str(),
            self.config.ollama_url.as_str(),
        );

        match self.invoker.invoke(&request).await? {
            TaskOutput::Complete(content) => {
                self.tabs
                    .send(tab, ContentRequest::DisplayResult { content })
                    .await?;
            }
            TaskOutput::Streaming(mut stream) => {
                let mut delivered = 0usize;
                while let Some(chunk) = stream.next().await {
                    self.tabs
                        .send(tab, ContentRequest::DisplayChunk { content: chunk? })
                        .await?;
                    delivered += 1;
                }
                debug!("Streamed {} chunks to tab {}", delivered, tab);
                if delivered == 0 {
                    // Leave the loading placeholder behind
                    self.tabs
                        .send(
                            tab,
                            ContentRequest::DisplayResult {
                                content: String::new(),
                            },
                        )
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn grab_selected_text(&self, tab: TabId) -> CtrlResult<String> {
        match self.tabs.send(tab, ContentRequest::GrabSelectedText).await? {
            ContentReply::SelectedText { text } => Ok(text),
            other => Err(CtrlError::Delivery {
                tab,
                reason: format!("unexpected reply to grab-selected-text: {other:?}"),
            }),
        }
    }

    fn task_action(self: &Arc<Self>, kind: TaskKind) -> Action {
        let controller = Arc::clone(self);
        Arc::new(move || {
            let controller = Arc::clone(&controller);
            async move {
                controller.run(kind).await;
            }
            .boxed()
        })
    }

    /// Build the context menu and dispatch table
    pub fn build_registry(self: &Arc<Self>) -> CtrlResult<ActionRegistry> {
        let mut registry = ActionRegistry::new();
        registry.add_menu(ActionId::Main, "CTRL-B", None)?;

        let tasks = [
            (ActionId::Summarize, "Summarize", TaskKind::Summarize),
            (ActionId::ImproveWriting, "Improve Writing", TaskKind::ImproveWriting),
            (ActionId::BulletPoints, "Bullet Points", TaskKind::BulletPoints),
        ];
        for (id, label, kind) in tasks {
            registry.register(id, label, Some(ActionId::Main), self.task_action(kind))?;
        }

        registry.add_menu(ActionId::ToneMenu, "Change Writing Tone", Some(ActionId::Main))?;
        for tone in Tone::ALL {
            registry.register(
                ActionId::Tone(tone),
                tone.label(),
                Some(ActionId::ToneMenu),
                self.task_action(TaskKind::ChangeTone(tone)),
            )?;
        }

        Ok(registry)
    }
}

/// Controller plus its trigger surface
pub struct Extension {
    controller: Arc<BackgroundController>,
    registry: ActionRegistry,
}

impl Extension {
    pub fn new(config: Config, engine: Arc<dyn LlmEngine>, tabs: Arc<dyn TabMessenger>) -> CtrlResult<Self> {
        let controller = Arc::new(BackgroundController::new(config, engine, tabs));
        let registry = controller.build_registry()?;
        Ok(Self {
            controller,
            registry,
        })
    }

    pub fn controller(&self) -> &Arc<BackgroundController> {
        &self.controller
    }

    pub fn menu(&self) -> &[MenuItem] {
        self.registry.menu()
    }

    /// Keyboard command fired
    pub async fn handle_command(&self, command: &str) {
        debug!("⌨️ Command: {}", command);
        self.registry.dispatch_command(command).await;
    }

    /// Context menu entry clicked
    pub async fn handle_menu_click(&self, menu_item_id: &str) {
        debug!("🖱️ Menu click: {}", menu_item_id);
        self.registry.dispatch(menu_item_id).await;
    }
}
