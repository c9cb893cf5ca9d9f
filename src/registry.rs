//! Action Registry
//!
//! Menu tree plus dispatch table. Ids form a closed set so a bad menu
//! definition fails at construction; ids arriving from UI events are
//! untrusted and anything unknown is ignored.

use crate::error::{CtrlError, CtrlResult};
use crate::task::Tone;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Keyboard command bound to the default action
pub const GRAB_COMMAND: &str = "grab-selected-text";

const ID_PREFIX: &str = "ctrl-b-";
const TONE_PREFIX: &str = "ctrl-b-tone-";

/// Stable identifier of a menu node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    Main,
    Summarize,
    ImproveWriting,
    BulletPoints,
    ToneMenu,
    Tone(Tone),
}

impl ActionId {
    /// Parse an id raised by a UI event
    pub fn parse(raw: &str) -> Option<ActionId> {
        if let Some(label) = raw.strip_prefix(TONE_PREFIX) {
            return Tone::from_label(label).map(ActionId::Tone);
        }
        match raw.strip_prefix(ID_PREFIX)? {
            "main" => Some(ActionId::Main),
            "summarize" => Some(ActionId::Summarize),
            "improve-writing" => Some(ActionId::ImproveWriting),
            "bullet-points" => Some(ActionId::BulletPoints),
            "tone" => Some(ActionId::ToneMenu),
            _ => None,
        }
    }

    /// Action bound to a keyboard command
    pub fn from_command(command: &str) -> Option<ActionId> {
        match command {
            GRAB_COMMAND => Some(ActionId::Summarize),
            _ => None,
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionId::Main => write!(f, "{ID_PREFIX}main"),
            ActionId::Summarize => write!(f, "{ID_PREFIX}summarize"),
            ActionId::ImproveWriting => write!(f, "{ID_PREFIX}improve-writing"),
            ActionId::BulletPoints => write!(f, "{ID_PREFIX}bullet-points"),
            ActionId::ToneMenu => write!(f, "{ID_PREFIX}tone"),
            ActionId::Tone(tone) => write!(f, "{TONE_PREFIX}{}", tone.label()),
        }
    }
}

/// Zero-argument action bound to a leaf
pub type Action = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// One node of the menu tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: ActionId,
    pub label: String,
    pub parent: Option<ActionId>,
}

/// Menu tree and id -> action table
#[derive(Default)]
pub struct ActionRegistry {
    items: Vec<MenuItem>,
    actions: HashMap<ActionId, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-leaf node (root or submenu)
    pub fn add_menu(&mut self, id: ActionId, label: &str, parent: Option<ActionId>) -> CtrlResult<()> {
        self.push_item(id, label, parent)
    }

    /// Add a leaf and bind its action
    pub fn register(
        &mut self,
        id: ActionId,
        label: &str,
        parent: Option<ActionId>,
        action: Action,
    ) -> CtrlResult<()> {
        self.push_item(id, label, parent)?;
        self.actions.insert(id, action);
        Ok(())
    }

    fn push_item(&mut self, id: ActionId, label: &str, parent: Option<ActionId>) -> CtrlResult<()> {
        if self.contains(id) {
            return Err(CtrlError::Registry(format!("duplicate menu id {id}")));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(CtrlError::Registry(format!(
                    "parent {parent} of {id} is not registered"
                )));
            }
        }
        debug!("Menu item {} -> {:?}", id, label);
        self.items.push(MenuItem {
            id,
            label: label.to_string(),
            parent,
        });
        Ok(())
    }

    pub fn contains(&self, id: ActionId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Menu items in registration (render) order
    pub fn menu(&self) -> &[MenuItem] {
        &self.items
    }

    /// Children of `parent` in render order
    pub fn children(&self, parent: ActionId) -> impl Iterator<Item = &MenuItem> {
        self.items
            .iter()
            .filter(move |item| item.parent == Some(parent))
    }

    /// Look up the action for a raw id. Unknown or non-leaf ids give `None`.
    pub fn action(&self, raw_id: &str) -> Option<Action> {
        let id = ActionId::parse(raw_id)?;
        self.actions.get(&id).cloned()
    }

    /// Run the action bound to `raw_id`; unknown ids are a no-op
    pub async fn dispatch(&self, raw_id: &str) {
        match self.action(raw_id) {
            Some(action) => action().await,
            None => debug!("Ignoring unknown action id {:?}", raw_id),
        }
    }

    /// Run the action bound to a keyboard command; unknown commands are a no-op
    pub async fn dispatch_command(&self, command: &str) {
        match ActionId::from_command(command).and_then(|id| self.actions.get(&id).cloned()) {
            Some(action) => action().await,
            None => debug!("Ignoring unknown command {:?}", command),
        }
    }
}
