//! Mode switching between the static and dynamic branches.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::store::AttributeStore;
use crate::domain::types::BlockType;

#[derive(Debug, Clone)]
pub struct ModeController {
    store: Arc<AttributeStore>,
}

impl ModeController {
    pub fn new(store: Arc<AttributeStore>) -> Self {
        Self { store }
    }

    pub fn mode(&self) -> BlockType {
        self.store.config().block_type
    }

    /// Write `mode` into the store. Static entries and the category selection
    /// are left as they are.
    pub fn set_mode(&self, mode: BlockType) {
        let previous = self.store.update("set_mode", |draft| {
            let previous = draft.config().block_type;
            draft.set_block_type(mode);
            previous
        });
        info!(from = %previous, to = %mode, "block mode changed");
    }

    /// Tag entry point used by the mode buttons. Unknown tags select static.
    pub fn set_mode_tag(&self, tag: &str) -> BlockType {
        let mode = match BlockType::parse_tag(tag) {
            Some(mode) => mode,
            None => {
                debug!(tag, "unrecognized block mode tag; using static");
                BlockType::default()
            }
        };
        self.set_mode(mode);
        mode
    }

    pub fn is_static_active(&self) -> bool {
        match self.mode() {
            BlockType::Static => true,
            BlockType::Dynamic => false,
        }
    }

    pub fn is_dynamic_active(&self) -> bool {
        match self.mode() {
            BlockType::Static => false,
            BlockType::Dynamic => true,
        }
    }
}
