//! Player identity and tool inventory components.

use serde::{Deserialize, Serialize};

use netrun_logic::tools::{Tool, ToolStage};

/// Who this entity is. The id is the stable key used by the external
/// ledger and persistence; the handle is display flavor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: String,
    pub handle: String,
    pub credits: u32,
}

impl PlayerProfile {
    pub fn new(player_id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            handle: handle.into(),
            credits: 0,
        }
    }
}

/// The tools a player carries into attempts. Maintained by the external
/// store layer; read (and consumed from) by the intrusion engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolInventory {
    pub tools: Vec<Tool>,
}

impl ToolInventory {
    pub fn add(&mut self, tool: Tool) {
        self.tools.push(tool);
    }

    /// Burn consumables used by a resolution of the given stage.
    ///
    /// Cloak consumables count as used too: they modified the stage's
    /// trace gain. Consumption happens whether or not the stage
    /// succeeded. Returns how many tools were removed.
    pub fn consume_used(&mut self, stage: ToolStage) -> usize {
        let before = self.tools.len();
        self.tools
            .retain(|t| !(t.consumable && (t.stage == stage || t.stage == ToolStage::Cloak)));
        before - self.tools.len()
    }
}
