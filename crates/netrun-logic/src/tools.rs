//! Intrusion tools and the builtin store catalog.
//!
//! Tools are bought in the (external) store and carried in the player's
//! inventory. During an attempt, tools bound to the resolving stage reduce
//! the layer's effective strength; cloak tools instead reduce the trace
//! gained by the action. Consumable tools burn on use whether or not the
//! stage succeeds.

use serde::{Deserialize, Serialize};

/// Which part of an attempt a tool applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolStage {
    Scan,
    Exploit,
    Download,
    /// Reduces trace gain rather than defense strength.
    Cloak,
}

/// One piece of intrusion kit in a player's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub stage: ToolStage,
    /// Strength reduction (or trace reduction, for cloaks) in points.
    pub magnitude: f32,
    /// Consumables are removed from inventory on use, success or not.
    pub consumable: bool,
}

impl Tool {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        stage: ToolStage,
        magnitude: f32,
        consumable: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stage,
            magnitude,
            consumable,
        }
    }
}

/// Total effective-strength reduction the inventory provides for a stage.
/// Cloak tools never contribute here.
pub fn stage_reduction(tools: &[Tool], stage: ToolStage) -> f32 {
    if stage == ToolStage::Cloak {
        return 0.0;
    }
    tools
        .iter()
        .filter(|t| t.stage == stage)
        .map(|t| t.magnitude)
        .sum()
}

/// Total trace-gain reduction from cloak tools.
pub fn cloak_reduction(tools: &[Tool]) -> f32 {
    tools
        .iter()
        .filter(|t| t.stage == ToolStage::Cloak)
        .map(|t| t.magnitude)
        .sum()
}

/// The store's standard tool roster.
pub fn builtin_catalog() -> Vec<Tool> {
    vec![
        Tool::new("port_scanner", "Port Scanner", ToolStage::Scan, 8.0, false),
        Tool::new(
            "network_analyzer",
            "Network Analyzer",
            ToolStage::Scan,
            14.0,
            false,
        ),
        Tool::new(
            "password_cracker",
            "Password Cracker",
            ToolStage::Exploit,
            10.0,
            false,
        ),
        Tool::new(
            "exploit_generator",
            "Exploit Generator",
            ToolStage::Exploit,
            20.0,
            true,
        ),
        Tool::new(
            "code_analyzer",
            "Code Analyzer",
            ToolStage::Download,
            12.0,
            false,
        ),
        Tool::new(
            "proxy_router",
            "Proxy Router",
            ToolStage::Cloak,
            4.0,
            false,
        ),
        Tool::new(
            "trace_cleaner",
            "Trace Cleaner",
            ToolStage::Cloak,
            8.0,
            true,
        ),
    ]
}
