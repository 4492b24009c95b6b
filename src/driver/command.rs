//! Inbound control commands
//!
//! The JSON vocabulary a client sends to steer the simulation, e.g.
//! `{"action":"timescale","value":2.0}`.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::simulation::{ConfigUpdate, SimEngine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SimCommand {
    Start,
    Stop,
    Reset,
    Config {
        #[serde(default)]
        data: ConfigUpdate,
    },
    #[serde(rename = "timescale")]
    TimeScale { value: f64 },
}

impl SimCommand {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw.trim()).with_context(|| format!("Invalid command: {}", raw.trim()))
    }

    /// Run the command against the engine
    pub fn apply(&self, engine: &SimEngine) {
        debug!("Applying command {:?}", self);
        match self {
            SimCommand::Start => engine.start(),
            SimCommand::Stop => engine.stop(),
            SimCommand::Reset => engine.reset(),
            SimCommand::Config { data } => engine.update_config(data),
            SimCommand::TimeScale { value } => engine.set_time_scale(*value),
        }
    }
}
