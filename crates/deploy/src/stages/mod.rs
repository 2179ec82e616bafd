//! Deployment stages.
//!
//! Each stage deploys one contract and lives in its own submodule with a
//! config struct, its defaults and a `deploy` entry point. The declared
//! order is fixed: the token stage publishes the address the staker stage
//! consumes.

mod staker;
mod token;

pub use staker::{RewardParams, StakerStage};
pub use token::TokenStage;

/// Selector label attached to each stage.
///
/// Tags have no effect inside a stage; the runner uses them to pick which
/// stages of a run to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum StageTag {
    /// The token deployment stage.
    Evlr,
    /// The staker deployment stage.
    Estaker,
}
