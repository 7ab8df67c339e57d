/// Park-wide simulation flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkFlags {
    /// Simulation is paused; only actions allowed while paused are executed.
    pub paused: bool,
    /// Money is disabled: nothing is charged and funds are never checked.
    pub no_money: bool,
}

/// Operator overrides toggled through the cheat command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cheats {
    /// Land ownership is ignored for construction.
    pub sandbox_mode: bool,
    /// Spatial obstruction checks are skipped.
    pub disable_clearance_checks: bool,
    /// Construction may be executed while the park is paused.
    pub build_in_pause_mode: bool,
}
