//! Park-wide toggles: pause and cheats.

use crate::action::{
    ActionContext, ActionFlags, ActionResult, ActionTransition, CommandKind, ParameterVisitor,
    Status, Validated,
};
use crate::config::EngineConfig;
use crate::env::StringId;
use crate::finance::{Finance, Money};
use crate::state::{Permissions, WorldState};

/// Flips the pause flag. Always allowed while paused, otherwise nobody could unpause.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TogglePause;

impl ActionTransition for TogglePause {
    type Plan = ();

    const KIND: CommandKind = CommandKind::TogglePause;
    const TITLE: StringId = StringId::CantPauseGame;

    fn action_flags() -> ActionFlags {
        ActionFlags::ALLOW_WHILE_PAUSED
    }

    fn required_permission() -> Permissions {
        Permissions::TOGGLE_PAUSE
    }

    fn accept_parameters(&mut self, _visitor: &mut dyn ParameterVisitor) {}

    fn pre_validate(
        &self,
        _cx: &ActionContext<'_>,
        _world: &WorldState,
    ) -> Result<Validated<()>, ActionResult> {
        Ok(Validated::preview(ActionResult::ok()))
    }

    fn apply(
        &self,
        validated: Validated<()>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        world.park.paused = !world.park.paused;
        tracing::info!(target: "park::engine", paused = world.park.paused, "pause toggled");
        validated.result
    }
}

/// Operator override selected by [`CheatSet::cheat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum CheatKind {
    SandboxMode = 0,
    DisableClearanceChecks = 1,
    BuildInPauseMode = 2,
    NoMoney = 3,
    AddMoney = 4,
    SetMoney = 5,
}

impl CheatKind {
    /// Inclusive ranges accepted for `(param1, param2)`.
    fn parameter_range(self) -> ((i32, i32), (i32, i32)) {
        match self {
            CheatKind::SandboxMode
            | CheatKind::DisableClearanceChecks
            | CheatKind::BuildInPauseMode
            | CheatKind::NoMoney => ((0, 1), (0, 0)),
            CheatKind::AddMoney => (
                (-EngineConfig::MAX_CHEAT_MONEY, EngineConfig::MAX_CHEAT_MONEY),
                (0, 0),
            ),
            CheatKind::SetMoney => ((0, EngineConfig::MAX_CHEAT_MONEY), (0, 0)),
        }
    }
}

/// Sets one cheat. Toggles take `param1` as 0/1; money cheats take an amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CheatSet {
    pub cheat: u8,
    pub param1: i32,
    pub param2: i32,
}

impl CheatSet {
    pub fn new(cheat: CheatKind, param1: i32) -> Self {
        Self {
            cheat: cheat as u8,
            param1,
            param2: 0,
        }
    }
}

impl ActionTransition for CheatSet {
    type Plan = CheatKind;

    const KIND: CommandKind = CommandKind::CheatSet;
    const TITLE: StringId = StringId::CantSetCheat;

    fn action_flags() -> ActionFlags {
        ActionFlags::ALLOW_WHILE_PAUSED
    }

    fn required_permission() -> Permissions {
        Permissions::CHEAT
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u8("cheat", &mut self.cheat);
        visitor.visit_i32("param1", &mut self.param1);
        visitor.visit_i32("param2", &mut self.param2);
    }

    fn pre_validate(
        &self,
        _cx: &ActionContext<'_>,
        _world: &WorldState,
    ) -> Result<Validated<CheatKind>, ActionResult> {
        let kind = CheatKind::from_repr(self.cheat)
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::InvalidCheat))?;

        let ((min1, max1), (min2, max2)) = kind.parameter_range();
        if !(min1..=max1).contains(&self.param1) || !(min2..=max2).contains(&self.param2) {
            return Err(Self::refuse(
                Status::InvalidParameters,
                StringId::ValueOutOfRange,
            ));
        }

        Ok(Validated::new(ActionResult::ok(), kind))
    }

    fn apply(
        &self,
        validated: Validated<CheatKind>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        let enabled = self.param1 != 0;
        match validated.plan {
            CheatKind::SandboxMode => world.cheats.sandbox_mode = enabled,
            CheatKind::DisableClearanceChecks => world.cheats.disable_clearance_checks = enabled,
            CheatKind::BuildInPauseMode => world.cheats.build_in_pause_mode = enabled,
            CheatKind::NoMoney => world.park.no_money = enabled,
            // Money cheats move cash directly; they are not an expense.
            CheatKind::AddMoney => {
                let cash = world.finance.funds().saturating_add(Money::from(self.param1));
                world.finance.set_cash(cash);
            }
            CheatKind::SetMoney => world.finance.set_cash(Money::from(self.param1)),
        }
        tracing::info!(target: "park::engine", cheat = %validated.plan, param1 = self.param1, "cheat set");
        validated.result
    }
}
