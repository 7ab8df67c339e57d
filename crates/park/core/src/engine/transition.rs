//! Per-body drivers shared by top-level and nested dispatch.

use crate::action::{ActionContext, ActionResult, ActionTransition, CommandKind, Status};
use crate::env::StringId;
use crate::finance::Finance;
use crate::state::WorldState;

/// Identifies which stage of the pipeline refused an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    Gate,
    PreValidate,
    Funds,
    Apply,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::Gate => "gate",
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Funds => "funds",
            TransitionPhase::Apply => "apply",
        }
    }
}

fn refused<T: ActionTransition>(phase: TransitionPhase, result: ActionResult) -> ActionResult {
    refused_at(T::KIND, phase, result)
}

pub(crate) fn refused_at(
    kind: CommandKind,
    phase: TransitionPhase,
    result: ActionResult,
) -> ActionResult {
    tracing::trace!(
        target: "park::engine",
        kind = %kind,
        phase = phase.as_str(),
        status = %result.status,
        "refused"
    );
    result
}

/// Top-level affordability check on a validated preview.
fn check_funds<T: ActionTransition>(
    cx: &ActionContext<'_>,
    world: &WorldState,
    preview: &ActionResult,
) -> Result<(), ActionResult> {
    if preview.cost >= 0 || !cx.flags.charges_funds() || world.park.no_money {
        return Ok(());
    }
    if world.finance.can_afford(preview.cost) {
        Ok(())
    } else {
        Err(T::refuse(Status::InsufficientFunds, StringId::NotEnoughCash))
    }
}

/// Validates without mutating. The funds check only applies to top-level calls.
pub(crate) fn drive_query<T: ActionTransition>(
    body: &T,
    cx: &ActionContext<'_>,
    world: &WorldState,
    top_level: bool,
) -> ActionResult {
    let validated = match body.pre_validate(cx, world) {
        Ok(validated) => validated,
        Err(refusal) => return refused::<T>(TransitionPhase::PreValidate, refusal),
    };
    if top_level {
        if let Err(refusal) = check_funds::<T>(cx, world, &validated.result) {
            return refused::<T>(TransitionPhase::Funds, refusal);
        }
    }
    validated.result
}

/// Validates and then applies against the same state.
pub(crate) fn drive_execute<T: ActionTransition>(
    body: &T,
    cx: &ActionContext<'_>,
    world: &mut WorldState,
    top_level: bool,
) -> ActionResult {
    let validated = match body.pre_validate(cx, world) {
        Ok(validated) => validated,
        Err(refusal) => return refused::<T>(TransitionPhase::PreValidate, refusal),
    };
    if top_level {
        if let Err(refusal) = check_funds::<T>(cx, world, &validated.result) {
            return refused::<T>(TransitionPhase::Funds, refusal);
        }
    }
    let result = body.apply(validated, cx, world);
    if result.is_ok() {
        result
    } else {
        refused::<T>(TransitionPhase::Apply, result)
    }
}
