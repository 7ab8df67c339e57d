//! The contract every command body implements.

use crate::env::{ParkEnv, StringId};
use crate::state::{Permissions, PlayerId, WorldState};

use super::result::{ActionResult, Status};
use super::visitor::ParameterVisitor;
use super::{ActionFlags, CommandFlags, CommandKind, SessionMode};

/// Everything an action may consult besides the world itself.
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    pub env: ParkEnv<'a>,
    pub actor: Option<PlayerId>,
    pub flags: CommandFlags,
    pub mode: SessionMode,
}

impl<'a> ActionContext<'a> {
    pub fn new(env: ParkEnv<'a>, actor: Option<PlayerId>, flags: CommandFlags) -> Self {
        Self {
            env,
            actor,
            flags,
            mode: SessionMode::Play,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_ghost(&self) -> bool {
        self.flags.contains(CommandFlags::GHOST)
    }
}

/// Output of a successful validation: the preview result plus whatever the
/// apply phase needs so it does not recompute lookups.
#[derive(Clone, Debug)]
pub struct Validated<P> {
    pub result: ActionResult,
    pub plan: P,
}

impl<P> Validated<P> {
    pub fn new(result: ActionResult, plan: P) -> Self {
        Self { result, plan }
    }
}

impl Validated<()> {
    pub fn preview(result: ActionResult) -> Self {
        Self::new(result, ())
    }
}

/// Defines how a command body validates and mutates the world.
///
/// Query runs only [`Self::pre_validate`]; Execute runs it and then
/// [`Self::apply`] on the same state, so query can never accept something
/// execute refuses.
pub trait ActionTransition: Default + Clone {
    /// Data handed from validation to apply.
    type Plan;

    const KIND: CommandKind;

    /// Message identifier describing what this command attempts.
    const TITLE: StringId;

    fn action_flags() -> ActionFlags {
        ActionFlags::empty()
    }

    /// Permission an actor's group must hold. Empty means anyone may issue it.
    fn required_permission() -> Permissions {
        Permissions::empty()
    }

    /// Visits every field, in wire order.
    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor);

    /// Validates against the state **before** mutation and computes the preview.
    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<Self::Plan>, ActionResult>;

    /// Applies the change. Only called right after `pre_validate` succeeded on
    /// the same state.
    fn apply(
        &self,
        validated: Validated<Self::Plan>,
        cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult;

    /// Refusal tagged with this command's title.
    fn refuse(status: Status, detail: StringId) -> ActionResult {
        ActionResult::error(status, Self::TITLE, detail)
    }
}
