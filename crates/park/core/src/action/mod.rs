//! Action domain: the uniform command abstraction.
//!
//! # Module Structure
//!
//! - `flags`: static capability flags and per-invocation context flags
//! - `result`: [`ActionResult`], the [`Status`] taxonomy and payloads
//! - `transition`: the [`ActionTransition`] trait every command body implements
//! - `visitor`: field traversal shared by the codec and reflection
//! - `codec`: bit-exact wire encoding
//! - `registry`: tag to empty-body factories
//! - `kinds`: the concrete command bodies
//!
//! An [`Action`] is an envelope (actor, context flags, network id) around an
//! [`ActionBody`], the closed sum of every command kind. The body is private
//! so the kind of an action can never change after construction.

pub mod codec;
pub mod flags;
pub mod kinds;
pub mod registry;
pub mod result;
pub mod transition;
pub mod visitor;

pub use codec::{CodecError, decode, decode_with, encode};
pub use flags::{ActionFlags, CommandFlags, SessionMode};
pub use kinds::*;
pub use registry::{ActionFactory, ActionRegistry, RegistryError};
pub use result::{ActionResult, NestedSummary, ResultPayload, Status};
pub use transition::{ActionContext, ActionTransition, Validated};
pub use visitor::{
    ParameterError, ParameterList, ParameterValue, ParameterVisitor, assign_parameters,
    collect_parameters,
};

use crate::engine::transition::{drive_execute, drive_query};
use crate::env::StringId;
use crate::state::{NetworkId, Permissions, PlayerId, WorldState};

fn make<T>() -> ActionBody
where
    T: Default + Into<ActionBody>,
{
    T::default().into()
}

macro_rules! define_commands {
    ($( $(#[$meta:meta])* $variant:ident($body:ty) = $tag:literal ),+ $(,)?) => {
        /// Command kind discriminant; its value is the wire tag.
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            strum::Display,
            strum::EnumIter,
            strum::IntoStaticStr,
            strum::FromRepr,
        )]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[strum(serialize_all = "snake_case")]
        #[repr(u32)]
        pub enum CommandKind {
            $( $(#[$meta])* $variant = $tag, )+
        }

        /// Closed sum of every command body.
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum ActionBody {
            $( $variant($body), )+
        }

        impl ActionBody {
            pub fn kind(&self) -> CommandKind {
                match self {
                    $( Self::$variant(_) => CommandKind::$variant, )+
                }
            }

            pub fn action_flags(&self) -> ActionFlags {
                match self {
                    $( Self::$variant(_) => <$body as ActionTransition>::action_flags(), )+
                }
            }

            pub fn required_permission(&self) -> Permissions {
                match self {
                    $( Self::$variant(_) => <$body as ActionTransition>::required_permission(), )+
                }
            }

            pub fn title(&self) -> StringId {
                match self {
                    $( Self::$variant(_) => <$body as ActionTransition>::TITLE, )+
                }
            }

            pub fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
                match self {
                    $( Self::$variant(body) => body.accept_parameters(visitor), )+
                }
            }

            pub(crate) fn query_in(
                &self,
                cx: &ActionContext<'_>,
                world: &WorldState,
                top_level: bool,
            ) -> ActionResult {
                match self {
                    $( Self::$variant(body) => drive_query(body, cx, world, top_level), )+
                }
            }

            pub(crate) fn execute_in(
                &self,
                cx: &ActionContext<'_>,
                world: &mut WorldState,
                top_level: bool,
            ) -> ActionResult {
                match self {
                    $( Self::$variant(body) => drive_execute(body, cx, world, top_level), )+
                }
            }
        }

        $(
            impl From<$body> for ActionBody {
                fn from(body: $body) -> Self {
                    Self::$variant(body)
                }
            }
        )+

        pub(crate) const BUILTIN_FACTORIES: &[(CommandKind, ActionFactory)] = &[
            $( (CommandKind::$variant, make::<$body> as ActionFactory), )+
        ];
    };
}

define_commands! {
    TogglePause(TogglePause) = 0,
    CheatSet(CheatSet) = 1,
    LandSetRights(LandSetRights) = 10,
    LandSetHeight(LandSetHeight) = 11,
    LandRaise(LandRaise) = 12,
    LandLower(LandLower) = 13,
    FootpathPlace(FootpathPlace) = 20,
    FootpathRemove(FootpathRemove) = 21,
    BannerPlace(BannerPlace) = 30,
    BannerRemove(BannerRemove) = 31,
    BannerSetColour(BannerSetColour) = 32,
    BannerSetName(BannerSetName) = 33,
    RideCreate(RideCreate) = 40,
    RideSetStatus(RideSetStatus) = 41,
    RideDemolish(RideDemolish) = 42,
    TrackPlace(TrackPlace) = 43,
    TrackRemove(TrackRemove) = 44,
    PlayerSetGroup(PlayerSetGroup) = 50,
}

impl CommandKind {
    pub const fn tag(self) -> u32 {
        self as u32
    }
}

/// One invocation of a command: the shared envelope plus its typed body.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    /// Issuing participant; `None` for system-issued actions.
    pub actor: Option<PlayerId>,
    pub flags: CommandFlags,
    /// Assigned when the action is queued for transport.
    pub network_id: Option<NetworkId>,
    body: ActionBody,
}

impl Action {
    pub fn new(body: impl Into<ActionBody>) -> Self {
        Self {
            actor: None,
            flags: CommandFlags::empty(),
            network_id: None,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: PlayerId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_network_id(mut self, network_id: NetworkId) -> Self {
        self.network_id = Some(network_id);
        self
    }

    pub fn kind(&self) -> CommandKind {
        self.body.kind()
    }

    pub fn body(&self) -> &ActionBody {
        &self.body
    }

    pub fn action_flags(&self) -> ActionFlags {
        self.body.action_flags()
    }

    /// Snake-case name of the command kind, for logs and file names.
    pub fn as_snake_case(&self) -> &'static str {
        self.kind().into()
    }
}
