use crate::action::{
    ActionContext, ActionFlags, ActionResult, ActionTransition, CommandKind, ParameterVisitor,
    Status, Validated,
};
use crate::env::StringId;
use crate::state::{GroupId, PlayerId, PlayerList, Permissions, WorldState};

/// Moves a player into another permission group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerSetGroup {
    pub player: PlayerId,
    pub group: GroupId,
}

impl ActionTransition for PlayerSetGroup {
    type Plan = ();

    const KIND: CommandKind = CommandKind::PlayerSetGroup;
    const TITLE: StringId = StringId::CantChangePlayerGroup;

    fn action_flags() -> ActionFlags {
        ActionFlags::ALLOW_WHILE_PAUSED
    }

    fn required_permission() -> Permissions {
        Permissions::SET_PLAYER_GROUP
    }

    fn accept_parameters(&mut self, visitor: &mut dyn ParameterVisitor) {
        visitor.visit_u32("player", &mut self.player.0);
        visitor.visit_u8("group", &mut self.group);
    }

    fn pre_validate(
        &self,
        cx: &ActionContext<'_>,
        world: &WorldState,
    ) -> Result<Validated<()>, ActionResult> {
        let players = &world.players;
        let target = players
            .get(self.player)
            .ok_or_else(|| Self::refuse(Status::InvalidParameters, StringId::PlayerNotFound))?;
        if players.group(self.group).is_none() {
            return Err(Self::refuse(
                Status::InvalidParameters,
                StringId::GroupNotFound,
            ));
        }
        if target.is_host {
            return Err(Self::refuse(
                Status::InvalidParameters,
                StringId::CantChangeHostGroup,
            ));
        }

        // Only admins may hand out admin rights.
        if self.group == PlayerList::ADMIN_GROUP {
            if let Some(actor) = cx.actor {
                let actor_group = players.get(actor).map(|player| player.group);
                if actor_group != Some(PlayerList::ADMIN_GROUP) {
                    return Err(Self::refuse(
                        Status::InvalidParameters,
                        StringId::CantSetToThisGroup,
                    ));
                }
            }
        }

        Ok(Validated::preview(ActionResult::ok()))
    }

    fn apply(
        &self,
        validated: Validated<()>,
        _cx: &ActionContext<'_>,
        world: &mut WorldState,
    ) -> ActionResult {
        match world.players.get_mut(self.player) {
            Some(player) => player.group = self.group,
            None => return ActionResult::internal(Self::TITLE, "validated player vanished"),
        }
        tracing::info!(
            target: "park::engine",
            player = %self.player,
            group = self.group,
            "player group changed"
        );
        validated.result
    }
}
