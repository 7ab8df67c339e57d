//! Session participants and their permission groups.

use std::collections::BTreeMap;

use bitflags::bitflags;

use super::common::PlayerId;

bitflags! {
    /// Capabilities granted to members of a permission group.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Permissions: u32 {
        const TOGGLE_PAUSE      = 1 << 0;
        const TERRAFORM         = 1 << 1;
        const BUILD_PATH        = 1 << 2;
        const BUILD_SCENERY     = 1 << 3;
        const RIDE_CONSTRUCTION = 1 << 4;
        const RIDE_PROPERTIES   = 1 << 5;
        const DEMOLISH_RIDE     = 1 << 6;
        const CHEAT             = 1 << 7;
        const SET_PLAYER_GROUP  = 1 << 8;
        const EDIT_SCENARIO     = 1 << 9;
    }
}

/// Identifier of a permission group.
pub type GroupId = u8;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerGroup {
    pub id: GroupId,
    pub name: String,
    pub permissions: Permissions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub name: String,
    pub group: GroupId,
    /// Set for the participant hosting the session.
    pub is_host: bool,
}

/// Players in the session plus the group table they reference.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerList {
    players: BTreeMap<PlayerId, Player>,
    groups: Vec<PlayerGroup>,
    default_group: GroupId,
}

impl PlayerList {
    pub const ADMIN_GROUP: GroupId = 0;
    pub const SPECTATOR_GROUP: GroupId = 1;
    pub const USER_GROUP: GroupId = 2;

    /// Creates a list holding only the host, with the default group table.
    pub fn with_host(name: impl Into<String>) -> Self {
        let user = Permissions::all()
            - Permissions::SET_PLAYER_GROUP
            - Permissions::CHEAT
            - Permissions::EDIT_SCENARIO;
        let groups = vec![
            PlayerGroup {
                id: Self::ADMIN_GROUP,
                name: "Admin".into(),
                permissions: Permissions::all(),
            },
            PlayerGroup {
                id: Self::SPECTATOR_GROUP,
                name: "Spectator".into(),
                permissions: Permissions::empty(),
            },
            PlayerGroup {
                id: Self::USER_GROUP,
                name: "User".into(),
                permissions: user,
            },
        ];

        let mut players = BTreeMap::new();
        players.insert(
            PlayerId::HOST,
            Player {
                name: name.into(),
                group: Self::ADMIN_GROUP,
                is_host: true,
            },
        );

        Self {
            players,
            groups,
            default_group: Self::SPECTATOR_GROUP,
        }
    }

    /// Registers a joining player in the default group.
    pub fn join(&mut self, id: PlayerId, name: impl Into<String>) {
        self.players.insert(
            id,
            Player {
                name: name.into(),
                group: self.default_group,
                is_host: false,
            },
        );
    }

    pub fn leave(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn group(&self, id: GroupId) -> Option<&PlayerGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// Permissions of a player, empty for unknown players.
    pub fn permissions(&self, id: PlayerId) -> Permissions {
        self.get(id)
            .and_then(|player| self.group(player.group))
            .map(|group| group.permissions)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &Player)> {
        self.players.iter().map(|(id, player)| (*id, player))
    }
}

impl Default for PlayerList {
    fn default() -> Self {
        Self::with_host("Host")
    }
}
