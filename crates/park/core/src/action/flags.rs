use bitflags::bitflags;

bitflags! {
    /// Static capabilities of a command kind.
    ///
    /// These decide whether the engine attempts an action at all under the
    /// current session conditions.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionFlags: u32 {
        /// May be executed while the park is paused.
        const ALLOW_WHILE_PAUSED = 1 << 0;
        /// Runs only on the issuing participant and is never sent over the network.
        const CLIENT_ONLY        = 1 << 1;
        /// Only valid inside the scenario editor.
        const EDITOR_ONLY        = 1 << 2;
    }
}

bitflags! {
    /// Per-invocation context attached by the caller.
    ///
    /// These change how an action behaves once the engine has decided to run it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CommandFlags: u32 {
        /// Preview placement: never charged, stripped from snapshots.
        const GHOST     = 1 << 0;
        /// Skip the financial deduction; cost is accounted for elsewhere.
        const NO_SPEND  = 1 << 1;
        /// Committing call, as opposed to a wire-level dry run.
        const APPLY     = 1 << 2;
        /// Applied from the network queue.
        const NETWORKED = 1 << 3;
    }
}

impl CommandFlags {
    /// Returns true if a successful execute with these flags books its cost.
    pub const fn charges_funds(self) -> bool {
        !self.intersects(Self::GHOST.union(Self::NO_SPEND))
    }
}

/// Where the session is running; gates editor-only commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Play,
    Editor,
}
