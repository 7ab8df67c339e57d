//! Single-writer session driving the engine from the tick thread.
//!
//! A [`Session`] owns the authoritative [`WorldState`], the network queue and
//! the oracles. Locally originated commands are queried, stamped with a
//! network id and scheduled `input_delay_ticks` ahead; remote ones arrive
//! through [`Session::receive`] or a [`QueueSender`]. Every participant that
//! feeds the same entries at the same ticks ends in the same state.
//!
//! A server applies its own commands and everything it receives, relaying
//! each accepted entry to the clients. A client only sends: its commands are
//! applied when the server's relay comes back, and the callback parked at
//! submit time is attached to that echo.

use std::collections::HashMap;
use std::sync::Arc;

use park_core::{
    Action, ActionFlags, ActionResult, CommandFlags, EnglishStrings, Env, LocalisationOracle,
    NetworkId, ObjectOracle, ParkEngine, ParkEnv, PlayerId, StaticObjects, Tick, WorldState,
    decode, encode,
};

use crate::config::{NetworkMode, RuntimeConfig};
use crate::error::Result;
use crate::events::{EventBus, SessionEvent};
use crate::queue::{ActionQueue, Completion, ProcessReport, QueueSender};
use crate::repository::ActionLogEntry;

/// Outbound wire payload for remote participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub tick: Tick,
    pub payload: Vec<u8>,
}

pub struct Session {
    world: WorldState,
    config: RuntimeConfig,
    queue: ActionQueue,
    events: EventBus,
    objects: Arc<dyn ObjectOracle>,
    strings: Arc<dyn LocalisationOracle>,
    current_tick: Tick,
    next_network_id: NetworkId,
    outbound: Vec<Packet>,
    local_player: Option<PlayerId>,
    /// Client callbacks waiting for the server's echo. Network ids are only
    /// unique per participant, so the actor is part of the key.
    pending: HashMap<(Option<PlayerId>, NetworkId), Completion>,
}

fn park_env<'a>(
    objects: &'a Arc<dyn ObjectOracle>,
    strings: &'a Arc<dyn LocalisationOracle>,
) -> ParkEnv<'a> {
    let objects: &'a (dyn ObjectOracle + 'a) = objects.as_ref();
    let strings: &'a (dyn LocalisationOracle + 'a) = strings.as_ref();
    Env::with_all(objects, strings)
}

impl Session {
    /// Starts a session over `world` with the built-in object and string tables.
    pub fn new(world: WorldState, config: RuntimeConfig) -> Self {
        Self::with_oracles(
            world,
            config,
            Arc::new(StaticObjects::default()),
            Arc::new(EnglishStrings),
        )
    }

    /// Starts a session on a fresh park built from `config.engine`.
    pub fn from_config(config: RuntimeConfig) -> Self {
        let world = WorldState::new(&config.engine);
        Self::new(world, config)
    }

    pub fn with_oracles(
        world: WorldState,
        config: RuntimeConfig,
        objects: Arc<dyn ObjectOracle>,
        strings: Arc<dyn LocalisationOracle>,
    ) -> Self {
        Self {
            world,
            queue: ActionQueue::new(config.discard_stale),
            events: EventBus::with_capacity(config.event_buffer_size),
            config,
            objects,
            strings,
            current_tick: Tick::ZERO,
            next_network_id: NetworkId(0),
            outbound: Vec::new(),
            local_player: None,
            pending: HashMap::new(),
        }
    }

    /// Stamps `player` as the actor of submitted commands that carry none.
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.local_player = Some(player);
        self
    }

    pub fn local_player(&self) -> Option<PlayerId> {
        self.local_player
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Consistent copy of the world for readers off the tick thread.
    pub fn snapshot(&self) -> WorldState {
        self.world.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    /// Tick the next [`Session::tick`] call processes.
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Producer handle for a transport thread.
    pub fn sender(&self) -> QueueSender {
        self.queue.sender()
    }

    /// Validates `action` against the current world without touching it.
    pub fn query(&self, action: &Action) -> ActionResult {
        let env = park_env(&self.objects, &self.strings);
        park_core::query(&self.world, env, self.config.session_mode, action)
    }

    /// Submits a locally originated command.
    ///
    /// The command is stamped `APPLY` and queried first; a refusal is
    /// returned without queueing it. Client-only commands and ghosts are
    /// executed immediately and never sent. Everything else gets a network
    /// id and is scheduled `input_delay_ticks` ahead: queued locally unless
    /// this is a client, and encoded for the transport unless this is single
    /// player. The returned result is the Query preview (or the Execute
    /// result for local-only commands); the callback receives the Execute
    /// result.
    ///
    /// # Errors
    ///
    /// Fails only if a networked command cannot be encoded; it is not queued then.
    pub fn submit(&mut self, mut action: Action, callback: Option<Completion>) -> Result<ActionResult> {
        if action.actor.is_none() {
            action.actor = self.local_player;
        }
        action.flags |= CommandFlags::APPLY;

        let preview = self.query(&action);
        if !preview.is_ok() {
            return Ok(preview);
        }

        if action.action_flags().contains(ActionFlags::CLIENT_ONLY)
            || action.flags.contains(CommandFlags::GHOST)
        {
            let result = self.execute(&action);
            if let Some(callback) = callback {
                callback(&action, &result);
            }
            return Ok(result);
        }

        let network_id = self.next_network_id;
        self.next_network_id = network_id.next();
        action.network_id = Some(network_id);
        let tick = self.current_tick + self.config.input_delay_ticks;

        match self.config.network_mode {
            NetworkMode::None => {
                self.queue.enqueue(tick, action, callback);
            }
            NetworkMode::Server => {
                self.outbound.push(Packet {
                    tick,
                    payload: encode(&action)?,
                });
                self.queue.enqueue(tick, action, callback);
            }
            NetworkMode::Client => {
                self.outbound.push(Packet {
                    tick,
                    payload: encode(&action)?,
                });
                if let Some(callback) = callback {
                    self.pending.insert((action.actor, network_id), callback);
                }
            }
        }
        Ok(preview)
    }

    /// Accepts a command from a remote participant for `tick`.
    ///
    /// A server applies late arrivals at its current tick and relays every
    /// accepted entry. A client re-attaches the callback of its own command
    /// when the echo arrives.
    ///
    /// # Errors
    ///
    /// Returns a codec error for undecodable bytes; nothing is queued then.
    pub fn receive(&mut self, tick: Tick, bytes: &[u8]) -> Result<()> {
        let action = decode(bytes)?;
        self.accept_remote(tick, action)
    }

    /// Same as [`Session::receive`], with the actor taken from the connection
    /// rather than the payload.
    ///
    /// # Errors
    ///
    /// Returns a codec error for undecodable bytes; nothing is queued then.
    pub fn receive_from(&mut self, player: PlayerId, tick: Tick, bytes: &[u8]) -> Result<()> {
        let mut action = decode(bytes)?;
        action.actor = Some(player);
        self.accept_remote(tick, action)
    }

    fn accept_remote(&mut self, tick: Tick, mut action: Action) -> Result<()> {
        action.flags |= CommandFlags::NETWORKED;
        match self.config.network_mode {
            NetworkMode::None => {
                self.queue.enqueue(tick, action, None);
            }
            NetworkMode::Server => {
                let tick = tick.max(self.current_tick);
                self.outbound.push(Packet {
                    tick,
                    payload: encode(&action)?,
                });
                self.queue.enqueue(tick, action, None);
            }
            NetworkMode::Client => {
                let callback = action
                    .network_id
                    .and_then(|id| self.pending.remove(&(action.actor, id)));
                self.queue.enqueue(tick, action, callback);
            }
        }
        Ok(())
    }

    /// Client commands sent but not yet echoed back by the server.
    pub fn awaiting_echo(&self) -> usize {
        self.pending.len()
    }

    /// Encoded payloads of locally submitted commands since the last call.
    pub fn take_outbound(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.outbound)
    }

    /// Applies every entry due at the current tick, then advances the tick.
    pub fn tick(&mut self) -> ProcessReport {
        let tick = self.current_tick;
        let mode = self.config.session_mode;
        let env = park_env(&self.objects, &self.strings);
        let world = &mut self.world;

        // Entries without APPLY are dry runs and only ever see Query.
        let report = self.queue.process(tick, |action| {
            if action.flags.contains(CommandFlags::APPLY) {
                ParkEngine::new(&mut *world).with_mode(mode).execute(env, action)
            } else {
                park_core::query(&*world, env, mode, action)
            }
        });

        let committed = report
            .applied
            .iter()
            .filter(|entry| entry.action.flags.contains(CommandFlags::APPLY));
        for entry in committed {
            self.events.publish(SessionEvent::ActionExecuted {
                tick: entry.tick,
                kind: entry.action.kind(),
                network_id: entry.action.network_id,
                status: entry.result.status,
                cost: entry.result.cost,
                expenditure: entry.result.expenditure,
            });
        }
        for discarded in &report.discarded {
            self.events.publish(SessionEvent::EntryDiscarded {
                tick: discarded.tick,
                kind: discarded.kind,
                network_id: discarded.network_id,
            });
        }

        self.current_tick = tick + 1;
        report
    }

    /// Runs ticks until nothing is left to apply.
    ///
    /// Stops immediately if the queue is suspended.
    pub fn run_until_idle(&mut self) -> Vec<ProcessReport> {
        let mut reports = Vec::new();
        while !self.queue.is_suspended() && !self.queue.is_empty() {
            reports.push(self.tick());
        }
        reports
    }

    pub fn suspend(&mut self) {
        self.queue.suspend();
        self.events.publish(SessionEvent::QueueSuspended {
            tick: self.current_tick,
            pending: self.queue.len(),
        });
    }

    pub fn resume(&mut self) {
        self.queue.resume();
        self.events.publish(SessionEvent::QueueResumed {
            tick: self.current_tick,
            pending: self.queue.len(),
        });
    }

    /// Abandons every pending entry. Returns how many were dropped.
    ///
    /// Callbacks still waiting for a server echo are dropped too.
    pub fn clear(&mut self) -> usize {
        self.pending.clear();
        let dropped = self.queue.clear();
        self.events.publish(SessionEvent::QueueCleared {
            tick: self.current_tick,
            dropped,
        });
        dropped
    }

    fn execute(&mut self, action: &Action) -> ActionResult {
        let env = park_env(&self.objects, &self.strings);
        ParkEngine::new(&mut self.world)
            .with_mode(self.config.session_mode)
            .execute(env, action)
    }
}

impl ProcessReport {
    /// Log records for the entries applied in this pass.
    ///
    /// # Errors
    ///
    /// Fails if an applied action no longer encodes.
    pub fn log_entries(&self) -> Result<Vec<ActionLogEntry>> {
        self.applied
            .iter()
            .map(|entry| {
                Ok(ActionLogEntry {
                    tick: entry.tick,
                    payload: encode(&entry.action)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use park_core::{
        CheatKind, CheatSet, CoordsXY, CoordsXYZ, EngineConfig, Finance, FootpathPlace,
        OwnershipFlags, Status, TogglePause,
    };

    use super::*;
    use crate::config::NetworkMode;

    fn session() -> Session {
        Session::from_config(RuntimeConfig::default())
    }

    #[test]
    fn submit_schedules_after_the_input_delay() {
        let mut session = session();

        let preview = session.submit(Action::new(TogglePause), None).expect("submit");
        assert!(preview.is_ok());
        assert!(!session.world().park.paused);

        assert!(session.tick().applied.is_empty());
        let report = session.tick();
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].tick, Tick(1));
        assert!(session.world().park.paused);
    }

    #[test]
    fn refused_submissions_are_not_queued() {
        let mut session = session();
        let bad = Action::new(CheatSet {
            cheat: 99,
            ..CheatSet::default()
        });

        let result = session.submit(bad, None).expect("submit");

        assert_eq!(result.status, Status::InvalidParameters);
        assert!(session.queue().is_empty());
    }

    #[test]
    fn networked_submissions_are_stamped_and_sent() {
        let mut session = Session::from_config(RuntimeConfig {
            network_mode: NetworkMode::Server,
            ..RuntimeConfig::default()
        });

        session.submit(Action::new(TogglePause), None).expect("first");
        session
            .submit(Action::new(CheatSet::new(CheatKind::SandboxMode, 1)), None)
            .expect("second");

        let packets = session.take_outbound();
        assert_eq!(packets.len(), 2);
        let second = decode(&packets[1].payload).expect("decode");
        assert_eq!(second.network_id, Some(NetworkId(1)));
        assert!(second.flags.contains(CommandFlags::APPLY));
        assert!(!second.flags.contains(CommandFlags::NETWORKED));
        assert!(session.take_outbound().is_empty());
        assert_eq!(session.queue().len(), 2);
    }

    #[test]
    fn client_applies_its_command_only_on_the_echo() {
        let mut client = Session::from_config(RuntimeConfig {
            network_mode: NetworkMode::Client,
            ..RuntimeConfig::default()
        })
        .with_player(PlayerId::HOST);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);

        client
            .submit(
                Action::new(TogglePause),
                Some(Box::new(move |_, result| {
                    *sink.lock().expect("sink") = Some(result.status);
                })),
            )
            .expect("submit");

        assert!(client.queue().is_empty());
        assert_eq!(client.awaiting_echo(), 1);
        assert!(client.run_until_idle().is_empty());
        assert!(!client.world().park.paused);

        let packet = client.take_outbound().remove(0);
        let sent = decode(&packet.payload).expect("decode");
        assert_eq!(sent.actor, Some(PlayerId::HOST));
        client.receive(packet.tick, &packet.payload).expect("echo");
        client.run_until_idle();

        assert!(client.world().park.paused);
        assert_eq!(client.awaiting_echo(), 0);
        assert_eq!(*seen.lock().expect("seen"), Some(Status::Ok));
    }

    #[test]
    fn echo_from_another_actor_keeps_the_callback_parked() {
        let mut client = Session::from_config(RuntimeConfig {
            network_mode: NetworkMode::Client,
            ..RuntimeConfig::default()
        })
        .with_player(PlayerId::HOST);
        client
            .submit(Action::new(TogglePause), Some(Box::new(|_, _| {})))
            .expect("submit");
        let packet = client.take_outbound().remove(0);

        let mut other = decode(&packet.payload).expect("decode");
        other.actor = Some(PlayerId(1));
        client
            .receive(packet.tick, &encode(&other).expect("encode"))
            .expect("receive");

        assert_eq!(client.awaiting_echo(), 1);
        assert_eq!(client.queue().len(), 1);
    }

    #[test]
    fn server_relays_received_entries_at_its_own_tick() {
        let mut server = Session::from_config(RuntimeConfig {
            network_mode: NetworkMode::Server,
            ..RuntimeConfig::default()
        });
        for _ in 0..3 {
            server.tick();
        }
        let late = Action::new(TogglePause)
            .with_flags(CommandFlags::APPLY)
            .with_network_id(NetworkId(0));

        server
            .receive_from(PlayerId::HOST, Tick(1), &encode(&late).expect("encode"))
            .expect("receive");

        let relayed = server.take_outbound();
        assert_eq!(relayed.len(), 1);
        assert_eq!(relayed[0].tick, Tick(3));
        let action = decode(&relayed[0].payload).expect("decode");
        assert_eq!(action.actor, Some(PlayerId::HOST));
        assert!(action.flags.contains(CommandFlags::NETWORKED));

        let report = server.tick();
        assert_eq!(report.applied.len(), 1);
        assert!(server.world().park.paused);
    }

    #[test]
    fn entries_without_apply_are_only_queried() {
        let mut session = session();
        let mut events = session.events().subscribe(crate::events::Topic::Actions);
        let funds = session.world().finance.funds();
        let dry = Action::new(CheatSet::new(CheatKind::AddMoney, 50));

        session.receive(Tick(0), &encode(&dry).expect("encode")).expect("dry");
        let report = session.tick();

        assert_eq!(report.applied.len(), 1);
        assert!(report.applied[0].result.is_ok());
        assert_eq!(session.world().finance.funds(), funds);
        assert!(events.try_recv().is_err());

        let committed = dry.with_flags(CommandFlags::APPLY);
        session
            .receive(Tick(1), &encode(&committed).expect("encode"))
            .expect("apply");
        session.tick();

        assert_eq!(session.world().finance.funds(), funds + 50);
        assert!(events.try_recv().is_ok());
    }

    #[test]
    fn ghost_submissions_run_at_once_and_stay_local() {
        let mut world = WorldState::new(&EngineConfig::with_map_size(16));
        for tile in world.map.tiles_mut() {
            tile.ownership = OwnershipFlags::OWNED;
        }
        let mut session = Session::new(
            world,
            RuntimeConfig {
                network_mode: NetworkMode::Server,
                ..RuntimeConfig::default()
            },
        );
        let ghost = Action::new(FootpathPlace {
            loc: CoordsXYZ::new(64, 64, 112),
        })
        .with_flags(CommandFlags::GHOST);

        let result = session.submit(ghost, None).expect("submit");

        assert!(result.is_ok(), "{result:?}");
        let tile = session.world().map.tile_at(CoordsXY::new(64, 64)).expect("tile");
        assert_eq!(tile.path.map(|path| path.ghost), Some(true));
        assert!(session.queue().is_empty());
        assert!(session.take_outbound().is_empty());
    }

    #[test]
    fn single_player_sends_nothing() {
        let mut session = session();
        session.submit(Action::new(TogglePause), None).expect("submit");
        assert!(session.take_outbound().is_empty());
    }

    #[test]
    fn callback_receives_the_execute_result() {
        let mut session = session();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);

        session
            .submit(
                Action::new(TogglePause),
                Some(Box::new(move |_, result| {
                    *sink.lock().expect("sink") = Some(result.status);
                })),
            )
            .expect("submit");
        session.run_until_idle();

        assert_eq!(*seen.lock().expect("seen"), Some(Status::Ok));
    }
}
