use std::sync::{Arc, Mutex};

use park_core::{
    Action, BannerPlace, CheatKind, CheatSet, CommandFlags, CoordsXY, CoordsXYZ, CoordsXYZD,
    EngineConfig, FootpathPlace, LandRaise, MapRange, OwnershipFlags, PlayerId, RideCreate, RideId,
    RideType, Status, Tick, WorldState, encode,
};
use park_runtime::{
    ActionLog, ActionLogReader, NetworkMode, Packet, RuntimeConfig, Session, replay,
};
use tempfile::TempDir;

const GROUND_Z: i32 = 112;

fn start_world() -> WorldState {
    let mut world = WorldState::new(&EngineConfig::with_map_size(24));
    for tile in world.map.tiles_mut() {
        tile.ownership = OwnershipFlags::OWNED;
    }
    world
}

/// Mixed input: successes, a refusal (second path on the same tile) and a nested range op.
fn script() -> Vec<(Tick, Vec<u8>)> {
    let actions = [
        (1, Action::new(FootpathPlace { loc: CoordsXYZ::new(64, 64, GROUND_Z) })),
        (1, Action::new(FootpathPlace { loc: CoordsXYZ::new(64, 64, GROUND_Z) })),
        (
            2,
            Action::new(BannerPlace {
                loc: CoordsXYZD::new(64, 64, GROUND_Z, 1),
                banner_type: 1,
                colour: 7,
            }),
        ),
        (
            3,
            Action::new(LandRaise {
                centre: CoordsXY::new(256, 256),
                range: MapRange::new(224, 224, 288, 288),
            }),
        ),
        (3, Action::new(CheatSet::new(CheatKind::AddMoney, 500))),
        (5, Action::new(FootpathPlace { loc: CoordsXYZ::new(96, 64, GROUND_Z) })),
    ];
    actions
        .into_iter()
        .map(|(tick, action)| {
            let action = action.with_flags(CommandFlags::APPLY);
            (Tick(tick), encode(&action).expect("encode"))
        })
        .collect()
}

fn run(script: &[(Tick, Vec<u8>)]) -> Session {
    let mut session = Session::new(start_world(), RuntimeConfig::default());
    for (tick, payload) in script {
        session.receive(*tick, payload).expect("receive");
    }
    session.run_until_idle();
    session
}

#[test]
fn identical_input_gives_identical_state_roots() {
    let script = script();

    let a = run(&script);
    let b = run(&script);

    assert_eq!(a.world().state_root(), b.world().state_root());
    assert_eq!(a.world(), b.world());
    assert_ne!(a.world().state_root(), start_world().state_root());
}

#[test]
fn logged_session_replays_to_the_same_root() {
    let dir = TempDir::new().expect("tempdir");
    let log_path = dir.path().join("actions.log");
    let script = script();

    let mut session = Session::new(
        start_world(),
        RuntimeConfig {
            network_mode: NetworkMode::Server,
            ..RuntimeConfig::default()
        },
    );
    for (tick, payload) in &script {
        session.receive(*tick, payload).expect("receive");
    }
    let mut live_results = Vec::new();
    {
        let mut log = ActionLog::create(&log_path).expect("create log");
        for report in session.run_until_idle() {
            log.append_all(&report.log_entries().expect("entries"))
                .expect("append");
            live_results.extend(report.applied.into_iter().map(|entry| entry.result));
        }
        log.flush().expect("flush");
    }

    let entries = ActionLogReader::read_all(&log_path).expect("read log");
    assert_eq!(entries.len(), script.len());

    let outcome = replay(start_world(), &entries, RuntimeConfig::default()).expect("replay");

    assert_eq!(outcome.results, live_results);
    assert_eq!(outcome.world.state_root(), session.world().state_root());
    assert_eq!(outcome.state_root_hex(), hex::encode(session.world().state_root()));
    assert!(!live_results[1].is_ok());
}

const GUEST: PlayerId = PlayerId(1);

fn shared_world() -> WorldState {
    let mut world = start_world();
    world.players.join(GUEST, "Guest");
    if let Some(guest) = world.players.get_mut(GUEST) {
        guest.group = park_core::state::PlayerList::USER_GROUP;
    }
    world
}

fn participant(mode: NetworkMode, player: PlayerId) -> Session {
    let config = RuntimeConfig {
        network_mode: mode,
        ..RuntimeConfig::default()
    };
    Session::new(shared_world(), config).with_player(player)
}

fn deliver(packets: Vec<Packet>, to: &mut Session, from: Option<PlayerId>) {
    for packet in packets {
        match from {
            Some(player) => to.receive_from(player, packet.tick, &packet.payload),
            None => to.receive(packet.tick, &packet.payload),
        }
        .expect("deliver");
    }
}

#[test]
fn server_and_client_converge_on_exchanged_packets() {
    let mut host = participant(NetworkMode::Server, PlayerId::HOST);
    let mut client = participant(NetworkMode::Client, GUEST);
    let echoed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&echoed);

    let maze = RideCreate {
        ride_type: RideType::Maze as u8,
        colour: 1,
    };
    let coaster = RideCreate {
        ride_type: RideType::Coaster as u8,
        colour: 2,
    };
    assert!(host.submit(Action::new(maze), None).expect("host submit").is_ok());
    let preview = client
        .submit(
            Action::new(coaster),
            Some(Box::new(move |action, result| {
                *sink.lock().expect("sink") = Some((action.actor, result.status));
            })),
        )
        .expect("client submit");
    assert!(preview.is_ok());
    assert!(client.queue().is_empty());

    // Both participants numbered their first command 0.
    deliver(client.take_outbound(), &mut host, Some(GUEST));
    deliver(host.take_outbound(), &mut client, None);
    assert!(host.take_outbound().is_empty());

    host.run_until_idle();
    client.run_until_idle();

    assert_eq!(host.world().state_root(), client.world().state_root());
    for session in [&host, &client] {
        let rides = &session.world().rides;
        assert_eq!(rides.get(RideId(0)).map(|ride| ride.ride_type), Some(RideType::Maze));
        assert_eq!(rides.get(RideId(1)).map(|ride| ride.ride_type), Some(RideType::Coaster));
    }
    assert_eq!(*echoed.lock().expect("echoed"), Some((Some(GUEST), Status::Ok)));
    assert_eq!(client.awaiting_echo(), 0);
}
