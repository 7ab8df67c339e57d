use std::sync::{Arc, Mutex};

use park_core::{
    Action, ActionBody, CheatKind, CheatSet, CommandFlags, CommandKind, Finance, NetworkId, Status,
    Tick, encode,
};
use park_runtime::{RuntimeConfig, Session, SessionEvent, Topic};
use tokio::sync::broadcast::Receiver;

fn remote(network_id: u32, amount: i32) -> Vec<u8> {
    let mut action =
        Action::new(CheatSet::new(CheatKind::AddMoney, amount)).with_flags(CommandFlags::APPLY);
    action.network_id = Some(NetworkId(network_id));
    encode(&action).expect("encode")
}

fn executed_ids(events: &mut Receiver<SessionEvent>) -> Vec<Option<NetworkId>> {
    let mut ids = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::ActionExecuted { network_id, .. } = event {
            ids.push(network_id);
        }
    }
    ids
}

#[test]
fn suspended_entries_apply_in_tick_order_after_resume() {
    let mut session = Session::from_config(RuntimeConfig::default());
    let mut executed = session.events().subscribe(Topic::Actions);
    let mut control = session.events().subscribe(Topic::Queue);
    let funds = session.world().finance.funds();

    session.suspend();
    session.receive(Tick(3), &remote(30, 3)).expect("receive");
    session.receive(Tick(1), &remote(10, 1)).expect("receive");
    session.receive(Tick(2), &remote(20, 2)).expect("receive");

    assert!(session.run_until_idle().is_empty());
    for _ in 0..5 {
        assert!(session.tick().applied.is_empty());
    }
    assert_eq!(session.queue().len(), 3);
    assert_eq!(session.world().finance.funds(), funds);

    session.resume();
    let reports = session.run_until_idle();

    assert_eq!(reports.len(), 1);
    assert_eq!(
        executed_ids(&mut executed),
        vec![Some(NetworkId(10)), Some(NetworkId(20)), Some(NetworkId(30))]
    );
    assert_eq!(session.world().finance.funds(), funds + 6);
    assert!(matches!(
        control.try_recv(),
        Ok(SessionEvent::QueueSuspended { pending: 0, .. })
    ));
    assert!(matches!(
        control.try_recv(),
        Ok(SessionEvent::QueueResumed { pending: 3, .. })
    ));
}

#[test]
fn same_tick_entries_keep_arrival_order() {
    let mut session = Session::from_config(RuntimeConfig::default());
    let mut executed = session.events().subscribe(Topic::Actions);

    for id in [7, 3, 5] {
        session.receive(Tick(1), &remote(id, 1)).expect("receive");
    }
    session.run_until_idle();

    assert_eq!(
        executed_ids(&mut executed),
        vec![Some(NetworkId(7)), Some(NetworkId(3)), Some(NetworkId(5))]
    );
}

#[test]
fn clear_drops_pending_entries_without_callbacks() {
    let mut session = Session::from_config(RuntimeConfig::default());
    let called = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&called);

    session
        .submit(
            Action::new(CheatSet::new(CheatKind::AddMoney, 100)),
            Some(Box::new(move |_, _| *flag.lock().expect("flag") = true)),
        )
        .expect("submit");
    session.receive(Tick(4), &remote(1, 1)).expect("receive");
    let funds = session.world().finance.funds();

    assert_eq!(session.clear(), 2);
    assert!(session.queue().is_empty());
    assert!(session.run_until_idle().is_empty());
    for _ in 0..5 {
        assert!(session.tick().is_empty());
    }

    assert!(!*called.lock().expect("called"));
    assert_eq!(session.world().finance.funds(), funds);
}

#[test]
fn stale_entries_are_discarded_when_configured() {
    let mut session = Session::from_config(RuntimeConfig {
        discard_stale: true,
        ..RuntimeConfig::default()
    });
    let mut control = session.events().subscribe(Topic::Queue);
    for _ in 0..3 {
        session.tick();
    }

    let sender = session.sender();
    sender.send_encoded(Tick(1), &remote(9, 1)).expect("send");
    sender.send_encoded(Tick(3), &remote(10, 1)).expect("send");
    let report = session.tick();

    assert_eq!(report.discarded.len(), 1);
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].action.network_id, Some(NetworkId(10)));
    assert_eq!(
        control.try_recv().expect("discard event"),
        SessionEvent::EntryDiscarded {
            tick: Tick(1),
            kind: CommandKind::CheatSet,
            network_id: Some(NetworkId(9)),
        }
    );
}

#[test]
fn late_entries_apply_on_the_next_tick_by_default() {
    let mut session = Session::from_config(RuntimeConfig::default());
    for _ in 0..3 {
        session.tick();
    }

    session
        .sender()
        .send_encoded(Tick(1), &remote(9, 1))
        .expect("send");
    let report = session.tick();

    assert!(report.discarded.is_empty());
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].tick, Tick(1));
}

#[tokio::test]
async fn sender_hands_entries_over_from_another_task() {
    let mut session = Session::from_config(RuntimeConfig::default());
    let sender = session.sender();

    let transport = tokio::spawn(async move {
        for id in 0..4u32 {
            sender
                .send_encoded(Tick(u64::from(id)), &remote(id, 10))
                .expect("send");
        }
    });
    transport.await.expect("transport task");

    let mut applied = Vec::new();
    for _ in 0..4 {
        applied.extend(session.tick().applied);
    }

    let ids: Vec<_> = applied
        .iter()
        .map(|entry| entry.action.network_id)
        .collect();
    assert_eq!(ids, (0..4).map(|id| Some(NetworkId(id))).collect::<Vec<_>>());
    assert!(applied.iter().all(|entry| entry.result.status == Status::Ok));
    assert!(
        applied
            .iter()
            .all(|entry| matches!(entry.action.body(), ActionBody::CheatSet(_)))
    );
}
