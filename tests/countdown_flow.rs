mod common;

use std::{sync::Arc, time::Duration};

use common::{Recorder, TokioClock, EPOCH_MS};
use proctor_clock::{
    session::{AnnouncementPolicy, SessionController, FINISH_PHRASE},
    state::{AppState, KeyValueStore, MemoryStore, RunState, SessionPhase},
    state::store::RUN_STATE_KEY,
    tasks::{engine_event_task, spawn_countdown_engine, DEFAULT_TICK_INTERVAL},
};
use tokio::time::timeout;

fn wire_up(store: Arc<MemoryStore>, recorder: &Arc<Recorder>, config: &str) -> Arc<AppState> {
    let clock = Arc::new(TokioClock::new(EPOCH_MS));
    let (engine, events, _task) = spawn_countdown_engine(clock.clone(), DEFAULT_TICK_INTERVAL);

    let mut controller = SessionController::new(
        engine,
        recorder.side_effects(),
        store as Arc<dyn KeyValueStore>,
        clock,
        AnnouncementPolicy::ExactMinute,
    );
    controller.restore(config);

    let state = Arc::new(AppState::new(controller, 0, "127.0.0.1".to_string()));
    tokio::spawn(engine_event_task(Arc::clone(&state), events));
    state
}

async fn wait_for_alarm(state: &AppState) {
    let mut display = state.subscribe_display().unwrap();
    timeout(Duration::from_secs(3600), async {
        while !display.borrow_and_update().alarm {
            display.changed().await.unwrap();
        }
    })
    .await
    .expect("countdown never finished");
}

#[tokio::test(start_paused = true)]
async fn a_full_countdown_announces_checkpoints_then_finishes() {
    let recorder = Recorder::new();
    let store = Arc::new(MemoryStore::new());
    let state = wire_up(store.clone(), &recorder, "3, 2, 1");

    let mut display = state.subscribe_display().unwrap();
    assert!(state.perform("start", |c| c.start()).unwrap());

    // Every render carries a distinct, non-increasing value until the alarm
    let mut rendered = Vec::new();
    timeout(Duration::from_secs(3600), async {
        loop {
            display.changed().await.unwrap();
            let snapshot = display.borrow_and_update().clone();
            if snapshot.alarm {
                break;
            }
            rendered.push(snapshot.remaining_seconds);
        }
    })
    .await
    .expect("countdown never finished");

    assert!(rendered.windows(2).all(|w| w[0] > w[1]), "renders: {:?}", rendered);
    assert_eq!(rendered.last(), Some(&0));
    assert_eq!(
        recorder.spoken(),
        vec![
            "2 minutes remaining.".to_string(),
            "1 minutes remaining.".to_string(),
            FINISH_PHRASE.to_string(),
        ]
    );

    let controller = state.lock_controller().unwrap();
    assert_eq!(controller.phase(), SessionPhase::Alarm);
    assert_eq!(controller.current_display().clock, "03:00");
    let saved = RunState::from_json(&store.get(RUN_STATE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(saved, RunState::idle(180));
}

#[tokio::test(start_paused = true)]
async fn a_restart_mid_countdown_resumes_and_finishes() {
    let saved = RunState {
        is_running: true,
        target_timestamp: Some(EPOCH_MS + 90_000),
        last_known_seconds_remaining: 100,
    }
    .to_json()
    .unwrap();
    let store = Arc::new(MemoryStore::with_entries([(RUN_STATE_KEY, saved.as_str())]));
    let recorder = Recorder::new();

    let state = wire_up(store, &recorder, "5, 1");
    assert_eq!(
        state.lock_controller().unwrap().current_display().clock,
        "01:30"
    );

    wait_for_alarm(&state).await;

    assert_eq!(
        recorder.spoken(),
        vec!["1 minutes remaining.".to_string(), FINISH_PHRASE.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn stopping_mid_countdown_never_raises_the_alarm() {
    let recorder = Recorder::new();
    let state = wire_up(Arc::new(MemoryStore::new()), &recorder, "1");

    state.perform("start", |c| c.start()).unwrap();
    tokio::time::sleep(Duration::from_millis(30_100)).await;
    state.perform("stop", |c| c.stop()).unwrap();
    tokio::time::sleep(Duration::from_secs(120)).await;

    let controller = state.lock_controller().unwrap();
    assert_eq!(controller.phase(), SessionPhase::Idle);
    assert_eq!(controller.current_display().clock, "00:30");
    assert!(recorder.spoken().is_empty());
}
