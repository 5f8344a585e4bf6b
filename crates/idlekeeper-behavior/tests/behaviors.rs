//! Integration tests for the anti-idle and chat behaviors.
//!
//! Timing tests use `start_paused = true`: the clock only moves when every
//! task is idle, so sleeps in the test resolve in a deterministic order
//! relative to the behavior timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use idlekeeper_behavior::{
    ABSENT_RETRY, AntiIdle, AntiIdleConfig, AntiIdleTick, BehaviorConfig, ChatConfig, ChatLoop,
    EpochCounter, JUMP_PULSE, arm, run_anti_idle, run_chat,
};
use idlekeeper_session::{Control, Direction, GameSession, Position, SessionId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// =========================================================================
// Recording session
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Set(Control, bool),
    Look(Position),
    Chat(String),
    End(String),
}

struct RecordingSession {
    present: AtomicBool,
    controls: Mutex<HashMap<Control, bool>>,
    log: Mutex<Vec<Command>>,
}

impl RecordingSession {
    fn new(present: bool) -> Arc<Self> {
        Arc::new(Self {
            present: AtomicBool::new(present),
            controls: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        })
    }

    fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }

    fn commands(&self) -> Vec<Command> {
        self.log.lock().unwrap().clone()
    }

    fn chats(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Chat(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl GameSession for RecordingSession {
    fn id(&self) -> SessionId {
        SessionId::new(1)
    }

    fn has_presence(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    fn set_control(&self, control: Control, active: bool) {
        self.controls.lock().unwrap().insert(control, active);
        self.log.lock().unwrap().push(Command::Set(control, active));
    }

    fn control_state(&self, control: Control) -> bool {
        self.controls
            .lock()
            .unwrap()
            .get(&control)
            .copied()
            .unwrap_or(false)
    }

    fn look_at(&self, target: Position) {
        self.log.lock().unwrap().push(Command::Look(target));
    }

    fn chat(&self, message: &str) {
        self.log.lock().unwrap().push(Command::Chat(message.to_string()));
    }

    fn end(&self, reason: &str) {
        self.log.lock().unwrap().push(Command::End(reason.to_string()));
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn anti_idle(movements: Vec<Direction>, sneak: bool, seed: u64) -> AntiIdle<StdRng> {
    AntiIdle::with_rng(
        AntiIdleConfig {
            enabled: true,
            interval_ms: 2_000,
            sneak,
            movements,
        },
        StdRng::seed_from_u64(seed),
    )
}

fn chat_config(messages: &[&str], repeat: bool) -> ChatConfig {
    ChatConfig {
        enabled: true,
        repeat,
        interval_secs: 5,
        messages: messages.iter().map(|m| m.to_string()).collect(),
    }
}

fn held_directions(session: &RecordingSession) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|d| session.control_state(d.control()))
        .collect()
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// =========================================================================
// Anti-idle tick logic
// =========================================================================

#[test]
fn test_tick_without_presence_sends_nothing() {
    let session = RecordingSession::new(false);
    let mut behavior = anti_idle(Direction::ALL.to_vec(), true, 1);

    assert_eq!(behavior.tick(session.as_ref()), AntiIdleTick::Skipped);
    assert!(session.commands().is_empty());
    assert_eq!(behavior.current(), None);
}

#[test]
fn test_previous_direction_released_before_next_pressed() {
    let session = RecordingSession::new(true);
    let mut behavior = anti_idle(Direction::ALL.to_vec(), false, 7);

    for _ in 0..50 {
        let previous = behavior.current();
        session.clear();
        let AntiIdleTick::Acted {
            direction: Some(next),
        } = behavior.tick(session.as_ref())
        else {
            panic!("tick with presence should act");
        };

        let commands = session.commands();
        let press = commands
            .iter()
            .position(|c| *c == Command::Set(next.control(), true))
            .expect("new direction pressed");
        if let Some(previous) = previous {
            let release = commands
                .iter()
                .position(|c| *c == Command::Set(previous.control(), false))
                .expect("previous direction released");
            assert!(release < press, "release must precede press");
        }
        assert_eq!(held_directions(&session), vec![next]);
        assert_eq!(behavior.current(), Some(next));
    }
}

#[test]
fn test_draws_stay_in_movement_set_and_may_repeat() {
    let session = RecordingSession::new(true);
    let allowed = vec![Direction::Left, Direction::Right];
    let mut behavior = anti_idle(allowed.clone(), false, 42);

    let mut draws = Vec::new();
    for _ in 0..64 {
        if let AntiIdleTick::Acted {
            direction: Some(d),
        } = behavior.tick(session.as_ref())
        {
            draws.push(d);
        }
    }

    assert_eq!(draws.len(), 64);
    assert!(draws.iter().all(|d| allowed.contains(d)));
    assert!(draws.contains(&Direction::Left));
    assert!(draws.contains(&Direction::Right));
    assert!(
        draws.windows(2).any(|w| w[0] == w[1]),
        "independent draws should repeat at least once in 64 ticks"
    );
}

#[test]
fn test_single_direction_is_reasserted() {
    let session = RecordingSession::new(true);
    let mut behavior = anti_idle(vec![Direction::Forward], false, 3);

    behavior.tick(session.as_ref());
    session.clear();
    behavior.tick(session.as_ref());

    let commands = session.commands();
    assert!(commands.contains(&Command::Set(Control::Forward, false)));
    assert!(commands.contains(&Command::Set(Control::Forward, true)));
    assert_eq!(held_directions(&session), vec![Direction::Forward]);
}

#[test]
fn test_direction_held_from_join_is_released() {
    let session = RecordingSession::new(true);
    session.set_control(Control::Forward, true);
    let mut behavior = anti_idle(vec![Direction::Left], false, 3);

    behavior.tick(session.as_ref());
    assert_eq!(held_directions(&session), vec![Direction::Left]);
}

#[test]
fn test_empty_movement_set_only_jumps() {
    let session = RecordingSession::new(true);
    let mut behavior = anti_idle(Vec::new(), false, 3);

    assert_eq!(
        behavior.tick(session.as_ref()),
        AntiIdleTick::Acted { direction: None }
    );
    assert_eq!(session.commands(), vec![Command::Set(Control::Jump, true)]);
}

#[test]
fn test_sneak_only_toggled_when_different() {
    let session = RecordingSession::new(true);
    let mut behavior = anti_idle(vec![Direction::Back], true, 5);

    behavior.tick(session.as_ref());
    assert!(session.commands().contains(&Command::Set(Control::Sneak, true)));

    session.clear();
    behavior.tick(session.as_ref());
    assert!(
        !session
            .commands()
            .iter()
            .any(|c| matches!(c, Command::Set(Control::Sneak, _))),
        "sneak already matches policy, no command expected"
    );
}

// =========================================================================
// Anti-idle timing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_tick_waits_one_interval() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let task = tokio::spawn(run_anti_idle(
        Arc::clone(&session),
        epoch.guard(),
        anti_idle(Direction::ALL.to_vec(), false, 1),
    ));

    sleep_ms(1_999).await;
    assert!(session.commands().is_empty());

    sleep_ms(2).await;
    assert!(!session.commands().is_empty());
    task.abort();
}

#[tokio::test(start_paused = true)]
async fn test_jump_pulse_is_released_after_500ms() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let task = tokio::spawn(run_anti_idle(
        Arc::clone(&session),
        epoch.guard(),
        anti_idle(Direction::ALL.to_vec(), false, 1),
    ));

    sleep_ms(2_001).await;
    assert!(session.control_state(Control::Jump), "jump held right after tick");

    sleep_ms(JUMP_PULSE.as_millis() as u64 - 2).await;
    assert!(session.control_state(Control::Jump), "still held before 500ms");

    sleep_ms(2).await;
    assert!(!session.control_state(Control::Jump), "released after 500ms");

    // And again on the next tick.
    sleep_ms(1_500).await;
    assert!(session.control_state(Control::Jump));
    task.abort();
}

#[tokio::test(start_paused = true)]
async fn test_anti_idle_skips_while_absent_and_resumes() {
    let session = RecordingSession::new(false);
    let epoch = EpochCounter::new();
    let task = tokio::spawn(run_anti_idle(
        Arc::clone(&session),
        epoch.guard(),
        anti_idle(Direction::ALL.to_vec(), false, 1),
    ));

    sleep_ms(4_100).await;
    assert!(session.commands().is_empty());

    session.set_present(true);
    sleep_ms(2_000).await;
    assert!(session.commands().contains(&Command::Set(Control::Jump, true)));
    task.abort();
}

#[tokio::test(start_paused = true)]
async fn test_anti_idle_exits_when_superseded() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let task = tokio::spawn(run_anti_idle(
        Arc::clone(&session),
        epoch.guard(),
        anti_idle(Direction::ALL.to_vec(), false, 1),
    ));

    sleep_ms(1_000).await;
    epoch.advance();
    sleep_ms(5_000).await;

    assert!(session.commands().is_empty());
    assert!(task.is_finished());
}

// =========================================================================
// Chat loop timing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_chat_rotation_over_time() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let task = tokio::spawn(run_chat(
        Arc::clone(&session),
        epoch.guard(),
        ChatLoop::new(&chat_config(&["A", "B", "C"], true)),
    ));

    sleep_ms(4_999).await;
    assert!(session.chats().is_empty(), "never sends immediately on join");

    sleep_ms(15_002).await;
    assert_eq!(session.chats(), ["A", "B", "C", "A"]);
    task.abort();
}

#[tokio::test(start_paused = true)]
async fn test_chat_zero_interval_is_paced() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let config = ChatConfig {
        interval_secs: 0,
        ..chat_config(&["A", "B"], true)
    };
    let task = tokio::spawn(run_chat(
        Arc::clone(&session),
        epoch.guard(),
        ChatLoop::new(&config),
    ));

    sleep_ms(999).await;
    assert!(session.chats().is_empty());

    // One message per second at most.
    sleep_ms(3_002).await;
    assert_eq!(session.chats(), ["A", "B", "A", "B"]);
    task.abort();
}

#[tokio::test(start_paused = true)]
async fn test_chat_without_repeat_sends_once_and_finishes() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let task = tokio::spawn(run_chat(
        Arc::clone(&session),
        epoch.guard(),
        ChatLoop::new(&chat_config(&["A", "B"], false)),
    ));

    sleep_ms(60_000).await;
    assert_eq!(session.chats(), ["A"]);
    assert!(task.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_chat_waits_for_presence_without_advancing() {
    let session = RecordingSession::new(false);
    let epoch = EpochCounter::new();
    let task = tokio::spawn(run_chat(
        Arc::clone(&session),
        epoch.guard(),
        ChatLoop::new(&chat_config(&["A", "B"], true)),
    ));

    // First attempt at 5s finds no presence; retry is due at 5s + 30s.
    sleep_ms(10_000).await;
    session.set_present(true);
    assert!(session.chats().is_empty());

    sleep_ms(ABSENT_RETRY.as_millis() as u64 - 5_000 - 1).await;
    assert!(session.chats().is_empty());

    sleep_ms(2).await;
    assert_eq!(session.chats(), ["A"]);
    task.abort();
}

#[tokio::test(start_paused = true)]
async fn test_chat_exits_when_superseded() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let task = tokio::spawn(run_chat(
        Arc::clone(&session),
        epoch.guard(),
        ChatLoop::new(&chat_config(&["A"], true)),
    ));

    epoch.advance();
    sleep_ms(5_001).await;
    assert!(session.chats().is_empty());
    assert!(task.is_finished());
}

// =========================================================================
// Arming
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_arm_spawns_only_enabled_timers() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();

    let config = BehaviorConfig::default();
    let armed = arm(Arc::clone(&session), epoch.guard(), &config);
    assert_eq!(armed.len(), 1, "anti-idle only; chat is off by default");

    let config = BehaviorConfig {
        chat: chat_config(&["hello"], true),
        ..BehaviorConfig::default()
    };
    let both = arm(Arc::clone(&session), epoch.guard(), &config);
    assert_eq!(both.len(), 2);

    let config = BehaviorConfig {
        anti_idle: AntiIdleConfig {
            enabled: false,
            ..AntiIdleConfig::default()
        },
        chat: ChatConfig {
            enabled: true,
            ..ChatConfig::default()
        },
        chat_log: true,
    };
    assert!(arm(Arc::clone(&session), epoch.guard(), &config).is_empty());

    armed.cancel();
    both.cancel();
}

/// Records the target of every log event.
#[derive(Clone, Default)]
struct Targets(Arc<Mutex<Vec<String>>>);

impl<S: tracing::Subscriber> Layer<S> for Targets {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.0
            .lock()
            .unwrap()
            .push(event.metadata().target().to_string());
    }
}

#[tokio::test(start_paused = true)]
async fn test_module_start_lines_use_behavior_target() {
    let targets = Targets::default();
    let subscriber = tracing_subscriber::registry().with(targets.clone());
    let _default = tracing::subscriber::set_default(subscriber);

    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let config = BehaviorConfig {
        chat: chat_config(&["hello"], true),
        ..BehaviorConfig::default()
    };
    let armed = arm(Arc::clone(&session), epoch.guard(), &config);

    let targets = targets.0.lock().unwrap().clone();
    assert_eq!(targets, ["behavior", "behavior"]);
    armed.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_armed_timers() {
    let session = RecordingSession::new(true);
    let epoch = EpochCounter::new();
    let config = BehaviorConfig {
        chat: chat_config(&["hello"], true),
        ..BehaviorConfig::default()
    };

    let armed = arm(Arc::clone(&session), epoch.guard(), &config);
    armed.cancel();

    sleep_ms(120_000).await;
    assert!(session.commands().is_empty());
}
