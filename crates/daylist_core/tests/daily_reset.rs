use chrono::{DateTime, Duration as TimeDelta, TimeZone, Utc};
use daylist_core::schedule::{next_system_midnight, ResetCallback};
use daylist_core::{Board, BoardConfig, Clock, ManualClock, MidnightScheduler, ResetPolicy, TaskId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

fn counting_callback() -> (ResetCallback, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let callback: ResetCallback = Box::new(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (callback, count)
}

#[tokio::test(start_paused = true)]
async fn crossing_local_midnight_clears_list_and_restarts_ids() {
    let clock = ManualClock::starting_at(start());
    let board = Board::default();
    board.add_task("x").expect("added");
    board
        .start_daily_reset(Arc::new(clock.clone()))
        .expect("armed");

    let midnight = next_system_midnight(start());
    assert_eq!(board.next_reset_at(), Some(midnight));

    clock.jump(midnight - clock.now() + TimeDelta::seconds(1));
    tokio::time::sleep(Duration::from_secs(61)).await;

    let snapshot = board.snapshot();
    assert!(snapshot.tasks.is_empty());
    assert_eq!(snapshot.incomplete_count, 0);
    assert_eq!(board.add_task("y"), Some(TaskId::new(1)));
    assert!(board.is_daily_reset_armed());
    assert!(board.next_reset_at().expect("re-armed") > midnight);
}

#[tokio::test(start_paused = true)]
async fn fires_at_deadline_without_clock_jumps() {
    let clock = ManualClock::starting_at(start());
    let deadline = start() + TimeDelta::minutes(5);
    let board = Board::default();
    board.add_task("x");
    board
        .start_daily_reset_at(Arc::new(clock), deadline)
        .expect("armed");

    tokio::time::sleep(Duration::from_secs(4 * 60)).await;
    assert_eq!(board.snapshot().tasks.len(), 1);

    tokio::time::sleep(Duration::from_secs(2 * 60)).await;
    assert!(board.snapshot().tasks.is_empty());
}

#[tokio::test(start_paused = true)]
async fn forward_jump_past_deadline_fires_promptly() {
    let clock = ManualClock::starting_at(start());
    let (callback, count) = counting_callback();
    let handle = MidnightScheduler::new(Arc::new(clock.clone()))
        .with_policy(ResetPolicy::Once)
        .arm_at(start() + TimeDelta::hours(10), callback)
        .expect("armed");

    clock.jump(TimeDelta::hours(11));
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(handle.fired_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn backward_jump_waits_for_the_original_wall_clock_deadline() {
    let clock = ManualClock::starting_at(start());
    let deadline = start() + TimeDelta::seconds(10);
    let (callback, count) = counting_callback();
    let _handle = MidnightScheduler::new(Arc::new(clock.clone()))
        .with_policy(ResetPolicy::Once)
        .arm_at(deadline, callback)
        .expect("armed");

    clock.jump(TimeDelta::hours(-1));
    tokio::time::sleep(Duration::from_secs(30 * 60)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(clock.now() < deadline);

    tokio::time::sleep(Duration::from_secs(31 * 60)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn rearm_resets_again_on_the_following_midnight() {
    let clock = ManualClock::starting_at(start());
    let (callback, count) = counting_callback();
    let handle = MidnightScheduler::new(Arc::new(clock.clone()))
        .arm_at(start() + TimeDelta::seconds(10), callback)
        .expect("armed");

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    let second = handle.deadline();
    assert!(second > clock.now());

    clock.jump(second - clock.now() + TimeDelta::seconds(1));
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert!(handle.deadline() > second);
    assert!(handle.is_active());
}

#[tokio::test(start_paused = true)]
async fn cancel_after_firing_is_a_noop() {
    let clock = ManualClock::starting_at(start());
    let (callback, count) = counting_callback();
    let handle = MidnightScheduler::new(Arc::new(clock))
        .with_policy(ResetPolicy::Once)
        .arm_at(start() + TimeDelta::seconds(1), callback)
        .expect("armed");

    tokio::time::sleep(Duration::from_secs(5)).await;
    handle.cancel();
    handle.cancel();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(!handle.is_active());
}

#[tokio::test(start_paused = true)]
async fn once_policy_from_config_stops_after_first_reset() {
    let config = BoardConfig {
        reset_policy: ResetPolicy::Once,
        ..BoardConfig::default()
    };
    let clock = ManualClock::starting_at(start());
    let board = Board::new(config);
    board
        .start_daily_reset_at(Arc::new(clock), start() + TimeDelta::seconds(5))
        .expect("armed");

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!board.is_daily_reset_armed());
    assert!(board.snapshot().next_reset_at.is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_before_midnight_keeps_the_list() {
    let clock = ManualClock::starting_at(start());
    let board = Board::default();
    board.add_task("keep me");
    board
        .start_daily_reset_at(Arc::new(clock), start() + TimeDelta::seconds(30))
        .expect("armed");

    board.shutdown();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(board.snapshot().tasks.len(), 1);
}
