use super::*;

#[test]
fn three_per_second_window() {
    let rl = RateLimiter::new(3, Duration::from_millis(1000));
    let t0 = Instant::now();

    let got: Vec<bool> = (0..4).map(|_| rl.check_at("1.2.3.4", t0).allowed).collect();
    assert_eq!(got, vec![true, true, true, false]);

    let later = t0 + Duration::from_millis(1001);
    let d = rl.check_at("1.2.3.4", later);
    assert!(d.allowed);
    assert_eq!(d.remaining, 2);
}

#[test]
fn remaining_counts_down_and_denial_does_not_consume() {
    let rl = RateLimiter::new(2, Duration::from_secs(60));
    let t0 = Instant::now();
    assert_eq!(rl.check_at("a", t0).remaining, 1);
    assert_eq!(rl.check_at("a", t0).remaining, 0);

    let denied = rl.check_at("a", t0 + Duration::from_secs(1));
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 0);
    assert_eq!(denied.reset_at, t0 + Duration::from_secs(60));
    assert_eq!(
        denied.retry_after(t0 + Duration::from_secs(1)),
        Duration::from_secs(59)
    );
}

#[test]
fn window_boundary_is_still_inside_the_window() {
    let rl = RateLimiter::new(1, Duration::from_millis(100));
    let t0 = Instant::now();
    assert!(rl.check_at("k", t0).allowed);
    assert!(!rl.check_at("k", t0 + Duration::from_millis(100)).allowed);
    assert!(rl.check_at("k", t0 + Duration::from_millis(101)).allowed);
}

#[test]
fn clients_are_independent() {
    let rl = RateLimiter::new(1, Duration::from_secs(60));
    let t0 = Instant::now();
    assert!(rl.check_at("a", t0).allowed);
    assert!(rl.check_at("b", t0).allowed);
    assert!(!rl.check_at("a", t0).allowed);
    assert_eq!(rl.len(), 2);
}

#[test]
fn purge_removes_only_elapsed_windows() {
    let rl = RateLimiter::new(5, Duration::from_millis(50));
    let t0 = Instant::now();
    rl.check_at("old", t0);
    rl.check_at("new", t0 + Duration::from_millis(40));

    assert_eq!(rl.purge_expired(t0 + Duration::from_millis(60)), 1);
    assert_eq!(rl.len(), 1);
    assert_eq!(rl.purge_expired(t0 + Duration::from_millis(200)), 1);
    assert!(rl.is_empty());
}

#[test]
fn denied_decision_converts_to_rate_limited_error() {
    let rl = RateLimiter::new(1, Duration::from_secs(30));
    let t0 = Instant::now();
    assert!(rl.check_at("x", t0).into_result(t0).is_ok());
    let err = rl.check_at("x", t0).into_result(t0).unwrap_err();
    assert!(matches!(err, MemeError::RateLimited { retry_after } if retry_after == Duration::from_secs(30)));
}

#[tokio::test]
async fn purge_task_runs_without_traffic() {
    let rl = Arc::new(RateLimiter::new(5, Duration::from_millis(10)));
    rl.check("idle");
    assert_eq!(rl.len(), 1);

    let handle = rl.clone().spawn_purge_task(Duration::from_millis(30));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rl.is_empty());
    handle.abort();
}
