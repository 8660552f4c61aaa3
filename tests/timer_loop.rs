use std::thread;
use std::time::Duration;

use vtimer::{
    Clock, HostTicks, ManualTicks, SharedTimerService, TimeoutError, TimeoutList, TimerService,
    NO_DEADLINE,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn two_timers_fire_in_deadline_order() {
    init_logging();
    let mut list = TimeoutList::<8>::new();

    let one = list.alloc().unwrap();
    assert_eq!(one.get(), 1);
    list.request(one, 500).unwrap();
    assert_eq!(list.next_deadline(), 500);

    let two = list.alloc().unwrap();
    assert_eq!(two.get(), 2);
    assert_eq!(list.request(two, 300), Ok(true));
    assert_eq!(list.next_deadline(), 300);

    assert_eq!(list.poll(300), Some(two));
    assert_eq!(list.cancel(two), Ok(true));
    assert_eq!(list.poll(300), None);
    assert_eq!(list.poll(500), Some(one));
}

#[test]
fn exhausting_capacity_is_reported_and_harmless() {
    init_logging();
    const ENTRIES: usize = 8;
    let mut list = TimeoutList::<ENTRIES>::new();

    let mut issued = Vec::new();
    for _ in 0..ENTRIES - 1 {
        issued.push(list.alloc().unwrap());
    }
    for (i, &h) in issued.iter().enumerate() {
        list.request(h, 1_000 - i as u64).unwrap();
    }
    let snapshot: Vec<_> = list.iter().collect();

    assert_eq!(
        list.alloc(),
        Err(TimeoutError::CapacityExhausted {
            capacity: ENTRIES - 1
        })
    );
    assert_eq!(list.iter().collect::<Vec<_>>(), snapshot);
    assert_eq!(list.next_deadline(), 1_000 - (ENTRIES as u64 - 2));
}

#[test]
fn fifty_hertz_tick_from_gigahertz_counter() {
    let clock = Clock::new(1_000_000_000, ManualTicks::new()).unwrap();
    assert_eq!(clock.deadline_from_delta(1, 50), 20_000_000);
    assert_eq!(
        clock.deadline_from_delta(u64::MAX, u64::MAX),
        1_000_000_000
    );
}

#[test]
fn idle_list_reports_no_deadline() {
    let mut svc: TimerService<_, 4> = TimerService::new(Clock::host());
    assert_eq!(svc.timeouts().next_deadline(), NO_DEADLINE);
    assert_eq!(svc.next_deadline(), None);
    assert!(svc.expire().is_empty());
}

#[test]
fn host_clock_timer_loop_delivers_a_short_timeout() {
    init_logging();
    let svc: SharedTimerService<HostTicks, 4> =
        SharedTimerService::new(TimerService::new(Clock::host()));
    let handle = svc.alloc().unwrap();

    let loop_thread = {
        let svc = svc.clone();
        thread::spawn(move || svc.wait_timeout(Duration::from_secs(10)))
    };

    // 2 ms in a millisecond domain.
    svc.arm_in(handle, 2, 1_000).unwrap();
    let events = loop_thread.join().expect("timer loop panicked");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].handle, handle);
}
