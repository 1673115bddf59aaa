use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

fn counting(delay: Duration) -> (Debouncer, Arc<AtomicUsize>) {
	let fired = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&fired);
	let debouncer = Debouncer::new(delay, move || {
		let counter = Arc::clone(&counter);
		async move {
			counter.fetch_add(1, Ordering::SeqCst);
		}
	});
	(debouncer, fired)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn burst_collapses_to_one_fire() {
	let (debouncer, fired) = counting(Duration::from_millis(100));

	debouncer.request();
	tokio::time::sleep(Duration::from_millis(50)).await;
	debouncer.request();
	tokio::time::sleep(Duration::from_millis(50)).await;
	debouncer.request();
	assert_eq!(fired.load(Ordering::SeqCst), 0);

	tokio::time::sleep(Duration::from_millis(150)).await;
	assert_eq!(fired.load(Ordering::SeqCst), 1);
	assert!(!debouncer.is_pending());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn fires_only_after_quiescence() {
	let (debouncer, fired) = counting(Duration::from_millis(100));

	debouncer.request();
	tokio::time::sleep(Duration::from_millis(99)).await;
	assert_eq!(fired.load(Ordering::SeqCst), 0);
	assert!(debouncer.is_pending());

	tokio::time::sleep(Duration::from_millis(2)).await;
	assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn cancel_pending_drops_the_call() {
	let (debouncer, fired) = counting(Duration::from_millis(100));

	debouncer.request();
	debouncer.cancel_pending();
	assert!(!debouncer.is_pending());

	tokio::time::sleep(Duration::from_millis(500)).await;
	assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn separate_windows_fire_separately() {
	let (debouncer, fired) = counting(Duration::from_millis(10));

	debouncer.request();
	tokio::time::sleep(Duration::from_millis(20)).await;
	debouncer.request();
	tokio::time::sleep(Duration::from_millis(20)).await;

	assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn drop_cancels_pending_timer() {
	let (debouncer, fired) = counting(Duration::from_millis(100));

	debouncer.request();
	drop(debouncer);
	tokio::time::sleep(Duration::from_millis(500)).await;

	assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn fires_without_an_ambient_runtime() {
	let (tx, rx) = std::sync::mpsc::channel();
	let tx = parking_lot::Mutex::new(tx);
	let debouncer = Debouncer::new(Duration::from_millis(1), move || {
		let _ = tx.lock().send(());
		async {}
	});

	debouncer.request();

	assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
	assert!(!debouncer.is_pending());
}
