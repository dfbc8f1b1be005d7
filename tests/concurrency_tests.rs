//! # Concurrency Tests
//!
//! Identity cache behaviour under parallel first access:
//! - One provider load per identity, however many callers race
//! - Callers for different identities do not share stores
//! - Failed loads are retried instead of cached
//! - The process-wide context lifecycle (serialized)

use metabind::{
    global, init, shutdown, Bundle, Identity, MetadataContext, MetadataError, MockProvider,
};
use serial_test::serial;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

// ============================================================================
// TEST HELPERS
// ============================================================================

const PACKAGE: &str = "com.example.app";

fn app() -> Identity {
    Identity::application(PACKAGE).unwrap()
}

fn activity() -> Identity {
    Identity::component(PACKAGE, ".TestActivity").unwrap()
}

fn provider() -> MockProvider {
    MockProvider::new()
        .with_bundle(
            app(),
            Bundle::builder()
                .string("metadata.string", "Hello, World!")
                .int("metadata.integer", 42)
                .build(),
        )
        .with_bundle(
            activity(),
            Bundle::builder()
                .string("metadata.activity.string", "Hello, World")
                .build(),
        )
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// SINGLE-FLIGHT
// ============================================================================

#[test]
fn test_concurrent_first_access_single_load() {
    init_tracing();
    const THREADS: usize = 16;

    let mock = provider().with_delay(Duration::from_millis(25));
    let context = Arc::new(MetadataContext::builder(PACKAGE, mock.clone()).build().unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let identity = if i % 2 == 0 { app() } else { activity() };
                context.get(&identity).unwrap()
            })
        })
        .collect();

    let stores: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(mock.load_count(&app()), 1);
    assert_eq!(mock.load_count(&activity()), 1);

    for (i, store) in stores.iter().enumerate() {
        let first = &stores[i % 2];
        assert!(Arc::ptr_eq(first, store));
    }
    assert!(!Arc::ptr_eq(&stores[0], &stores[1]));
    assert_eq!(context.cache().stats().loads, 2);
}

#[test]
fn test_repeated_lookups_are_idempotent() {
    let mock = provider();
    let context = MetadataContext::builder(PACKAGE, mock.clone()).build().unwrap();

    let values: Vec<i32> = (0..10)
        .map(|_| {
            context
                .application()
                .unwrap()
                .get_as::<i32>("metadata.integer")
                .unwrap()
        })
        .collect();

    assert!(values.iter().all(|v| *v == 42));
    assert_eq!(mock.load_count(&app()), 1);
    assert_eq!(context.cache().stats().hits, 9);
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_failed_load_is_retried() {
    let mock = provider();
    mock.fail_next(1);
    let context = MetadataContext::builder(PACKAGE, mock.clone()).build().unwrap();

    assert!(matches!(
        context.application(),
        Err(MetadataError::IdentityNotFound { .. })
    ));
    assert!(!context.cache().contains(&app()));

    let store = context.application().unwrap();
    assert_eq!(store.get_metadata().len(), 2);
    assert_eq!(mock.load_count(&app()), 2);
    assert_eq!(context.cache().stats().failures, 1);
}

#[test]
fn test_concurrent_failure_then_success() {
    const THREADS: usize = 8;

    let mock = provider().with_delay(Duration::from_millis(10));
    mock.fail_next(1);
    let context = Arc::new(MetadataContext::builder(PACKAGE, mock.clone()).build().unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                context.application().is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    // Exactly one caller saw the simulated failure; the rest share one load
    assert_eq!(successes, THREADS - 1);
    assert_eq!(mock.load_count(&app()), 2);
}

// ============================================================================
// PROCESS-WIDE CONTEXT
// ============================================================================

#[test]
#[serial]
fn test_global_context_from_threads() {
    shutdown();
    init(MetadataContext::builder(PACKAGE, provider()).build().unwrap()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(|| {
                global()
                    .unwrap()
                    .component(".TestActivity")
                    .unwrap()
                    .get_metadata()
                    .len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }

    let context = shutdown().unwrap();
    assert_eq!(context.cache().len(), 1);
    assert!(matches!(global(), Err(MetadataError::NotInitialized)));
}

#[test]
#[serial]
fn test_shutdown_resets_state() {
    shutdown();
    let first = MockProvider::new().with_bundle(app(), Bundle::empty());
    init(MetadataContext::builder(PACKAGE, first).build().unwrap()).unwrap();
    assert!(global().unwrap().application().unwrap().get_metadata().is_empty());
    shutdown();

    init(MetadataContext::builder(PACKAGE, provider()).build().unwrap()).unwrap();
    assert_eq!(global().unwrap().application().unwrap().get_metadata().len(), 2);
    shutdown();
}
