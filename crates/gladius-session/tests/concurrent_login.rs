//! Registry behaviour under concurrent logins, shared the way the server
//! shares it: one `ClientRegistry` behind a Tokio mutex.

use std::sync::Arc;

use gladius_protocol::PlayerId;
use gladius_session::{ClientRegistry, SessionError};
use tokio::sync::Mutex;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_register_same_name_concurrently_exactly_one_wins() {
    let registry = Arc::new(Mutex::new(ClientRegistry::new()));

    let mut tasks = Vec::new();
    for i in 0..32 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            let mut registry = registry.lock().await;
            let result = registry.register("bob", PlayerId(i)).map(|_| ());
            result
        }));
    }

    let mut wins = 0;
    let mut duplicates = 0;
    for task in tasks {
        match task.await.expect("task should not panic") {
            Ok(()) => wins += 1,
            Err(SessionError::DuplicateConnection(_)) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(duplicates, 31);
    assert_eq!(registry.lock().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_check_then_register_race_is_caught_by_register() {
    // Both logins pass the availability check before either registers.
    let registry = Arc::new(Mutex::new(ClientRegistry::new()));
    assert!(registry.lock().await.check("bob").is_ok());
    assert!(registry.lock().await.check("bob").is_ok());

    let first = registry.lock().await.register("bob", PlayerId(1)).is_ok();
    let second = registry
        .lock()
        .await
        .register("bob", PlayerId(2))
        .map(|_| ());

    assert!(first);
    assert!(matches!(second, Err(SessionError::DuplicateConnection(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_names_register_concurrently() {
    let registry = Arc::new(Mutex::new(ClientRegistry::new()));

    let mut tasks = Vec::new();
    for i in 0..16 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            let name = format!("player{i}");
            let mut registry = registry.lock().await;
            let result = registry.register(&name, PlayerId(i)).map(|_| ());
            result
        }));
    }
    for task in tasks {
        task.await.unwrap().expect("distinct names never collide");
    }

    assert_eq!(registry.lock().await.len(), 16);
}
