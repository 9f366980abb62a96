//! Concurrency properties of the print queue engine.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use printgate_queue::{PrintQueueEngine, QueueError};

#[test]
fn concurrent_submits_get_distinct_ids() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let engine = Arc::new(PrintQueueEngine::default());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|i| engine.submit("shared", &format!("t{t}-{i}.pdf")).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: HashSet<u64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();

    let total = THREADS * PER_THREAD;
    assert_eq!(ids.len(), total);
    assert_eq!(engine.list("shared").unwrap().len(), total);
    assert_eq!(ids, (1..=total as u64).collect());
}

#[test]
fn concurrent_promotes_never_lose_or_duplicate_jobs() {
    let engine = Arc::new(PrintQueueEngine::default());
    for i in 0..20 {
        engine.submit("p1", &format!("{i}.pdf")).unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for round in 0..100u64 {
                    let job_id = (t * 7 + round) % 20 + 1;
                    engine.promote("p1", job_id).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let ids: Vec<u64> = engine.list("p1").unwrap().iter().map(|job| job.id).collect();
    let unique: HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 20);
    assert_eq!(unique, (1..=20).collect());
}

#[test]
fn restart_is_atomic_with_respect_to_submits() {
    let engine = Arc::new(PrintQueueEngine::default());

    let submitters: Vec<_> = ["A", "B", "C"]
        .into_iter()
        .map(|printer| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..500 {
                    engine.submit(printer, &format!("{i}.pdf")).unwrap();
                }
            })
        })
        .collect();

    let restarter = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..50 {
                engine.restart();
            }
        })
    };

    for handle in submitters {
        handle.join().unwrap();
    }
    restarter.join().unwrap();

    assert!(engine.is_running());
    // Whatever survived the last restart is a gap-free run of ids.
    for printer in engine.resources() {
        let ids: Vec<u64> = engine.list(&printer).unwrap().iter().map(|job| job.id).collect();
        assert_eq!(ids, (1..=ids.len() as u64).collect::<Vec<_>>(), "printer {printer}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submits_from_async_tasks_to_many_printers() {
    let engine = Arc::new(PrintQueueEngine::default());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let printer = format!("printer-{}", i % 4);
                engine.submit(&printer, "doc.pdf").map(|job| (printer, job.id))
            })
        })
        .collect();

    for task in tasks {
        let (printer, id) = task.await.unwrap().unwrap();
        assert!((1..=4).contains(&id), "{printer} got id {id}");
    }

    assert_eq!(engine.resources().len(), 4);
    for printer in engine.resources() {
        assert_eq!(engine.status(&printer).queue_length, 4);
    }

    engine.stop();
    assert!(matches!(
        engine.submit("printer-0", "late.pdf"),
        Err(QueueError::ServiceStopped)
    ));
}
