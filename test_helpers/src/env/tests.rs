//! Unit tests for environment guards.

use super::*;
use std::sync::{Arc, Barrier};
use std::thread;

fn value(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[test]
fn set_var_restores_original() {
    let _base = set_var("PROPBIND_HELPERS_SET", "orig");
    {
        let _guard = set_var("PROPBIND_HELPERS_SET", "temp");
        assert_eq!(value("PROPBIND_HELPERS_SET").as_deref(), Some("temp"));
    }
    assert_eq!(value("PROPBIND_HELPERS_SET").as_deref(), Some("orig"));
}

#[test]
fn remove_var_restores_value() {
    let _base = set_var("PROPBIND_HELPERS_REMOVE", "present");
    {
        let _guard = remove_var("PROPBIND_HELPERS_REMOVE");
        assert_eq!(value("PROPBIND_HELPERS_REMOVE"), None);
    }
    assert_eq!(value("PROPBIND_HELPERS_REMOVE").as_deref(), Some("present"));
}

#[test]
fn set_var_unsets_when_absent() {
    let key = "PROPBIND_HELPERS_UNSET";
    drop(remove_var(key));
    {
        let _guard = set_var(key, "tmp");
        assert_eq!(value(key).as_deref(), Some("tmp"));
    }
    assert_eq!(value(key), None);
}

#[test]
fn stacking_restores_in_lifo() {
    let key = "PROPBIND_HELPERS_STACK";
    let first = set_var(key, "v1");
    let second = set_var(key, "v2");
    assert_eq!(value(key).as_deref(), Some("v2"));
    drop(second);
    assert_eq!(value(key).as_deref(), Some("v1"));
    drop(first);
}

#[test]
fn scope_vars_sets_and_restores_together() {
    {
        let _scope = scope_vars([
            ("PROPBIND_HELPERS_SCOPE_A", "1"),
            ("PROPBIND_HELPERS_SCOPE_B", "2"),
        ]);
        assert_eq!(value("PROPBIND_HELPERS_SCOPE_A").as_deref(), Some("1"));
        assert_eq!(value("PROPBIND_HELPERS_SCOPE_B").as_deref(), Some("2"));
    }
    assert_eq!(value("PROPBIND_HELPERS_SCOPE_A"), None);
    assert_eq!(value("PROPBIND_HELPERS_SCOPE_B"), None);
}

#[test]
fn concurrent_mutations_restore_values() {
    const THREADS: usize = 4;
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|index| {
            let gate = Arc::clone(&barrier);
            thread::spawn(move || {
                let key = format!("PROPBIND_HELPERS_THREAD_{index}");
                gate.wait();
                for iteration in 0..8 {
                    let expected = format!("value-{iteration}");
                    let guard = set_var(&key, &expected);
                    assert_eq!(value(&key), Some(expected));
                    drop(guard);
                    assert_eq!(value(&key), None);
                }
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().is_ok(), "worker thread panicked");
    }
}
