//! Engine and registry fixtures.

use opsync_engine::{EngineConfig, MutatorError, MutatorRegistry, Reconciler};
use opsync_protocol::Mutation;
use opsync_store::{MemoryStore, SpaceId};
use serde_json::json;
use std::sync::Arc;

/// The space every fixture engine starts with.
pub const TEST_SPACE: &str = "test";

/// Builds an engine over a fresh in-memory store with [`TEST_SPACE`] created.
pub fn engine_with(registry: MutatorRegistry) -> (Reconciler<MemoryStore>, SpaceId) {
    let engine = Reconciler::new(
        Arc::new(MemoryStore::new()),
        Arc::new(registry),
        EngineConfig::default(),
    );
    let space = SpaceId::new(TEST_SPACE);
    engine
        .create_space(&space)
        .expect("creating the fixture space cannot fail on a fresh store");
    (engine, space)
}

/// A registry for sequencing tests.
///
/// - `append`: pushes its argument onto the JSON array under `"log"`. Applied
///   exactly-once and in-order, the log reproduces the submitted arguments
///   exactly; any duplicate or reordered application is visible.
/// - `increment`: adds its integer argument to the number under `"counter"`.
pub fn counter_registry() -> MutatorRegistry {
    MutatorRegistry::new()
        .with("append", |view, args| {
            let mut log = view.get("log")?.unwrap_or_else(|| json!([]));
            log.as_array_mut()
                .ok_or_else(|| MutatorError::failed("log is not an array"))?
                .push(args.clone());
            view.put("log", &log)?;
            Ok(())
        })
        .with("increment", |view, args| {
            let by = args
                .as_i64()
                .ok_or_else(|| MutatorError::invalid_args("args must be an integer"))?;
            let current = view.get("counter")?.and_then(|v| v.as_i64()).unwrap_or(0);
            view.put("counter", &json!(current + by))?;
            Ok(())
        })
}

/// A todo-list registry in the shape real applications register.
pub fn todo_registry() -> MutatorRegistry {
    MutatorRegistry::new()
        .with("createTodo", |view, args| {
            let id = args["id"]
                .as_str()
                .ok_or_else(|| MutatorError::invalid_args("id must be a string"))?;
            view.put(&format!("todo/{id}"), args)?;
            Ok(())
        })
        .with("deleteTodo", |view, args| {
            let id = args
                .as_str()
                .ok_or_else(|| MutatorError::invalid_args("args must be a string id"))?;
            view.delete(&format!("todo/{id}"))?;
            Ok(())
        })
}

/// `append` mutations for the given id range, each carrying its id as the
/// argument.
pub fn append_mutations(ids: impl IntoIterator<Item = u64>) -> Vec<Mutation> {
    ids.into_iter()
        .map(|id| Mutation::new(id, "append", json!(id)))
        .collect()
}

/// Reads the `"log"` array a [`counter_registry`] engine has accumulated.
pub fn read_log(engine: &Reconciler<MemoryStore>, space: &SpaceId) -> Vec<u64> {
    use opsync_store::Store;

    engine
        .store()
        .transact(|tx| {
            let Some(bytes) = tx.entry(space, "log")? else {
                return Ok(Vec::new());
            };
            let value: serde_json::Value = serde_json::from_slice(&bytes)?;
            Ok(value
                .as_array()
                .map(|entries| entries.iter().filter_map(|v| v.as_u64()).collect())
                .unwrap_or_default())
        })
        .expect("reading the fixture log cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsync_protocol::PushRequest;

    #[test]
    fn counter_engine_appends_in_order() {
        let (engine, space) = engine_with(counter_registry());

        engine
            .handle_push(&space, &PushRequest::new("c1", append_mutations(1..=3)))
            .unwrap();

        assert_eq!(read_log(&engine, &space), vec![1, 2, 3]);
    }

    #[test]
    fn todo_engine_round_trip() {
        let (engine, space) = engine_with(todo_registry());

        engine
            .handle_push(
                &space,
                &PushRequest::new(
                    "c1",
                    vec![
                        Mutation::new(1, "createTodo", json!({ "id": "t1", "text": "x" })),
                        Mutation::new(2, "deleteTodo", json!("t1")),
                    ],
                ),
            )
            .unwrap();

        use opsync_store::Store;
        engine
            .store()
            .transact(|tx| {
                assert_eq!(tx.entry(&space, "todo/t1")?, None);
                Ok(())
            })
            .unwrap();
    }
}
