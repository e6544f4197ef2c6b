//! Property-based serialization round-trip tests.
//!
//! Uses proptest to verify:
//! 1. Any valid `Task` survives encode → decode round-trip.
//! 2. Any valid `TaskPatch` survives round-trip, including the nested
//!    due-date option.
//! 3. Any valid `StoreMessage` survives round-trip.
//! 4. Random bytes never cause a panic in `decode` (returns `Err` gracefully).

use checked_proto::store::{StoreMessage, decode, encode};
use checked_proto::task::{Task, TaskId, TaskPatch};
use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

// --- Arbitrary implementations for protocol types ---

/// Strategy for generating arbitrary `TaskId` values.
fn arb_task_id() -> impl Strategy<Value = TaskId> {
    any::<u128>().prop_map(|n| TaskId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating arbitrary dates within chrono's valid range.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..=9999, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Strategy for generating arbitrary `Task` values.
fn arb_task() -> impl Strategy<Value = Task> {
    (
        arb_task_id(),
        "[^\x00]{0,256}",
        any::<bool>(),
        prop::option::of(arb_date()),
        any::<u64>(),
        any::<u64>(),
        "[a-z0-9-]{1,32}",
    )
        .prop_map(
            |(id, name, is_done, due_date, created_at, updated_at, owner)| Task {
                id,
                name,
                is_done,
                due_date,
                created_at,
                updated_at,
                owner,
            },
        )
}

/// Strategy for generating arbitrary `TaskPatch` values, covering all
/// three due-date shapes: absent, explicit null, and a concrete date.
fn arb_patch() -> impl Strategy<Value = TaskPatch> {
    (
        arb_task_id(),
        prop::option::of("[^\x00]{0,256}"),
        prop::option::of(any::<bool>()),
        prop::option::of(prop::option::of(arb_date())),
    )
        .prop_map(|(id, name, is_done, due_date)| TaskPatch {
            id,
            name,
            is_done,
            due_date,
        })
}

/// Strategy for generating arbitrary `StoreMessage` values.
fn arb_store_message() -> impl Strategy<Value = StoreMessage> {
    prop_oneof![
        "[a-z0-9-]{1,32}".prop_map(|owner| StoreMessage::Hello { owner }),
        "[a-z0-9-]{1,32}".prop_map(|owner| StoreMessage::Welcome { owner }),
        (any::<u64>(), "[^\x00]{1,256}")
            .prop_map(|(op_id, name)| StoreMessage::Create { op_id, name }),
        (any::<u64>(), arb_patch()).prop_map(|(op_id, patch)| StoreMessage::Update { op_id, patch }),
        (any::<u64>(), arb_task_id()).prop_map(|(op_id, id)| StoreMessage::Delete { op_id, id }),
        any::<u64>().prop_map(|op_id| StoreMessage::Ack { op_id }),
        (any::<u64>(), "[^\x00]{0,128}")
            .prop_map(|(op_id, reason)| StoreMessage::Rejected { op_id, reason }),
        prop::collection::vec(arb_task(), 0..8).prop_map(|tasks| StoreMessage::Snapshot { tasks }),
        "[^\x00]{0,128}".prop_map(|reason| StoreMessage::Error { reason }),
    ]
}

// --- Round-trip properties ---

proptest! {
    #[test]
    fn task_round_trip(task in arb_task()) {
        let bytes = postcard::to_allocvec(&task).expect("serialize");
        let decoded: Task = postcard::from_bytes(&bytes).expect("deserialize");
        prop_assert_eq!(task, decoded);
    }

    #[test]
    fn patch_round_trip_preserves_due_date_shape(patch in arb_patch()) {
        let bytes = postcard::to_allocvec(&patch).expect("serialize");
        let decoded: TaskPatch = postcard::from_bytes(&bytes).expect("deserialize");
        prop_assert_eq!(&patch.due_date, &decoded.due_date);
        prop_assert_eq!(patch, decoded);
    }

    #[test]
    fn store_message_round_trip(msg in arb_store_message()) {
        let bytes = encode(&msg).expect("encode");
        let decoded = decode(&bytes).expect("decode");
        prop_assert_eq!(msg, decoded);
    }

    #[test]
    fn decode_never_panics_on_random_bytes(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        // Must return Ok or Err, never panic.
        let _ = decode(&bytes);
    }
}
