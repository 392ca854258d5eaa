//! Test that an in-place update is rejected once the session has been committed.

use rrb_vector::persistent::PersistentVector;

fn main() {
    let source: PersistentVector<i32> = (0..10).collect();
    let mut transient = source.transient();
    let committed = transient.persistent();
    let _ = transient.update(0, -1);
    let _ = committed;
}
