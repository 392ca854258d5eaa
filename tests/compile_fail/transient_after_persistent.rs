//! Test that a transient vector cannot be written to after it is committed.

use rrb_vector::persistent::TransientVector;

fn main() {
    let mut transient: TransientVector<i32> = TransientVector::new();
    transient.push_back(1);
    let _vector = transient.persistent();
    transient.push_back(2);
}
