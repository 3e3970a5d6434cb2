//! Expensive heap verification, compiled in with the `extreme_assertions` feature.

use crate::plan::generational::Gen;
use crate::policy::space::Space;
use crate::vm::ClassRegistry;

/// Check the heap right after a minor collection: no slot of any object refers to a space that
/// was just emptied, and every old object that refers to the young generation is remembered.
pub fn verify_after_minor(plan: &Gen, classes: &ClassRegistry) {
    let mut checked = 0;
    for object in plan.all_objects() {
        let mature = plan.is_mature(object.to_raw_address());
        classes.class_of(object).for_each_slot(object, |slot| {
            let Some(referent) = slot.load() else {
                return;
            };
            let addr = referent.to_raw_address();
            assert!(
                !plan.nursery.eden.contains(addr) && !plan.nursery.in_to(addr),
                "{:?} of {} refers to {} in an empty space",
                slot,
                object,
                referent
            );
            if mature && plan.is_young(addr) {
                assert!(
                    plan.remset.contains(object),
                    "{} refers to young {} but is not remembered",
                    object,
                    referent
                );
            }
            checked += 1;
        });
    }
    trace!("Verified {} slots after a minor collection", checked);
}
