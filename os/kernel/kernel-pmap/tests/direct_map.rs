use kernel_info::memory::{DMAP_BASE, DMAP_SIZE};
use kernel_memory_addresses::PhysicalAddress;
use kernel_pmap::{bootstrap_direct_map, phys_to_dmap};
use std::panic::catch_unwind;

// One test drives the whole lifecycle: the window is process-global, so
// ordering matters and parallel test functions would race the bootstrap.
#[test]
fn bootstraps_once_and_translates_linearly() {
    bootstrap_direct_map();

    assert_eq!(phys_to_dmap(PhysicalAddress::new(0)).as_u64(), DMAP_BASE);
    assert_eq!(
        phys_to_dmap(PhysicalAddress::new(0x4000_0000)).as_u64(),
        DMAP_BASE + 0x4000_0000
    );

    // the last covered byte still translates
    assert_eq!(
        phys_to_dmap(PhysicalAddress::new(DMAP_SIZE - 1)).as_u64(),
        DMAP_BASE + DMAP_SIZE - 1
    );

    // one past the end is a contract violation
    let oob = catch_unwind(|| phys_to_dmap(PhysicalAddress::new(DMAP_SIZE)));
    assert!(oob.is_err(), "out-of-window translation must panic");

    // the bounds are fixed for the lifetime of the process
    let again = catch_unwind(bootstrap_direct_map);
    assert!(again.is_err(), "second bootstrap must panic");
}
