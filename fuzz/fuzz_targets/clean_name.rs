#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let once = zdom::clean_name(data);
    assert_eq!(zdom::clean_name(&once), once);
    assert!(once.is_empty() || zdom::is_valid_name(&once));
});
