#![no_main]

use libfuzzer_sys::fuzz_target;
use trove_sdk::citation::{Pid, extract_pids};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Every extracted identifier resolves back to the same ID from its
    // persistent URL. Gazette articles share the news-article form.
    for pid in extract_pids(text) {
        let reparsed = Pid::parse(&pid.persistent_url());
        assert_eq!(reparsed.map(|p| p.id), Some(pid.id));
    }
});
