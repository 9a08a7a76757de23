#![no_main]

use libfuzzer_sys::fuzz_target;
use trove_sdk::citation::Citation;
use trove_sdk::formatters::{compact_search, format_search_markdown};
use trove_sdk::models::SearchResponse;

fuzz_target!(|data: &[u8]| {
    let Ok(response) = serde_json::from_slice::<SearchResponse>(data) else {
        return;
    };

    let _ = format_search_markdown(&response);
    let _ = compact_search(&response);
    for category in &response.categories {
        for record in category.records() {
            let _ = Citation::from_record(&record);
        }
    }
});
