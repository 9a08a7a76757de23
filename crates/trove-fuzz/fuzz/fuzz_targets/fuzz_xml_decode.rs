#![no_main]

use libfuzzer_sys::fuzz_target;
use trove_sdk::models::SearchResponse;
use trove_sdk::models::xml::xml_to_value;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Decoding may fail, but never panic; decoded trees feed the same models as JSON.
    if let Ok(value) = xml_to_value(text) {
        if let Ok(response) = serde_json::from_value::<SearchResponse>(value) {
            for category in &response.categories {
                let _ = category.records().count();
            }
        }
    }
});
