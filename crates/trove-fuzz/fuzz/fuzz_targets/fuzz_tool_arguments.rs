#![no_main]

use libfuzzer_sys::fuzz_target;
use trove_sdk::models::{HarvestInput, SearchInput};
use trove_sdk::tools::{self, schema};

fuzz_target!(|data: &[u8]| {
    let Ok(arguments) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    for tool in tools::register_all_tools() {
        let _ = schema::validate(&tool.input_schema(), &arguments);
    }
    let _ = serde_json::from_value::<SearchInput>(arguments.clone());
    let _ = serde_json::from_value::<HarvestInput>(arguments);
});
