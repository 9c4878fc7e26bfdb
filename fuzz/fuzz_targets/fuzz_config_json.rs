#![no_main]

use agora_nav::TrackerConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Must never panic; anything accepted must also validate cleanly.
    if let Ok(config) = TrackerConfig::from_json_str(text) {
        assert!(config.validate().is_empty());
        assert!(config.activation_frames >= 1);
    }
});
