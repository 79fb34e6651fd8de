//! Common test utilities for labbcat integration tests

use labbcat::Config;
use serde_json::{Value, json};
use wiremock::MockServer;

/// Path the mock store is mounted under
pub const BASE_PATH: &str = "/labbcat/";

/// Configuration pointing at the mock server
pub fn mock_config(server: &MockServer) -> Config {
    let mut config = Config::new(format!("{}{}", server.uri(), BASE_PATH));
    config.tasks.default_refresh = std::time::Duration::from_millis(50);
    config
}

/// Full request path for `path` under the mock base
pub fn mock_path(path: &str) -> String {
    format!("{}{}", BASE_PATH, path)
}

/// Successful response envelope wrapping `result`
pub fn envelope(result: Value) -> Value {
    json!({
        "title": "LaBB-CAT",
        "version": "20240301.1025",
        "code": 0,
        "errors": [],
        "messages": [],
        "model": { "result": result }
    })
}

/// Two search result rows, one with anchor ids and one with offsets
pub fn sample_matches() -> Value {
    json!([
        {
            "MatchId": "g_3;em_11_23;n_19985-n_20003;p_4;#=ew_0_12611;prefix=001-",
            "Transcript": "AgnesShacklock-01.trs",
            "Participant": "Agnes Shacklock",
            "Corpus": "UC",
            "Line": 60.897,
            "LineEnd": 67.922,
            "BeforeMatch": "",
            "Text": "knox",
            "AfterMatch": "street"
        },
        {
            "MatchId": "BR2044_OllyOhlson.eaf;1.5-3.25;prefix=002-",
            "Transcript": "BR2044_OllyOhlson.eaf",
            "Participant": "Olly Ohlson",
            "Corpus": "QB",
            "Line": 1.5,
            "LineEnd": 3.25,
            "BeforeMatch": "down on",
            "Text": "knox",
            "AfterMatch": ""
        }
    ])
}
