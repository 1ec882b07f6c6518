use super::*;
use crate::RagError;
use serial_test::serial;

const KEY_VAR: &str = "RAGDEX_COMPLETION_TEST_KEY";

fn test_config() -> Config {
    let mut config = Config::with_base_dir("/tmp/ragdex-test");
    config.completion.model = "gemini-1.5-flash".to_string();
    config.completion.api_key_env = KEY_VAR.to_string();
    config.completion.temperature = 0.7;
    config.completion.max_output_tokens = 128;
    config
}

#[test]
#[serial]
fn client_configuration() {
    // SAFETY: #[serial] tests are the only environment writers here.
    unsafe { std::env::set_var(KEY_VAR, "completion-key") };

    let client = CompletionClient::new(&test_config()).expect("Failed to create client");

    assert_eq!(client.model, "gemini-1.5-flash");
    assert_eq!(client.api_key, "completion-key");
    assert_eq!(client.temperature, 0.7);
    assert_eq!(client.max_output_tokens, 128);

    // SAFETY: see above.
    unsafe { std::env::remove_var(KEY_VAR) };
}

#[test]
#[serial]
fn missing_api_key_fails_construction() {
    // SAFETY: #[serial] tests are the only environment writers here.
    unsafe { std::env::remove_var(KEY_VAR) };

    let result = CompletionClient::new(&test_config());
    assert!(matches!(result, Err(RagError::Config(_))));
}
