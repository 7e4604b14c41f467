/*!
 * Tests for application configuration
 */

use std::str::FromStr;

use anchorsync::app_config::{Config, MatcherProvider, SyncConfig};

/// Test default configuration values
#[test]
fn test_config_default_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.sync.anchor_groups, 6);
    assert_eq!(config.sync.entries_per_group, 4);
    assert_eq!(config.sync.search_window, 40);
    assert_eq!(config.sync.max_deviation_factor, 3.0);
    assert_eq!(config.sync.excerpt_chars, 80);
    assert_eq!(config.sync.concurrent_groups, 3);
    assert_eq!(config.sync.retry_count, 3);
    assert_eq!(config.sync.retry_backoff_ms, 1000);

    assert_eq!(config.matcher.provider, MatcherProvider::OpenAI);
    assert_eq!(config.matcher.available_providers.len(), 2);
}

/// Missing fields fall back to their defaults during deserialization
#[test]
fn test_config_deserialization_withPartialJson_shouldUseDefaults() {
    let json = r#"{
        "sync": { "anchor_groups": 10 },
        "matcher": {
            "provider": "lmstudio",
            "available_providers": [
                { "type": "lmstudio", "model": "mistral-7b" }
            ]
        }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.sync.anchor_groups, 10);
    assert_eq!(config.sync.entries_per_group, 4);
    assert_eq!(config.matcher.provider, MatcherProvider::LMStudio);
    assert_eq!(config.matcher.get_model(), "mistral-7b");
}

/// Provider getters fall back to built-in defaults when the entry is missing
#[test]
fn test_matcher_config_getters_withNoProviderEntry_shouldFallBack() {
    let mut config = Config::default();
    config.matcher.available_providers.clear();

    config.matcher.provider = MatcherProvider::OpenAI;
    assert_eq!(config.matcher.get_endpoint(), "https://api.openai.com/v1");
    assert_eq!(config.matcher.get_model(), "gpt-4o-mini");
    assert_eq!(config.matcher.get_timeout_secs(), 60);

    config.matcher.provider = MatcherProvider::LMStudio;
    assert_eq!(config.matcher.get_endpoint(), "http://localhost:1234/v1");
    assert_eq!(config.matcher.get_model(), "local-model");
    assert!(config.matcher.get_api_key().is_empty());
}

/// Test provider parsing and display
#[test]
fn test_matcher_provider_fromStr_shouldParseKnownNames() {
    assert_eq!(MatcherProvider::from_str("openai").unwrap(), MatcherProvider::OpenAI);
    assert_eq!(MatcherProvider::from_str("LMStudio").unwrap(), MatcherProvider::LMStudio);
    assert!(MatcherProvider::from_str("ollama").is_err());

    assert_eq!(MatcherProvider::OpenAI.to_string(), "openai");
    assert_eq!(MatcherProvider::LMStudio.display_name(), "LM Studio");
}

/// Validation rejects zeroed sync parameters
#[test]
fn test_config_validation_withZeroAnchorGroups_shouldFail() {
    let mut config = Config::default();
    config.sync.anchor_groups = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_withNegativeDeviationFactor_shouldFail() {
    let mut config = Config::default();
    config.sync.max_deviation_factor = -1.0;
    assert!(config.validate().is_err());
}

/// The OpenAI provider needs a key; the local provider does not
#[test]
fn test_config_validation_withMissingApiKey_shouldDependOnProvider() {
    let mut config = Config::default();

    config.matcher.provider = MatcherProvider::OpenAI;
    assert!(config.validate().is_err(), "OpenAI without a key is invalid");

    config.matcher.provider = MatcherProvider::LMStudio;
    assert!(config.validate().is_ok(), "LM Studio runs without a key");

    config.matcher.provider = MatcherProvider::OpenAI;
    if let Some(provider) = config
        .matcher
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "openai")
    {
        provider.api_key = "sk-test".to_string();
    }
    assert!(config.validate().is_ok());
}

/// Config serializes back to JSON with the provider names in lowercase
#[test]
fn test_config_serialization_shouldUseLowercaseProviderNames() {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config).unwrap();

    assert!(json.contains("\"provider\": \"openai\""));
    assert!(json.contains("\"type\": \"lmstudio\""));
}

/// SyncConfig alone round-trips through JSON
#[test]
fn test_sync_config_serde_shouldRoundTrip() {
    let config = SyncConfig {
        anchor_groups: 8,
        entries_per_group: 5,
        ..SyncConfig::default()
    };

    let json = serde_json::to_string(&config).unwrap();
    let reparsed: SyncConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(reparsed.anchor_groups, 8);
    assert_eq!(reparsed.entries_per_group, 5);
    assert_eq!(reparsed.search_window, config.search_window);
}
