use util::MappingConfig;

/// Keeps the configs meant for the adapter instance with the given key. A config without key
/// belongs to an instance without key, keys are compared ignoring case.
pub fn filter_configs(configs: Vec<MappingConfig>, key: Option<&str>) -> Vec<MappingConfig> {
    configs
        .into_iter()
        .filter(|config| matches_key(config.adapter_key.as_deref(), key))
        .collect()
}

fn matches_key(config_key: Option<&str>, key: Option<&str>) -> bool {
    match (config_key, key) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
