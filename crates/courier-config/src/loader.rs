// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./courier.toml` > `~/.config/courier/courier.toml` > `/etc/courier/courier.toml`
//! with environment variable overrides via the `COURIER_` prefix, plus the
//! legacy `ZAPI_BASE_URL`, `ZAPI_TOKEN` and `PORT` variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CourierConfig;

/// Environment variables honoured without the `COURIER_` prefix.
const LEGACY_ENV_KEYS: &[&str] = &["ZAPI_BASE_URL", "ZAPI_TOKEN", "PORT"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/courier/courier.toml` (system-wide)
/// 3. `~/.config/courier/courier.toml` (user XDG config)
/// 4. `./courier.toml` (local directory)
/// 5. Legacy `ZAPI_*` / `PORT` environment variables
/// 6. `COURIER_*` environment variables
pub fn load_config() -> Result<CourierConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CourierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CourierConfig::default()))
        .merge(Toml::file("/etc/courier/courier.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("courier/courier.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("courier.toml"))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// `COURIER_*` variables, mapped section-by-section with `Env::map()`.
///
/// `Env::split("_")` would turn `COURIER_PROVIDER_BASE_URL` into
/// `provider.base.url`; the explicit prefix rewrite keeps `provider.base_url`.
fn env_provider() -> Env {
    Env::prefixed("COURIER_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("provider_", "provider.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("dispatch_", "dispatch.", 1);
        mapped.into()
    })
}

/// Variable names used by earlier deployments of the service.
fn legacy_env_provider() -> Env {
    Env::raw().only(LEGACY_ENV_KEYS).map(|key| {
        match key.as_str().to_ascii_lowercase().as_str() {
            "zapi_base_url" => "provider.base_url".into(),
            "zapi_token" => "provider.token".into(),
            "port" => "server.port".into(),
            other => other.to_string().into(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn prefixed_env_overrides_file_values() {
        Jail::expect_with(|jail| {
            jail.create_file("courier.toml", "[provider]\nbase_url = \"http://file.local\"\n")?;
            jail.set_env("COURIER_PROVIDER_BASE_URL", "http://env.local");
            jail.set_env("COURIER_DISPATCH_SEND_INTERVAL_MS", "250");

            let config = load_config_from_path(Path::new("courier.toml"))?;
            assert_eq!(config.provider.base_url, "http://env.local");
            assert_eq!(config.dispatch.send_interval_ms, 250);
            Ok(())
        });
    }

    #[test]
    fn legacy_env_names_are_honoured() {
        Jail::expect_with(|jail| {
            jail.create_file("courier.toml", "")?;
            jail.set_env("ZAPI_BASE_URL", "http://legacy.local");
            jail.set_env("ZAPI_TOKEN", "legacy-token");
            jail.set_env("PORT", "4100");

            let config = load_config_from_path(Path::new("courier.toml"))?;
            assert_eq!(config.provider.base_url, "http://legacy.local");
            assert_eq!(config.provider.token.as_deref(), Some("legacy-token"));
            assert_eq!(config.server.port, 4100);
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_wins_over_legacy_env() {
        Jail::expect_with(|jail| {
            jail.create_file("courier.toml", "")?;
            jail.set_env("PORT", "4100");
            jail.set_env("COURIER_SERVER_PORT", "4200");

            let config = load_config_from_path(Path::new("courier.toml"))?;
            assert_eq!(config.server.port, 4200);
            Ok(())
        });
    }
}
