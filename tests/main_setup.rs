use platform_shell::{AppConfig, config::Env, error::ConfigError};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: [&str; 7] = [
    "APP_ENV",
    "JWT_SECRET",
    "BIND_ADDR",
    "LOGIN_URL",
    "UNAUTHORIZED_URL",
    "MEMBER_API_URL",
    "PROFILE_TIMEOUT_MS",
];

// --- Setup/Teardown Utilities ---

/// Utility to run a test function on a clean environment and restore the
/// original variables afterward
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    // Run the test
    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    // Re-panic if the test failed
    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("LOGIN_URL", "https://accounts.topcoder.com/");
            env::set_var("MEMBER_API_URL", "https://api.topcoder.com/v5");
        }
        // JWT_SECRET is missing
        AppConfig::load()
    });

    assert!(
        matches!(result, Err(ConfigError::Missing("JWT_SECRET"))),
        "Production config loading should fail on a missing secret"
    );
}

#[test]
#[serial]
fn test_app_config_production_requires_member_api() {
    let result = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("JWT_SECRET", "prod-secret");
            env::set_var("LOGIN_URL", "https://accounts.topcoder.com/");
        }
        AppConfig::load()
    });

    assert!(matches!(result, Err(ConfigError::Missing("MEMBER_API_URL"))));
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    // Local mode needs nothing from the environment
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    })
    .expect("local config loads without variables");

    assert_eq!(config.env, Env::Local);
    // Check local JWT secret fallback
    assert_eq!(config.jwt_secret, "super-secure-test-secret-value-local");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.unauthorized_url, "/");
    assert!(config.member_api_url.is_none());
    assert_eq!(config.profile_timeout, Duration::from_secs(5));
    assert_eq!(config.login_url, AppConfig::default().login_url);
}

#[test]
#[serial]
fn test_app_config_rejects_invalid_values() {
    let result = run_with_env(|| {
        unsafe {
            env::set_var("PROFILE_TIMEOUT_MS", "soon");
        }
        AppConfig::load()
    });
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            var: "PROFILE_TIMEOUT_MS",
            ..
        })
    ));

    let result = run_with_env(|| {
        unsafe {
            env::set_var("LOGIN_URL", "not a url");
        }
        AppConfig::load()
    });
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            var: "LOGIN_URL",
            ..
        })
    ));
}

#[test]
#[serial]
fn test_app_config_production_complete() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("JWT_SECRET", "prod-secret");
            env::set_var("LOGIN_URL", "https://accounts.topcoder.com/");
            env::set_var("UNAUTHORIZED_URL", "/unauthorized");
            env::set_var("MEMBER_API_URL", "https://api.topcoder.com/v5");
            env::set_var("PROFILE_TIMEOUT_MS", "1500");
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
        }
        AppConfig::load()
    })
    .expect("complete production config loads");

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.profile_timeout, Duration::from_millis(1500));
    assert_eq!(config.member_api_url.as_deref(), Some("https://api.topcoder.com/v5"));

    let redirects = config.redirects();
    assert_eq!(redirects.login_url.as_str(), "https://accounts.topcoder.com/");
    assert_eq!(redirects.unauthorized_url, "/unauthorized");
}

#[test]
fn test_app_config_debug_redacts_secret() {
    let config = AppConfig {
        jwt_secret: "do-not-print".to_string(),
        ..AppConfig::default()
    };
    let printed = format!("{config:?}");
    assert!(!printed.contains("do-not-print"));
    assert!(printed.contains("[REDACTED]"));
}
