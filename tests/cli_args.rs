//! Integration tests for CLI argument handling
//!
//! Tests the --location and --city flags from the command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_skycast"))
        .args(args)
        .output()
        .expect("Failed to execute skycast")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skycast"), "Help should mention skycast");
    assert!(stdout.contains("location"), "Help should mention --location");
    assert!(stdout.contains("city"), "Help should mention --city");
}

#[test]
fn test_invalid_location_prints_error_and_exits() {
    let output = run_cli(&["--location", "not-a-coordinate"]);
    assert!(
        !output.status.success(),
        "Expected invalid location to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid location"),
        "Should print error message about invalid location: {}",
        stderr
    );
}

#[test]
fn test_out_of_range_location_prints_error_and_exits() {
    let output = run_cli(&["--location", "91.0,10.0"]);
    assert!(
        !output.status.success(),
        "Expected out-of-range latitude to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid location"),
        "Should print error message about invalid location: {}",
        stderr
    );
}

#[test]
fn test_location_with_help_is_valid() {
    // This test just verifies the argument is accepted (doesn't error immediately)
    // The actual startup fetch is tested in unit tests
    let output = run_cli(&["--location", "49.28,-123.12", "--help"]);
    // With --help, it should succeed regardless of other flags
    // This is a workaround since we can't easily test TUI apps
    assert!(output.status.success());
}

#[test]
fn test_city_with_help_is_valid() {
    let output = run_cli(&["--city", "Seattle", "--help"]);
    assert!(output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use skycast::cli::{parse_location_arg, Cli, StartupConfig};

    #[test]
    fn test_cli_no_args_has_no_flags() {
        let cli = Cli::parse_from(["skycast"]);
        assert!(cli.location.is_none());
        assert!(cli.city.is_none());
    }

    #[test]
    fn test_cli_location_flag_with_value() {
        let cli = Cli::parse_from(["skycast", "--location", "49.28,-123.12"]);
        assert_eq!(cli.location.as_deref(), Some("49.28,-123.12"));
    }

    #[test]
    fn test_cli_city_flag_with_value() {
        let cli = Cli::parse_from(["skycast", "--city", "Portland"]);
        assert_eq!(cli.city.as_deref(), Some("Portland"));
    }

    #[test]
    fn test_parse_location_arg_valid_pair() {
        let result = parse_location_arg("49.28,-123.12");
        assert!(result.is_ok());
        let coordinate = result.unwrap();
        assert!((coordinate.latitude - 49.28).abs() < 1e-9);
        assert!((coordinate.longitude - (-123.12)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_location_arg_invalid_returns_error() {
        let result = parse_location_arg("invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_location_arg_out_of_range_returns_error() {
        assert!(parse_location_arg("90.5,0").is_err());
        assert!(parse_location_arg("0,180.5").is_err());
    }

    #[test]
    fn test_startup_config_default_is_empty() {
        let config = StartupConfig::default();
        assert!(config.device_location.is_none());
        assert!(config.initial_city.is_none());
    }

    #[test]
    fn test_startup_config_from_cli_no_flags() {
        let cli = Cli::parse_from(["skycast"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert!(config.device_location.is_none());
        assert!(config.initial_city.is_none());
    }

    #[test]
    fn test_startup_config_from_cli_location() {
        let cli = Cli::parse_from(["skycast", "--location", "49.28,-123.12"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert!(config.device_location.is_some());
        assert!(config.initial_city.is_none());
    }

    #[test]
    fn test_startup_config_from_cli_city() {
        let cli = Cli::parse_from(["skycast", "--city", "Portland"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert!(config.device_location.is_none());
        assert_eq!(config.initial_city.as_deref(), Some("Portland"));
    }

    #[test]
    fn test_startup_config_from_cli_invalid_location() {
        let cli = Cli::parse_from(["skycast", "--location", "garbage"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_err());
    }
}
