//! End-to-end sessions against the mock backend.
//!
//! Each test drives `app::run` with a scripted stdin and captures stdout and
//! stderr, the same way the binary wires them up.

use pwm_core::Polarity;
use pwm_driver_mock::{DriverCall, ErrorConfig, ErrorScenario, MockControllerConfig, MockProvider};
use pwm_tool::app::{self, EXIT_FAILURE, EXIT_OK};
use pwm_tool::cli::{self, Action};

struct Outcome {
    code: u8,
    out: String,
    err: String,
}

async fn run(action: Action, provider: &MockProvider, stdin: &str) -> Outcome {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let code = app::run(
        action,
        &cli::usage("pwmtool"),
        provider,
        stdin.as_bytes(),
        &mut out,
        &mut err,
    )
    .await;

    Outcome {
        code,
        out: String::from_utf8(out).unwrap(),
        err: String::from_utf8(err).unwrap(),
    }
}

fn interactive(name: Option<&str>) -> Action {
    Action::Interactive {
        friendly_name: name.map(String::from),
    }
}

fn four_pin_bench() -> MockProvider {
    MockProvider::new(vec![MockControllerConfig::new("mock0", "PWM1").with_pin_count(4)])
}

#[tokio::test]
async fn test_full_command_script() {
    let provider = four_pin_bench();
    let journal = provider.journal();

    let result = run(
        interactive(Some("PWM1")),
        &provider,
        "open 0\nfreq 1000\ndutycycle 50\npolarity\nstart\ninfo\nstop\nquit\n",
    )
    .await;

    assert_eq!(result.code, EXIT_OK);
    assert!(result.err.is_empty(), "unexpected errors: {}", result.err);
    assert!(result.out.starts_with("  Type 'help' for a list of commands\n> "));
    assert!(result.out.contains("Polarity is now ActiveLow\n"));
    assert!(result.out.contains("                 IsStarted: true\n"));
    assert!(result.out.contains(" ActiveDutyCyclePercentage: 50\n"));
    assert!(!result.out.contains("Pin not started"));

    let forwarded: Vec<_> = journal
        .calls()
        .into_iter()
        .filter(|c| !matches!(c, DriverCall::FindAll { .. }))
        .collect();
    assert_eq!(
        forwarded,
        vec![
            DriverCall::OpenController { id: "mock0".into() },
            DriverCall::OpenPin {
                id: "mock0".into(),
                pin: 0
            },
            DriverCall::SetFrequency {
                id: "mock0".into(),
                hz: 1000.0
            },
            DriverCall::SetDutyCycle {
                pin: 0,
                fraction: 0.5
            },
            DriverCall::SetPolarity {
                pin: 0,
                polarity: Polarity::ActiveLow
            },
            DriverCall::Start { pin: 0 },
            DriverCall::Stop { pin: 0 },
            DriverCall::ReleasePin {
                id: "mock0".into(),
                pin: 0
            },
            DriverCall::ReleaseController { id: "mock0".into() },
        ]
    );
}

#[tokio::test]
async fn test_list_empty_system() {
    let result = run(Action::List, &MockProvider::empty(), "").await;
    assert_eq!(result.code, EXIT_OK);
    assert!(result
        .out
        .contains("There are no pwm controllers on this system."));
}

#[tokio::test]
async fn test_list_skips_busy_and_releases_everything() {
    let provider = MockProvider::new(vec![
        MockControllerConfig::new("mock0", "PWM1"),
        MockControllerConfig::new("mock1", "PWM2").claimed_elsewhere(),
        MockControllerConfig::new("mock2", "PWM3"),
    ]);

    let result = run(Action::List, &provider, "").await;
    assert_eq!(result.code, EXIT_OK);
    assert!(result.out.contains("Found 3 PwmControllers\n"));
    assert!(result.out.contains("  PWM2 mock1 Pwm controller mock1 is in use.\n"));
    assert!(result.out.contains("  PWM3 mock2 4 1 1000000\n"));
    assert!(!provider.is_claimed("mock0"));
    assert!(!provider.is_claimed("mock2"));
}

#[tokio::test]
async fn test_stop_without_pin_continues() {
    let provider = four_pin_bench();
    let result = run(interactive(None), &provider, "stop\nopen 1\nstart\nstop\nquit\n").await;

    assert_eq!(result.code, EXIT_OK);
    assert!(result.out.contains("No open pin\n"));
    assert!(result.err.is_empty());
    assert!(provider
        .journal()
        .calls()
        .contains(&DriverCall::Stop { pin: 1 }));
}

#[tokio::test]
async fn test_end_of_input_closes_session() {
    let provider = four_pin_bench();
    let result = run(interactive(None), &provider, "open 2\nstart").await;
    assert_eq!(result.code, EXIT_OK);
    assert!(!provider.is_claimed("mock0"));
}

#[tokio::test]
async fn test_reopen_replaces_pin() {
    let provider = four_pin_bench();
    let result = run(
        interactive(None),
        &provider,
        "open 0\nstart\nopen 3\ninfo\nquit\n",
    )
    .await;

    // The new pin starts fresh.
    assert!(result.out.contains("                 IsStarted: false\n"));
    let releases = provider
        .journal()
        .filtered(|c| matches!(c, DriverCall::ReleasePin { pin: 0, .. }));
    assert_eq!(releases.len(), 1);
}

#[tokio::test]
async fn test_out_of_range_values_are_forwarded_and_rejected() {
    let provider = four_pin_bench();
    let result = run(
        interactive(None),
        &provider,
        "open 0\ndutycycle 101\ndutycycle -3\nfreq 5000000\ninfo\nquit\n",
    )
    .await;

    assert_eq!(result.code, EXIT_OK);
    assert_eq!(result.err.lines().count(), 3);
    assert!(result
        .err
        .lines()
        .all(|l| l.starts_with("Error: ") && l.contains("invalid_parameter")));

    let duty: Vec<_> = provider
        .journal()
        .filtered(|c| matches!(c, DriverCall::SetDutyCycle { .. }));
    assert_eq!(
        duty,
        vec![
            DriverCall::SetDutyCycle {
                pin: 0,
                fraction: 1.01
            },
            DriverCall::SetDutyCycle {
                pin: 0,
                fraction: -0.03
            },
        ]
    );
    // Rejected values leave the hardware untouched.
    assert!(result.out.contains(" ActiveDutyCyclePercentage: 0\n"));
    assert!(result.out.contains(" ActualFrequency: 1000\n"));
}

#[tokio::test]
async fn test_bind_busy_exits_one() {
    let provider = MockProvider::new(vec![
        MockControllerConfig::new("mock0", "PWM1").claimed_elsewhere(),
        MockControllerConfig::new("mock1", "PWM1"),
    ]);

    let result = run(interactive(Some("PWM1")), &provider, "quit\n").await;
    assert_eq!(result.code, EXIT_FAILURE);
    assert_eq!(
        result.err,
        "Error: Pwm controller mock0 is in use. Please ensure that no other applications are using pwm.\n"
    );
    assert!(result.out.is_empty());
}

#[tokio::test]
async fn test_bind_not_found_exits_one() {
    let result = run(interactive(Some("PWM7")), &four_pin_bench(), "").await;
    assert_eq!(result.code, EXIT_FAILURE);
    assert_eq!(result.err, "Error: pwm controller not found\n");
}

#[tokio::test]
async fn test_usage_action() {
    let result = run(Action::Usage, &MockProvider::empty(), "").await;
    assert_eq!(result.code, EXIT_OK);
    assert!(result.out.contains("Usage: pwmtool [-list] [FriendlyName]"));
}

#[tokio::test]
async fn test_hardware_failure_mid_session_is_reported() {
    let provider = four_pin_bench().with_errors(ErrorConfig::scenario(ErrorScenario::FailAfterN {
        operation: "set_duty_cycle",
        count: 1,
    }));

    let result = run(
        interactive(None),
        &provider,
        "open 0\ndutycycle 25\ndutycycle 75\nstart\ninfo\nquit\n",
    )
    .await;

    assert_eq!(result.code, EXIT_OK);
    assert_eq!(
        result.err,
        "Error: Driver 'mock' hardware error: Injected failure after 1 operations\n"
    );
    // Later commands still ran against the pin.
    assert!(result.out.contains("IsStarted: true\n"));
    assert!(result.out.contains("ActiveDutyCyclePercentage: 25\n"));
    assert!(provider
        .journal()
        .calls()
        .contains(&DriverCall::Start { pin: 0 }));
    assert!(!provider.is_claimed("mock0"));
}
