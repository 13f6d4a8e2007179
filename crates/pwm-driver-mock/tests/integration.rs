//! Integration tests for the mock PWM backend
//!
//! These tests drive the mock only through the `pwm-core` traits, the same
//! way the application does.

use pwm_core::{DriverErrorKind, Polarity, PwmController, PwmPin, PwmProvider};
use pwm_driver_mock::*;

fn bench() -> MockProvider {
    MockProvider::new(vec![
        MockControllerConfig::new("mock0", "PWM1"),
        MockControllerConfig::anonymous("mock1").with_frequency_range(10.0, 500.0),
        MockControllerConfig::new("mock2", "PWM1").claimed_elsewhere(),
    ])
}

/// Test the provider through a trait object
#[tokio::test]
async fn test_provider_as_trait_object() {
    let provider: Box<dyn PwmProvider> = Box::new(bench());
    assert_eq!(provider.backend(), "mock");

    let all = provider.find_all(None).await.unwrap();
    assert_eq!(all.len(), 3);

    let named = provider.find_all(Some("PWM1")).await.unwrap();
    let ids: Vec<_> = named.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["mock0", "mock2"]);
}

/// Test the journal captures a full pin lifecycle in order
#[tokio::test]
async fn test_journal_lifecycle() {
    let provider = bench();
    let journal = provider.journal();

    {
        let controller = provider.open_controller("mock0").await.unwrap().unwrap();
        controller.set_desired_frequency(2000.0).await.unwrap();
        let mut pin = controller.open_pin(2).await.unwrap();
        pin.set_active_duty_cycle(0.5).await.unwrap();
        pin.set_polarity(Polarity::ActiveLow).await.unwrap();
        pin.start().await.unwrap();
        pin.stop().await.unwrap();
    }

    assert_eq!(
        journal.calls(),
        vec![
            DriverCall::OpenController { id: "mock0".into() },
            DriverCall::SetFrequency {
                id: "mock0".into(),
                hz: 2000.0
            },
            DriverCall::OpenPin {
                id: "mock0".into(),
                pin: 2
            },
            DriverCall::SetDutyCycle {
                pin: 2,
                fraction: 0.5
            },
            DriverCall::SetPolarity {
                pin: 2,
                polarity: Polarity::ActiveLow
            },
            DriverCall::Start { pin: 2 },
            DriverCall::Stop { pin: 2 },
            DriverCall::ReleasePin {
                id: "mock0".into(),
                pin: 2
            },
            DriverCall::ReleaseController { id: "mock0".into() },
        ]
    );
}

/// Test frequency survives re-acquisition like real hardware state
#[tokio::test]
async fn test_frequency_persists_across_claims() {
    let provider = bench();

    let controller = provider.open_controller("mock1").await.unwrap().unwrap();
    assert_eq!(controller.actual_frequency().await.unwrap(), 500.0);
    controller.set_desired_frequency(20.0).await.unwrap();
    drop(controller);

    let controller = provider.open_controller("mock1").await.unwrap().unwrap();
    let caps = controller.capabilities().await.unwrap();
    assert_eq!(caps.actual_frequency, 20.0);
    assert_eq!(caps.min_frequency, 10.0);
    assert_eq!(caps.max_frequency, 500.0);
    assert_eq!(caps.pin_count, 4);
}

/// Test a sticky hardware fault reaches every call
#[tokio::test]
async fn test_hardware_fault_scenario() {
    let provider =
        bench().with_errors(ErrorConfig::scenario(ErrorScenario::HardwareFault { code: 7 }));

    let err = provider.find_all(None).await.unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::Hardware);
    assert!(provider.open_controller("mock0").await.is_err());
}

/// Test realistic mode still completes every call
#[tokio::test]
async fn test_realistic_mode() {
    let provider = bench().with_mode(MockMode::Realistic);
    let controller = provider.open_controller("mock0").await.unwrap().unwrap();
    let mut pin = controller.open_pin(0).await.unwrap();
    pin.start().await.unwrap();
    assert!(pin.is_started().await.unwrap());
}
