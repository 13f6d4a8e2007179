//! A full session against a fake `/sys/class/pwm` tree.

use pwm_tool::app::{self, EXIT_OK};
use pwm_tool::backend::build_provider;
use pwm_tool::cli::{self, Action};
use pwm_tool::config::{BackendKind, Config};
use std::fs;
use std::path::Path;

fn fake_chip(root: &Path) {
    let chip = root.join("pwmchip0");
    let channel = chip.join("pwm1");
    fs::create_dir_all(&channel).unwrap();
    fs::write(chip.join("npwm"), "2\n").unwrap();
    fs::write(chip.join("export"), "").unwrap();
    fs::write(chip.join("unexport"), "").unwrap();
    for (attr, value) in [
        ("period", "0"),
        ("duty_cycle", "0"),
        ("polarity", "normal"),
        ("enable", "0"),
    ] {
        fs::write(channel.join(attr), value).unwrap();
    }
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap().trim().to_string()
}

#[tokio::test]
async fn test_session_programs_sysfs() {
    let root = tempfile::tempdir().unwrap();
    let locks = tempfile::tempdir().unwrap();
    fake_chip(root.path());

    let mut config = Config {
        backend: BackendKind::Sysfs,
        ..Config::default()
    };
    config.sysfs.root = root.path().to_path_buf();
    config.sysfs.lock_dir = locks.path().to_path_buf();
    config
        .sysfs
        .aliases
        .insert("pwmchip0".into(), "PWM1".into());
    config.validate().unwrap();

    let provider = build_provider(&config);
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let code = app::run(
        Action::Interactive {
            friendly_name: Some("PWM1".into()),
        },
        &cli::usage("pwmtool"),
        provider.as_ref(),
        "open 1\nfreq 2000\ndutycycle 25\npolarity\nstart\ninfo\nquit\n".as_bytes(),
        &mut out,
        &mut err,
    )
    .await;

    let out = String::from_utf8(out).unwrap();
    assert_eq!(code, EXIT_OK);
    assert!(err.is_empty(), "{}", String::from_utf8_lossy(&err));
    assert!(out.contains(" ActualFrequency: 2000\n"));
    assert!(out.contains("                  Polarity: ActiveLow\n"));
    assert!(out.contains(" ActiveDutyCyclePercentage: 25\n"));

    assert_eq!(read(root.path(), "pwmchip0/pwm1/period"), "500000");
    assert_eq!(read(root.path(), "pwmchip0/pwm1/duty_cycle"), "125000");
    assert_eq!(read(root.path(), "pwmchip0/pwm1/polarity"), "inversed");
    assert_eq!(read(root.path(), "pwmchip0/pwm1/enable"), "1");
}

#[tokio::test]
async fn test_list_sysfs() {
    let root = tempfile::tempdir().unwrap();
    let locks = tempfile::tempdir().unwrap();
    fake_chip(root.path());

    let mut config = Config::default();
    config.sysfs.root = root.path().to_path_buf();
    config.sysfs.lock_dir = locks.path().to_path_buf();

    let provider = build_provider(&config);
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let code = app::run(
        Action::List,
        "",
        provider.as_ref(),
        "".as_bytes(),
        &mut out,
        &mut err,
    )
    .await;

    assert_eq!(code, EXIT_OK);
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Found 1 PwmControllers\n"));
    assert!(out.contains("  pwmchip0 pwmchip0 2 1 1000000\n"));
}
