//! Unit tests for risk profiles

use equitrader::error::EngineError;
use equitrader::risk::RiskProfile;

#[test]
fn test_default_is_moderate() {
    assert_eq!(RiskProfile::default(), RiskProfile::Moderate);
}

#[test]
fn test_parse_names_and_levels() {
    assert_eq!("conservative".parse::<RiskProfile>().unwrap(), RiskProfile::Conservative);
    assert_eq!(" MODERATE ".parse::<RiskProfile>().unwrap(), RiskProfile::Moderate);
    assert_eq!("3".parse::<RiskProfile>().unwrap(), RiskProfile::Aggressive);
    assert_eq!("1".parse::<RiskProfile>().unwrap(), RiskProfile::Conservative);
    assert!(matches!(
        "reckless".parse::<RiskProfile>(),
        Err(EngineError::Configuration(_))
    ));
}

#[test]
fn test_exit_distances_widen_with_risk() {
    assert_eq!(RiskProfile::Conservative.stop_loss_pct(), 0.05);
    assert_eq!(RiskProfile::Moderate.stop_loss_pct(), 0.07);
    assert_eq!(RiskProfile::Aggressive.stop_loss_pct(), 0.10);
    assert_eq!(RiskProfile::Conservative.take_profit_pct(), 0.15);
    assert_eq!(RiskProfile::Moderate.take_profit_pct(), 0.20);
    assert_eq!(RiskProfile::Aggressive.take_profit_pct(), 0.30);
}

#[test]
fn test_display_round_trips() {
    for profile in RiskProfile::ALL {
        assert_eq!(profile.to_string().parse::<RiskProfile>().unwrap(), profile);
    }
}
