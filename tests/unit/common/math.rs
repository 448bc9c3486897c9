//! Unit tests for numeric helpers

use equitrader::common::math::{ema_alpha, ema_series, mean, sample_std, sma_series, std_series};

use crate::test_utils::assert_close;

#[test]
fn test_ema_alpha() {
    assert_close(ema_alpha(12), 2.0 / 13.0, 1e-15);
    assert_close(ema_alpha(1), 1.0, 1e-15);
}

#[test]
fn test_ema_of_constant_series_is_constant() {
    let values = vec![42.0; 30];
    let series = ema_series(&values, 12);
    assert_eq!(series.len(), 30);
    assert_close(series[29], 42.0, 1e-12);
}

#[test]
fn test_ema_empty_is_empty() {
    assert!(ema_series(&[], 12).is_empty());
}

#[test]
fn test_sma_requires_full_window() {
    let values = [1.0, 2.0, 3.0];
    assert!(sma_series(&values, 4).iter().all(Option::is_none));
    assert_close(sma_series(&values, 3)[2].unwrap(), 2.0, 1e-15);
    assert!(sma_series(&values, 0).iter().all(Option::is_none));
}

#[test]
fn test_sma_series_aligns_with_input() {
    let out = sma_series(&[1.0, 2.0, 3.0, 4.0], 2);
    assert_eq!(out, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
}

#[test]
fn test_sample_std() {
    assert!(sample_std(&[5.0]).is_none());
    assert_close(sample_std(&[2.0, 4.0]).unwrap(), 2.0_f64.sqrt(), 1e-12);

    let out = std_series(&[1.0, 1.0, 1.0], 2);
    assert_eq!(out[0], None);
    assert_eq!(out[2], Some(0.0));
}

#[test]
fn test_mean() {
    assert!(mean(&[]).is_none());
    assert_close(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0, 1e-15);
}
