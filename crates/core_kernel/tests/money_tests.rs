//! Behavioral tests for Money and Rate

use core_kernel::{Money, Rate};
use rust_decimal_macros::dec;

#[test]
fn coverage_application_pins_truncation_mode() {
    // The auto-approval rates in production are 80% and 60%; the payout is
    // always truncated toward zero at the cent.
    let cases = [
        (dec!(400.00), dec!(0.80), dec!(320.00)),
        (dec!(500.00), dec!(0.80), dec!(400.00)),
        (dec!(33.33), dec!(0.60), dec!(19.99)),
        (dec!(199.99), dec!(0.60), dec!(119.99)),
        (dec!(0.01), dec!(0.80), dec!(0.00)),
    ];

    for (requested, rate, expected) in cases {
        let approved = Money::new(requested).apply_rate(Rate::new(rate));
        assert_eq!(
            approved.amount(),
            expected,
            "{requested} x {rate} should truncate to {expected}"
        );
    }
}

#[test]
fn money_ordering_follows_amounts() {
    let low = Money::new(dec!(199.99));
    let high = Money::new(dec!(200.00));

    assert!(low < high);
    assert!(low <= Money::new(dec!(199.99)));
}

#[test]
fn display_uses_brl_symbol() {
    assert_eq!(Money::new(dec!(320.00)).to_string(), "R$ 320.00");
    assert_eq!(Money::zero().to_string(), "R$ 0.00");
}
