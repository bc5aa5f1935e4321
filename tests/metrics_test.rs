use powerpi::config::{MetricsConfig, Phase};
use powerpi::sensor::{Normalizer, Snapshot, frame::decode_line};
use powerpi::{MetricsCalculator, power_factor};

fn snapshot_of(values: &[f64]) -> Snapshot {
    let line = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    Snapshot::build(&decode_line(&line).unwrap(), None, &Normalizer::default()).unwrap()
}

#[test]
fn zero_inputs_give_zero_factor() {
    for phase in [Phase::Single, Phase::Three] {
        for other in [0.0, 1.0, 250.0, -400.0] {
            assert_eq!(power_factor(0.0, other, phase), 0.0);
            assert_eq!(power_factor(other, 0.0, phase), 0.0);
        }
    }
}

#[test]
fn documented_factor_values() {
    assert_eq!(power_factor(100.0, 200.0, Phase::Single), 500.0);
    assert!((power_factor(100.0, 200.0, Phase::Three) - 166.667).abs() < 1e-3);
}

#[test]
fn seven_circuit_single_phase_board() {
    // rp 100..=106 | ap 200..=206 | i 300..=306 | v 240
    let mut values: Vec<f64> = Vec::new();
    for block in [100.0, 200.0, 300.0] {
        values.extend((0..7).map(|i| block + i as f64));
    }
    values.push(240.0);

    let calc = MetricsCalculator::new(MetricsConfig::default()).unwrap();
    assert_eq!(calc.required_channels(), 22);

    let metrics = calc.derive(&snapshot_of(&values)).unwrap();
    assert_eq!(metrics.len(), 7);
    for (c, m) in metrics.iter().enumerate() {
        assert_eq!(m.circuit, c + 1);
        assert_eq!(m.real_power, 100.0 + c as f64);
        assert_eq!(m.apparent_power, 200.0 + c as f64);
        assert_eq!(m.current, 300.0 + c as f64);
        assert_eq!(m.voltage, 240.0);
        assert_eq!(m.frequency, 50.0);
    }
}

#[test]
fn three_phase_uses_last_reading_as_voltage() {
    let mut values: Vec<f64> = Vec::new();
    for block in [100.0, 200.0, 300.0] {
        values.extend((0..7).map(|i| block + i as f64));
    }
    values.extend([230.0, 231.0, 232.0]);

    let calc = MetricsCalculator::new(MetricsConfig {
        phase: Phase::Three,
        ..Default::default()
    })
    .unwrap();

    let metrics = calc.derive(&snapshot_of(&values)).unwrap();
    assert_eq!(metrics.len(), 5);
    assert!(metrics.iter().all(|m| m.voltage == 232.0));
    let expected = 1000.0 * 100.0 / (3.0 * 200.0);
    assert!((metrics[0].power_factor - expected).abs() < 1e-9);
}
