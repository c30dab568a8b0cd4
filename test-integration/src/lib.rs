//! End-to-end scenarios for the sensor module, driven through the devkit
//! harness. No broker required; the scenarios live in `tests/`.

use simtemp_module::telemetry::policy::{
    PRESSURE_BASELINE, PRESSURE_NOISE, PRESSURE_SLOPE, TEMPERATURE_NOMINAL,
};
use simtemp_module::telemetry::Reading;

/// Instance ids in emission order.
pub fn instance_ids(readings: &[Reading]) -> Vec<usize> {
    readings.iter().map(|r| r.instance_id).collect()
}

/// Assert the physical invariants every emitted reading must satisfy:
/// temperature inside the stationary band, pressure correlated with
/// temperature net of the noise bound, humidity a valid percentage.
pub fn assert_physically_plausible(readings: &[Reading]) {
    for reading in readings {
        let t = reading.machine.temperature;
        assert!(
            (TEMPERATURE_NOMINAL - 25.0..=TEMPERATURE_NOMINAL + 25.0).contains(&t),
            "machine temperature {t} outside plausible band"
        );

        let expected = PRESSURE_BASELINE + PRESSURE_SLOPE * (t - TEMPERATURE_NOMINAL);
        let p = reading.machine.pressure;
        assert!(
            (p - expected).abs() <= PRESSURE_NOISE + 1e-9,
            "pressure {p} uncorrelated with temperature {t}"
        );

        let h = reading.ambient.humidity;
        assert!((0.0..=100.0).contains(&h), "humidity {h} out of range");
    }
}
