/// Fractional carrier cycles (0..1) accumulated over a propagation delay.
pub fn carrier_phase_cycles(delay: f64, freq: f64) -> f64 {
    (delay * freq).rem_euclid(1.0)
}

/// Doppler frequency implied by two delay readings `interval` seconds apart.
/// A shrinking delay (approaching satellite) yields a positive shift.
pub fn carrier_doppler(delay: f64, prev_delay: f64, freq: f64, interval: f64) -> f64 {
    -(delay - prev_delay) * freq / interval
}

/// Scale a cycle fraction into the 32-bit phase accumulator.
pub fn cycles_to_accumulator(cycles: f64) -> u32 {
    (cycles.rem_euclid(1.0) * 4_294_967_296.0) as u64 as u32
}

/// Signed accumulator increment for `cycles` of carrier, reduced mod 2^32.
pub fn cycles_to_step(cycles: f64) -> i32 {
    (cycles * 4_294_967_296.0).round() as i64 as i32
}
