//! Literal oracle scenarios for `RateFilter`.

use heli_sdlogger::rate_filter::RateFilter;

const MAX_PPRZ: i32 = 9600;

#[test]
fn s1_baseline() {
    let mut f = RateFilter::initialize(20, 0, 10000);
    let out: Vec<i32> = (0..4).map(|_| f.propagate(MAX_PPRZ)).collect();
    assert_eq!(out, vec![360, 707, 1041, 1362]);
}

#[test]
fn s2_higher_bandwidth() {
    let mut f = RateFilter::initialize(60, 0, 10000);
    let out: Vec<i32> = (0..4).map(|_| f.propagate(MAX_PPRZ)).collect();
    assert_eq!(out, vec![1007, 1908, 2715, 3437]);
}

#[test]
fn s3_delay_two_shifts_s1_by_two_samples() {
    let mut f = RateFilter::initialize(20, 2, 10000);
    let out: Vec<i32> = (0..6).map(|_| f.propagate(MAX_PPRZ)).collect();
    assert_eq!(out, vec![0, 0, 360, 707, 1041, 1362]);
}

#[test]
fn s4_slew_limited() {
    let mut f = RateFilter::initialize(20, 0, 340);
    let out: Vec<i32> = (0..4).map(|_| f.propagate(MAX_PPRZ)).collect();
    assert_eq!(out, vec![340, 680, 1015, 1337]);
}

#[test]
fn s5_negative_input_slew_limited() {
    let mut f = RateFilter::initialize(20, 0, 340);
    let out: Vec<i32> = (0..4).map(|_| f.propagate(-MAX_PPRZ)).collect();
    assert_eq!(out, vec![-340, -680, -1016, -1339]);
}

#[test]
fn s6_set_omega_midflight_matches_s2_from_fresh() {
    let mut f = RateFilter::initialize(20, 0, 10000);
    f.set_omega(60);
    let out: Vec<i32> = (0..4).map(|_| f.propagate(MAX_PPRZ)).collect();
    assert_eq!(out, vec![1007, 1908, 2715, 3437]);
}

#[test]
fn ring_wraparound_reproduces_s3_across_the_seam() {
    use heli_sdlogger::rate_filter::BUFFER_SIZE;

    // Warm `a` up with zero input until its write cursor sits two samples
    // shy of wrapping the 32-slot ring. The ring content stays all zero, the
    // same as a never-touched filter's, so the two filters are in
    // equivalent logical states despite their cursors being 30 samples
    // apart. The step response that follows must cross `a`'s wrap boundary
    // and still land on the same outputs `b` gets with no wraparound at all.
    let mut a = RateFilter::initialize(20, 2, 10000);
    for _ in 0..(BUFFER_SIZE - 2) {
        a.propagate(0);
    }
    let mut b = RateFilter::initialize(20, 2, 10000);

    let out_a: Vec<i32> = (0..6).map(|_| a.propagate(MAX_PPRZ)).collect();
    let out_b: Vec<i32> = (0..6).map(|_| b.propagate(MAX_PPRZ)).collect();
    assert_eq!(out_a, out_b);
    assert_eq!(out_b, vec![0, 0, 360, 707, 1041, 1362]);
}

#[test]
fn delay_and_omega_are_clamped_not_rejected() {
    use heli_sdlogger::rate_filter::BUFFER_SIZE;

    let mut f = RateFilter::initialize(0, BUFFER_SIZE * 4, 10000);
    assert_eq!(f.delay(), BUFFER_SIZE - 1);
    assert_eq!(f.omega(), 1);
    // Still total: never panics regardless of how it's driven.
    for _ in 0..BUFFER_SIZE {
        f.propagate(i32::MIN);
        f.propagate(i32::MAX);
    }
}
