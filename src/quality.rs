//! Carrier quality measurement.
//!
//! Peak signal-to-noise ratio between an original carrier and its embedded
//! counterpart. LSB matching bounds the per-sample error to 1, so values for
//! 8-bit media typically land well above 50 dB.

/// PSNR in decibels between two equal-length sample sequences.
///
/// Returns `None` when the sequences are empty or differ in length.
/// Identical sequences yield `f64::INFINITY`.
pub fn psnr(reference: &[f64], modified: &[f64], peak: f64) -> Option<f64> {
    if reference.is_empty() || reference.len() != modified.len() {
        return None;
    }

    let mse = reference
        .iter()
        .zip(modified)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        / reference.len() as f64;

    if mse == 0.0 {
        return Some(f64::INFINITY);
    }

    Some(20.0 * peak.log10() - 10.0 * mse.log10())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_are_infinite() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(psnr(&samples, &samples, 255.0), Some(f64::INFINITY));
    }

    #[test]
    fn unit_error_against_8bit_peak() {
        let reference = vec![10.0; 100];
        let modified = vec![11.0; 100];

        // MSE of 1 against a peak of 255: 20*log10(255) ~ 48.13 dB
        let db = psnr(&reference, &modified, 255.0).unwrap();
        assert!((db - 48.13).abs() < 0.01);
    }

    #[test]
    fn length_mismatch_is_none() {
        assert_eq!(psnr(&[1.0], &[1.0, 2.0], 255.0), None);
    }

    #[test]
    fn empty_is_none() {
        assert_eq!(psnr(&[], &[], 255.0), None);
    }
}
