use snafu::ensure;

use crate::errors::{CustomResult, DomainSnafu};

pub struct Math {}

impl Math {
    pub fn round_float_to_n_decimals(number: f64, decimals: i32) -> f64 {
        let multiplier = 10.0_f64.powi(decimals);
        (number * multiplier).round() / multiplier
    }

    pub fn mean(nums: &[f64]) -> f64 {
        let sum: f64 = nums.iter().sum();
        let len = nums.len() as f64;
        sum / len
    }

    /// population standard deviation (N in the denominator)
    pub fn standard_deviation(nums: &[f64]) -> f64 {
        let mean = Math::mean(nums);
        let mut sum = 0.0;
        for num in nums {
            sum += (num - mean).powi(2);
        }

        (sum / nums.len() as f64).sqrt()
    }

    pub fn median(nums: &[f64]) -> f64 {
        let nums = Math::sorted(nums);

        let middle = nums.len() / 2;
        if nums.len() % 2 == 0 {
            // even amount of elements, take the average of the two middle elements
            (nums[middle - 1] + nums[middle]) / 2.0
        } else {
            nums[middle]
        }
    }

    /// # quantile
    /// get the `q`-th quantile (0.0 - 1.0) of the numbers using linear
    /// interpolation between the two closest ranks.
    ///
    /// ## Arguments
    /// * `nums` - the numbers, in any order
    /// * `q` - the quantile to get
    ///
    /// ## Returns
    /// * `f64` - the interpolated value, 0.0 for an empty list
    pub fn quantile(nums: &[f64], q: f64) -> f64 {
        if nums.is_empty() {
            return 0.0;
        }

        let sorted = Math::sorted(nums);
        let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        if lower == upper {
            return sorted[lower];
        }

        sorted[lower] + (rank - lower as f64) * (sorted[upper] - sorted[lower])
    }

    /// # histogram mode
    /// split the range of the numbers into `bins` equal width bins and return
    /// the midpoint of the most populated one. ties go to the faster bin.
    ///
    /// ## Arguments
    /// * `nums` - the numbers to bin
    /// * `bins` - the amount of bins
    ///
    /// ## Returns
    /// * `f64` - midpoint of the fullest bin
    pub fn histogram_mode(nums: &[f64], bins: usize) -> f64 {
        if nums.is_empty() || bins == 0 {
            return 0.0;
        }

        let min = nums.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = nums.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max <= min {
            return min;
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0_usize; bins];
        for num in nums {
            let bin = (((num - min) / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }

        let mut fullest = 0;
        for (bin, count) in counts.iter().enumerate() {
            if *count > counts[fullest] {
                fullest = bin;
            }
        }

        min + (fullest as f64 + 0.5) * width
    }

    /// standard score, zero when there is no spread at all
    pub fn z_score(value: f64, mean: f64, standard_deviation: f64) -> f64 {
        if standard_deviation == 0.0 {
            return 0.0;
        }
        (value - mean) / standard_deviation
    }

    /// # percentile rank
    /// the share of the other values that are strictly slower (numerically
    /// greater) than `value`, as a percentage. equal values are never counted
    /// as slower so ties share a percentile.
    ///
    /// ## Arguments
    /// * `value` - the lap time to rank
    /// * `all_values` - every lap time in the population, `value` included
    ///
    /// ## Returns
    /// * `f64` - percentile between 0 and 100
    pub fn percentile(value: f64, all_values: &[f64]) -> CustomResult<f64> {
        ensure!(
            !all_values.is_empty(),
            DomainSnafu {
                reason: "percentile of an empty population"
            }
        );

        if all_values.len() == 1 {
            return Ok(100.0);
        }

        let slower = all_values.iter().filter(|v| **v > value).count();
        let others = (all_values.len() - 1) as f64;
        Ok((100.0 * slower as f64 / others).clamp(0.0, 100.0))
    }

    fn sorted(nums: &[f64]) -> Vec<f64> {
        let mut sorted = nums.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn standard_deviation_uses_population() {
        let nums = vec![60.0, 65.0];
        assert_eq!(Math::mean(&nums), 62.5);
        assert_eq!(Math::standard_deviation(&nums), 2.5);
    }

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(Math::median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(Math::median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn quantile_interpolates() {
        let nums: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        assert!((Math::quantile(&nums, 0.9) - 9.1).abs() < 1e-9);
        assert_eq!(Math::quantile(&nums, 0.0), 1.0);
        assert_eq!(Math::quantile(&nums, 1.0), 10.0);
        assert_eq!(Math::quantile(&[42.0], 0.05), 42.0);
    }

    #[test]
    fn histogram_mode_picks_fullest_bin() {
        let nums = vec![60.0, 60.1, 60.2, 61.0, 70.0];
        let mode = Math::histogram_mode(&nums, 20);
        // bin width is 0.5, the first bin holds three laps
        assert!((mode - 60.25).abs() < 1e-9);
        assert_eq!(Math::histogram_mode(&[55.0, 55.0], 20), 55.0);
    }

    #[test]
    fn z_score_without_spread_is_zero() {
        assert_eq!(Math::z_score(61.0, 60.0, 0.0), 0.0);
        assert_eq!(Math::z_score(-3.0, 12.0, 0.0), 0.0);
        assert_eq!(Math::z_score(60.0, 65.0, 2.0), -2.5);
    }

    #[test]
    fn percentile_fastest_and_slowest() {
        let population = vec![60.0, 61.0, 62.0];
        assert_eq!(Math::percentile(60.0, &population).unwrap(), 100.0);
        assert_eq!(Math::percentile(61.0, &population).unwrap(), 50.0);
        assert_eq!(Math::percentile(62.0, &population).unwrap(), 0.0);
    }

    #[test]
    fn percentile_ties_share_rank() {
        let population = vec![60.0, 60.0, 61.0];
        let first = Math::percentile(population[0], &population).unwrap();
        let second = Math::percentile(population[1], &population).unwrap();
        // one of the two other laps is slower
        assert_eq!(first, 50.0);
        assert_eq!(first, second);
        assert_eq!(Math::percentile(61.0, &population).unwrap(), 0.0);
    }

    #[test]
    fn percentile_of_single_value() {
        assert_eq!(Math::percentile(58.3, &[58.3]).unwrap(), 100.0);
    }

    #[test]
    fn percentile_of_empty_population_fails() {
        let result = Math::percentile(60.0, &[]);
        assert!(matches!(result, Err(Error::DomainError { .. })));
    }

    #[test]
    fn rounding() {
        assert_eq!(Math::round_float_to_n_decimals(66.666666, 2), 66.67);
        assert_eq!(Math::round_float_to_n_decimals(4.9999999, 3), 5.0);
    }
}
