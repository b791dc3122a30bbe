//! Wind chill with a gust penalty

use super::round_to;

/// Above this temperature (°C) wind chill is not defined
const WIND_CHILL_MAX_TEMP: f64 = 10.0;
/// Below this sustained wind (km/h) wind chill is not defined
const WIND_CHILL_MIN_WIND: f64 = 4.8;
/// Gusts only count at or below this temperature (°C)
const GUST_PENALTY_MAX_TEMP: f64 = 5.0;
/// Gust excess over sustained wind (km/h) below which gusts are ignored
const GUST_DELTA_THRESHOLD: f64 = 5.0;
const GUST_PENALTY_CAP: f64 = 2.0;

/// Feels-like temperature in °C, rounded to one decimal.
///
/// Environment Canada / NOAA wind chill on the sustained wind, minus up to
/// 2 °C when gusts exceed the sustained wind by at least 5 km/h in cold
/// conditions.
#[must_use]
pub fn feels_like(temp_c: f64, wind_kmh: f64, gust_kmh: Option<f64>) -> f64 {
    if temp_c > WIND_CHILL_MAX_TEMP || wind_kmh < WIND_CHILL_MIN_WIND {
        return round_to(temp_c, 1);
    }

    let v16 = wind_kmh.powf(0.16);
    let wind_chill = 13.12 + 0.6215 * temp_c - 11.37 * v16 + 0.3965 * temp_c * v16;

    let Some(gust_kmh) = gust_kmh else {
        return round_to(wind_chill, 1);
    };
    if temp_c > GUST_PENALTY_MAX_TEMP {
        return round_to(wind_chill, 1);
    }

    let gust_delta = gust_kmh - wind_kmh;
    if gust_delta < GUST_DELTA_THRESHOLD {
        return round_to(wind_chill, 1);
    }

    let penalty = (0.15 * gust_delta.sqrt()).min(GUST_PENALTY_CAP);
    round_to(wind_chill - penalty, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(12.0, 20.0, Some(30.0), 12.0)]
    #[case(10.04, 10.0, None, 10.0)]
    #[case(3.0, 4.7, Some(40.0), 3.0)]
    #[case(0.0, 20.0, None, -5.2)]
    #[case(10.0, 10.0, None, 8.6)]
    #[case(-10.0, 30.0, None, -19.5)]
    #[case(-20.0, 50.0, Some(80.0), -36.2)]
    fn test_reference_values(
        #[case] temp: f64,
        #[case] wind: f64,
        #[case] gust: Option<f64>,
        #[case] expected: f64,
    ) {
        assert_eq!(feels_like(temp, wind, gust), expected);
    }

    #[test]
    fn test_small_gust_delta_is_ignored() {
        assert_eq!(feels_like(0.0, 20.0, Some(23.0)), feels_like(0.0, 20.0, None));
    }

    #[test]
    fn test_gust_penalty_is_bounded() {
        let calm = feels_like(0.0, 20.0, None);
        let gusty = feels_like(0.0, 20.0, Some(40.0));
        assert!(gusty < calm);
        assert!(calm - gusty > 0.0);
        assert!(calm - gusty < 2.0);
        assert_eq!(gusty, -5.9);
    }

    #[test]
    fn test_gust_penalty_caps_at_two_degrees() {
        // delta 200 km/h would give 2.12 uncapped
        assert_eq!(feels_like(-10.0, 30.0, Some(230.0)), -21.5);
    }

    #[test]
    fn test_gusts_ignored_above_five_degrees() {
        assert_eq!(feels_like(6.0, 10.0, Some(30.0)), 3.9);
        assert_eq!(feels_like(5.0, 10.0, Some(30.0)), 2.0);
    }
}
