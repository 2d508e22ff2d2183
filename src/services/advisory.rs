//! Threshold advisories for the forecast page.
//!
//! Rules are evaluated per category in a fixed order (temperature,
//! precipitation, humidity). Within a category the higher threshold is
//! checked first so at most one of hot/warm, rain/showers, muggy/dry fires.

/// Max temperature at or above which the hot advisory fires (°C).
const HOT_MAX_C: f64 = 35.0;
/// Max temperature at or above which the warm advisory fires (°C).
const WARM_MAX_C: f64 = 30.0;
/// Min temperature below which the cool-night advisory fires (°C).
const COOL_MIN_C: f64 = 22.0;
/// Max precipitation probability at or above which the rain-gear advisory fires (%).
const HEAVY_RAIN_POP: f64 = 70.0;
/// Max precipitation probability at or above which the umbrella advisory fires (%).
const SHOWER_POP: f64 = 40.0;
/// Max relative humidity at or above which the muggy advisory fires (%).
const MUGGY_HUMIDITY: f64 = 85.0;
/// Max relative humidity at or below which the dry-air advisory fires (%).
const DRY_HUMIDITY: f64 = 50.0;

/// A single advisory, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    Hot,
    Warm,
    CoolNight,
    HeavyRain,
    Showers,
    Muggy,
    DryAir,
}

impl Advisory {
    /// The advisory text shown to users.
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::Hot => "今天炎熱，請加強防曬並多補充水分。",
            Advisory::Warm => "天氣偏熱，外出注意多喝水。",
            Advisory::CoolNight => "清晨／夜晚較涼，出門記得帶件薄外套。",
            Advisory::HeavyRain => "降雨機率高，出門請攜帶雨具並注意路滑。",
            Advisory::Showers => "有機會陣雨，外出建議帶把傘。",
            Advisory::Muggy => "濕度高，悶熱不適，建議開啟空調或除濕。",
            Advisory::DryAir => "空氣較乾燥，建議多喝水並注意保濕。",
        }
    }
}

fn max_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn min_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Evaluate all advisory rules.
///
/// An empty slice contributes nothing for its category.
pub fn evaluate_advisories(temps: &[f64], pops: &[f64], hums: &[f64]) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if let (Some(max), Some(min)) = (max_of(temps), min_of(temps)) {
        if max >= HOT_MAX_C {
            advisories.push(Advisory::Hot);
        } else if max >= WARM_MAX_C {
            advisories.push(Advisory::Warm);
        }
        if min < COOL_MIN_C {
            advisories.push(Advisory::CoolNight);
        }
    }

    if let Some(max) = max_of(pops) {
        if max >= HEAVY_RAIN_POP {
            advisories.push(Advisory::HeavyRain);
        } else if max >= SHOWER_POP {
            advisories.push(Advisory::Showers);
        }
    }

    if let Some(max) = max_of(hums) {
        if max >= MUGGY_HUMIDITY {
            advisories.push(Advisory::Muggy);
        } else if max <= DRY_HUMIDITY {
            advisories.push(Advisory::DryAir);
        }
    }

    advisories
}

/// Advisory messages for display.
pub fn advisory_messages(temps: &[f64], pops: &[f64], hums: &[f64]) -> Vec<String> {
    evaluate_advisories(temps, pops, hums)
        .iter()
        .map(|a| a.message().to_string())
        .collect()
}
