//! Clothing and equipment advice from a per-language reference table

use crate::analysis::daily_history::SNOW_CODES;
use crate::models::EnrichedHourlyPoint;
use crate::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

const HEAVY_SNOW_PRECIP_MM: f64 = 5.0;
const WET_PRECIP_MM: f64 = 3.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLayer {
    pub torso: String,
    pub legs: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidLayers {
    pub active: String,
    pub static_extra: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OuterLayers {
    pub required_windstopper: String,
    pub legs: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accessories {
    pub hands: String,
    pub head_face: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Layering for one feels-like bucket, keyed by `range`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureInterval {
    pub range: String,
    pub base_layer: BaseLayer,
    pub mid_layers: MidLayers,
    pub outer_layers: OuterLayers,
    pub accessories: Accessories,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecipitationOverride {
    pub required_additions: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecipitationOverrides {
    pub heavy_snow: PrecipitationOverride,
    pub wet_snow_or_rain: PrecipitationOverride,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clothing {
    pub temperature_feel_intervals_celsius: Vec<TemperatureInterval>,
    pub always_carried_core_items: CoreItems,
    pub precipitation_overrides: PrecipitationOverrides,
}

/// Category name to items, in the order the reference file lists them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct CoreItems(pub Vec<(String, Vec<String>)>);

impl TryFrom<Map<String, Value>> for CoreItems {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        map.into_iter()
            .map(|(category, items)| Ok((category, serde_json::from_value::<Vec<String>>(items)?)))
            .collect::<std::result::Result<Vec<_>, Self::Error>>()
            .map(Self)
    }
}

impl From<CoreItems> for Map<String, Value> {
    fn from(items: CoreItems) -> Self {
        items
            .0
            .into_iter()
            .map(|(category, items)| (category, Value::from(items)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub mandatory_safety_kit_3_4: Vec<String>,
    pub ski_touring_system: Vec<String>,
    pub navigation_communication: Vec<String>,
    pub emergency_repair: Vec<String>,
    pub food_hydration: Vec<String>,
}

/// Contents of one `clothing_per_temp_feel*.json` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothingReference {
    pub clothing: Clothing,
    pub equipment: Equipment,
}

impl ClothingReference {
    /// File name for a language; English is the unsuffixed file
    #[must_use]
    pub fn file_name(language: &str) -> String {
        if language == "en" {
            "clothing_per_temp_feel.json".to_string()
        } else {
            format!("clothing_per_temp_feel_{language}.json")
        }
    }

    /// Load the reference table for `language` from `dir`
    pub fn load(dir: &Path, language: &str) -> Result<Self> {
        let path = dir.join(Self::file_name(language));
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ForecastError::config(format!(
                "Failed to read clothing reference {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ForecastError::config(format!(
                "Invalid clothing reference {}: {e}",
                path.display()
            ))
        })
    }

    #[must_use]
    pub fn interval(&self, range: &str) -> Option<&TemperatureInterval> {
        self.clothing
            .temperature_feel_intervals_celsius
            .iter()
            .find(|interval| interval.range == range)
    }
}

/// Bucket key for the colder of the two feels-like extremes
#[must_use]
pub fn temperature_bucket(feel_min: f64, feel_max: f64) -> &'static str {
    let temp = feel_min.min(feel_max);
    if temp < -20.0 {
        "below_-20"
    } else if temp < -10.0 {
        "-20_to_-10"
    } else if temp < 0.0 {
        "-10_to_0"
    } else if temp < 10.0 {
        "0_to_10"
    } else {
        "above_10"
    }
}

/// Which precipitation override applies, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationKind {
    HeavySnow,
    Wet,
}

/// The day's conditions the advice is picked from
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceConditions {
    pub feel_min: f64,
    pub feel_max: f64,
    pub feel_avg: f64,
    pub precip_total: f64,
    pub is_snowy: bool,
}

impl AdviceConditions {
    /// `None` for an empty day
    #[must_use]
    pub fn from_points(points: &[EnrichedHourlyPoint]) -> Option<Self> {
        let feels = || points.iter().map(|p| p.temperature_feel);
        let feel_min = feels().reduce(f64::min)?;
        let feel_max = feels().reduce(f64::max)?;
        #[allow(clippy::cast_precision_loss)]
        let feel_avg = feels().sum::<f64>() / points.len() as f64;
        Some(Self {
            feel_min,
            feel_max,
            feel_avg,
            precip_total: points.iter().map(|p| p.point.precipitation).sum(),
            is_snowy: points
                .iter()
                .any(|p| p.point.weather_code.is_some_and(|c| SNOW_CODES.contains(&c))),
        })
    }

    #[must_use]
    pub fn precipitation(&self) -> Option<PrecipitationKind> {
        if self.is_snowy && self.precip_total > HEAVY_SNOW_PRECIP_MM {
            Some(PrecipitationKind::HeavySnow)
        } else if !self.is_snowy && self.precip_total > WET_PRECIP_MM {
            Some(PrecipitationKind::Wet)
        } else {
            None
        }
    }
}

fn title_case(category: &str) -> String {
    category
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn items_block(heading: &str, items: &[String]) -> Vec<String> {
    std::iter::once(heading.to_string())
        .chain(items.iter().map(|item| format!("- {item}")))
        .collect()
}

/// Markdown advice for one language
pub fn render_clothing_advice(
    reference: &ClothingReference,
    conditions: &AdviceConditions,
) -> Result<String> {
    let range = temperature_bucket(conditions.feel_min, conditions.feel_max);
    let interval = reference.interval(range).ok_or_else(|| {
        ForecastError::config(format!("Clothing reference has no interval for {range}"))
    })?;

    let mut lines = vec![
        format!(
            "**Temperature (feels like): {:.1}°C to {:.1}°C** (avg: {:.1}°C)",
            conditions.feel_min, conditions.feel_max, conditions.feel_avg
        ),
        String::new(),
        "**Base Layers:**".to_string(),
        format!("- Torso: {}", interval.base_layer.torso),
        format!("- Legs: {}", interval.base_layer.legs),
        String::new(),
        "**Mid Layers:**".to_string(),
        format!("- Active: {}", interval.mid_layers.active),
        format!("- Static/Stops: {}", interval.mid_layers.static_extra),
        String::new(),
        "**Outer Layers:**".to_string(),
        format!("- Jacket: {}", interval.outer_layers.required_windstopper),
        format!("- Legs: {}", interval.outer_layers.legs),
        String::new(),
        "**Accessories:**".to_string(),
        format!("- Hands: {}", interval.accessories.hands),
        format!("- Head/Face: {}", interval.accessories.head_face),
    ];
    if let Some(notes) = &interval.accessories.notes {
        lines.push(format!("- Notes: {notes}"));
    }
    lines.push(String::new());

    lines.push("**Always Carried (Core):**".to_string());
    lines.extend(
        reference
            .clothing
            .always_carried_core_items
            .0
            .iter()
            .map(|(category, items)| format!("- {}: {}", title_case(category), items.join(", "))),
    );
    lines.push(String::new());

    let overrides = &reference.clothing.precipitation_overrides;
    let precipitation = match conditions.precipitation() {
        Some(PrecipitationKind::HeavySnow) => {
            Some(("**Heavy Snow Conditions:**", &overrides.heavy_snow))
        }
        Some(PrecipitationKind::Wet) => Some((
            "**Wet Precipitation (Rain/Wet Snow):**",
            &overrides.wet_snow_or_rain,
        )),
        None => None,
    };
    if let Some((heading, info)) = precipitation {
        lines.extend(items_block(heading, &info.required_additions));
        lines.push(format!("- {}", info.notes));
        lines.push(String::new());
    }

    let equipment = &reference.equipment;
    lines.push("**Essential Equipment:**".to_string());
    lines.push(String::new());
    for (heading, items) in [
        ("*Mandatory Safety (Avalanche):*", &equipment.mandatory_safety_kit_3_4),
        ("*Ski Touring System:*", &equipment.ski_touring_system),
        ("*Navigation & Communication:*", &equipment.navigation_communication),
        ("*Emergency & Repair:*", &equipment.emergency_repair),
        ("*Food & Hydration:*", &equipment.food_hydration),
    ] {
        lines.extend(items_block(heading, items));
        lines.push(String::new());
    }

    Ok(lines.join("\n").trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HourlyForecastPoint;
    use rstest::rstest;

    fn interval(range: &str) -> serde_json::Value {
        serde_json::json!({
            "range": range,
            "base_layer": {"torso": format!("{range} torso"), "legs": "long johns"},
            "mid_layers": {"active": "fleece", "static_extra": "puffy"},
            "outer_layers": {"required_windstopper": "shell", "legs": "shell pants"},
            "accessories": {"hands": "gloves", "head_face": "buff"}
        })
    }

    fn reference() -> ClothingReference {
        let json = serde_json::json!({
            "clothing": {
                "temperature_feel_intervals_celsius": [
                    interval("below_-20"), interval("-20_to_-10"), interval("-10_to_0"),
                    interval("0_to_10"), interval("above_10")
                ],
                "always_carried_core_items": {
                    "spare_layers": ["dry base layer"],
                    "emergency": ["bivy bag", "headlamp"]
                },
                "precipitation_overrides": {
                    "heavy_snow": {"required_additions": ["goggles"], "notes": "expect trail breaking"},
                    "wet_snow_or_rain": {"required_additions": ["hardshell"], "notes": "pack dry bags"}
                }
            },
            "equipment": {
                "mandatory_safety_kit_3_4": ["transceiver", "shovel", "probe"],
                "ski_touring_system": ["skins"],
                "navigation_communication": ["map"],
                "emergency_repair": ["ski straps"],
                "food_hydration": ["thermos"]
            }
        });
        serde_json::from_value(json).unwrap()
    }

    fn point(temperature: f64, precipitation: f64, code: i64) -> EnrichedHourlyPoint {
        EnrichedHourlyPoint::from_point(HourlyForecastPoint {
            time_local: "2026-01-28T12:00".to_string(),
            hour: 12,
            temperature,
            precipitation,
            precipitation_probability: None,
            wind_speed: 0.0,
            wind_gusts: None,
            weather_code: Some(code),
            wind_direction: None,
            conditions: String::new(),
            cloud_cover: None,
            cloud_cover_low: None,
            cloud_cover_mid: None,
            cloud_cover_high: None,
        })
    }

    #[rstest]
    #[case(-25.0, -5.0, "below_-20")]
    #[case(-20.0, 3.0, "-20_to_-10")]
    #[case(-10.0, -10.0, "-10_to_0")]
    #[case(-0.1, 5.0, "-10_to_0")]
    #[case(0.0, 8.0, "0_to_10")]
    #[case(10.0, 15.0, "above_10")]
    #[case(12.0, 9.9, "0_to_10")]
    fn test_temperature_bucket(#[case] min: f64, #[case] max: f64, #[case] expected: &str) {
        assert_eq!(temperature_bucket(min, max), expected);
    }

    #[rstest]
    #[case("en", "clothing_per_temp_feel.json")]
    #[case("ro", "clothing_per_temp_feel_ro.json")]
    #[case("hu", "clothing_per_temp_feel_hu.json")]
    fn test_file_name(#[case] language: &str, #[case] expected: &str) {
        assert_eq!(ClothingReference::file_name(language), expected);
    }

    #[test]
    fn test_conditions_from_points() {
        let points = vec![point(-4.0, 3.0, 73), point(2.0, 3.0, 3)];
        let conditions = AdviceConditions::from_points(&points).unwrap();
        assert_eq!(conditions.feel_min, -4.0);
        assert_eq!(conditions.feel_max, 2.0);
        assert_eq!(conditions.feel_avg, -1.0);
        assert!(conditions.is_snowy);
        assert_eq!(conditions.precipitation(), Some(PrecipitationKind::HeavySnow));
        assert!(AdviceConditions::from_points(&[]).is_none());
    }

    #[rstest]
    #[case(true, 5.0, None)]
    #[case(true, 5.1, Some(PrecipitationKind::HeavySnow))]
    #[case(false, 3.0, None)]
    #[case(false, 3.5, Some(PrecipitationKind::Wet))]
    #[case(true, 4.0, None)]
    fn test_precipitation_override(
        #[case] is_snowy: bool,
        #[case] precip_total: f64,
        #[case] expected: Option<PrecipitationKind>,
    ) {
        let conditions = AdviceConditions {
            feel_min: -5.0,
            feel_max: 0.0,
            feel_avg: -2.0,
            precip_total,
            is_snowy,
        };
        assert_eq!(conditions.precipitation(), expected);
    }

    #[test]
    fn test_render_advice() {
        let conditions = AdviceConditions {
            feel_min: -12.0,
            feel_max: -3.0,
            feel_avg: -7.5,
            precip_total: 4.0,
            is_snowy: false,
        };
        let advice = render_clothing_advice(&reference(), &conditions).unwrap();

        assert!(advice.starts_with(
            "**Temperature (feels like): -12.0°C to -3.0°C** (avg: -7.5°C)"
        ));
        assert!(advice.contains("- Torso: -20_to_-10 torso"));
        assert!(advice.contains(
            "- Head/Face: buff\n\n**Always Carried (Core):**\n- Spare Layers"
        ));
        assert!(advice.contains("- Spare Layers: dry base layer\n- Emergency: bivy bag, headlamp"));
        assert!(advice.contains("**Wet Precipitation (Rain/Wet Snow):**\n- hardshell\n- pack dry bags"));
        assert!(!advice.contains("Heavy Snow"));
        assert!(!advice.contains("- Notes:"));
        assert!(advice.ends_with("*Food & Hydration:*\n- thermos"));
    }

    #[test]
    fn test_core_items_keep_file_order() {
        let items: CoreItems =
            serde_json::from_str(r#"{"warmth": ["puffy"], "emergency": ["bivy bag"], "backup": []}"#)
                .unwrap();
        let categories: Vec<&str> = items.0.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(categories, vec!["warmth", "emergency", "backup"]);

        let reloaded: CoreItems =
            serde_json::from_str(&serde_json::to_string(&items).unwrap()).unwrap();
        assert_eq!(reloaded, items);

        assert!(serde_json::from_str::<CoreItems>(r#"{"warmth": "puffy"}"#).is_err());
    }

    #[test]
    fn test_missing_interval_is_an_error() {
        let mut reference = reference();
        reference
            .clothing
            .temperature_feel_intervals_celsius
            .retain(|i| i.range != "above_10");
        let conditions = AdviceConditions {
            feel_min: 12.0,
            feel_max: 18.0,
            feel_avg: 15.0,
            precip_total: 0.0,
            is_snowy: false,
        };
        assert!(matches!(
            render_clothing_advice(&reference, &conditions),
            Err(ForecastError::Config { .. })
        ));
    }

    #[test]
    fn test_load_missing_language_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClothingReference::load(dir.path(), "de").is_err());
        std::fs::write(
            dir.path().join("clothing_per_temp_feel_de.json"),
            serde_json::to_string(&reference()).unwrap(),
        )
        .unwrap();
        assert!(ClothingReference::load(dir.path(), "de").is_ok());
    }
}
