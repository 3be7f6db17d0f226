//! Map coloring for provinces and members.
//!
//! Two policies are supported. [`ColorPolicy::Flat`] paints a fixed base color
//! whose alpha follows the province's portion, and [`ColorPolicy::Gradient`]
//! interpolates between a light and a dark endpoint of the relevant option.
//! All color tables live in [`Palette`] and are passed in explicitly.

use crate::error::{Error, Result};
use crate::stats::{ProvinceVoteStats, VoteTally};
use crate::types::VoteOption;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `#RGB`, or a `r, g, b` triple
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| Error::Color(input.to_string()));
        }

        let channels: Vec<u8> = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| Error::Color(input.to_string()))?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(Error::Color(input.to_string())),
        }
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
        match hex.len() {
            6 => Some(Self::new(
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
            )),
            3 => {
                let expand = |i: usize| -> Option<u8> {
                    let digit = channel(hex.get(i..i + 1)?)?;
                    Some(digit * 17)
                };
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1)
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let (a, b) = (f64::from(a), f64::from(b));
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// WCAG relative luminance
    pub fn relative_luminance(self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = f64::from(channel) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Rgb::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

/// Light and dark endpoint of a gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientStops {
    pub light: Rgb,
    pub dark: Rgb,
}

impl GradientStops {
    pub const fn new(light: Rgb, dark: Rgb) -> Self {
        Self { light, dark }
    }

    pub fn at(&self, t: f64) -> Rgb {
        self.light.lerp(self.dark, t)
    }
}

/// Color tables used by the mapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Provinces without data
    pub no_data: Rgb,
    /// Flat base color when no option is selected
    pub all_option_base: Rgb,
    /// Flat base color, legend swatch and member color per option
    pub option_colors: IndexMap<VoteOption, Rgb>,
    pub gradients: IndexMap<VoteOption, GradientStops>,
    /// Used when a gradient lookup misses
    pub fallback_gradient: GradientStops,
    /// Members without any recorded vote
    pub member_default: Rgb,
    pub light_text: Rgb,
    pub dark_text: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        let option_colors = IndexMap::from([
            (VoteOption::Agree, Rgb::new(0x00, 0xC7, 0x58)),
            (VoteOption::Disagree, Rgb::new(0xEF, 0x44, 0x44)),
            (VoteOption::Abstain, Rgb::new(0xED, 0xB2, 0x00)),
            (VoteOption::NoVote, Rgb::new(0x1F, 0x29, 0x37)),
            (VoteOption::Absent, Rgb::new(0x6B, 0x72, 0x80)),
        ]);
        let gradients = IndexMap::from([
            (
                VoteOption::Agree,
                GradientStops::new(Rgb::new(0xBB, 0xF7, 0xD0), Rgb::new(0x00, 0xC7, 0x58)),
            ),
            (
                VoteOption::Disagree,
                GradientStops::new(Rgb::new(0xFE, 0xCA, 0xCA), Rgb::new(0xEF, 0x44, 0x44)),
            ),
            (
                VoteOption::Abstain,
                GradientStops::new(Rgb::new(0xFE, 0xF0, 0x8A), Rgb::new(0xED, 0xB2, 0x00)),
            ),
            (
                VoteOption::NoVote,
                GradientStops::new(Rgb::new(0xD1, 0xD5, 0xDB), Rgb::new(0x1F, 0x29, 0x37)),
            ),
            (
                VoteOption::Absent,
                GradientStops::new(Rgb::new(0xF3, 0xF4, 0xF6), Rgb::new(0x6B, 0x72, 0x80)),
            ),
        ]);

        Self {
            no_data: Rgb::new(0xE5, 0xE7, 0xEB),
            all_option_base: Rgb::new(139, 92, 246),
            option_colors,
            gradients,
            fallback_gradient: GradientStops::new(
                Rgb::new(0xF9, 0xFA, 0xFB),
                Rgb::new(0x9C, 0xA3, 0xAF),
            ),
            member_default: Rgb::new(0xD1, 0xD5, 0xDB),
            light_text: Rgb::WHITE,
            dark_text: Rgb::new(0x1F, 0x29, 0x37),
        }
    }
}

/// Coloring policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPolicy {
    /// Base color with portion-driven opacity
    #[default]
    Flat,
    /// Light-to-dark interpolation by portion
    Gradient,
}

impl std::str::FromStr for ColorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(ColorPolicy::Flat),
            "gradient" => Ok(ColorPolicy::Gradient),
            other => Err(Error::Config(format!(
                "Invalid color policy '{}'. Allowed values are: flat, gradient",
                other
            ))),
        }
    }
}

/// Opacity range of the flat policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityBand {
    pub min: f64,
    pub max: f64,
}

impl OpacityBand {
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.min) || !in_unit(self.max) || self.min > self.max {
            return Err(Error::Config(format!(
                "Opacity band must satisfy 0 <= min <= max <= 1, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for OpacityBand {
    fn default() -> Self {
        Self { min: 0.2, max: 0.9 }
    }
}

/// A resolved fill color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapColor {
    Solid(Rgb),
    Translucent { base: Rgb, alpha: f64 },
}

impl MapColor {
    /// The color as seen on a white page
    pub fn flatten(&self) -> Rgb {
        match *self {
            MapColor::Solid(rgb) => rgb,
            MapColor::Translucent { base, alpha } => Rgb::WHITE.lerp(base, alpha),
        }
    }
}

impl fmt::Display for MapColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapColor::Solid(rgb) => write!(f, "{}", rgb),
            MapColor::Translucent { base, alpha } => {
                write!(f, "rgba({}, {}, {}, {})", base.r, base.g, base.b, alpha)
            }
        }
    }
}

impl Serialize for MapColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One swatch of the map legend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub option: VoteOption,
    pub color: Rgb,
}

/// What the map legend shows for the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Legend {
    /// One swatch per option
    Options { entries: Vec<LegendEntry> },
    /// Gradient scale of a single option, `light` at `min_percent` and
    /// `dark` at `max_percent`
    Gradient {
        label: String,
        light: Rgb,
        dark: Rgb,
        min_percent: u8,
        max_percent: u8,
    },
}

/// Maps stats to display colors under one policy and palette
#[derive(Debug, Clone, Copy)]
pub struct ColorMapper<'a> {
    policy: ColorPolicy,
    opacity: OpacityBand,
    palette: &'a Palette,
}

impl<'a> ColorMapper<'a> {
    pub fn new(policy: ColorPolicy, opacity: OpacityBand, palette: &'a Palette) -> Self {
        Self {
            policy,
            opacity,
            palette,
        }
    }

    pub fn policy(&self) -> ColorPolicy {
        self.policy
    }

    /// Fill color of a province. `stats` is `None` when the province has no
    /// data under the current selection.
    pub fn province_color(
        &self,
        stats: Option<&ProvinceVoteStats>,
        selected_option: Option<&str>,
    ) -> MapColor {
        let Some(stats) = stats else {
            return MapColor::Solid(self.palette.no_data);
        };
        match self.policy {
            ColorPolicy::Flat => self.flat_color(stats, selected_option),
            ColorPolicy::Gradient => self.gradient_color(stats, selected_option),
        }
    }

    fn flat_color(&self, stats: &ProvinceVoteStats, selected_option: Option<&str>) -> MapColor {
        let base = match selected_option {
            None => Some(self.palette.all_option_base),
            Some(label) => VoteOption::from_label(label)
                .and_then(|option| self.palette.option_colors.get(&option).copied()),
        };
        match base {
            Some(base) => MapColor::Translucent {
                base,
                alpha: self.opacity.clamp(stats.portion),
            },
            None => MapColor::Solid(self.palette.no_data),
        }
    }

    fn gradient_color(&self, stats: &ProvinceVoteStats, selected_option: Option<&str>) -> MapColor {
        let key = match selected_option {
            Some(label) => match VoteOption::from_label(label) {
                Some(option) => Some(option),
                None => return MapColor::Solid(self.palette.no_data),
            },
            None => stats.winning_option,
        };
        if stats.portion.is_nan() || stats.portion <= 0.0 {
            return MapColor::Solid(self.palette.no_data);
        }
        MapColor::Solid(self.gradient_for(key).at(stats.portion.clamp(0.0, 1.0)))
    }

    fn gradient_for(&self, option: Option<VoteOption>) -> GradientStops {
        option
            .and_then(|option| self.palette.gradients.get(&option).copied())
            .unwrap_or(self.palette.fallback_gradient)
    }

    /// Color of a member card: the single color of their majority action
    pub fn member_color(&self, tally: &VoteTally) -> Rgb {
        tally
            .winning_option()
            .and_then(|option| self.palette.option_colors.get(&option).copied())
            .unwrap_or(self.palette.member_default)
    }

    /// White on dark backgrounds, dark gray on light ones
    pub fn text_color(&self, background: &MapColor) -> Rgb {
        if background.flatten().relative_luminance() < 0.5 {
            self.palette.light_text
        } else {
            self.palette.dark_text
        }
    }

    /// Legend of the current selection. Only the gradient policy with a
    /// selected option shows a scale; everything else lists the option colors.
    pub fn legend(&self, selected_option: Option<&str>) -> Legend {
        match (self.policy, selected_option) {
            (ColorPolicy::Gradient, Some(label)) => {
                let stops = self.gradient_for(VoteOption::from_label(label));
                Legend::Gradient {
                    label: label.to_string(),
                    light: stops.light,
                    dark: stops.dark,
                    min_percent: 0,
                    max_percent: 100,
                }
            }
            _ => Legend::Options {
                entries: self
                    .palette
                    .option_colors
                    .iter()
                    .map(|(option, color)| LegendEntry {
                        option: *option,
                        color: *color,
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(portion: f64, counts: [u32; 5]) -> ProvinceVoteStats {
        ProvinceVoteStats::from_tally("p", VoteTally::from_counts(counts), portion)
    }

    fn alpha_of(color: MapColor) -> f64 {
        match color {
            MapColor::Translucent { alpha, .. } => alpha,
            MapColor::Solid(_) => panic!("expected translucent color, got {}", color),
        }
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(Rgb::parse("#00C758").unwrap(), Rgb::new(0, 199, 88));
        assert_eq!(Rgb::parse("#fff").unwrap(), Rgb::WHITE);
        assert_eq!(Rgb::parse("139, 92, 246").unwrap(), Rgb::new(139, 92, 246));
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("1, 2").is_err());
        assert!(Rgb::parse("300, 0, 0").is_err());
    }

    #[test]
    fn test_flat_opacity_is_clamped_to_band() {
        let palette = Palette::default();
        let mapper = ColorMapper::new(ColorPolicy::Flat, OpacityBand::default(), &palette);

        assert_eq!(alpha_of(mapper.province_color(Some(&stats(0.0, [1, 0, 0, 0, 0])), None)), 0.2);
        assert_eq!(alpha_of(mapper.province_color(Some(&stats(1.0, [1, 0, 0, 0, 0])), None)), 0.9);
        assert_eq!(alpha_of(mapper.province_color(Some(&stats(1.5, [1, 0, 0, 0, 0])), None)), 0.9);
        assert_eq!(alpha_of(mapper.province_color(Some(&stats(0.5, [1, 0, 0, 0, 0])), None)), 0.5);
    }

    #[test]
    fn test_flat_uses_option_base_color() {
        let palette = Palette::default();
        let mapper = ColorMapper::new(ColorPolicy::Flat, OpacityBand::default(), &palette);
        let color = mapper.province_color(
            Some(&stats(0.5, [1, 0, 0, 0, 0])),
            Some(VoteOption::Disagree.label()),
        );
        assert_eq!(color.to_string(), "rgba(239, 68, 68, 0.5)");

        let all = mapper.province_color(Some(&stats(0.5, [1, 0, 0, 0, 0])), None);
        assert_eq!(all.to_string(), "rgba(139, 92, 246, 0.5)");
    }

    #[test]
    fn test_no_data_and_unknown_option() {
        let palette = Palette::default();
        for policy in [ColorPolicy::Flat, ColorPolicy::Gradient] {
            let mapper = ColorMapper::new(policy, OpacityBand::default(), &palette);
            assert_eq!(mapper.province_color(None, None), MapColor::Solid(palette.no_data));
            assert_eq!(
                mapper.province_color(Some(&stats(0.5, [1, 0, 0, 0, 0])), Some("unknown")),
                MapColor::Solid(palette.no_data)
            );
        }
    }

    #[test]
    fn test_gradient_endpoints() {
        let palette = Palette::default();
        let mapper = ColorMapper::new(ColorPolicy::Gradient, OpacityBand::default(), &palette);
        let agree = VoteOption::Agree.label();

        let zero = mapper.province_color(Some(&stats(0.0, [1, 0, 0, 0, 0])), Some(agree));
        assert_eq!(zero, MapColor::Solid(palette.no_data));
        assert_ne!(zero, MapColor::Solid(palette.gradients[&VoteOption::Agree].light));

        let full = mapper.province_color(Some(&stats(1.0, [1, 0, 0, 0, 0])), Some(agree));
        assert_eq!(full, MapColor::Solid(palette.gradients[&VoteOption::Agree].dark));

        let over = mapper.province_color(Some(&stats(2.0, [1, 0, 0, 0, 0])), Some(agree));
        assert_eq!(over, full);
    }

    #[test]
    fn test_gradient_follows_winning_option_without_selection() {
        let palette = Palette::default();
        let mapper = ColorMapper::new(ColorPolicy::Gradient, OpacityBand::default(), &palette);
        let color = mapper.province_color(Some(&stats(1.0, [1, 4, 0, 0, 0])), None);
        assert_eq!(color, MapColor::Solid(palette.gradients[&VoteOption::Disagree].dark));
    }

    #[test]
    fn test_gradient_lookup_miss_falls_back_to_gray() {
        let mut palette = Palette::default();
        palette.gradients.shift_remove(&VoteOption::Abstain);
        let mapper = ColorMapper::new(ColorPolicy::Gradient, OpacityBand::default(), &palette);
        let color = mapper.province_color(Some(&stats(1.0, [0, 0, 2, 0, 0])), None);
        assert_eq!(color, MapColor::Solid(palette.fallback_gradient.dark));
    }

    #[test]
    fn test_lerp_midpoint() {
        let mid = Rgb::new(0, 0, 0).lerp(Rgb::new(200, 100, 50), 0.5);
        assert_eq!(mid, Rgb::new(100, 50, 25));
    }

    #[test]
    fn test_text_color_by_luminance() {
        let palette = Palette::default();
        let mapper = ColorMapper::new(ColorPolicy::Gradient, OpacityBand::default(), &palette);

        assert_eq!(mapper.text_color(&MapColor::Solid(Rgb::new(0, 0, 0))), Rgb::WHITE);
        assert_eq!(mapper.text_color(&MapColor::Solid(Rgb::WHITE)), palette.dark_text);
        assert!((Rgb::WHITE.relative_luminance() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_member_color_uses_majority_action() {
        let palette = Palette::default();
        let mapper = ColorMapper::new(ColorPolicy::Flat, OpacityBand::default(), &palette);

        let tally = VoteTally::from_counts([0, 0, 5, 1, 0]);
        assert_eq!(mapper.member_color(&tally), Rgb::new(0xED, 0xB2, 0x00));
        assert_eq!(mapper.member_color(&VoteTally::default()), palette.member_default);
    }

    #[test]
    fn test_legend_shapes() {
        let palette = Palette::default();
        let agree = VoteOption::Agree.label();

        let gradient = ColorMapper::new(ColorPolicy::Gradient, OpacityBand::default(), &palette);
        match gradient.legend(None) {
            Legend::Options { entries } => {
                let options: Vec<VoteOption> = entries.iter().map(|e| e.option).collect();
                assert_eq!(options, VoteOption::ALL.to_vec());
            }
            other => panic!("unexpected legend {:?}", other),
        }
        let stops = palette.gradients[&VoteOption::Agree];
        assert_eq!(
            gradient.legend(Some(agree)),
            Legend::Gradient {
                label: agree.to_string(),
                light: stops.light,
                dark: stops.dark,
                min_percent: 0,
                max_percent: 100,
            }
        );
    }

    #[test]
    fn test_flat_legend_always_lists_option_colors() {
        let palette = Palette::default();
        let flat = ColorMapper::new(ColorPolicy::Flat, OpacityBand::default(), &palette);
        let swatches = flat.legend(None);
        assert!(matches!(swatches, Legend::Options { ref entries } if entries.len() == 5));
        assert_eq!(flat.legend(Some(VoteOption::Agree.label())), swatches);
        assert_eq!(flat.legend(Some("unknown")), swatches);
    }

    #[test]
    fn test_gradient_legend_serializes_bounds() {
        let palette = Palette::default();
        let gradient = ColorMapper::new(ColorPolicy::Gradient, OpacityBand::default(), &palette);
        let value = serde_json::to_value(gradient.legend(Some(VoteOption::Disagree.label()))).unwrap();
        assert_eq!(value["kind"], "gradient");
        assert_eq!(value["min_percent"], 0);
        assert_eq!(value["max_percent"], 100);
        assert_eq!(value["dark"], "#EF4444");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Gradient".parse::<ColorPolicy>().unwrap(), ColorPolicy::Gradient);
        assert!("rainbow".parse::<ColorPolicy>().is_err());
    }

    #[test]
    fn test_opacity_band_validation() {
        assert!(OpacityBand::default().validate().is_ok());
        assert!(OpacityBand { min: 0.8, max: 0.2 }.validate().is_err());
        assert!(OpacityBand { min: -0.1, max: 0.2 }.validate().is_err());
    }
}
