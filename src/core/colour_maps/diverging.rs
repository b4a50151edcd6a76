use crate::core::actions::generate_pixel_buffer::ports::colour_map::ColourMap;
use crate::core::data::colour::Colour;
use std::convert::Infallible;

/// Magnitudes below this are drawn with [`NEUTRAL_COLOUR`].
pub const NEAR_ZERO_THRESHOLD: f64 = 0.01;

pub const NEUTRAL_COLOUR: Colour = Colour::WHITE;

/// How far the channel opposite the hue drops at full intensity (255 -> 51).
const STRONG_FALLOFF: f64 = 204.0;

/// How far green drops at full intensity in either direction (255 -> 128).
const SOFT_FALLOFF: f64 = 127.0;

fn fade(intensity: f64, falloff: f64) -> u8 {
    // Always positive here, so round() is round-half-up.
    (255.0 - intensity * falloff).round() as u8
}

/// Maps an activation onto a white-centred blue/red diverging scale.
///
/// The value is clamped into [-1, 1]. Positive values fade from white towards
/// blue, negative values from white towards red, and anything with a
/// magnitude under [`NEAR_ZERO_THRESHOLD`] is white. NaN is treated as no
/// activation and is also white; infinities clamp to the ends of the scale.
#[must_use]
pub fn diverging_colour(value: f64) -> Colour {
    if value.is_nan() {
        return NEUTRAL_COLOUR;
    }

    let normalised = value.clamp(-1.0, 1.0);
    let intensity = normalised.abs();

    if intensity < NEAR_ZERO_THRESHOLD {
        return NEUTRAL_COLOUR;
    }

    let strong = fade(intensity, STRONG_FALLOFF);
    let soft = fade(intensity, SOFT_FALLOFF);

    if normalised > 0.0 {
        Colour {
            r: strong,
            g: soft,
            b: 255,
        }
    } else {
        Colour {
            r: 255,
            g: soft,
            b: strong,
        }
    }
}

/// [`diverging_colour`] behind the [`ColourMap`] port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DivergingColourMap;

impl DivergingColourMap {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ColourMap for DivergingColourMap {
    type T = f64;
    type Failure = Infallible;

    fn map(&self, value: f64) -> Result<Colour, Infallible> {
        Ok(diverging_colour(value))
    }

    fn display_name(&self) -> &str {
        "Diverging blue-red"
    }
}
