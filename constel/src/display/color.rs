//! Star colors for the renderer
//!
//! Colors are cosmetic and computed once per world. A star's mass is mapped
//! to a main-sequence surface temperature, and the temperature to linear RGB
//! with Tanner Helland's blackbody approximation.
//!
//! See https://tannerhelland.com/2012/09/18/convert-temperature-rgb-algorithm-code.html.

const SOLAR_TEMPERATURE: f64 = 5778.0;

const MIN_TEMPERATURE: f64 = 1000.0;
const MAX_TEMPERATURE: f64 = 40000.0;
const TEMP_DIVISOR: f64 = 100.0;
const DAYLIGHT_TEMP_THRESHOLD: f64 = 6600.0;
const BLUE_TEMP_THRESHOLD: f64 = 1900.0;
const MAX_COLOR_VALUE: f64 = 255.0;

const RED_COEFFICIENT: f64 = 329.698727446;
const RED_OFFSET: f64 = 60.0;
const RED_EXPONENT: f64 = -0.1332047592;

const GREEN_WARM_COEFFICIENT: f64 = 99.4708025861;
const GREEN_WARM_OFFSET: f64 = -161.1195681661;
const GREEN_COOL_COEFFICIENT: f64 = 288.1221695283;
const GREEN_COOL_EXPONENT: f64 = -0.0755148492;

const BLUE_COEFFICIENT: f64 = 138.5177312231;
const BLUE_OFFSET: f64 = -305.0447927307;
const BLUE_LOG_OFFSET: f64 = 10.0;

/// Surface temperature in Kelvin of a main-sequence star of `mass` solar
/// masses. Lighter stars cool faster than heavier ones heat up.
pub fn temperature_for_mass(mass: f64) -> f64 {
    if mass < 1.0 {
        SOLAR_TEMPERATURE * mass.powf(0.6)
    } else {
        SOLAR_TEMPERATURE * mass.powf(0.5)
    }
}

/// Normalized `[r, g, b]` of a blackbody at `temperature` Kelvin, clamped to
/// 1000K..40000K
pub fn rgb_for_temp(temperature: f64) -> [f32; 3] {
    let temp = temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
    let temp_100 = temp / TEMP_DIVISOR;

    let red = if temp <= DAYLIGHT_TEMP_THRESHOLD {
        MAX_COLOR_VALUE
    } else {
        RED_COEFFICIENT * (temp_100 - RED_OFFSET).powf(RED_EXPONENT)
    };

    let green = if temp <= DAYLIGHT_TEMP_THRESHOLD {
        GREEN_WARM_COEFFICIENT * temp_100.ln() + GREEN_WARM_OFFSET
    } else {
        GREEN_COOL_COEFFICIENT * (temp_100 - RED_OFFSET).powf(GREEN_COOL_EXPONENT)
    };

    let blue = if temp >= DAYLIGHT_TEMP_THRESHOLD {
        MAX_COLOR_VALUE
    } else if temp < BLUE_TEMP_THRESHOLD {
        0.0
    } else {
        BLUE_COEFFICIENT * (temp_100 - BLUE_LOG_OFFSET).ln() + BLUE_OFFSET
    };

    [red, green, blue].map(|c| (c.clamp(0.0, MAX_COLOR_VALUE) / MAX_COLOR_VALUE) as f32)
}

/// Display color of a star of `mass`
pub fn color_for_mass(mass: f64) -> [f32; 3] {
    rgb_for_temp(temperature_for_mass(mass))
}
