/// Pascals per inch of mercury, as used by the reference driver.
const PASCALS_PER_INCH_OF_MERCURY: f64 = 3386.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PressureUnit {
    #[default]
    Pascal,
    InchesOfMercury,
}

impl TemperatureUnit {
    /// Convert a compensated Celsius value into this unit.
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => to_fahrenheit(celsius),
        }
    }
}

impl PressureUnit {
    /// Convert a compensated Pascal value into this unit.
    pub fn convert(self, pascal: f64) -> f64 {
        match self {
            PressureUnit::Pascal => pascal,
            PressureUnit::InchesOfMercury => to_inches_of_mercury(pascal),
        }
    }
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn to_inches_of_mercury(pascal: f64) -> f64 {
    pascal / PASCALS_PER_INCH_OF_MERCURY
}
