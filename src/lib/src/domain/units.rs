/// Convert degrees Celsius to degrees Fahrenheit
#[inline]
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}
