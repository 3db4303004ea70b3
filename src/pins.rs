//! GPIO / peripheral pin assignments for the MediBox board (ESP32-WROOM).
//!
//! Single source of truth: every adapter references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Indicator LEDs (one per dose slot, active HIGH)
// ---------------------------------------------------------------------------

pub const INDICATOR_GPIOS: [i32; 4] = [2, 4, 5, 18];

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// LDR voltage divider on ADC1 channel 6 (GPIO 34), 11 dB attenuation.
pub const LDR_ADC_GPIO: i32 = 34;
/// DHT11 single-wire data line.
pub const DHT_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Buzzer (LEDC PWM, 1 kHz carrier, 10-bit duty)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 23;
pub const BUZZER_FREQ_HZ: u32 = 1000;

// ---------------------------------------------------------------------------
// Buttons (momentary, internal pull-up, LOW = pressed)
// ---------------------------------------------------------------------------

/// Left button: "yes" / confirm.
pub const BUTTON_CONFIRM_GPIO: i32 = 25;
/// Right button: "no" / deny.
pub const BUTTON_DENY_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// SSD1306 128x64 OLED on I2C0
// ---------------------------------------------------------------------------

pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_SDA_GPIO: i32 = 21;
