//! lfo-hw-interface
//!
//! LFO control module firmware for the Raspberry Pi Pico 2. Wires the four
//! library crates into a running device:
//!
//! 1. The encoder watcher task waits on pin edges and feeds every quadrature
//!    transition into the shared `ENCODER` channel.
//! 2. The audio task advances a four-channel [`PhaseOscillator`] at
//!    `SAMPLE_RATE_HZ` and writes one PWM duty per channel. It re-reads the
//!    settings and ramps towards them whenever `RETUNE` is signalled.
//! 3. The UI task runs at the display refresh rate: it drains the encoder and
//!    button, follows the rate pot, drives the [`MenuNavigator`] and flushes
//!    shown frames to the OLED.
//!
//! Settings live in `AtomicI32` statics. The menu writes them, the audio task
//! reads them, and nothing else is shared between the two paths.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicI32, Ordering};

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel as AdcChannel};
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_rp::pwm::{self, Pwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lfo_input::{
    Button, ButtonConfig, EncoderChannel, PotConfig, PotFilter, PressEvent, Rotary, RotaryEncoder,
};
use lfo_oled_display::{DisplayConfig, OledDriver};
use lfo_oscillator::{curves, phase_from_degrees, PhaseOscillator};
use lfo_settings_menu::{
    Action, ChoiceSetting, IntSetting, MenuExit, MenuHooks, MenuNavigator, NodeId, SettingsTree,
    TreeError,
};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Oscillator tick rate.
const SAMPLE_RATE_HZ: u32 = 4_000;

/// Oscillator channels, one PWM output each.
const CHANNELS: usize = 4;

/// PWM counter wrap; 12-bit duty resolution.
const PWM_TOP: u16 = 4095;

/// SSD1306 I2C address.
const OLED_ADDRESS: u8 = 0x3C;

/// Room for every node of the settings tree, root included.
const TREE_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// LFO rate as a 7-bit controller value, see [`curves::rate_hz`].
static RATE: AtomicI32 = AtomicI32::new(40);
/// Phase spread between adjacent channels, in degrees.
static SPREAD: AtomicI32 = AtomicI32::new(90);
/// Glide time as a 7-bit controller value, see [`curves::ramp_time_ms`].
static GLIDE: AtomicI32 = AtomicI32::new(20);
/// 0 = nearest table entry, 1 = interpolated.
static INTERPOLATE: AtomicI32 = AtomicI32::new(1);
/// Output depth as a 7-bit controller value, see [`curves::expression_gain`].
static DEPTH: AtomicI32 = AtomicI32::new(127);

/// Every setting, in snapshot order.
static SETTINGS: [&AtomicI32; 5] = [&RATE, &SPREAD, &GLIDE, &INTERPOLATE, &DEPTH];

static INTERPOLATE_LABELS: [&str; 2] = ["Off", "On"];

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Quadrature decoder shared by the watcher task and the UI task.
static ENCODER: EncoderChannel = EncoderChannel::new();

/// Raised whenever a setting the audio task depends on changes.
static RETUNE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

static TREE: StaticCell<SettingsTree<'static, TREE_CAPACITY>> = StaticCell::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type OledI2c = I2c<'static, I2C0, i2c::Async>;

type MenuRotary = RotaryEncoder<&'static EncoderChannel, Input<'static>>;

// ---------------------------------------------------------------------------
// Settings tree and menu hooks
// ---------------------------------------------------------------------------

/// ```text
/// Settings
/// ├── Rate
/// ├── LFO ...
/// │   ├── Spread
/// │   ├── Glide
/// │   ├── Interp
/// │   ├── Reset
/// │   └── Back
/// ├── Depth
/// ├── Defaults
/// ├── Save & Exit
/// └── Cancel
/// ```
fn build_settings_tree() -> Result<SettingsTree<'static, TREE_CAPACITY>, TreeError> {
    let mut tree = SettingsTree::new("Settings");
    let root = tree.root();

    tree.add_int(root, "Rate", IntSetting::new(&RATE, 0, 127, 40))?;

    let lfo = tree.add_menu(root, "LFO")?;
    tree.add_int(lfo, "Spread", IntSetting::new(&SPREAD, 0, 180, 90))?;
    tree.add_int(lfo, "Glide", IntSetting::new(&GLIDE, 0, 127, 20))?;
    tree.add_choice(lfo, "Interp", ChoiceSetting::new(&INTERPOLATE, &INTERPOLATE_LABELS, 1))?;
    tree.add_action(lfo, Action::ResetMenuToDefaults)?;
    tree.add_action(lfo, Action::Back)?;

    tree.add_int(root, "Depth", IntSetting::new(&DEPTH, 0, 127, 127))?;
    tree.add_action(root, Action::ResetToDefaults)?;
    tree.add_action(root, Action::SaveAndExit)?;
    tree.add_action(root, Action::Cancel)?;

    Ok(tree)
}

fn snapshot() -> [i32; 5] {
    core::array::from_fn(|i| SETTINGS[i].load(Ordering::Relaxed))
}

/// RAM-only persistence: "save" keeps a snapshot, "load" puts it back.
struct Hooks {
    saved: [i32; 5],
}

impl MenuHooks for Hooks {
    fn setting_changed(&mut self, node: NodeId, setting: &IntSetting<'_>) {
        debug!("Setting {} = {}", node.index(), setting.value());
        RETUNE.signal(());
    }

    fn save(&mut self) {
        self.saved = snapshot();
        info!("Settings saved");
    }

    fn load(&mut self) {
        for (setting, &value) in SETTINGS.iter().zip(self.saved.iter()) {
            setting.store(value, Ordering::Relaxed);
        }
        RETUNE.signal(());
        info!("Settings reverted");
    }

    fn hidden(&mut self, exit: MenuExit) {
        info!("Menu closed: {}", exit);
    }
}

// ---------------------------------------------------------------------------
// Audio path
// ---------------------------------------------------------------------------

/// Read a 7-bit setting.
fn controller_value(setting: &AtomicI32) -> u8 {
    setting.load(Ordering::Relaxed).clamp(0, 127) as u8
}

/// Ramp rate and channel offsets to the current settings over the glide time.
fn retune(lfo: &mut PhaseOscillator<CHANNELS>) {
    let glide = curves::ramp_samples(controller_value(&GLIDE), SAMPLE_RATE_HZ);
    lfo.ramp_frequency(curves::rate_hz(controller_value(&RATE)), glide);

    let spread = SPREAD.load(Ordering::Relaxed);
    for channel in 0..CHANNELS {
        let degrees = (spread * channel as i32) as f32;
        lfo.ramp_phase_offset(channel, phase_from_degrees(degrees), glide);
    }
    debug!(
        "Retune: rate={} spread={} glide={} ticks",
        RATE.load(Ordering::Relaxed),
        spread,
        glide
    );
}

/// Unipolar table value scaled by `gain`, then onto `0..=PWM_TOP`.
fn duty(lfo: &PhaseOscillator<CHANNELS>, channel: usize, interpolate: bool, gain: u16) -> u16 {
    let raw = if interpolate {
        lfo.raw_ip(channel)
    } else {
        lfo.raw(channel)
    } as u32;
    let scaled = (raw * gain as u32) >> 16;
    ((scaled * PWM_TOP as u32) >> 16) as u16
}

fn pwm_config() -> pwm::Config {
    let mut config = pwm::Config::default();
    config.top = PWM_TOP;
    config
}

#[embassy_executor::task]
async fn audio_task(mut pwm_low: Pwm<'static>, mut pwm_high: Pwm<'static>) {
    info!("Audio task started at {} Hz", SAMPLE_RATE_HZ);

    let mut lfo: PhaseOscillator<CHANNELS> =
        PhaseOscillator::new(SAMPLE_RATE_HZ, curves::rate_hz(controller_value(&RATE)));
    let spread = SPREAD.load(Ordering::Relaxed);
    for channel in 0..CHANNELS {
        lfo.set_phase_offset(channel, phase_from_degrees((spread * channel as i32) as f32));
    }

    let mut config_low = pwm_config();
    let mut config_high = pwm_config();
    let mut ticker = Ticker::every(Duration::from_hz(SAMPLE_RATE_HZ as u64));

    loop {
        if RETUNE.try_take().is_some() {
            retune(&mut lfo);
        }

        lfo.advance();
        let interpolate = INTERPOLATE.load(Ordering::Relaxed) != 0;
        let gain = curves::expression_gain(controller_value(&DEPTH));
        let duties: [u16; CHANNELS] =
            core::array::from_fn(|channel| duty(&lfo, channel, interpolate, gain));

        config_low.compare_a = duties[0];
        config_low.compare_b = duties[1];
        pwm_low.set_config(&config_low);
        config_high.compare_a = duties[2];
        config_high.compare_b = duties[3];
        pwm_high.set_config(&config_high);

        ticker.next().await;
    }
}

// ---------------------------------------------------------------------------
// Input and UI
// ---------------------------------------------------------------------------

/// Feeds `ENCODER` from pin edges. Only returns if a pin read fails.
#[embassy_executor::task]
async fn encoder_task(pin_a: Input<'static>, pin_b: Input<'static>) {
    info!("Encoder watcher started");
    if let Err(e) = lfo_input::watch_encoder_pins(pin_a, pin_b, &ENCODER).await {
        error!("Encoder watcher stopped: {}", e);
    }
}

#[embassy_executor::task]
async fn ui_task(
    mut rotary: MenuRotary,
    mut oled: OledDriver<OledI2c>,
    mut adc: Adc<'static, adc::Async>,
    mut rate_pot: AdcChannel<'static>,
    tree: &'static SettingsTree<'static, TREE_CAPACITY>,
) {
    info!("UI task started");

    // The menu still runs without a panel; frames are just never flushed.
    if let Err(e) = oled.init().await {
        error!("OLED init failed: {}", e);
    }
    let refresh_ms = oled.config().refresh_period_ms();

    let mut hooks = Hooks { saved: snapshot() };
    let mut menu = MenuNavigator::new(tree, oled);

    let initial = match adc.read(&mut rate_pot).await {
        Ok(reading) => reading,
        Err(_) => {
            warn!("Could not read rate pot; starting from 0");
            0
        }
    };
    let mut pot = PotFilter::new(initial, PotConfig::default());

    let mut ticker = Ticker::every(Duration::from_millis(refresh_ms));
    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        match rotary.update(now_ms) {
            Ok(true) => {
                let long_press = rotary.button().detector().peek_event() == Some(PressEvent::LongPress);
                if menu.is_visible() && long_press {
                    rotary.take_event();
                    menu.cancel(&mut rotary, &mut hooks);
                } else if menu.is_visible() {
                    menu.update(&mut rotary, &mut hooks);
                } else if rotary.take_tap() {
                    menu.show(&mut rotary);
                } else {
                    rotary.clear_events();
                }
            }
            Ok(false) => {}
            Err(e) => warn!("Encoder read failed: {}", e),
        }

        // The pot owns the rate while the menu is closed.
        match adc.read(&mut rate_pot).await {
            Ok(reading) => {
                if pot.update(reading) && !menu.is_visible() {
                    RATE.store(pot.value(), Ordering::Relaxed);
                    RETUNE.signal(());
                }
            }
            Err(_) => warn!("Rate pot read failed"),
        }

        match menu.display_mut().present().await {
            Ok(_) => {}
            Err(e) if e.is_transient() => warn!("OLED flush failed: {}", e),
            // No panel: skip flushing quietly every tick.
            Err(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("lfo-hw-interface starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // LFO 1/2  → GP0/GP1  PWM slice 0
    // LFO 3/4  → GP2/GP3  PWM slice 1
    // ENC_A    → GP10     pull-up
    // ENC_B    → GP11     pull-up
    // ENC_SW   → GP12     active-low, pull-up
    // I2C_SDA  → GP20
    // I2C_SCL  → GP21
    // RATE_POT → GP26     ADC0
    // ———————————————————————————————————————————————————————————————————————

    let pwm_low = Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_0, p.PIN_1, pwm_config());
    let pwm_high = Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, pwm_config());

    let pin_a = Input::new(p.PIN_10, Pull::Up);
    let pin_b = Input::new(p.PIN_11, Pull::Up);
    let push = Input::new(p.PIN_12, Pull::Up);
    let rotary = RotaryEncoder::interrupt_driven(&ENCODER, Button::new(push, ButtonConfig::default()));

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );
    let oled = OledDriver::new(i2c, OLED_ADDRESS, DisplayConfig::default());

    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let rate_pot = AdcChannel::new_pin(p.PIN_26, Pull::None);

    let tree = match build_settings_tree() {
        Ok(tree) => TREE.init(tree),
        Err(e) => {
            error!("Settings tree does not fit: {}", e);
            return;
        }
    };
    info!("Settings tree: {} nodes", tree.len());

    // —— Spawn tasks ————————————————————————————————————————————————————————

    spawner.spawn(encoder_task(pin_a, pin_b)).unwrap();
    spawner.spawn(audio_task(pwm_low, pwm_high)).unwrap();
    spawner.spawn(ui_task(rotary, oled, adc, rate_pot, tree)).unwrap();

    info!("All tasks spawned");
}
