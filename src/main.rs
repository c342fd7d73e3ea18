//! pluggable-hid demo firmware (nRF52840).
//!
//! One composite HID interface carrying two sub-devices:
//!
//! - a keyboard (report ID 1) that types a key every few seconds and
//!   reports host LED changes,
//! - a raw HID endpoint (report ID 2) echoing every output report back to
//!   the host as an input report.
//!
//! Flash with `cargo run --release --features embedded`.

#![no_std]
#![no_main]

use core::cell::Cell;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_futures::join::join;
use embassy_futures::select::{select, Either};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use embassy_usb::{Builder, Config};
use heapless::Vec;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pluggable_hid::config::{self, HidConfig, ReportIdSource};
use pluggable_hid::hid::keyboard::{KeyboardReport, KEYBOARD_REPORT_SIZE, MOD_LEFT_SHIFT};
use pluggable_hid::hid::raw::{pad_report, RAWHID_RX_SIZE};
use pluggable_hid::hid::{Keyboard, KeyboardLeds, RawHid, KEYBOARD_REPORT_ID, RAWHID_REPORT_ID};
use pluggable_hid::usb::{CompositeHidClass, ReportSender, State};
use pluggable_hid::{Error, HidRegistry};

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
type RawReport = Vec<u8, RAWHID_RX_SIZE>;

/// Usage ID of the key the demo types ('a').
const KEY_A: u8 = 0x04;

static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static HID_STATE: StaticCell<State<'static>> = StaticCell::new();

static KEYBOARD: StaticCell<Keyboard<fn(KeyboardLeds), fn() -> KeyboardReport>> =
    StaticCell::new();
static RAW_HID: StaticCell<RawHid<fn(&[u8])>> = StaticCell::new();

// Sub-device callbacks run inside the control handler; hand the data over
// to the report task.
static LED_SIGNAL: Signal<CriticalSectionRawMutex, KeyboardLeds> = Signal::new();
static RAW_RX: Channel<CriticalSectionRawMutex, RawReport, 4> = Channel::new();

// Keys currently held, written by the report task and read back by the
// host with GET_REPORT.
static KEY_STATE: Mutex<CriticalSectionRawMutex, Cell<KeyboardReport>> =
    Mutex::new(Cell::new(KeyboardReport::empty()));

fn current_keys() -> KeyboardReport {
    KEY_STATE.lock(|keys| keys.get())
}

fn on_leds(leds: KeyboardLeds) {
    LED_SIGNAL.signal(leds);
}

fn on_raw_data(data: &[u8]) {
    let mut report = RawReport::new();
    // Cannot fail: data is at most RAWHID_RX_SIZE bytes.
    let _ = report.extend_from_slice(data);
    if RAW_RX.try_send(report).is_err() {
        warn!("raw HID: echo queue full, report dropped");
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.hfclk_source = embassy_nrf::config::HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    info!("pluggable-hid demo starting");

    let driver = Driver::new(p.USBD, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;
    // Single HID interface, class declared at interface level.
    usb_config.device_class = 0x00;
    usb_config.device_sub_class = 0x00;
    usb_config.device_protocol = 0x00;
    usb_config.composite_with_iads = false;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 128]),
    );

    // Registration order is report descriptor order.
    let mut registry = HidRegistry::new();
    let keyboard = KEYBOARD.init(Keyboard::new(
        on_leds as fn(KeyboardLeds),
        current_keys as fn() -> KeyboardReport,
    ));
    let raw_hid = RAW_HID.init(RawHid::new(on_raw_data as fn(&[u8])));
    if let Err(e) = registry.append(keyboard) {
        warn!("keyboard not registered: {}", e);
    }
    if let Err(e) = registry.append(raw_hid) {
        warn!("raw HID not registered: {}", e);
    }

    let hid_config = HidConfig {
        report_id_source: ReportIdSource::ValueLow,
        ..HidConfig::default()
    };
    let sender = match CompositeHidClass::new(
        &mut builder,
        HID_STATE.init(State::new()),
        registry,
        hid_config,
    ) {
        Ok(sender) => sender,
        Err(e) => {
            warn!("composite HID not added: {}", e);
            return;
        }
    };

    let mut device = builder.build();
    info!("USB composite HID initialised");

    join(device.run(), report_task(sender)).await;
}

/// Types a key every few seconds and echoes raw HID output reports.
async fn report_task(mut sender: ReportSender<'static, UsbDriver>) {
    let mut frame = [0u8; KEYBOARD_REPORT_SIZE];

    loop {
        sender.ready().await;
        info!("USB configured");

        loop {
            let tick = Timer::after_secs(3);
            let event = select(tick, select(RAW_RX.receive(), LED_SIGNAL.wait())).await;

            let result = match event {
                Either::First(()) => {
                    let press = KeyboardReport::pressed(MOD_LEFT_SHIFT, &[KEY_A]);
                    match send_keys(&mut sender, &mut frame, press).await {
                        Ok(_) => send_keys(&mut sender, &mut frame, KeyboardReport::empty()).await,
                        Err(e) => Err(e),
                    }
                }
                Either::Second(Either::First(data)) => {
                    sender.send_report(RAWHID_REPORT_ID, &pad_report(&data)).await
                }
                Either::Second(Either::Second(leds)) => {
                    info!(
                        "LEDs: num {} caps {} scroll {}",
                        leds.num_lock(),
                        leds.caps_lock(),
                        leds.scroll_lock()
                    );
                    Ok(0)
                }
            };

            if let Err(e) = result {
                warn!("report not sent: {}", e);
                break;
            }
        }
    }
}

/// Make `keys` the current key state, then send it as an input report.
async fn send_keys(
    sender: &mut ReportSender<'static, UsbDriver>,
    frame: &mut [u8; KEYBOARD_REPORT_SIZE],
    keys: KeyboardReport,
) -> Result<usize, Error> {
    KEY_STATE.lock(|state| state.set(keys));
    let n = keys.serialize(frame);
    sender.send_report(KEYBOARD_REPORT_ID, &frame[..n]).await
}
