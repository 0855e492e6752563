// $ RUST_LOG=debug cargo run --example loopback_exchange --features std
//
// The original setup runs the memory device and the exchange driver on two
// boards wired back to back. This demo binds the device to an in-process
// bus instead, so the whole write/seek/split-read sequence can be watched
// on a host.

use i2c_scratchpad::{Exchange, Loopback, MemDevice, DEFAULT_DEVICE_ADDRESS};
use std::thread;
use std::time::Duration;

struct Delay;

impl embedded_hal::delay::DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }
}

fn main() {
    env_logger::init();

    let mut bus = Loopback::new();
    bus.bind(DEFAULT_DEVICE_ADDRESS, MemDevice::new())
        .expect("empty bind table");

    let mut exchange = Exchange::new(bus, DEFAULT_DEVICE_ADDRESS);
    if let Err(err) = exchange.run(&mut Delay) {
        eprintln!("exchange stopped: {}", err);
    }
}
