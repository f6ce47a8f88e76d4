extern crate bmp085;

use bmp085::{Bmp085Builder, PressureUnit};
use std::env;

fn main() {
    let bus = env::args()
        .nth(1)
        .map(|arg| arg.parse().expect("bus index must be a number"))
        .unwrap_or(1);
    let oss = env::args()
        .nth(2)
        .map(|arg| arg.parse::<u8>().expect("mode must be a number"))
        .unwrap_or(0);

    let mut builder = Bmp085Builder::new();
    builder.bus(bus).oss(oss).expect("invalid oversampling mode");

    let mut dev = builder.build().expect("Failed to build device");

    println!("devices on /dev/i2c-{}: {:02x?}", bus, dev.scan().expect("failed to scan"));

    let reading = dev.read().expect("failed to read");
    println!("{:?} Pa", reading.pressure);
    println!("{:?} c", reading.temperature);

    let mut dev = builder
        .pressure_unit(PressureUnit::InchesOfMercury)
        .build()
        .expect("Failed to build device");

    println!("{:.2} inHg", dev.read().expect("failed to read").pressure);
}
