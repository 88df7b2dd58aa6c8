use log::Level;

use dumpflow_core::writer::MinidumpWriter;
use dumpflow_dummy::DummyProvider;

use std::fs::OpenOptions;

fn main() {
    simple_logger::init_with_level(Level::Debug).unwrap();

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open("dummy.dmp")
        .unwrap();

    MinidumpWriter::new(file, DummyProvider::new())
        .write()
        .unwrap();
}
