use average::Mean;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{clock::Frame, scheduler::Schedule, slot::SlotTimes, window::ChargeWindow},
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn mean_rate(rates: impl IntoIterator<Item = KilowattHourRate>) -> KilowattHourRate {
    let estimate: Mean = rates.into_iter().map(|rate| rate.0).collect();
    if estimate.is_empty() { KilowattHourRate::ZERO } else { estimate.mean().into() }
}

fn rate_cell(rate: KilowattHourRate, mean_rate: KilowattHourRate) -> Cell {
    Cell::new(rate).set_alignment(CellAlignment::Right).fg(if rate.is_negative() {
        Color::Cyan
    } else if rate >= mean_rate {
        Color::Red
    } else {
        Color::Green
    })
}

pub fn build_schedule_table(schedule: &Schedule) -> Table {
    let mean_rate = mean_rate(schedule.slots.iter().map(|slot| slot.unit_price));

    let mut table = new_table();
    table.set_header(vec!["#", "Date", "Start", "End", "Price", "Net", "Charged", "Running", "Charge"]);
    for slot in &schedule.slots {
        let start = slot.times.start.get(Frame::Local);
        let end = slot.times.end.get(Frame::Local);
        table.add_row(vec![
            Cell::new(slot.index).add_attribute(Attribute::Dim),
            Cell::new(start.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(start.format("%H:%M")),
            Cell::new(end.format("%H:%M")).add_attribute(Attribute::Dim),
            rate_cell(slot.unit_price, mean_rate),
            Cell::new(slot.net_energy).set_alignment(CellAlignment::Right).fg(
                if slot.net_energy <= KilowattHours::ZERO { Color::Green } else { Color::DarkYellow },
            ),
            Cell::new(slot.charged_energy).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(slot.running_capacity).set_alignment(CellAlignment::Right).fg(
                if slot.running_capacity <= KilowattHours::ZERO { Color::Red } else { Color::Reset },
            ),
            if slot.charge {
                Cell::new("charge").fg(Color::Green)
            } else {
                Cell::new("").add_attribute(Attribute::Dim)
            },
        ]);
    }
    table
}

pub fn build_windows_table(windows: &[ChargeWindow]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Frame", "Start", "End"]);
    for (i, window) in windows.iter().enumerate() {
        for (frame, name) in [
            (Frame::Local, "local"),
            (Frame::Price, "price"),
            (Frame::Device, "device"),
            (Frame::Scheduler, "scheduler"),
        ] {
            let cell = |text: String| {
                if frame == Frame::Device {
                    Cell::new(text).add_attribute(Attribute::Bold)
                } else {
                    Cell::new(text)
                }
            };
            table.add_row(vec![
                Cell::new(format!("#{i} {name}")).add_attribute(Attribute::Dim),
                cell(window.start.get(frame).format("%b %d %H:%M").to_string()),
                cell(window.end.get(frame).format("%b %d %H:%M").to_string()),
            ]);
        }
    }
    table
}

pub fn build_prices_table(prices: &[(SlotTimes, KilowattHourRate)]) -> Table {
    let mean_rate = mean_rate(prices.iter().map(|(_, rate)| *rate));

    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "End", "Device", "Price"]);
    for (times, rate) in prices {
        table.add_row(vec![
            Cell::new(times.start.local.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(times.start.local.format("%H:%M")),
            Cell::new(times.end.local.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(times.start.device.format("%H:%M")).add_attribute(Attribute::Dim),
            rate_cell(*rate, mean_rate),
        ]);
    }
    table
}
