//! # Machining & Secondary Operations
//!
//! Machine time is entered per operation kind as hours + minutes at an hourly
//! rate. Setup is the only kind whose cost is a one-time amount amortized
//! over the run; sawing, milling, turning and welding are already per-piece.
//!
//! Secondary operations are flat per-piece add-ons (coating, deburring, …),
//! either picked from a preset list or free-text custom entries.

use serde::{Deserialize, Serialize};

/// The five machine-time slots of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachiningKind {
    /// One-time setup, amortized over the produced quantity
    Setup,
    Sawing,
    Milling,
    Turning,
    Welding,
}

impl MachiningKind {
    /// All kinds in display order
    pub const ALL: [MachiningKind; 5] = [
        MachiningKind::Setup,
        MachiningKind::Sawing,
        MachiningKind::Milling,
        MachiningKind::Turning,
        MachiningKind::Welding,
    ];

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            MachiningKind::Setup => "Setup",
            MachiningKind::Sawing => "Sawing",
            MachiningKind::Milling => "Milling",
            MachiningKind::Turning => "Turning",
            MachiningKind::Welding => "Welding",
        }
    }
}

/// Machine time at an hourly rate.
///
/// Invariant: `minutes < 60`. [`OperationEntry::new`] normalizes, carrying
/// minute overflow into hours, so arbitrary user input cannot break it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationEntry {
    pub hours: u32,
    pub minutes: u32,
    pub rate_per_hour: f64,
}

impl OperationEntry {
    /// Create an entry, normalizing minutes into the 0..60 range.
    pub fn new(hours: u32, minutes: u32, rate_per_hour: f64) -> Self {
        OperationEntry {
            hours: hours + minutes / 60,
            minutes: minutes % 60,
            rate_per_hour,
        }
    }

    /// Duration in fractional hours.
    pub fn duration_hours(&self) -> f64 {
        self.hours as f64 + self.minutes as f64 / 60.0
    }

    /// Cost of this machine time (duration × rate).
    pub fn cost(&self) -> f64 {
        self.duration_hours() * self.rate_per_hour
    }

    /// True when no time has been entered.
    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0
    }
}

/// Name of a secondary operation: a preset from the shop's list, or a
/// free-text custom entry. A tagged variant instead of a sentinel string so
/// validation never has to compare against magic values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name")]
pub enum OperationName {
    Preset(String),
    Custom(String),
}

impl OperationName {
    /// The display label, regardless of variant.
    pub fn label(&self) -> &str {
        match self {
            OperationName::Preset(name) | OperationName::Custom(name) => name,
        }
    }
}

impl Default for OperationName {
    fn default() -> Self {
        OperationName::Custom(String::new())
    }
}

/// Flat per-piece finishing cost layered on top of machining.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SecondaryOperation {
    pub name: OperationName,
    pub price_per_piece: f64,
}

impl SecondaryOperation {
    /// Preset operation (e.g., "Powder coating").
    pub fn preset(name: impl Into<String>, price_per_piece: f64) -> Self {
        SecondaryOperation {
            name: OperationName::Preset(name.into()),
            price_per_piece,
        }
    }

    /// Custom free-text operation.
    pub fn custom(name: impl Into<String>, price_per_piece: f64) -> Self {
        SecondaryOperation {
            name: OperationName::Custom(name.into()),
            price_per_piece,
        }
    }
}
