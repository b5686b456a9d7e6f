//! # PartQuote CLI
//!
//! Terminal front-end for the cost estimation engine: walks the five wizard
//! steps over stdin, prints the totals report, and optionally saves the
//! record under `records/` so the next run for the same part resumes at the
//! results view.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use quote_core::data::Part;
use quote_core::geometry::{Shape, ShapeDescriptor};
use quote_core::machining::{MachiningKind, OperationEntry, SecondaryOperation};
use quote_core::rows::PriceUnit;
use quote_core::session::{CalculationSession, StaticCatalog, Step};
use quote_core::store::{FileRecordStore, NullNotifier};
use quote_core::totals::Totals;

fn prompt_str(prompt: &str, default: &str) -> String {
    print!("{prompt}");
    if io::stdout().flush().is_err() {
        return default.to_string();
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default.to_string();
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    prompt_str(prompt, &default.to_string())
        .parse()
        .unwrap_or(default)
}

fn prompt_u32(prompt: &str, default: u32) -> u32 {
    prompt_str(prompt, &default.to_string())
        .parse()
        .unwrap_or(default)
}

fn prompt_yes(prompt: &str) -> bool {
    matches!(prompt_str(prompt, "n").to_lowercase().as_str(), "y" | "yes")
}

fn edit_material_step(session: &mut CalculationSession<StaticCatalog>) {
    println!("--- Step 1: Materials ---");
    loop {
        let shape_name = prompt_str(
            "Shape (round_bar/square_bar/rectangular_bar/hex_bar/round_tube/square_tube/rectangular_tube/sheet/profile) [rectangular_bar]: ",
            "rectangular_bar",
        );

        let descriptor = if shape_name == "profile" {
            let name = prompt_str("Profile designation [UPN 100]: ", "UPN 100");
            let kg_m = prompt_str("Weight per meter (kg/m) [10.6]: ", "10.6");
            ShapeDescriptor::profile(name, kg_m)
        } else {
            let mut desc = ShapeDescriptor::simple(&shape_name);
            if let Some(shape) = Shape::from_name(&shape_name) {
                for key in shape.dimension_keys() {
                    let value = prompt_str(&format!("  {key} (mm): "), "0");
                    desc = desc.with_dimension(*key, value);
                }
            }
            let grade = prompt_str("  material grade (blank = mild steel): ", "");
            if !grade.is_empty() {
                desc = desc.with_dimension("grade", grade);
            }
            desc
        };

        let index = session.data().material_rows.len() - 1;
        let length = prompt_f64("Stock length per piece (mm) [1000]: ", 1000.0);
        let price = prompt_f64("Price [2.5]: ", 2.5);
        let unit = match prompt_str("Price unit (kg/m) [kg]: ", "kg").as_str() {
            "m" => PriceUnit::PerMeter,
            _ => PriceUnit::PerKg,
        };
        session.update_material_row(index, |row| {
            row.material_name = descriptor.shape_name.clone();
            row.material_info = Some(descriptor.clone());
            row.length_per_piece_mm = length;
            row.material_price = price;
            row.material_price_unit = unit;
        });

        if !prompt_yes("Add another material row? [y/N]: ") {
            break;
        }
        session.add_material_row();
    }
}

fn edit_component_step(session: &mut CalculationSession<StaticCatalog>) {
    println!("--- Step 2: Components ---");
    if !prompt_yes("Add purchased components? [y/N]: ") {
        return;
    }
    loop {
        let index = session.data().component_rows.len() - 1;
        let name = prompt_str("Component name [insert]: ", "insert");
        let qty = prompt_f64("Pieces per part [1]: ", 1.0);
        let price = prompt_f64("Unit price [0.5]: ", 0.5);
        session.update_component_row(index, |row| {
            row.component_name = name.clone();
            row.quantity = qty;
            row.component_price = price;
        });

        if !prompt_yes("Add another component? [y/N]: ") {
            break;
        }
        session.add_component_row();
    }
}

fn edit_machining_step(session: &mut CalculationSession<StaticCatalog>) {
    println!("--- Step 3: Machining ---");
    for kind in MachiningKind::ALL {
        let hours = prompt_u32(&format!("{} hours [0]: ", kind.display_name()), 0);
        let minutes = prompt_u32(&format!("{} minutes [0]: ", kind.display_name()), 0);
        if hours == 0 && minutes == 0 {
            continue;
        }
        let rate = prompt_f64("  rate per hour [40]: ", 40.0);
        session.set_machining(kind, OperationEntry::new(hours, minutes, rate));
    }
}

fn edit_secondary_step(session: &mut CalculationSession<StaticCatalog>) {
    println!("--- Step 4: Secondary operations ---");
    while prompt_yes("Add a secondary operation? [y/N]: ") {
        let name = prompt_str("  name [Powder coating]: ", "Powder coating");
        let price = prompt_f64("  price per piece [1.0]: ", 1.0);
        session.add_secondary_op(SecondaryOperation::custom(name, price));
    }
}

fn edit_quantity_step(session: &mut CalculationSession<StaticCatalog>) {
    println!("--- Step 5: Quantity & transport ---");
    let qty = prompt_u32("Quantity [1]: ", 1);
    let transport = prompt_f64("Transport cost for the run [0]: ", 0.0);
    session.set_quantity(qty);
    session.set_transport_cost(transport);
}

fn print_report(report: &Totals) {
    println!("═══════════════════════════════════════");
    println!("  COST CALCULATION RESULTS");
    println!("═══════════════════════════════════════");
    println!();
    println!("  Weight per piece:     {:>10.3} kg", report.weight_per_piece);
    println!("  Total weight:         {:>10.3} kg", report.total_weight);
    println!();
    println!("                         per piece      total");
    println!(
        "  Material:             {:>10.2} {:>10.2}",
        report.material_cost_per_piece, report.material_cost_total
    );
    println!(
        "  Components:           {:>10.2} {:>10.2}",
        report.component_cost_per_piece, report.component_cost_total
    );
    println!(
        "  Setup:                {:>10.2} {:>10.2}",
        report.setup.per_piece, report.setup.total
    );
    for (label, cost) in [
        ("Sawing:", report.sawing),
        ("Milling:", report.milling),
        ("Turning:", report.turning),
        ("Welding:", report.welding),
    ] {
        println!("  {label:<21} {:>10.2} {:>10.2}", cost.per_piece, cost.total);
    }
    println!(
        "  Secondary ops:        {:>10.2} {:>10.2}",
        report.secondary_ops_per_piece, report.secondary_ops_total
    );
    println!(
        "  Transport:            {:>10.2} {:>10.2}",
        report.transport_per_piece, report.transport_cost
    );
    println!("  ─────────────────────────────────────");
    println!(
        "  TOTAL:                {:>10.2} {:>10.2}",
        report.total_per_piece, report.total_for_quantity
    );
    println!();
}

/// Keep part ids stable across runs so a saved calculation is found again.
fn load_or_create_part(dir: &Path, name: &str) -> Part {
    let index_path = dir.join("parts.json");
    let mut index: BTreeMap<String, Part> = fs::read_to_string(&index_path)
        .ok()
        .and_then(|contents| serde_json::from_str(&contents).ok())
        .unwrap_or_default();

    if let Some(part) = index.get(name) {
        return part.clone();
    }

    let part = Part::new(name);
    index.insert(name.to_string(), part.clone());
    if fs::create_dir_all(dir).is_ok() {
        if let Ok(json) = serde_json::to_string_pretty(&index) {
            let _ = fs::write(&index_path, json);
        }
    }
    part
}

fn main() {
    println!("PartQuote CLI - Part Cost Calculator");
    println!("====================================");
    println!();

    let part_name = prompt_str("Part name [Demo part]: ", "Demo part");
    let part = load_or_create_part(Path::new("records"), &part_name);

    let mut store = FileRecordStore::new("records");
    let mut session =
        match CalculationSession::open(part, &store, StaticCatalog::default(), &NullNotifier) {
            Ok(session) => session,
            Err(e) => {
                eprintln!("Failed to open session: {e}");
                std::process::exit(1);
            }
        };

    if session.step() == Step::Results {
        println!("Found a saved calculation; showing results.");
        println!();
    }

    loop {
        while session.step() != Step::Results {
            match session.step() {
                Step::Materials => edit_material_step(&mut session),
                Step::Components => edit_component_step(&mut session),
                Step::Machining => edit_machining_step(&mut session),
                Step::SecondaryOps => edit_secondary_step(&mut session),
                Step::QuantityTransport => edit_quantity_step(&mut session),
                Step::Results => unreachable!(),
            }
            session.next();
            println!();
        }

        print_report(&session.totals());

        if prompt_yes("Edit quantity & transport again? [y/N]: ") {
            session.edit();
            continue;
        }
        break;
    }

    let report = session.totals();

    if prompt_yes("Dump report as JSON? [y/N]: ") {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize report: {e}"),
        }
    }

    if prompt_yes("Save calculation? [y/N]: ") {
        match session.save(&mut store, &NullNotifier) {
            Ok(()) => println!(
                "Saved to {}",
                store.record_path(session.part().id).display()
            ),
            Err(e) => eprintln!("Save failed: {e}"),
        }
    }
}
