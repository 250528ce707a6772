use colored::Colorize;
use property_valuer::location::table::NEIGHBORHOODS;

/// Execute the neighborhoods command
pub fn execute() {
    println!("{}", "Neighborhoods:".bold());
    for n in NEIGHBORHOODS {
        println!(
            "  {:<14} {:>9.4}, {:>8.4}  {}",
            n.name.cyan(),
            n.latitude,
            n.longitude,
            n.label.dimmed()
        );
    }
}
