use crate::build::BuildReport;

pub fn print_build_report(report: &BuildReport) {
    println!("✅ Built firmware for {}", report.board);
    println!("   Image: {}", report.firmware.display());
    println!("   ELF:   {}", report.elf.display());

    if report.used_libraries.is_empty() {
        println!("   No libraries used");
    } else {
        println!("📦 Libraries ({}), in link order:", report.used_libraries.len());
        for library in &report.used_libraries {
            println!("  • {} ({})", library.name(), library.path().display());
        }
    }
}

pub fn print_build_report_json(report: &BuildReport) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn print_boards(lines: &[String]) {
    if lines.is_empty() {
        println!("No boards found; check the SDK directory (--sdk-dir)");
        return;
    }
    for line in lines {
        println!("{line}");
    }
}
