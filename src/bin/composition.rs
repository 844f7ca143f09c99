// Standard Library Imports
use std::fmt::Write;

// External Crate Imports
use glycomod::{AdductIons, Composition, MassType, ReducingEnd};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, IntoDiagnostic, Result};
use rustyline::DefaultEditor;

fn main() -> Result<()> {
    let mut rl = DefaultEditor::new().into_diagnostic()?;
    while let Ok(notation) = rl.readline("Composition: ") {
        rl.add_history_entry(&notation).into_diagnostic()?;
        match notation.parse::<Composition>() {
            Ok(composition) => print!("{}", composition_info(&composition)),
            Err(err) => render_error(err),
        }
    }
    Ok(())
}

fn composition_info(composition: &Composition) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "Short Notation: {}", composition.short_notation());
    for mass_type in [MassType::Monoisotopic, MassType::Average] {
        let mass = composition.neutral_mass(mass_type).round_dp(4);
        let ions = AdductIons::new(composition, mass_type, &ReducingEnd::Free);
        let _ = writeln!(buf, "{mass_type:?} Mass: {mass}");
        let _ = writeln!(
            buf,
            "  [M+H]+: {}  [M+Na]+: {}  [M+K]+: {}  [M+NH4]+: {}",
            ions.h, ions.na, ions.k, ions.nh4
        );
        let _ = writeln!(
            buf,
            "  [M+2H]2+: {}  [M+H+Na]2+: {}  [M+H+K]2+: {}  [M+2Na]2+: {}",
            ions.h2, ions.h_na, ions.h_k, ions.na2
        );
    }
    let _ = writeln!(buf);
    buf
}

fn render_error(diagnostic: impl Diagnostic) {
    let mut buf = String::new();
    match GraphicalReportHandler::new_themed(GraphicalTheme::unicode()).render_report(&mut buf, &diagnostic) {
        Ok(()) => println!("{buf}"),
        Err(_) => println!("{diagnostic}"),
    }
}
