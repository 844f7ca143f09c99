// External Crate Imports
use glycomod::{LineKind, ParsedResponse, classify, parse_structure_line};
use itertools::Itertools;
use tracing::warn;

// Public API ==========================================================================================================

/// Lays a search response out for reading: header lines as the service wrote them, then every candidate composition
/// numbered and column-aligned
#[must_use]
pub fn text_report(response: &ParsedResponse) -> String {
    response
        .blocks()
        .iter()
        .map(|block| {
            let mut counter = 0;
            block
                .iter()
                .map(|line| match classify(line) {
                    LineKind::Structure(structure) => {
                        counter += 1;
                        structure_entry(counter, structure)
                    }
                    _ => line.clone(),
                })
                .join("\n")
        })
        .join("\n\n")
}

#[must_use]
pub fn search_banner(results: usize) -> String {
    format!("SEARCH RETURNED {results} RESULTS")
}

// Private Functions ===================================================================================================

fn structure_entry(counter: usize, line: &str) -> String {
    match parse_structure_line(line) {
        Ok(structure) => {
            let mass = structure.theoretical_mh.to_string();
            let delta = structure.delta.to_string();
            let notation: String = structure.notation.split_whitespace().collect();
            format!("\t{counter}. [MH]+: {mass:>9},  Error: {delta:>6}, Comp: {notation}")
        }
        Err(err) => {
            warn!("left a structure line unformatted: {err}");
            format!("\t{counter}. {line}")
        }
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use glycomod::parse_response;
    use indoc::indoc;
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn numbered_structures() {
        let response = parse_response(indoc! {"
            User mass: 1454.0
            Adduct ([M+H]+): 1.00727
            Derivative mass (Free reducing end): 18.0105546
            1434.5020.48(Hex)3 (HexNAc)2 (Deoxyhexose)1 (Pent)3
            1435.32-0.337(Hex)1 (HexNAc)3 (Deoxyhexose)2 (Pent)1 (Sulph)3
            3 structures found.
            User mass: 3000.5
            Adduct ([M+H]+): 1.00727
            0 structures found.
        "});
        assert_snapshot!(text_report(&response), @r"
        User mass: 1454.0
        Adduct ([M+H]+): 1.00727
        Derivative mass (Free reducing end): 18.0105546
        	1. [MH]+:  1434.502,  Error:   0.48, Comp: (Hex)3(HexNAc)2(Deoxyhexose)1(Pent)3
        	2. [MH]+:   1435.32,  Error: -0.337, Comp: (Hex)1(HexNAc)3(Deoxyhexose)2(Pent)1(Sulph)3
        3 structures

        User mass: 3000.5
        Adduct ([M+H]+): 1.00727
        0 structures found.
        ");
    }

    #[test]
    fn unreadable_structures_are_kept() {
        let response = parse_response("User mass: 911.3\n892(Hex)3\n1 structure found.");
        assert_eq!(
            text_report(&response),
            "User mass: 911.3\n\t1. 892(Hex)3\n1 structure found."
        );
    }

    #[test]
    fn banner() {
        assert_eq!(search_banner(12), "SEARCH RETURNED 12 RESULTS");
        assert_eq!(text_report(&ParsedResponse::default()), "");
    }
}
