use std::io::{self, BufRead, Write};

use ac_core::config::RenderMode;

/// Demande la variante de rendu sur `output` et lit une ligne sur `input`.
///
/// `2` choisit la couleur ; toute autre réponse, y compris une entrée
/// vide ou fermée, donne le monochrome. Le choix couleur rappelle que le
/// terminal doit gérer les séquences ANSI truecolor.
///
/// # Errors
/// Returns the I/O error from writing the menu or reading the answer.
pub fn ask_mode<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<RenderMode> {
    writeln!(output, "Choisissez le mode de rendu :")?;
    writeln!(output, "1. {}", RenderMode::Mono.label())?;
    writeln!(output, "2. {}", RenderMode::Color.label())?;
    write!(output, "Votre choix (1 ou 2) : ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let mode = RenderMode::from_choice(&answer);
    if mode == RenderMode::Color {
        writeln!(output, "Assurez-vous que votre terminal supporte les couleurs ANSI.")?;
        output.flush()?;
    }
    Ok(mode)
}
