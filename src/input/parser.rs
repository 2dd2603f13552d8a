// src/input/parser.rs

use serde_yaml;
use std::fs::File;
use std::io::Read;
use crate::error::Result;
use crate::input::InputDeck;

/// Parses the input deck from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML input file.
///
/// # Returns
///
/// * `Ok(InputDeck)` if parsing is successful.
/// * `Err(PdeError)` if the file cannot be read or is not a valid deck.
pub fn parse_input_deck(file_path: &str) -> Result<InputDeck> {
    let mut file = File::open(file_path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    parse_input_deck_str(&contents)
}

/// Parses an input deck already held in memory.
pub fn parse_input_deck_str(contents: &str) -> Result<InputDeck> {
    let input_deck: InputDeck = serde_yaml::from_str(contents)?;
    Ok(input_deck)
}
