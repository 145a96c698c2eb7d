//! Puzzle input: boundary records, text rows, JSON files and generated puzzles.
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::engine::{parse_slot, Color, Slot, Tube, TUBE_CAPACITY};
use crate::error::SetupError;

/// Loosely typed tube description as it arrives from a caller.
///
/// Colors are free-form tokens; `null`, `"none"`, `"."` and `"_"` mark empty slots.
/// Nothing in this shape is trusted until [`tubes_from_records`] validates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TubeRecord {
    pub name: String,
    pub colors: Vec<Option<String>>,
}

impl From<&Tube> for TubeRecord {
    fn from(tube: &Tube) -> Self {
        TubeRecord {
            name: tube.name().to_string(),
            colors: tube
                .slots()
                .iter()
                .map(|slot| slot.map(|color| color.name().to_string()))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct PuzzleFile {
    tubes: Vec<TubeRecord>,
}

/// Validates boundary records into tubes.
///
/// # Errors
/// - `SetupError::NoTubes` for an empty list.
/// - `SetupError::WrongSlotCount`, `SetupError::GapInTube` or
///   `SetupError::UnknownColor` for a malformed tube.
/// - `SetupError::DuplicateTubeName` if two records share a name.
pub fn tubes_from_records(records: &[TubeRecord]) -> Result<Vec<Tube>, SetupError> {
    let tubes = records
        .iter()
        .map(|record| {
            let slots = record
                .colors
                .iter()
                .map(|token| match token {
                    Some(token) => parse_slot(&record.name, token),
                    None => Ok(None),
                })
                .collect::<Result<Vec<Slot>, SetupError>>()?;
            Tube::from_slots(record.name.clone(), &slots)
        })
        .collect::<Result<Vec<Tube>, SetupError>>()?;
    check_tube_list(&tubes)?;
    Ok(tubes)
}

/// Converts tubes back into boundary records.
pub fn tubes_to_records(tubes: &[Tube]) -> Vec<TubeRecord> {
    tubes.iter().map(TubeRecord::from).collect()
}

fn check_tube_list(tubes: &[Tube]) -> Result<(), SetupError> {
    if tubes.is_empty() {
        return Err(SetupError::NoTubes);
    }
    let mut seen = HashSet::new();
    for tube in tubes {
        if !seen.insert(tube.name()) {
            return Err(SetupError::DuplicateTubeName(tube.name().to_string()));
        }
    }
    Ok(())
}

/// Parses one text row: an optional `Name:` prefix followed by
/// whitespace-separated slot tokens, bottom slot first.
fn tube_from_row(line: usize, default_name: String, row: &str) -> Result<Tube, SetupError> {
    let (name, body) = match row.split_once(':') {
        Some((name, body)) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(SetupError::Malformed {
                    line,
                    message: "tube name before ':' is empty".to_string(),
                });
            }
            (name.to_string(), body)
        }
        None => (default_name, row),
    };
    let slots = body
        .split_whitespace()
        .map(|token| parse_slot(&name, token))
        .collect::<Result<Vec<Slot>, SetupError>>()?;
    Tube::from_slots(name, &slots)
}

/// Parses an array of text rows into tubes, one tube per row.
///
/// Each row lists exactly `TUBE_CAPACITY` tokens bottom-to-top, separated by
/// whitespace. A token is a color name (`RED`), a short code (`R`, `LB`, `Gr`)
/// or an empty marker (`.`, `_`, `none`). Rows may start with `Name:`; unnamed
/// rows are called `Tube1`, `Tube2`, ... by position.
///
/// # Examples
/// ```
/// use tube_sort_solver::engine::Color;
/// use tube_sort_solver::utils::tubes_from_str_array;
///
/// let tubes = tubes_from_str_array(&["R R B B", "Spare: . . . ."]).unwrap();
/// assert_eq!(tubes[0].name(), "Tube1");
/// assert_eq!(tubes[0].top_run(), Some((Color::Blue, 2)));
/// assert_eq!(tubes[1].name(), "Spare");
/// assert!(tubes_from_str_array(&["R X B B"]).is_err());
/// ```
pub fn tubes_from_str_array(rows: &[&str]) -> Result<Vec<Tube>, SetupError> {
    let tubes = rows
        .iter()
        .enumerate()
        .map(|(i, row)| tube_from_row(i + 1, format!("Tube{}", i + 1), row))
        .collect::<Result<Vec<Tube>, SetupError>>()?;
    check_tube_list(&tubes)?;
    Ok(tubes)
}

/// Parses a puzzle file.
///
/// JSON input is either an array of `{"name", "colors"}` records or an object
/// with a `tubes` array of them. Anything else is read as text rows; blank lines
/// and lines starting with `#` are skipped, and error line numbers refer to the
/// original text.
pub fn parse_puzzle(text: &str) -> Result<Vec<Tube>, SetupError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        let records: Vec<TubeRecord> = serde_json::from_str(trimmed)?;
        return tubes_from_records(&records);
    }
    if trimmed.starts_with('{') {
        let file: PuzzleFile = serde_json::from_str(trimmed)?;
        return tubes_from_records(&file.tubes);
    }

    let tubes = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .enumerate()
        .map(|(index, (line, row))| tube_from_row(line, format!("Tube{}", index + 1), row))
        .collect::<Result<Vec<Tube>, SetupError>>()?;
    check_tube_list(&tubes)?;
    Ok(tubes)
}

/// Generates a shuffled puzzle from a seed.
///
/// Uses the first `colors` colors of the palette (clamped to `1..=12`), each
/// contributing `TUBE_CAPACITY` units, dealt into full tubes, followed by
/// `empty_tubes` empty tubes. The same arguments always produce the same puzzle.
pub fn random_puzzle(colors: usize, empty_tubes: usize, seed: u64) -> Vec<Tube> {
    let colors = colors.clamp(1, Color::ALL.len());
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut units: Vec<Color> = Color::ALL[..colors]
        .iter()
        .flat_map(|&color| std::iter::repeat(color).take(TUBE_CAPACITY))
        .collect();
    units.shuffle(&mut rng);

    let mut tubes: Vec<Tube> = units
        .chunks(TUBE_CAPACITY)
        .enumerate()
        .map(|(i, chunk)| {
            let slots: Vec<Slot> = chunk.iter().copied().map(Some).collect();
            Tube::from_slots(format!("Tube{}", i + 1), &slots)
                .expect("full generated tubes have no gaps")
        })
        .collect();
    for i in 0..empty_tubes {
        tubes.push(Tube::empty(format!("Tube{}", colors + i + 1)));
    }
    tubes
}

const DEFAULT_PUZZLE: [&str; 14] = [
    "GREY BLUE BLUE LIGHT_BLUE",
    "YELLOW MEHENDI BLUE LIGHT_GREEN",
    "GREEN GREEN GREEN BROWN",
    "LIGHT_GREEN PURPLE BROWN GREY",
    "MEHENDI YELLOW LIGHT_BLUE RED",
    "LIGHT_BLUE PINK PURPLE GREY",
    "LIGHT_BLUE GREEN ORANGE PINK",
    "RED PURPLE ORANGE LIGHT_GREEN",
    "YELLOW GREY LIGHT_GREEN PINK",
    "ORANGE MEHENDI BLUE MEHENDI",
    "RED YELLOW BROWN BROWN",
    "PURPLE RED ORANGE PINK",
    "none none none none",
    "none none none none",
];

/// The built-in twelve-color starting position with two spare tubes.
pub fn default_puzzle() -> Vec<Tube> {
    tubes_from_str_array(&DEFAULT_PUZZLE).expect("built-in puzzle is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_tubes_from_str_array_valid() {
        let tubes = tubes_from_str_array(&["R R B B", "Gr LB . .", "none none none none"]).unwrap();
        assert_eq!(tubes.len(), 3);
        assert_eq!(tubes[0].slots()[3], Some(Color::Blue));
        assert_eq!(tubes[1].slots()[0], Some(Color::Grey));
        assert_eq!(tubes[1].slots()[1], Some(Color::LightBlue));
        assert!(tubes[2].is_empty());
        assert_eq!(tubes[2].name(), "Tube3");
    }

    #[test]
    fn test_tubes_from_str_array_invalid_color() {
        let result = tubes_from_str_array(&["R R X B"]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("undefined color 'X'"));
    }

    #[test]
    fn test_tubes_from_str_array_wrong_slot_count() {
        let result = tubes_from_str_array(&["R R B"]);
        assert!(matches!(result, Err(SetupError::WrongSlotCount { found: 3, .. })));
    }

    #[test]
    fn test_tubes_from_str_array_gap() {
        let result = tubes_from_str_array(&["R . B ."]);
        assert!(matches!(result, Err(SetupError::GapInTube { slot: 1, .. })));
    }

    #[test]
    fn test_tubes_from_str_array_duplicate_names() {
        let result = tubes_from_str_array(&["A: R R R R", "A: B B B B"]);
        assert!(matches!(result, Err(SetupError::DuplicateTubeName(name)) if name == "A"));
    }

    #[test]
    fn test_tubes_from_str_array_empty_input() {
        let rows: [&str; 0] = [];
        assert!(matches!(tubes_from_str_array(&rows), Err(SetupError::NoTubes)));
    }

    #[test]
    fn test_records_round_trip_through_validation() {
        let records = vec![
            TubeRecord {
                name: "Tube1".to_string(),
                colors: vec![
                    Some("RED".to_string()),
                    Some("blue".to_string()),
                    Some("None".to_string()),
                    None,
                ],
            },
            TubeRecord {
                name: "Tube2".to_string(),
                colors: vec![None, None, None, None],
            },
        ];
        let tubes = tubes_from_records(&records).unwrap();
        assert_eq!(tubes[0].top_run(), Some((Color::Blue, 1)));
        assert!(tubes[1].is_empty());

        let back = tubes_to_records(&tubes);
        assert_eq!(back[0].colors[1], Some("BLUE".to_string()));
        assert_eq!(back[0].colors[2], None);
    }

    #[test]
    fn test_records_reject_short_tube() {
        let records = vec![TubeRecord {
            name: "Tube1".to_string(),
            colors: vec![Some("RED".to_string())],
        }];
        assert!(matches!(
            tubes_from_records(&records),
            Err(SetupError::WrongSlotCount { found: 1, .. })
        ));
    }

    #[test]
    fn test_parse_puzzle_json_forms() {
        let array = r#"[{"name": "A", "colors": ["RED", "RED", null, null]},
                        {"name": "B", "colors": ["none", "none", "none", "none"]}]"#;
        let tubes = parse_puzzle(array).unwrap();
        assert_eq!(tubes.len(), 2);
        assert_eq!(tubes[0].name(), "A");

        let object = r#"{"tubes": [{"name": "A", "colors": ["GREEN", "GREEN", "GREEN", "GREEN"]}]}"#;
        let tubes = parse_puzzle(object).unwrap();
        assert!(tubes[0].is_completed());

        assert!(matches!(parse_puzzle("[{\"name\": 3}]"), Err(SetupError::Json(_))));
    }

    #[test]
    fn test_parse_puzzle_text_skips_comments() {
        let text = "# sample\n\nR R B B\n\n# spare\n. . . .\n";
        let tubes = parse_puzzle(text).unwrap();
        assert_eq!(tubes.len(), 2);
        assert_eq!(tubes[1].name(), "Tube2");

        let err = parse_puzzle("R R B B\n: . . . .").unwrap_err();
        assert!(matches!(err, SetupError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_random_puzzle_is_deterministic_and_balanced() {
        let first = random_puzzle(5, 2, 42);
        let second = random_puzzle(5, 2, 42);
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
        assert!(first[5].is_empty() && first[6].is_empty());

        let mut counts: HashMap<Color, usize> = HashMap::new();
        for tube in &first {
            for color in tube.slots().iter().flatten() {
                *counts.entry(*color).or_insert(0) += 1;
            }
        }
        assert_eq!(counts.len(), 5);
        assert!(counts.values().all(|&n| n == TUBE_CAPACITY));
    }

    #[test]
    fn test_default_puzzle_shape() {
        let tubes = default_puzzle();
        assert_eq!(tubes.len(), 14);
        assert_eq!(tubes[0].slots()[0], Some(Color::Grey));
        assert!(tubes[12].is_empty() && tubes[13].is_empty());
    }
}
