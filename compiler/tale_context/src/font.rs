//! Font properties inferred from file names like `OpenSans-SemiBoldItalic.ttf`.

use serde_json::{Map, Value};

/// What a font file name says about the face.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub weight: Option<u16>,
    pub style: Option<&'static str>,
    pub stretch: Option<&'static str>,
}

impl FontFace {
    /// The inferred properties as a struct overlay.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        if !self.family.is_empty() {
            object.insert("family".to_string(), Value::from(self.family.clone()));
        }
        if let Some(weight) = self.weight {
            object.insert("weight".to_string(), Value::from(weight));
        }
        if let Some(style) = self.style {
            object.insert("style".to_string(), Value::from(style));
        }
        if let Some(stretch) = self.stretch {
            object.insert("stretch".to_string(), Value::from(stretch));
        }
        Value::Object(object)
    }
}

const MODIFIERS: [&str; 4] = ["semi", "demi", "extra", "ultra"];

fn weight_of(word: &str) -> Option<u16> {
    Some(match word {
        "thin" | "hairline" => 100,
        "extralight" | "ultralight" => 200,
        "light" => 300,
        "regular" | "normal" | "book" => 400,
        "medium" => 500,
        "semibold" | "demibold" => 600,
        "bold" => 700,
        "extrabold" | "ultrabold" => 800,
        "black" | "heavy" => 900,
        _ => return None,
    })
}

fn style_of(word: &str) -> Option<&'static str> {
    match word {
        "italic" => Some("italic"),
        "oblique" => Some("oblique"),
        _ => None,
    }
}

fn stretch_of(word: &str) -> Option<&'static str> {
    Some(match word {
        "ultracondensed" => "ultra-condensed",
        "extracondensed" => "extra-condensed",
        "condensed" => "condensed",
        "semicondensed" => "semi-condensed",
        "semiexpanded" => "semi-expanded",
        "expanded" => "expanded",
        "extraexpanded" => "extra-expanded",
        "ultraexpanded" => "ultra-expanded",
        _ => return None,
    })
}

fn is_descriptor(word: &str) -> bool {
    let word = word.to_ascii_lowercase();
    MODIFIERS.contains(&word.as_str())
        || weight_of(&word).is_some()
        || style_of(&word).is_some()
        || stretch_of(&word).is_some()
}

/// Split on separators and lower-to-upper case changes.
fn words(stem: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for part in stem.split(['-', '_', ' ']).filter(|p| !p.is_empty()) {
        let mut start = 0;
        let mut previous_lower = false;
        for (i, c) in part.char_indices() {
            if c.is_uppercase() && previous_lower {
                words.push(&part[start..i]);
                start = i;
            }
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
        }
        words.push(&part[start..]);
    }
    words
}

/// Infer family, weight, style and stretch from a font file name.
pub fn infer_font(file_name: &str) -> FontFace {
    let stem = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let stem = stem.rsplit_once('.').map_or(stem, |(stem, _)| stem);
    let words = words(stem);
    let split = words
        .iter()
        .position(|word| is_descriptor(word))
        .unwrap_or(words.len())
        .max(1)
        .min(words.len());
    let mut face = FontFace {
        family: words[..split].join(" "),
        ..FontFace::default()
    };

    let mut pending_modifier: Option<String> = None;
    for word in &words[split..] {
        let lower = word.to_ascii_lowercase();
        if MODIFIERS.contains(&lower.as_str()) {
            pending_modifier = Some(lower);
            continue;
        }
        let word = match pending_modifier.take() {
            Some(modifier) => format!("{modifier}{lower}"),
            None => lower,
        };
        if let Some(weight) = weight_of(&word) {
            face.weight = Some(weight);
        } else if let Some(style) = style_of(&word) {
            face.style = Some(style);
        } else if let Some(stretch) = stretch_of(&word) {
            face.stretch = Some(stretch);
        }
    }
    face
}
