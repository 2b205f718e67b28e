/// Canonical punctuation for look-alike characters produced by OCR and by
/// typographic text layers.
fn canonical_char(character: char) -> char {
    match character {
        'º' | '˚' => '°',
        '’' | '‘' | '′' => '\'',
        '“' | '”' | '″' => '"',
        '—' | '–' => '-',
        '·' => '.',
        '：' => ':',
        other => other,
    }
}

fn is_horizontal_space(character: char) -> bool {
    matches!(character, ' ' | '\t' | '\u{00A0}')
}

/// Substitutes punctuation look-alikes and canonicalizes line endings while
/// leaving whitespace runs intact.
pub(crate) fn normalize_punctuation(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .map(|character| match character {
            '\r' => '\n',
            other => canonical_char(other),
        })
        .collect()
}

/// Full normalization applied before any label pattern runs: punctuation
/// substitution, horizontal whitespace collapsed to one space, every line
/// and the text as a whole trimmed.
pub(crate) fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    normalize_punctuation(text)
        .split('\n')
        .map(collapse_horizontal_space)
        .collect::<Vec<String>>()
        .join("\n")
        .trim()
        .to_string()
}

fn collapse_horizontal_space(line: &str) -> String {
    let mut collapsed = String::with_capacity(line.len());
    let mut pending_space = false;

    for character in line.chars() {
        if is_horizontal_space(character) {
            pending_space = !collapsed.is_empty();
            continue;
        }
        if pending_space {
            collapsed.push(' ');
            pending_space = false;
        }
        collapsed.push(character);
    }

    collapsed
}
