use crate::types::ModeFlag;
use serde::Serialize;

// ---------------------------------------------------------------------------
// RequestFlag / FlagSet
// ---------------------------------------------------------------------------

/// Trailing single-letter flags on a raw request, e.g. `"fix the parser -s -q"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestFlag {
    /// `-s`: split the work across delegates where independence allows.
    Split,
    /// `-q`: force sequential dispatch, never parallelize.
    Sequential,
    /// `-p`: treat this request as planning-phase only.
    Planning,
}

impl RequestFlag {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            's' => Some(RequestFlag::Split),
            'q' => Some(RequestFlag::Sequential),
            'p' => Some(RequestFlag::Planning),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlagSet {
    pub flags: Vec<RequestFlag>,
}

impl FlagSet {
    pub fn contains(&self, flag: RequestFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Session mode requested by the flags: `-p` holds the work in planning,
    /// `-s` asks for delegation. `-p` wins when both are present.
    pub fn requested_mode(&self) -> Option<ModeFlag> {
        if self.contains(RequestFlag::Planning) {
            Some(ModeFlag::Planning)
        } else if self.contains(RequestFlag::Split) {
            Some(ModeFlag::Executing)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// parse_flags()
// ---------------------------------------------------------------------------

/// Strip recognized trailing flags from a request.
///
/// Flags must appear at the very end of the input with no other text after
/// them. An unrecognized flag in the trailing group invalidates the whole
/// group — the input is returned unchanged with no flags — so ordinary text
/// that happens to end in `-x` is never silently eaten.
pub fn parse_flags(input: &str) -> (String, FlagSet) {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    // Walk backwards over flag-shaped tokens.
    let mut split_at = tokens.len();
    while split_at > 0 && is_flag_shaped(tokens[split_at - 1]) {
        split_at -= 1;
    }

    let trailing = &tokens[split_at..];
    if trailing.is_empty() || split_at == 0 {
        return (input.trim().to_string(), FlagSet::default());
    }

    let mut flags = Vec::with_capacity(trailing.len());
    for token in trailing {
        let letter = token.chars().nth(1).unwrap_or('\0');
        match RequestFlag::from_letter(letter) {
            Some(flag) => {
                if !flags.contains(&flag) {
                    flags.push(flag);
                }
            }
            // Unknown flag: the group is ordinary text.
            None => return (input.trim().to_string(), FlagSet::default()),
        }
    }

    (tokens[..split_at].join(" "), FlagSet { flags })
}

fn is_flag_shaped(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('-')
        && matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.next().is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
