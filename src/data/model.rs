use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Compact timestamp layout used by the close-approach source and by
/// date-valued query criteria, e.g. `1900-Jan-01 00:00`.
pub const SOURCE_TIME_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Seconds-free layout used when rendering a timestamp for humans.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

/// A timestamp string that is not in `YYYY-Mon-DD HH:MM` form.
#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("expected YYYY-Mon-DD HH:MM")]
    Shape,
    #[error(transparent)]
    Parse(#[from] chrono::ParseError),
}

/// Parse a compact source timestamp (`YYYY-Mon-DD HH:MM`).
///
/// The layout is checked byte for byte first: chrono on its own accepts
/// signed or short numeric fields and surrounding whitespace.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, TimestampError> {
    if !has_timestamp_shape(s.as_bytes()) {
        return Err(TimestampError::Shape);
    }
    Ok(NaiveDateTime::parse_from_str(s, SOURCE_TIME_FORMAT)?)
}

fn has_timestamp_shape(b: &[u8]) -> bool {
    const DIGITS: [usize; 10] = [0, 1, 2, 3, 9, 10, 12, 13, 15, 16];
    b.len() == 17
        && DIGITS.iter().all(|&i| b[i].is_ascii_digit())
        && b[5..8].iter().all(u8::is_ascii_alphabetic)
        && b[4] == b'-'
        && b[8] == b'-'
        && b[11] == b' '
        && b[14] == b':'
}

/// Render a timestamp without seconds.
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format(DISPLAY_TIME_FORMAT).to_string()
}

/// Coerce a textual field to `f64`. Empty or malformed input becomes NaN.
pub fn coerce_float(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return f64::NAN;
    }
    match s.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            log::debug!("malformed numeric field {s:?}, using NaN");
            f64::NAN
        }
    }
}

/// Canonical (case-insensitive) form of a designation, used as index key.
pub fn canonical_designation(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Title-case a name: the first letter of every alphabetic run is upper-cased
/// and the rest lower-cased, so `"don QUIXOTE"` becomes `"Don Quixote"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// NearEarthObject
// ---------------------------------------------------------------------------

/// A near-Earth object, one row of the object source.
#[derive(Debug, Clone, PartialEq)]
pub struct NearEarthObject {
    designation: String,
    /// `None` when the source left the name empty.
    pub name: Option<String>,
    /// Diameter in km; NaN when unknown.
    pub diameter: f64,
    pub hazardous: bool,
    /// Positions of this object's approaches in the owning database's
    /// approach arena, in input order. Empty until linked.
    pub(crate) approaches: Vec<usize>,
}

impl NearEarthObject {
    /// Build an object from raw source fields. Never fails: an empty name
    /// becomes `None`, an unparseable diameter becomes NaN and any hazard flag
    /// other than `Y` means not hazardous.
    pub fn new(designation: &str, name: &str, diameter: &str, pha: &str) -> Self {
        let name = name.trim();
        Self {
            designation: designation.trim().to_string(),
            name: (!name.is_empty()).then(|| name.to_string()),
            diameter: coerce_float(diameter),
            hazardous: pha.trim().eq_ignore_ascii_case("Y"),
            approaches: Vec::new(),
        }
    }

    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// `433 (Eros)`, or just the designation when the object has no name.
    pub fn fullname(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.designation),
            None => self.designation.clone(),
        }
    }

    /// Number of linked close approaches.
    pub fn approach_count(&self) -> usize {
        self.approaches.len()
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hazard = if self.hazardous { "is" } else { "is not" };
        write!(
            f,
            "NEO {} has a diameter of {:.2} km and {hazard} hazardous.",
            self.fullname(),
            self.diameter
        )
    }
}

// ---------------------------------------------------------------------------
// CloseApproach
// ---------------------------------------------------------------------------

/// A single close approach to Earth, one record of the approach source.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseApproach {
    designation: String,
    pub time: NaiveDateTime,
    /// Nominal approach distance in au; NaN when malformed.
    pub distance: f64,
    /// Relative velocity in km/s; NaN when malformed.
    pub velocity: f64,
    /// Position of the owning object in the database's object arena.
    pub(crate) neo: Option<usize>,
}

impl CloseApproach {
    pub fn new(designation: &str, time: NaiveDateTime, distance: &str, velocity: &str) -> Self {
        Self {
            designation: designation.trim().to_string(),
            time,
            distance: coerce_float(distance),
            velocity: coerce_float(velocity),
            neo: None,
        }
    }

    /// The raw designation this approach was loaded with.
    pub fn designation(&self) -> &str {
        &self.designation
    }

    pub fn time_str(&self) -> String {
        format_timestamp(&self.time)
    }

    pub fn is_linked(&self) -> bool {
        self.neo.is_some()
    }
}

impl fmt::Display for CloseApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "On {}, {} approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.time_str(),
            self.designation,
            self.distance,
            self.velocity
        )
    }
}
